mod controller;
mod observer;
mod session;
mod store;
mod worker;

pub use controller::SpriteAtlas;
pub use observer::{AtlasObserver, Images, NullObserver};
pub use store::ImageStore;
pub use worker::DecodeWorker;
