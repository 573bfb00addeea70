mod file_source;
mod local;
mod resource;
mod response;
#[cfg(test)]
pub(crate) mod stub;

pub use file_source::{CancelToken, FetchHandle, FileSource, ResponseCallback};
pub use local::{LocalFileSource, local_path};
pub use resource::{Resource, ResourceKind};
pub use response::Response;
