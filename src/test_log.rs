//! Process-wide `log` sink that lets tests count emitted diagnostics.

use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};
static INIT: Once = Once::new();

pub(crate) fn init() {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Number of records at `level` whose text is exactly `message`.
/// Tests run in parallel, so callers should use messages unique to them.
pub(crate) fn count(level: Level, message: &str) -> usize {
    LOGGER
        .records
        .lock()
        .map(|records| {
            records
                .iter()
                .filter(|(l, m)| *l == level && m == message)
                .count()
        })
        .unwrap_or(0)
}
