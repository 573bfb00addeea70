use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use super::{FetchHandle, FileSource, Resource, Response, ResponseCallback};

/// Serves `file://` URLs and plain paths from the local disk.
///
/// Every request reads on its own background thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSource;

impl LocalFileSource {
    pub fn new() -> Self {
        Self
    }
}

impl FileSource for LocalFileSource {
    fn request(&self, resource: Resource, callback: ResponseCallback) -> FetchHandle {
        let handle = FetchHandle::new();
        let token = handle.token();

        std::thread::spawn(move || {
            if token.is_cancelled() {
                return;
            }
            let response = read_resource(&resource.url);
            if token.is_cancelled() {
                debug!("Discarding response for cancelled request {}", resource.url);
                return;
            }
            callback(response);
        });

        handle
    }
}

/// Filesystem path a local URL points at
pub fn local_path(url: &str) -> &Path {
    Path::new(url.strip_prefix("file://").unwrap_or(url))
}

fn read_resource(url: &str) -> Response {
    let path = local_path(url);
    match fs::read(path) {
        Ok(data) if data.is_empty() => Response::NoContent,
        Ok(data) => Response::Data(data),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Response::Error(format!("{}: not found", path.display()))
        }
        Err(e) => Response::Error(format!("{}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ResourceKind;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::Duration;

    fn fixture(name: &str, contents: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join("sprite-atlas-local-tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn fetch(url: String) -> Response {
        let (tx, rx) = mpsc::channel();
        let resource = Resource {
            kind: ResourceKind::SpriteJson,
            url,
        };
        let _handle = LocalFileSource::new().request(
            resource,
            Box::new(move |response| {
                let _ = tx.send(response);
            }),
        );
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_local_path_strips_scheme() {
        assert_eq!(local_path("file:///tmp/sprite.json"), Path::new("/tmp/sprite.json"));
        assert_eq!(local_path("assets/sprite.json"), Path::new("assets/sprite.json"));
    }

    #[test]
    fn test_reads_data() {
        let path = fixture("data.json", b"{}");
        let url = format!("file://{}", path.display());
        assert_eq!(fetch(url), Response::Data(b"{}".to_vec()));
    }

    #[test]
    fn test_empty_file_is_no_content() {
        let path = fixture("empty.json", b"");
        assert_eq!(fetch(path.display().to_string()), Response::NoContent);
    }

    #[test]
    fn test_missing_file_is_error() {
        let path = std::env::temp_dir().join("sprite-atlas-local-tests/does-not-exist.json");
        assert_eq!(
            fetch(path.display().to_string()),
            Response::Error(format!("{}: not found", path.display()))
        );
    }
}
