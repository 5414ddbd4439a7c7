use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Media library permission not granted.")]
    PermissionDenied,

    #[error("Failed to read file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Access to device capabilities a screen may need
#[async_trait]
pub trait Device: Send + Sync {
    /// Pick an image and return it base64-encoded; `None` when the user cancels
    async fn pick_image_base64(&self) -> Result<Option<String>, DeviceError>;
}

/// Picker backed by a file on disk.
///
/// A terminal has no gallery, so the "picked" image is whatever file the
/// configuration points at. No configured file behaves like a cancelled pick.
pub struct FileDevice {
    image_path: Option<PathBuf>,
}

impl FileDevice {
    pub fn new(image_path: Option<PathBuf>) -> Self {
        Self { image_path }
    }
}

#[async_trait]
impl Device for FileDevice {
    async fn pick_image_base64(&self) -> Result<Option<String>, DeviceError> {
        let Some(path) = &self.image_path else {
            debug!("No image configured, treating pick as cancelled");
            return Ok(None);
        };

        let bytes = tokio::fs::read(path).await.map_err(|source| match source.kind() {
            ErrorKind::PermissionDenied => DeviceError::PermissionDenied,
            _ => DeviceError::Read {
                path: path.clone(),
                source,
            },
        })?;

        info!("Picked image {:?} ({} bytes)", path, bytes.len());
        Ok(Some(STANDARD.encode(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_unconfigured_picker_cancels() {
        let device = FileDevice::new(None);
        assert_eq!(device.pick_image_base64().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reads_and_encodes_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let device = FileDevice::new(Some(file.path().to_path_buf()));
        assert_eq!(device.pick_image_base64().await.unwrap().as_deref(), Some("aGVsbG8="));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let device = FileDevice::new(Some(PathBuf::from("/no/such/image.png")));
        let err = device.pick_image_base64().await.unwrap_err();
        assert!(matches!(err, DeviceError::Read { .. }));
    }
}
