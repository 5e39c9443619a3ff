use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::capture::config::StillFormat;
use crate::capture::screenshot::encode_data_url;
use crate::error::GifawayError;

/// Source of stills for a capture run.
pub trait Camera: Send + Sync {
    /// Grab the current frame as an encoded still (`data:` URL).
    ///
    /// Returns [`GifawayError::FrameUnavailable`] while the feed is not ready.
    fn screenshot(&self) -> Result<String, GifawayError>;
}

/// Reads the frame an external capture process keeps overwriting on disk,
/// e.g. `ffmpeg -f v4l2 -i /dev/video0 -update 1 frame.jpg`.
pub struct FrameFileCamera {
    path: PathBuf,
    format: StillFormat,
}

impl FrameFileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = StillFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Camera for FrameFileCamera {
    fn screenshot(&self) -> Result<String, GifawayError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GifawayError::FrameUnavailable(format!(
                    "no frame at {}",
                    self.path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            // The writer truncates before each frame; treat the gap as not ready.
            return Err(GifawayError::FrameUnavailable("frame file is empty".into()));
        }
        Ok(encode_data_url(&bytes, self.format.mime()))
    }
}
