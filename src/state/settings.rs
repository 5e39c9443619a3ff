use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capture::config::{CaptureConfig, GifConfig};
use crate::error::GifawayError;
use crate::services::storage::manager::DEFAULT_STORAGE_KEY;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub capture: CaptureConfig,
    pub gif: GifConfig,
    pub storage_key: String,
    /// Frame file the camera reads; defaults under the data directory.
    pub camera_frame: Option<PathBuf>,
    /// Where rendered GIFs are written; defaults under the data directory.
    pub gallery_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            gif: GifConfig::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            camera_frame: None,
            gallery_dir: None,
        }
    }
}

impl AppSettings {
    /// Per-user application directory.
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("Gifaway"))
    }

    /// Read `settings.json` from `dir`; a missing file means defaults.
    pub fn load(dir: &Path) -> Result<Self, GifawayError> {
        let path = dir.join(SETTINGS_FILE);
        let settings: Self = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), GifawayError> {
        self.capture.validate()?;
        self.gif.validate()?;
        if self.storage_key.trim().is_empty() {
            return Err(GifawayError::InvalidConfig("storage_key must not be empty".into()));
        }
        Ok(())
    }

    pub fn camera_frame_path(&self, data_dir: &Path) -> PathBuf {
        self.camera_frame
            .clone()
            .unwrap_or_else(|| data_dir.join("camera").join("frame.jpg"))
    }

    pub fn gallery_path(&self, data_dir: &Path) -> PathBuf {
        self.gallery_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("Gallery"))
    }
}
