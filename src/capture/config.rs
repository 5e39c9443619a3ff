use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GifawayError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Ticks spent counting down before the first still.
    pub countdown_ticks: u32,
    /// Stills taken per run.
    pub image_count: u32,
    pub tick_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: 3,
            image_count: 3,
            tick_interval_ms: 1000,
        }
    }
}

impl CaptureConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Last tick of the capture window.
    pub fn last_capture_tick(&self) -> u32 {
        self.countdown_ticks.saturating_add(self.image_count)
    }

    /// Pre-increment tick count at which a run signals completion.
    /// One idle tick separates it from the last capture.
    pub fn completion_tick(&self) -> u32 {
        self.last_capture_tick().saturating_add(1)
    }

    pub fn validate(&self) -> Result<(), GifawayError> {
        if self.image_count == 0 {
            return Err(GifawayError::InvalidConfig(
                "image_count must be at least 1".into(),
            ));
        }
        let completion = self
            .countdown_ticks
            .checked_add(self.image_count)
            .and_then(|last| last.checked_add(1));
        if completion.is_none() {
            return Err(GifawayError::InvalidConfig(format!(
                "countdown_ticks ({}) plus image_count ({}) is too large",
                self.countdown_ticks, self.image_count
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(GifawayError::InvalidConfig(
                "tick_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StillFormat {
    Jpeg,
    Png,
}

impl StillFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            StillFormat::Jpeg => "image/jpeg",
            StillFormat::Png => "image/png",
        }
    }

    /// Guess from a frame file's extension; unknown extensions are treated as JPEG.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => StillFormat::Png,
            _ => StillFormat::Jpeg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GifConfig {
    pub width: u32,
    pub height: u32,
    /// Display time of each frame.
    pub frame_interval_secs: f32,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            frame_interval_secs: 0.3,
        }
    }
}

impl GifConfig {
    pub fn validate(&self) -> Result<(), GifawayError> {
        if self.width == 0 || self.height == 0 {
            return Err(GifawayError::InvalidConfig(format!(
                "GIF dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.frame_interval_secs.is_finite() || self.frame_interval_secs <= 0.0 {
            return Err(GifawayError::InvalidConfig(format!(
                "frame_interval_secs must be positive, got {}",
                self.frame_interval_secs
            )));
        }
        Ok(())
    }
}
