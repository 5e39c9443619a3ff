use serde::Serialize;

use crate::capture::phase::CapturePhase;
use crate::services::storage::manager::Session;

/// Event name constants for backend -> surface notifications
pub const CAPTURE_STATUS: &str = "capture:status";
pub const CAPTURE_COMPLETED: &str = "capture:completed";
pub const CAPTURE_CANCELLED: &str = "capture:cancelled";
pub const GALLERY_UPDATED: &str = "gallery:updated";

/// Progress of a single capture run, delivered on the run's own channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum RunUpdate {
    Status(CapturePhase),
    Completed(Session),
}

impl RunUpdate {
    pub fn name(&self) -> &'static str {
        match self {
            RunUpdate::Status(_) => CAPTURE_STATUS,
            RunUpdate::Completed(_) => CAPTURE_COMPLETED,
        }
    }
}

/// Broadcast by the gallery store after every append.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryUpdated {
    pub sessions: usize,
    pub appended_frames: usize,
    pub updated_at: String,
}

impl GalleryUpdated {
    pub fn new(sessions: usize, appended_frames: usize) -> Self {
        Self {
            sessions,
            appended_frames,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn name(&self) -> &'static str {
        GALLERY_UPDATED
    }
}
