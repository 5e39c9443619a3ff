//! Test doubles for the camera collaborator.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::capture::camera::Camera;
use crate::error::GifawayError;

/// Returns `still-N` for the N-th call, failing the first `fail_first` calls.
pub struct ScriptedCamera {
    calls: AtomicU32,
    fail_first: u32,
}

impl ScriptedCamera {
    pub fn numbered() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(fail_first: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_first,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Camera for ScriptedCamera {
    fn screenshot(&self) -> Result<String, GifawayError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_first {
            return Err(GifawayError::FrameUnavailable("warming up".into()));
        }
        Ok(format!("still-{}", call))
    }
}
