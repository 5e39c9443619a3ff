use uuid::Uuid;

use crate::capture::camera::Camera;
use crate::capture::config::CaptureConfig;
use crate::capture::phase::{determine_capture_mode, CaptureMode, CapturePhase};
use crate::services::storage::manager::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Still running; carries the phase to show until the next tick.
    Running(CapturePhase),
    /// Fired exactly once, on the completion tick.
    Completed(Session),
    /// The run already completed; nothing happened.
    Finished,
}

/// Transient state of one capture run.
#[derive(Debug)]
pub struct CaptureRun {
    id: Uuid,
    config: CaptureConfig,
    count: u32,
    stills: Vec<String>,
    completed: bool,
}

impl CaptureRun {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            count: 0,
            stills: Vec::new(),
            completed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn stills(&self) -> &[String] {
        &self.stills
    }

    pub fn phase(&self) -> CapturePhase {
        CapturePhase::at(self.count, &self.config)
    }

    /// Advance the run by one tick.
    ///
    /// Capture and completion are both decided on the count as it was before
    /// this tick, so completion lands one tick after the last capture.
    pub fn tick(&mut self, camera: &dyn Camera) -> TickOutcome {
        if self.completed {
            return TickOutcome::Finished;
        }

        let count = self.count;
        self.count = self.count.saturating_add(1);

        if determine_capture_mode(count, &self.config) == CaptureMode::Capture {
            match camera.screenshot() {
                Ok(still) => self.stills.push(still),
                Err(e) => log::debug!("Run {}: no still at tick {}: {}", self.id, count, e),
            }
        }

        if count == self.config.completion_tick() {
            self.completed = true;
            let stills = std::mem::take(&mut self.stills);
            if stills.len() < self.config.image_count as usize {
                log::warn!(
                    "Run {} completed with {} of {} stills",
                    self.id,
                    stills.len(),
                    self.config.image_count
                );
            }
            return TickOutcome::Completed(Session::new(stills));
        }

        TickOutcome::Running(self.phase())
    }
}
