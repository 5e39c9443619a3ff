use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::capture::camera::Camera;
use crate::capture::config::CaptureConfig;
use crate::capture::run::{CaptureRun, TickOutcome};
use crate::capture::ticker::Ticker;
use crate::error::GifawayError;
use crate::events::{RunUpdate, CAPTURE_CANCELLED, CAPTURE_COMPLETED};
use crate::services::storage::manager::Session;

type ActiveSlot = Arc<Mutex<Option<Uuid>>>;

/// Starts capture runs against a shared camera, one at a time.
pub struct CaptureController {
    camera: Arc<dyn Camera>,
    config: CaptureConfig,
    active: ActiveSlot,
}

impl CaptureController {
    pub fn new(camera: Arc<dyn Camera>, config: CaptureConfig) -> Result<Self, GifawayError> {
        config.validate()?;
        Ok(Self {
            camera,
            config,
            active: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Whether a run currently holds the camera. The start control is only
    /// offered while this is false.
    pub fn is_active(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Start a new run. Fails with [`GifawayError::RunActive`] while another
    /// run is live.
    pub fn start(&self) -> Result<RunHandle, GifawayError> {
        let mut run = CaptureRun::new(self.config.clone());
        let run_id = run.id();
        {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(current) = *active {
                log::warn!("Rejected start request: run {} is still active", current);
                return Err(GifawayError::RunActive);
            }
            *active = Some(run_id);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let _ = tx.send(RunUpdate::Status(run.phase()));

        let camera = Arc::clone(&self.camera);
        let slot = Arc::clone(&self.active);
        let stop = Arc::clone(&cancelled);
        let ticker = Ticker::start(self.config.tick_interval(), move || {
            if stop.load(Ordering::SeqCst) {
                return ControlFlow::Break(());
            }
            match run.tick(camera.as_ref()) {
                TickOutcome::Running(phase) => {
                    let update = RunUpdate::Status(phase);
                    log::debug!("{}: run {} {}", update.name(), run_id, phase);
                    let _ = tx.send(update);
                    ControlFlow::Continue(())
                }
                TickOutcome::Completed(session) => {
                    release(&slot, run_id);
                    log::info!(
                        "{}: run {} with {} stills",
                        CAPTURE_COMPLETED,
                        run_id,
                        session.len()
                    );
                    let _ = tx.send(RunUpdate::Completed(session));
                    ControlFlow::Break(())
                }
                TickOutcome::Finished => ControlFlow::Break(()),
            }
        });

        log::info!("Capture run {} started", run_id);
        Ok(RunHandle {
            id: run_id,
            updates: rx,
            cancelled,
            active: Arc::clone(&self.active),
            _ticker: ticker,
        })
    }
}

/// Clears the active slot if it still belongs to `run_id`.
fn release(slot: &ActiveSlot, run_id: Uuid) -> bool {
    let mut active = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if *active == Some(run_id) {
        *active = None;
        true
    } else {
        false
    }
}

/// Owner of a live run. Dropping it tears the run down: the timer stops and
/// no completion is delivered afterwards.
pub struct RunHandle {
    id: Uuid,
    updates: mpsc::UnboundedReceiver<RunUpdate>,
    cancelled: Arc<AtomicBool>,
    active: ActiveSlot,
    _ticker: Ticker,
}

impl RunHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next status or completion; `None` once the run has ended.
    pub async fn next_update(&mut self) -> Option<RunUpdate> {
        self.updates.recv().await
    }

    /// Wait for the run to complete, discarding status updates.
    pub async fn finish(mut self) -> Option<Session> {
        while let Some(update) = self.next_update().await {
            if let RunUpdate::Completed(session) = update {
                return Some(session);
            }
        }
        None
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.updates.close();
        if release(&self.active, self.id) {
            log::info!("{}: run {}", CAPTURE_CANCELLED, self.id);
        }
    }
}
