use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::capture::camera::Camera;
use crate::capture::controller::{CaptureController, RunHandle};
use crate::error::GifawayError;
use crate::events::GalleryUpdated;
use crate::services::render::encoder::AnimationEncoder;
use crate::services::render::renderer::{GalleryRenderer, RenderedGif};
use crate::services::storage::kv::KeyValueStore;
use crate::services::storage::manager::{GalleryStore, Session};
use crate::state::settings::AppSettings;

/// Global application state, built once at startup
pub struct AppState {
    pub gallery: Mutex<GalleryStore>,
    pub controller: CaptureController,
    pub renderer: Mutex<GalleryRenderer>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        camera: Arc<dyn Camera>,
        encoder: Arc<dyn AnimationEncoder>,
        settings: &AppSettings,
    ) -> Result<Self, GifawayError> {
        settings.validate()?;
        Ok(Self {
            gallery: Mutex::new(GalleryStore::load(store, settings.storage_key.clone())),
            controller: CaptureController::new(camera, settings.capture.clone())?,
            renderer: Mutex::new(GalleryRenderer::new(encoder, settings.gif.clone())?),
        })
    }

    pub fn start_capture(&self) -> Result<RunHandle, GifawayError> {
        self.controller.start()
    }

    pub fn capture_active(&self) -> bool {
        self.controller.is_active()
    }

    /// Append a completed run's session to the gallery and persist it.
    pub fn store_session(&self, session: Session) -> Result<Arc<Session>, GifawayError> {
        self.gallery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append(session)
    }

    /// Run one capture to completion and store its session.
    ///
    /// `Ok(None)` if the run ended without completing.
    pub async fn capture_session(&self) -> Result<Option<Arc<Session>>, GifawayError> {
        let handle = self.start_capture()?;
        match handle.finish().await {
            Some(session) => self.store_session(session).map(Some),
            None => Ok(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryUpdated> {
        self.gallery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribe()
    }

    pub fn session_count(&self) -> usize {
        self.gallery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gallery()
            .len()
    }

    /// Rendered gallery, newest first.
    pub fn render_gallery(&self) -> Vec<RenderedGif> {
        let gallery = self.gallery.lock().unwrap_or_else(PoisonError::into_inner);
        let mut renderer = self.renderer.lock().unwrap_or_else(PoisonError::into_inner);
        renderer.render(gallery.gallery())
    }
}
