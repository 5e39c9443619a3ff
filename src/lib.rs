pub mod capture;
pub mod error;
pub mod events;
pub mod services;
pub mod state;
pub mod ui;

use std::sync::Arc;

use crate::capture::camera::FrameFileCamera;
use crate::error::GifawayError;
use crate::services::render::encoder::ImageGifEncoder;
use crate::services::storage::kv::{FileStore, KeyValueStore, MemoryStore};
use crate::state::app_state::AppState;
use crate::state::settings::AppSettings;
use crate::ui::console::Console;

pub fn run() -> Result<(), GifawayError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Everything runs on one thread; ticks are serialized by the ticker task.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(launch())
}

async fn launch() -> Result<(), GifawayError> {
    let data_dir = AppSettings::data_dir();
    let settings = match &data_dir {
        Some(dir) => AppSettings::load(dir)?,
        None => AppSettings::default(),
    };

    let store: Arc<dyn KeyValueStore> = match &data_dir {
        Some(dir) => Arc::new(FileStore::open(dir.join("storage"))?),
        None => {
            log::warn!("No data directory available; the gallery will not survive a restart");
            Arc::new(MemoryStore::default())
        }
    };
    let base_dir = data_dir.unwrap_or_else(|| std::env::temp_dir().join("Gifaway"));

    let camera = FrameFileCamera::new(settings.camera_frame_path(&base_dir));
    log::info!("Reading camera frames from {}", camera.path().display());

    let state = Arc::new(AppState::new(
        store,
        Arc::new(camera),
        Arc::new(ImageGifEncoder),
        &settings,
    )?);
    Console::new(state, settings.gallery_path(&base_dir)).run().await
}
