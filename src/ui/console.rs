use std::future::Future;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use crate::capture::controller::RunHandle;
use crate::capture::screenshot::decode_data_url;
use crate::error::GifawayError;
use crate::events::RunUpdate;
use crate::services::render::renderer::{Rendered, RenderedGif};
use crate::state::app_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    List,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "s" | "start" => Some(Command::Start),
            "c" | "cancel" => Some(Command::Cancel),
            "l" | "list" => Some(Command::List),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "Commands: [Enter]/start, cancel, list, quit";

/// Feed stdin lines from a plain OS thread.
///
/// A blocked read there never holds up runtime shutdown; the thread dies
/// with the process.
pub fn stdin_lines() -> Result<mpsc::UnboundedReceiver<String>, GifawayError> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("gifaway-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("Stopped reading stdin: {}", e);
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

/// Terminal front end: start control, live status readout and the gallery.
pub struct Console {
    state: Arc<AppState>,
    gallery_dir: PathBuf,
}

impl Console {
    pub fn new(state: Arc<AppState>, gallery_dir: impl Into<PathBuf>) -> Self {
        Self {
            state,
            gallery_dir: gallery_dir.into(),
        }
    }

    /// Serve stdin until `quit`, end of input or Ctrl-C.
    pub async fn run(&self) -> Result<(), GifawayError> {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Ctrl-C handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.serve(stdin_lines()?, shutdown).await
    }

    /// Command loop over `lines`; returns when `shutdown` resolves, after
    /// tearing down any live run.
    pub async fn serve<F>(
        &self,
        mut lines: mpsc::UnboundedReceiver<String>,
        shutdown: F,
    ) -> Result<(), GifawayError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut gallery_updates = self.state.subscribe();
        let mut active: Option<RunHandle> = None;

        println!("Gifaway 📸");
        self.show_gallery();
        self.prompt(&active);

        loop {
            tokio::select! {
                line = lines.recv() => {
                    let Some(line) = line else { break };
                    match Command::parse(&line) {
                        Some(Command::Start) => match self.state.start_capture() {
                            Ok(handle) => active = Some(handle),
                            Err(GifawayError::RunActive) => println!("A capture is already running"),
                            Err(e) => return Err(e),
                        },
                        Some(Command::Cancel) => match active.take() {
                            Some(handle) => {
                                handle.cancel();
                                println!("Capture cancelled");
                                self.prompt(&active);
                            }
                            None => println!("Nothing to cancel"),
                        },
                        Some(Command::List) => self.show_gallery(),
                        Some(Command::Quit) => break,
                        None => println!("{}", HELP),
                    }
                }
                update = next_update(&mut active), if active.is_some() => match update {
                    Some(RunUpdate::Status(phase)) => println!("{}", phase),
                    Some(RunUpdate::Completed(session)) => {
                        active = None;
                        if let Err(e) = self.state.store_session(session) {
                            log::error!("Session kept in memory only: {}", e);
                        }
                    }
                    None => {
                        active = None;
                        self.prompt(&active);
                    }
                },
                event = gallery_updates.recv() => match event {
                    Ok(event) => {
                        log::debug!("{} at {}", event.name(), event.updated_at);
                        self.show_gallery();
                        self.prompt(&active);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::debug!("Skipped {} gallery updates", skipped);
                        self.show_gallery();
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => break,
            }
        }

        // Tear down any live run before leaving; it must not complete later.
        if let Some(handle) = active.take() {
            handle.cancel();
        }
        Ok(())
    }

    fn prompt(&self, active: &Option<RunHandle>) {
        if active.is_none() && !self.state.capture_active() {
            println!("Press Enter to start! 📸  ({})", HELP);
        }
    }

    /// List the gallery newest first. Write failures are logged, never fatal.
    fn show_gallery(&self) {
        let rendered = self.state.render_gallery();
        if rendered.is_empty() {
            println!("Gallery is empty");
            return;
        }
        if let Err(e) = std::fs::create_dir_all(&self.gallery_dir) {
            log::error!(
                "Cannot create gallery directory {}: {}",
                self.gallery_dir.display(),
                e
            );
        }
        for gif in &rendered {
            match describe(gif, &self.gallery_dir) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    log::error!("Could not save GIF #{}: {}", gif.index + 1, e);
                    println!("#{} 🍭", gif.index + 1);
                }
            }
        }
    }
}

async fn next_update(active: &mut Option<RunHandle>) -> Option<RunUpdate> {
    match active {
        Some(handle) => handle.next_update().await,
        None => std::future::pending().await,
    }
}

/// One gallery line; writes the GIF to `dir` the first time it is seen.
fn describe(gif: &RenderedGif, dir: &Path) -> Result<String, GifawayError> {
    match &gif.output {
        Rendered::Gif(data_url) => {
            let path = dir.join(gif.file_name());
            if !path.exists() {
                std::fs::write(&path, decode_data_url(data_url)?)?;
            }
            Ok(format!("#{} {}", gif.index + 1, path.display()))
        }
        Rendered::Placeholder => Ok(format!("#{} 🍭", gif.index + 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::screenshot::encode_data_url;
    use crate::capture::testing::ScriptedCamera;
    use crate::services::render::encoder::AnimationEncoder;
    use crate::services::storage::kv::{KeyValueStore, MemoryStore};
    use crate::state::settings::AppSettings;
    use std::time::Duration;

    struct StubGifEncoder;

    impl AnimationEncoder for StubGifEncoder {
        fn encode(
            &self,
            _stills: &[String],
            _width: u32,
            _height: u32,
            _frame_interval_secs: f32,
        ) -> Result<String, GifawayError> {
            Ok(encode_data_url(b"GIF89a", "image/gif"))
        }
    }

    fn app(stored: &str) -> Arc<AppState> {
        let store = Arc::new(MemoryStore::default());
        store.set("gifawayStore", stored).unwrap();
        Arc::new(
            AppState::new(
                store,
                Arc::new(ScriptedCamera::numbered()),
                Arc::new(StubGifEncoder),
                &AppSettings::default(),
            )
            .unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_mid_run_returns_and_tears_the_run_down() {
        let state = app("[]");
        let dir = tempfile::tempdir().unwrap();
        let console = Console::new(Arc::clone(&state), dir.path());

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("start".to_string()).unwrap();
        let shutdown = tokio::time::sleep(Duration::from_millis(2500));

        // tx stays alive: input is still open when shutdown arrives
        console.serve(rx, shutdown).await.unwrap();
        assert!(!state.capture_active());
        assert_eq!(state.session_count(), 0);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn end_of_input_returns() {
        let state = app("[]");
        let dir = tempfile::tempdir().unwrap();
        let console = Console::new(state, dir.path());

        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(tx);
        console.serve(rx, std::future::pending()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn unwritable_gallery_dir_keeps_the_console_alive() {
        let state = app(r#"[["a"],["b"]]"#);
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("not-a-dir");
        std::fs::write(&blocked, b"file").unwrap();
        let console = Console::new(Arc::clone(&state), &blocked);

        let (tx, rx) = mpsc::unbounded_channel();
        for line in ["list", "start"] {
            tx.send(line.to_string()).unwrap();
        }

        let completed = tokio::time::sleep(Duration::from_secs(9));
        console.serve(rx, completed).await.unwrap();
        // the run finished and was stored even though no GIF could be written
        assert_eq!(state.session_count(), 3);
        drop(tx);
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(""), Some(Command::Start));
        assert_eq!(Command::parse("  START \n"), Some(Command::Start));
        assert_eq!(Command::parse("cancel"), Some(Command::Cancel));
        assert_eq!(Command::parse("l"), Some(Command::List));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("dance"), None);
    }

    #[test]
    fn describe_writes_gif_once() {
        let dir = tempfile::tempdir().unwrap();
        let gif = RenderedGif {
            index: 1,
            digest: "abcdef0123456789".into(),
            output: Rendered::Gif(encode_data_url(b"GIF89a", "image/gif")),
        };

        let line = describe(&gif, dir.path()).unwrap();
        let path = dir.path().join("GIF abcdef012345.gif");
        assert_eq!(line, format!("#2 {}", path.display()));
        assert_eq!(std::fs::read(&path).unwrap(), b"GIF89a");

        std::fs::write(&path, b"kept").unwrap();
        describe(&gif, dir.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"kept");
    }

    #[test]
    fn placeholder_line() {
        let dir = tempfile::tempdir().unwrap();
        let gif = RenderedGif {
            index: 0,
            digest: String::new(),
            output: Rendered::Placeholder,
        };
        assert_eq!(describe(&gif, dir.path()).unwrap(), "#1 🍭");
    }
}
