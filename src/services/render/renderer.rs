use std::sync::Arc;

use crate::capture::config::GifConfig;
use crate::error::GifawayError;
use crate::services::render::encoder::AnimationEncoder;
use crate::services::storage::manager::{Gallery, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Placeholder,
    /// `data:image/gif;base64,...`
    Gif(String),
}

/// One gallery entry memoized on the identity of its session.
#[derive(Debug, Default)]
pub struct GifSlot {
    input: Option<Arc<Session>>,
    output: Option<String>,
}

impl GifSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `session`, re-encoding only when a different `Arc` is passed.
    ///
    /// A failed encode keeps whatever was shown before. Empty sessions never
    /// reach the encoder.
    pub fn render(
        &mut self,
        session: &Arc<Session>,
        encoder: &dyn AnimationEncoder,
        config: &GifConfig,
    ) -> Rendered {
        let unchanged = self
            .input
            .as_ref()
            .is_some_and(|previous| Arc::ptr_eq(previous, session));
        if !unchanged {
            self.input = Some(Arc::clone(session));
            if session.is_empty() {
                log::debug!("Session has no stills, leaving placeholder");
            } else {
                match encoder.encode(
                    session.stills(),
                    config.width,
                    config.height,
                    config.frame_interval_secs,
                ) {
                    Ok(gif) => self.output = Some(gif),
                    Err(e) => log::warn!("Keeping placeholder, encode failed: {}", e),
                }
            }
        }
        self.output()
    }

    pub fn output(&self) -> Rendered {
        match &self.output {
            Some(gif) => Rendered::Gif(gif.clone()),
            None => Rendered::Placeholder,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGif {
    /// Position in capture order.
    pub index: usize,
    pub digest: String,
    pub output: Rendered,
}

impl RenderedGif {
    pub fn file_name(&self) -> String {
        format!("GIF {}.gif", &self.digest[..self.digest.len().min(12)])
    }
}

/// Renders a whole gallery, newest first, with one memoized slot per entry.
pub struct GalleryRenderer {
    encoder: Arc<dyn AnimationEncoder>,
    config: GifConfig,
    slots: Vec<GifSlot>,
}

impl GalleryRenderer {
    pub fn new(encoder: Arc<dyn AnimationEncoder>, config: GifConfig) -> Result<Self, GifawayError> {
        config.validate()?;
        Ok(Self {
            encoder,
            config,
            slots: Vec::new(),
        })
    }

    pub fn render(&mut self, gallery: &Gallery) -> Vec<RenderedGif> {
        // The gallery only grows, so capture index is a stable slot key.
        self.slots.resize_with(gallery.len(), GifSlot::new);
        gallery
            .most_recent_first()
            .map(|(index, session)| RenderedGif {
                index,
                digest: session.digest(),
                output: self.slots[index].render(session, self.encoder.as_ref(), &self.config),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingEncoder {
        calls: AtomicUsize,
        fail: bool,
    }

    impl AnimationEncoder for CountingEncoder {
        fn encode(
            &self,
            stills: &[String],
            _width: u32,
            _height: u32,
            _frame_interval_secs: f32,
        ) -> Result<String, GifawayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GifawayError::EncodeFailed("boom".into()));
            }
            Ok(format!("gif:{}", stills.join("+")))
        }
    }

    fn session(stills: &[&str]) -> Arc<Session> {
        Arc::new(Session::new(stills.iter().map(|s| s.to_string()).collect()))
    }

    #[test]
    fn same_reference_encodes_once() {
        let encoder = CountingEncoder::default();
        let config = GifConfig::default();
        let input = session(&["a", "b"]);
        let mut slot = GifSlot::new();

        let first = slot.render(&input, &encoder, &config);
        let second = slot.render(&input, &encoder, &config);

        assert_eq!(first, Rendered::Gif("gif:a+b".into()));
        assert_eq!(first, second);
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn new_reference_re_encodes_even_with_equal_content() {
        let encoder = CountingEncoder::default();
        let config = GifConfig::default();
        let mut slot = GifSlot::new();

        slot.render(&session(&["a"]), &encoder, &config);
        slot.render(&session(&["a"]), &encoder, &config);
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn encode_failure_keeps_placeholder() {
        let encoder = CountingEncoder {
            fail: true,
            ..CountingEncoder::default()
        };
        let mut slot = GifSlot::new();
        let rendered = slot.render(&session(&["a"]), &encoder, &GifConfig::default());
        assert_eq!(rendered, Rendered::Placeholder);
    }

    #[test]
    fn empty_session_skips_encoder() {
        let encoder = CountingEncoder::default();
        let mut slot = GifSlot::new();
        let rendered = slot.render(&session(&[]), &encoder, &GifConfig::default());
        assert_eq!(rendered, Rendered::Placeholder);
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn gallery_renders_newest_first_and_memoizes_old_entries() {
        let encoder = Arc::new(CountingEncoder::default());
        let mut renderer = GalleryRenderer::new(encoder.clone(), GifConfig::default()).unwrap();

        let mut gallery = Gallery::new();
        gallery.push(session(&["A"]));
        gallery.push(session(&["B"]));
        renderer.render(&gallery);
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 2);

        gallery.push(session(&["S"]));
        let rendered = renderer.render(&gallery);
        let outputs: Vec<&Rendered> = rendered.iter().map(|r| &r.output).collect();
        assert_eq!(
            outputs,
            vec![
                &Rendered::Gif("gif:S".into()),
                &Rendered::Gif("gif:B".into()),
                &Rendered::Gif("gif:A".into()),
            ]
        );
        assert_eq!(rendered.iter().map(|r| r.index).collect::<Vec<_>>(), vec![2, 1, 0]);
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn file_name_uses_digest_prefix() {
        let gif = RenderedGif {
            index: 0,
            digest: "0123456789abcdef".into(),
            output: Rendered::Placeholder,
        };
        assert_eq!(gif.file_name(), "GIF 0123456789ab.gif");
    }
}
