use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capture::config::CaptureConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Countdown,
    Capture,
    Done,
}

/// Classify a tick count against the countdown and capture thresholds.
pub fn determine_capture_mode(count: u32, config: &CaptureConfig) -> CaptureMode {
    if count <= config.countdown_ticks {
        CaptureMode::Countdown
    } else if count <= config.last_capture_tick() {
        CaptureMode::Capture
    } else {
        CaptureMode::Done
    }
}

/// What the status readout shows for a given tick count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum CapturePhase {
    Countdown { remaining: u32 },
    Capture { index: u32, total: u32 },
    Done,
}

impl CapturePhase {
    pub fn at(count: u32, config: &CaptureConfig) -> Self {
        match determine_capture_mode(count, config) {
            CaptureMode::Countdown => CapturePhase::Countdown {
                remaining: config.countdown_ticks - count,
            },
            CaptureMode::Capture => CapturePhase::Capture {
                index: count - config.countdown_ticks,
                total: config.image_count,
            },
            CaptureMode::Done => CapturePhase::Done,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        match self {
            CapturePhase::Countdown { .. } => CaptureMode::Countdown,
            CapturePhase::Capture { .. } => CaptureMode::Capture,
            CapturePhase::Done => CaptureMode::Done,
        }
    }
}

const PICTURE_EMOJI: [&str; 4] = ["🎩", "✨", "🔮", "🎉"];

impl fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapturePhase::Countdown { remaining } => {
                write!(f, "🔥 COUNTDOWN! GET READY! {} 🔥", remaining)
            }
            CapturePhase::Capture { index, total } => {
                let emoji = PICTURE_EMOJI[*index as usize % PICTURE_EMOJI.len()];
                write!(f, "Taking Picture {} {} / {}", emoji, index, total)
            }
            CapturePhase::Done => write!(f, "Done 🙌"),
        }
    }
}
