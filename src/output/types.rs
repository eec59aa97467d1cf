//! The audio-output capability the controller drives, and the events an
//! output reports back.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// Identifies one play request. Each `play()` issued by the controller
/// carries a fresh ticket; the output echoes it back when the request
/// settles so stale settlements can be told apart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PlayTicket(pub u64);

/// Identifies one loaded source. Lifecycle events are stamped with the load
/// they belong to, so events still queued for a replaced source can be
/// recognized and dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LoadId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("no source loaded")]
    NoSource,

    #[error("unsupported source {0}")]
    UnsupportedSource(String),

    #[error("failed to open {locator}: {reason}")]
    Open { locator: String, reason: String },

    #[error("failed to decode {locator}: {reason}")]
    Decode { locator: String, reason: String },
}

/// Lifecycle notifications emitted by an output, consumed by
/// `PlaybackController::handle_output_event`.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// A new source finished loading. `None` when its length is unknown.
    MetadataLoaded {
        load: LoadId,
        duration: Option<f64>,
    },
    /// Playback position advanced.
    TimeUpdated { load: LoadId, current_time: f64 },
    /// The source played to its end.
    Ended { load: LoadId },
    /// A play request finished, successfully or not.
    PlaySettled {
        ticket: PlayTicket,
        result: Result<(), OutputError>,
    },
}

/// A single audio playback resource.
///
/// Times are seconds, volume is linear in `[0, 1]`. `play` is
/// asynchronous: its outcome arrives later as `OutputEvent::PlaySettled`.
pub trait AudioOutput {
    fn set_source(&mut self, locator: &str, load: LoadId);
    fn play(&mut self, ticket: PlayTicket);
    fn pause(&mut self);
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn duration(&self) -> Option<f64>;
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
}

#[derive(Debug)]
pub(crate) enum AudioCmd {
    /// Load a new source, paused at the start.
    SetSource(String, LoadId),
    /// Resume (or restart an ended source) and settle `ticket`.
    Play(PlayTicket),
    Pause,
    /// Jump to an absolute position.
    Seek(Duration),
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone)]
/// Position, length and volume published by the audio thread so the
/// `AudioOutput` getters can answer synchronously.
pub struct PlaybackInfo {
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub playing: bool,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            position: Duration::ZERO,
            duration: None,
            volume: 1.0,
            playing: false,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
