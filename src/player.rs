//! Playback core: the playlist, the transport state machine and the
//! synchronization of derived display state with the audio output.
//!
//! `PlaybackController` owns the playlist and player state, drives an
//! `AudioOutput`, consumes its `OutputEvent`s and publishes `ViewEvent`s to
//! whoever subscribed.

mod controller;
mod events;
mod state;
mod time;
mod volume;

pub use controller::*;
pub use events::ViewEvent;
pub use state::{PlaybackState, PlayerState};
pub use time::format_time;
pub use volume::VolumeIcon;
