//! The playback controller: playlist manager, transport state machine and
//! progress/volume synchronization in one single-threaded object.

use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::library::Track;
use crate::output::{AudioOutput, LoadId, OutputEvent, PlayTicket};

use super::events::ViewEvent;
use super::state::{PlaybackState, PlayerState};
use super::time::format_time;
use super::volume::{VolumeIcon, clamp_percent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("track index {index} out of bounds for a playlist of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

type Listener = Box<dyn FnMut(&ViewEvent)>;

/// Owns the playlist and player state and drives one `AudioOutput`.
///
/// Every play request carries a fresh `PlayTicket`; a settlement is applied
/// only while its ticket is still the outstanding one. Pausing, loading a
/// new source or issuing another play request retires the previous ticket.
///
/// Likewise every loaded source gets a `LoadId`, and metadata, progress and
/// end events stamped with an older load are dropped.
pub struct PlaybackController<O: AudioOutput> {
    playlist: Vec<Track>,
    state: PlayerState,
    playlist_visible: bool,
    output: O,
    next_ticket: u64,
    pending_play: Option<PlayTicket>,
    next_load: u64,
    current_load: Option<LoadId>,
    listeners: Vec<Listener>,
}

impl<O: AudioOutput> PlaybackController<O> {
    pub fn new(output: O, playlist: Vec<Track>) -> Self {
        Self {
            playlist,
            state: PlayerState::default(),
            playlist_visible: false,
            output,
            next_ticket: 0,
            pending_play: None,
            next_load: 0,
            current_load: None,
            listeners: Vec::new(),
        }
    }

    /// Register a presentation listener.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ViewEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Publish the initial view and load the current track, if any.
    pub fn start(&mut self) {
        self.refresh_playlist();
        if !self.playlist.is_empty() {
            self.load_song(self.state.cursor);
        }
        self.set_volume(self.state.volume * 100.0);
        self.emit(ViewEvent::Transport(self.state.playback));
        self.emit(ViewEvent::Autoplay(self.state.autoplay_enabled));
        self.emit(ViewEvent::PlaylistVisible(self.playlist_visible));
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    pub fn playback(&self) -> PlaybackState {
        self.state.playback
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn autoplay_enabled(&self) -> bool {
        self.state.autoplay_enabled
    }

    pub fn playlist_visible(&self) -> bool {
        self.playlist_visible
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.state.cursor)
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    fn emit(&mut self, event: ViewEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn set_playback(&mut self, playback: PlaybackState) {
        self.state.playback = playback;
        self.emit(ViewEvent::Transport(playback));
    }

    /// Playing, or about to be once the outstanding play request settles.
    fn playback_active(&self) -> bool {
        self.state.is_playing() || self.pending_play.is_some()
    }

    fn refresh_playlist(&mut self) {
        self.emit(ViewEvent::PlaylistChanged(self.playlist.clone()));
        let active = (!self.playlist.is_empty()).then_some(self.state.cursor);
        self.emit(ViewEvent::ActiveIndex(active));
    }

    // ---- playlist manager -------------------------------------------------

    /// Add a track to the end of the playlist. The first track added to an
    /// empty playlist becomes the current one.
    pub fn append(&mut self, track: Track) {
        self.playlist.push(track);
        self.refresh_playlist();
        if self.playlist.len() == 1 {
            self.state.cursor = 0;
            self.load_song(0);
        }
    }

    /// Remove the track at `index`. Out-of-range indices change nothing.
    ///
    /// Removing at or before the cursor moves the cursor back by one
    /// (never below 0). The track then at the cursor is loaded but not
    /// played; an emptied playlist stops playback.
    pub fn remove_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.playlist.len() {
            debug!(index, len = self.playlist.len(), "remove ignored: out of range");
            return None;
        }

        let removed = self.playlist.remove(index);
        if index <= self.state.cursor {
            self.state.cursor = self.state.cursor.saturating_sub(1);
        }
        self.refresh_playlist();

        if self.playlist.is_empty() {
            self.pending_play = None;
            self.current_load = None;
            self.state.cursor = 0;
            self.output.pause();
            self.emit(ViewEvent::TrackCleared);
            self.set_playback(PlaybackState::Stopped);
        } else {
            let was_active = self.playback_active();
            self.load_song(self.state.cursor);
            if was_active {
                self.set_playback(PlaybackState::Paused);
            }
        }

        Some(removed)
    }

    /// Randomly reorder the whole playlist and make the first track current.
    /// The previously current track is not tracked across the shuffle.
    pub fn shuffle(&mut self) {
        if self.playlist.is_empty() {
            debug!("shuffle ignored: empty playlist");
            return;
        }

        self.playlist.shuffle(&mut rand::rng());
        self.state.cursor = 0;
        self.refresh_playlist();

        let was_active = self.playback_active();
        self.load_song(0);
        if was_active {
            self.set_playback(PlaybackState::Paused);
        }
    }

    /// Make `index` the current track, continuing playback if it was active.
    pub fn select_at(&mut self, index: usize) -> Result<(), PlayerError> {
        if index >= self.playlist.len() {
            return Err(PlayerError::IndexOutOfBounds {
                index,
                len: self.playlist.len(),
            });
        }
        self.move_to(index);
        Ok(())
    }

    // ---- transport --------------------------------------------------------

    /// Show the track at `index` and hand its source to the output. The
    /// transport state is left alone; any outstanding play request is retired
    /// because it belonged to the previous source.
    pub fn load_song(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index).cloned() else {
            debug!(index, "load ignored: no such track");
            return;
        };

        info!(index, title = %track.title, "loading track");
        self.pending_play = None;
        self.next_load += 1;
        let load = LoadId(self.next_load);
        self.current_load = Some(load);
        self.output.set_source(&track.source, load);

        self.emit(ViewEvent::TrackLoaded { index, track });
        self.emit(ViewEvent::Duration(format_time(f64::NAN)));
        self.emit(ViewEvent::Progress {
            percent: Some(0.0),
            elapsed: format_time(0.0),
        });
        let active = (!self.playlist.is_empty()).then_some(self.state.cursor);
        self.emit(ViewEvent::ActiveIndex(active));
    }

    fn move_to(&mut self, index: usize) {
        let resume = self.playback_active();
        self.state.cursor = index;
        self.load_song(index);
        if resume {
            self.play();
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Ask the output to start playing. The state turns `Playing` once the
    /// request settles successfully. A failed request leaves a stopped or
    /// paused state alone, but a failed resume on a freshly loaded track
    /// drops `Playing` to `Paused`, since nothing is audible.
    pub fn play(&mut self) {
        if self.playlist.is_empty() {
            debug!("play ignored: empty playlist");
            return;
        }

        self.next_ticket += 1;
        let ticket = PlayTicket(self.next_ticket);
        self.pending_play = Some(ticket);
        self.output.play(ticket);
    }

    pub fn pause(&mut self) {
        self.pending_play = None;
        self.output.pause();
        let playback = if self.playlist.is_empty() {
            PlaybackState::Stopped
        } else {
            PlaybackState::Paused
        };
        self.set_playback(playback);
    }

    pub fn next(&mut self) {
        if self.playlist.is_empty() {
            debug!("next ignored: empty playlist");
            return;
        }
        let index = (self.state.cursor + 1) % self.playlist.len();
        self.move_to(index);
    }

    pub fn previous(&mut self) {
        if self.playlist.is_empty() {
            debug!("previous ignored: empty playlist");
            return;
        }
        let index = if self.state.cursor == 0 {
            self.playlist.len() - 1
        } else {
            self.state.cursor - 1
        };
        self.move_to(index);
    }

    pub fn toggle_autoplay(&mut self) {
        self.set_autoplay(!self.state.autoplay_enabled);
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        self.state.autoplay_enabled = enabled;
        self.emit(ViewEvent::Autoplay(enabled));
    }

    pub fn toggle_playlist_visible(&mut self) {
        self.set_playlist_visible(!self.playlist_visible);
    }

    pub fn set_playlist_visible(&mut self, visible: bool) {
        self.playlist_visible = visible;
        self.emit(ViewEvent::PlaylistVisible(visible));
    }

    // ---- progress & volume ------------------------------------------------

    /// Jump to `fraction` (0..=1) of the current track. Does nothing until
    /// the track's length is known.
    pub fn seek_to(&mut self, fraction: f64) {
        let Some(duration) = known_duration(self.output.duration()) else {
            debug!("seek ignored: duration unknown");
            return;
        };
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.output.set_current_time(fraction * duration);
    }

    /// Set the output volume from a 0-100 percentage.
    pub fn set_volume(&mut self, percent: f64) {
        let percent = clamp_percent(percent);
        self.state.volume = percent / 100.0;
        self.output.set_volume(self.state.volume);
        self.emit(ViewEvent::Volume {
            percent,
            icon: VolumeIcon::for_percent(percent),
        });
    }

    /// Nudge the volume by `delta` percentage points, clamped to 0-100.
    pub fn adjust_volume(&mut self, delta: f64) {
        // Whole percentages, like a slider with step 1.
        let current = (self.output.volume() * 100.0).round();
        self.set_volume(current + delta);
    }

    // ---- output events ----------------------------------------------------

    pub fn handle_output_event(&mut self, event: OutputEvent) {
        let load = match &event {
            OutputEvent::MetadataLoaded { load, .. }
            | OutputEvent::TimeUpdated { load, .. }
            | OutputEvent::Ended { load } => Some(*load),
            OutputEvent::PlaySettled { .. } => None,
        };
        if let Some(load) = load {
            if self.current_load != Some(load) {
                debug!(load = load.0, "discarding event for a replaced source");
                return;
            }
        }

        match event {
            OutputEvent::MetadataLoaded { duration, .. } => {
                let total = known_duration(duration).unwrap_or(f64::NAN);
                self.emit(ViewEvent::Duration(format_time(total)));
            }
            OutputEvent::TimeUpdated { current_time, .. } => {
                let percent = known_duration(self.output.duration())
                    .map(|d| (current_time / d * 100.0).clamp(0.0, 100.0));
                self.emit(ViewEvent::Progress {
                    percent,
                    elapsed: format_time(current_time),
                });
            }
            OutputEvent::Ended { .. } => {
                debug!(at = self.output.current_time(), "track ended");
                if self.state.autoplay_enabled {
                    self.next();
                } else {
                    self.pause();
                }
            }
            OutputEvent::PlaySettled { ticket, result } => {
                if self.pending_play != Some(ticket) {
                    debug!(ticket = ticket.0, "discarding stale play settlement");
                    return;
                }
                self.pending_play = None;

                match result {
                    Ok(()) => self.set_playback(PlaybackState::Playing),
                    Err(e) => {
                        let title = self.current_track().map(|t| t.title.clone());
                        warn!(error = %e, track = ?title, "playback failed");
                        // A resume after a track change can fail; the new
                        // source is silent, so don't claim to be playing.
                        if self.state.is_playing() {
                            self.set_playback(PlaybackState::Paused);
                        }
                    }
                }
            }
        }
    }
}

/// A duration usable for progress math: finite and positive.
fn known_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}
