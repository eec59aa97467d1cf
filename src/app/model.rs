//! Presentation model: the last-known view of the player, built purely from
//! `ViewEvent`s.

use crate::library::Track;
use crate::player::{PlaybackState, ViewEvent, VolumeIcon};

/// Everything the UI needs to render one frame.
pub struct App {
    pub tracks: Vec<Track>,
    /// Highlighted (current) playlist entry.
    pub active: Option<usize>,
    /// Browse cursor in the playlist panel.
    pub selected: usize,
    pub follow_playback: bool,

    pub playback: PlaybackState,
    pub now_playing: Option<Track>,
    pub elapsed: String,
    pub total: String,
    pub progress_percent: f64,

    pub volume_percent: f64,
    pub volume_icon: VolumeIcon,

    pub playlist_visible: bool,
    pub autoplay: bool,
    pub source_label: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            active: None,
            selected: 0,
            follow_playback: true,

            playback: PlaybackState::Stopped,
            now_playing: None,
            elapsed: "0:00".to_string(),
            total: "0:00".to_string(),
            progress_percent: 0.0,

            volume_percent: 50.0,
            volume_icon: VolumeIcon::Full,

            playlist_visible: false,
            autoplay: false,
            source_label: None,
        }
    }

    /// Record where the playlist came from (shown in the status line).
    pub fn set_source_label(&mut self, label: String) {
        self.source_label = Some(label);
    }

    /// Fold one controller event into the model.
    pub fn apply(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::PlaylistChanged(tracks) => {
                self.tracks = tracks;
                self.clamp_selected();
            }
            ViewEvent::TrackLoaded { track, .. } => {
                self.now_playing = Some(track);
            }
            ViewEvent::TrackCleared => {
                self.now_playing = None;
                self.elapsed = "0:00".to_string();
                self.total = "0:00".to_string();
                self.progress_percent = 0.0;
            }
            ViewEvent::ActiveIndex(active) => {
                self.active = active;
                if self.follow_playback {
                    if let Some(i) = active {
                        self.selected = i;
                    }
                }
            }
            ViewEvent::Transport(state) => self.playback = state,
            ViewEvent::Progress { percent, elapsed } => {
                if let Some(p) = percent {
                    self.progress_percent = p;
                }
                self.elapsed = elapsed;
            }
            ViewEvent::Duration(total) => self.total = total,
            ViewEvent::Volume { percent, icon } => {
                self.volume_percent = percent;
                self.volume_icon = icon;
            }
            ViewEvent::PlaylistVisible(visible) => self.playlist_visible = visible,
            ViewEvent::Autoplay(enabled) => self.autoplay = enabled,
        }
    }

    /// Return true if the playlist contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Enable following playback (cursor follows the current track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
        if let Some(i) = self.active {
            self.selected = i;
        }
    }

    /// Disable follow-playback so the cursor can roam.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the browse cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.follow_playback_off();
        self.selected = (self.selected + 1) % self.tracks.len();
    }

    /// Move the browse cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.follow_playback_off();
        self.selected = match self.selected {
            0 => self.tracks.len() - 1,
            i => i - 1,
        };
    }

    fn clamp_selected(&mut self) {
        if self.selected >= self.tracks.len() {
            self.selected = self.tracks.len().saturating_sub(1);
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
