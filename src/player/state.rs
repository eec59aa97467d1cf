/// The transport state of the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded yet, or the playlist is empty.
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Mutable player state owned by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Index of the current track. Meaningless while the playlist is empty.
    pub cursor: usize,
    pub playback: PlaybackState,
    pub autoplay_enabled: bool,
    /// Linear output volume in `[0, 1]`.
    pub volume: f64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            cursor: 0,
            playback: PlaybackState::Stopped,
            autoplay_enabled: false,
            volume: 0.5,
        }
    }
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        self.playback == PlaybackState::Playing
    }
}
