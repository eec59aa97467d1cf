use crate::library::Track;

use super::state::PlaybackState;
use super::volume::VolumeIcon;

/// Display updates published by the controller. Listeners treat them as
/// fire-and-forget notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// The playlist contents or order changed.
    PlaylistChanged(Vec<Track>),
    /// The track at `index` became the current one.
    TrackLoaded { index: usize, track: Track },
    /// The playlist emptied; nothing is current.
    TrackCleared,
    /// Which playlist entry to highlight.
    ActiveIndex(Option<usize>),
    /// Transport icon/animation state.
    Transport(PlaybackState),
    /// Playback progress. `percent` is `None` while the length is unknown.
    Progress { percent: Option<f64>, elapsed: String },
    /// Total length of the current track.
    Duration(String),
    Volume { percent: f64, icon: VolumeIcon },
    PlaylistVisible(bool),
    Autoplay(bool),
}
