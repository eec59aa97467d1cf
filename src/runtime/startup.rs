use std::path::Path;

use tracing::{info, warn};

use crate::app::App;
use crate::config;
use crate::library::{self, Track};
use crate::output::AudioOutput;
use crate::player::PlaybackController;

/// Build the initial playlist from `path`. A path that cannot be loaded
/// leaves the playlist empty rather than aborting startup.
pub fn load_playlist(path: &Path, settings: &config::Settings) -> Vec<Track> {
    match library::load(path, &settings.library) {
        Ok(tracks) => {
            info!(path = %path.display(), count = tracks.len(), "playlist loaded");
            tracks
        }
        Err(e) => {
            warn!(error = %e, "could not load playlist, starting empty");
            Vec::new()
        }
    }
}

/// Apply the configured defaults before the controller publishes its first view.
pub fn apply_defaults<O: AudioOutput>(
    controller: &mut PlaybackController<O>,
    app: &mut App,
    settings: &config::Settings,
) {
    controller.set_volume(f64::from(settings.audio.initial_volume));
    controller.set_autoplay(settings.playback.autoplay);
    controller.set_playlist_visible(settings.ui.show_playlist);

    if settings.ui.follow_playback {
        app.follow_playback_on();
    } else {
        app.follow_playback_off();
    }
}
