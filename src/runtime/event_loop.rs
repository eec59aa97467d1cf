use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::app::App;
use crate::config;
use crate::input::{self, Command};
use crate::output::{AudioOutput, OutputEvent, RodioOutput};
use crate::player::{PlaybackController, ViewEvent};
use crate::ui::{self, HitMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Main terminal event loop: forwards output events to the controller,
/// redraws, and dispatches input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<RodioOutput>,
    view_rx: &Receiver<ViewEvent>,
    output_rx: &Receiver<OutputEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = output_rx.try_recv() {
            controller.handle_output_event(ev);
        }
        drain_view_events(view_rx, app);

        let mut hits = HitMap::default();
        terminal.draw(|f| hits = ui::draw(f, app, &settings.ui, &settings.controls))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let cmd = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => input::map_key(key),
            Event::Mouse(mouse) => input::map_mouse(mouse, &hits),
            _ => None,
        };
        let Some(cmd) = cmd else {
            continue;
        };

        if dispatch(cmd, settings, app, controller) == Flow::Quit {
            info!("quit requested");
            controller
                .output()
                .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(());
        }
    }
}

/// Fold every pending controller event into the presentation model.
pub fn drain_view_events(view_rx: &Receiver<ViewEvent>, app: &mut App) {
    while let Ok(ev) = view_rx.try_recv() {
        app.apply(ev);
    }
}

/// Apply one input command.
pub fn dispatch<O: AudioOutput>(
    cmd: Command,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaybackController<O>,
) -> Flow {
    let step = f64::from(settings.controls.volume_step);

    match cmd {
        Command::TogglePlayPause => {
            app.follow_playback_on();
            controller.toggle_play_pause();
        }
        Command::Previous => {
            app.follow_playback_on();
            controller.previous();
        }
        Command::Next => {
            app.follow_playback_on();
            controller.next();
        }
        Command::VolumeUp => controller.adjust_volume(step),
        Command::VolumeDown => controller.adjust_volume(-step),
        Command::SeekTo(fraction) => controller.seek_to(fraction),
        Command::SetVolume(percent) => controller.set_volume(percent),
        Command::Select(index) => select(index, app, controller),
        Command::BrowseDown => app.next(),
        Command::BrowseUp => app.prev(),
        Command::SelectBrowsed => select(app.selected, app, controller),
        Command::RemoveBrowsed => {
            if app.has_tracks() {
                controller.remove_at(app.selected);
            }
        }
        Command::Shuffle => {
            app.follow_playback_on();
            controller.shuffle();
        }
        Command::ToggleAutoplay => controller.toggle_autoplay(),
        Command::TogglePlaylist => controller.toggle_playlist_visible(),
        Command::Quit => return Flow::Quit,
    }

    Flow::Continue
}

fn select<O: AudioOutput>(index: usize, app: &mut App, controller: &mut PlaybackController<O>) {
    match controller.select_at(index) {
        Ok(()) => app.follow_playback_on(),
        Err(e) => debug!(error = %e, "selection ignored"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use super::*;
    use crate::library::Track;
    use crate::output::fake::FakeOutput;
    use crate::player::PlaybackState;

    struct Harness {
        settings: config::Settings,
        app: App,
        controller: PlaybackController<FakeOutput>,
        view_rx: Receiver<ViewEvent>,
    }

    impl Harness {
        fn new(n: usize) -> Self {
            let tracks = (0..n)
                .map(|i| Track::new(format!("Song {i}"), "", "", format!("/music/{i}.mp3")))
                .collect();
            let mut controller = PlaybackController::new(FakeOutput::default(), tracks);
            let (tx, view_rx) = mpsc::channel();
            controller.subscribe(move |e| {
                let _ = tx.send(e.clone());
            });
            controller.start();

            let mut h = Self {
                settings: config::Settings::default(),
                app: App::new(),
                controller,
                view_rx,
            };
            h.sync();
            h
        }

        fn send(&mut self, cmd: Command) -> Flow {
            let flow = dispatch(cmd, &self.settings, &mut self.app, &mut self.controller);
            self.sync();
            flow
        }

        fn sync(&mut self) {
            drain_view_events(&self.view_rx, &mut self.app);
        }
    }

    #[test]
    fn browse_then_select_changes_current_track() {
        let mut h = Harness::new(4);
        h.send(Command::BrowseDown);
        h.send(Command::BrowseDown);
        assert!(!h.app.follow_playback);
        assert_eq!(h.controller.cursor(), 0);

        h.send(Command::SelectBrowsed);
        assert_eq!(h.controller.cursor(), 2);
        assert_eq!(h.app.active, Some(2));
        assert!(h.app.follow_playback);
    }

    #[test]
    fn out_of_range_click_is_ignored() {
        let mut h = Harness::new(2);
        assert_eq!(h.send(Command::Select(9)), Flow::Continue);
        assert_eq!(h.controller.cursor(), 0);
    }

    #[test]
    fn volume_keys_use_configured_step() {
        let mut h = Harness::new(1);
        h.settings.controls.volume_step = 5;
        h.send(Command::SetVolume(50.0));
        h.send(Command::VolumeUp);
        assert_eq!(h.app.volume_percent, 55.0);
        h.send(Command::VolumeDown);
        h.send(Command::VolumeDown);
        assert_eq!(h.app.volume_percent, 45.0);
    }

    #[test]
    fn remove_browsed_on_empty_playlist_is_noop() {
        let mut h = Harness::new(0);
        h.send(Command::RemoveBrowsed);
        assert!(h.controller.playlist().is_empty());
        assert_eq!(h.app.playback, PlaybackState::Stopped);
    }

    #[test]
    fn remove_browsed_drops_the_highlighted_entry() {
        let mut h = Harness::new(3);
        h.send(Command::BrowseDown);
        h.send(Command::RemoveBrowsed);
        let titles: Vec<&str> = h.app.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Song 0", "Song 2"]);
    }

    #[test]
    fn toggles_reach_the_view() {
        let mut h = Harness::new(1);
        h.send(Command::ToggleAutoplay);
        h.send(Command::TogglePlaylist);
        assert!(h.app.autoplay);
        assert!(h.app.playlist_visible);
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut h = Harness::new(1);
        assert_eq!(h.send(Command::Quit), Flow::Quit);
    }
}
