use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use crate::config::AudioSettings;

use super::sink::{create_sink_at, probe_duration, resolve_source};
use super::types::{AudioCmd, LoadId, OutputError, OutputEvent, PlayTicket, PlaybackHandle};

/// Everything the audio thread owns: the device stream, the current sink and
/// the bookkeeping needed to report a position.
struct Deck {
    stream: Option<OutputStream>,
    info: PlaybackHandle,
    events: Sender<OutputEvent>,

    load: LoadId,
    path: Option<PathBuf>,
    load_error: Option<OutputError>,
    sink: Option<Sink>,
    duration: Option<Duration>,
    volume: f32,

    // position = offset + accumulated + (now - started_at)
    offset: Duration,
    started_at: Option<Instant>,
    accumulated: Duration,
    ended: bool,
}

impl Deck {
    fn new(stream: Option<OutputStream>, info: PlaybackHandle, events: Sender<OutputEvent>) -> Self {
        let volume = info.lock().map(|i| i.volume).unwrap_or(1.0);
        Self {
            stream,
            info,
            events,
            load: LoadId(0),
            path: None,
            load_error: None,
            sink: None,
            duration: None,
            volume,
            offset: Duration::ZERO,
            started_at: None,
            accumulated: Duration::ZERO,
            ended: false,
        }
    }

    fn emit(&self, event: OutputEvent) {
        // The receiver only disappears during shutdown.
        let _ = self.events.send(event);
    }

    fn position(&self) -> Duration {
        let running = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
        let pos = self.offset + self.accumulated + running;
        match self.duration {
            Some(total) => pos.min(total),
            None => pos,
        }
    }

    fn publish(&self) {
        if let Ok(mut info) = self.info.lock() {
            info.position = self.position();
            info.duration = self.duration;
            info.playing = self.started_at.is_some();
        }
    }

    fn reset_clock(&mut self, offset: Duration) {
        self.offset = offset;
        self.accumulated = Duration::ZERO;
        self.started_at = None;
        self.ended = false;
    }

    fn set_source(&mut self, locator: &str, load: LoadId) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.load = load;
        self.reset_clock(Duration::ZERO);
        self.path = None;
        self.duration = None;
        self.load_error = None;

        let loaded = resolve_source(locator).and_then(|path| {
            let stream = self.stream.as_ref().ok_or(OutputError::NoDevice)?;
            let sink = create_sink_at(stream, &path, Duration::ZERO)?;
            Ok((path, sink))
        });

        match loaded {
            Ok((path, sink)) => {
                sink.set_volume(self.volume);
                self.duration = probe_duration(&path);
                debug!(source = %path.display(), duration = ?self.duration, "source loaded");
                self.path = Some(path);
                self.sink = Some(sink);
                self.publish();
                self.emit(OutputEvent::MetadataLoaded {
                    load: self.load,
                    duration: self.duration.map(|d| d.as_secs_f64()),
                });
            }
            Err(e) => {
                warn!(locator, error = %e, "failed to load source");
                self.load_error = Some(e);
                self.publish();
            }
        }
    }

    /// Rebuild the sink at `start_at`, keeping the current play/pause state.
    fn rebuild_sink(&mut self, start_at: Duration) -> Result<(), OutputError> {
        let path = self.path.as_ref().ok_or(OutputError::NoSource)?;
        let stream = self.stream.as_ref().ok_or(OutputError::NoDevice)?;
        let was_playing = self.started_at.is_some();

        let sink = create_sink_at(stream, path, start_at)?;
        sink.set_volume(self.volume);
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }

        self.reset_clock(start_at);
        if was_playing {
            if let Some(sink) = self.sink.as_ref() {
                sink.play();
            }
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn play(&mut self, ticket: PlayTicket) {
        let result = self.try_play();
        if let Err(e) = &result {
            debug!(ticket = ticket.0, error = %e, "play request rejected");
        }
        self.publish();
        self.emit(OutputEvent::PlaySettled { ticket, result });
    }

    fn try_play(&mut self) -> Result<(), OutputError> {
        if self.sink.is_none() {
            return Err(match (&self.load_error, &self.stream) {
                (Some(e), _) => e.clone(),
                (None, None) => OutputError::NoDevice,
                (None, Some(_)) => OutputError::NoSource,
            });
        }

        let drained = self.sink.as_ref().map(|s| s.empty()).unwrap_or(true);
        if self.ended || drained {
            // Playing an ended source starts it over.
            self.started_at = None;
            self.rebuild_sink(Duration::ZERO)?;
        }

        if self.started_at.is_none() {
            if let Some(sink) = self.sink.as_ref() {
                sink.play();
            }
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        if let Some(t) = self.started_at.take() {
            self.accumulated += t.elapsed();
        }
        self.publish();
    }

    fn seek(&mut self, to: Duration) {
        let to = match self.duration {
            Some(total) => to.min(total),
            None => to,
        };
        match self.rebuild_sink(to) {
            Ok(()) => {
                self.publish();
                self.emit(OutputEvent::TimeUpdated {
                    load: self.load,
                    current_time: to.as_secs_f64(),
                });
            }
            Err(e) => debug!(error = %e, "seek ignored"),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(volume);
        }
    }

    /// Report progress while playing; detect the end of the source.
    fn tick(&mut self) {
        if self.started_at.is_none() {
            return;
        }

        let drained = self.sink.as_ref().map(|s| s.empty()).unwrap_or(true);
        if drained {
            if let Some(t) = self.started_at.take() {
                self.accumulated += t.elapsed();
            }
            self.ended = true;
            self.publish();
            self.emit(OutputEvent::TimeUpdated {
                load: self.load,
                current_time: self.position().as_secs_f64(),
            });
            self.emit(OutputEvent::Ended { load: self.load });
            return;
        }

        self.publish();
        self.emit(OutputEvent::TimeUpdated {
            load: self.load,
            current_time: self.position().as_secs_f64(),
        });
    }

    fn fade_out(&mut self, fade_out_ms: u64, steps: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if fade_out_ms > 0 && self.started_at.is_some() {
            let steps = steps.max(1);
            let start = self.volume;
            for step in 1..=steps {
                let t = (step as f32) / (steps as f32);
                sink.set_volume(start * (1.0 - t));
                thread::sleep(Duration::from_millis((fade_out_ms / steps).max(1)));
            }
        }
        sink.stop();
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<OutputEvent>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped, which
                // would scribble over the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                error!(error = %e, "no audio output device; playback disabled");
                None
            }
        };

        let tick = Duration::from_millis(audio_settings.tick_ms.max(1));
        let mut deck = Deck::new(stream, playback_info, events);
        let mut last_tick = Instant::now();

        loop {
            match rx.recv_timeout(tick) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    deck.fade_out(fade_out_ms, audio_settings.fade_steps);
                    break;
                }
                Ok(AudioCmd::SetSource(locator, load)) => deck.set_source(&locator, load),
                Ok(AudioCmd::Play(ticket)) => deck.play(ticket),
                Ok(AudioCmd::Pause) => deck.pause(),
                Ok(AudioCmd::Seek(to)) => deck.seek(to),
                Ok(AudioCmd::SetVolume(v)) => deck.set_volume(v),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            // Commands arriving back to back must not starve progress reports.
            if last_tick.elapsed() >= tick {
                deck.tick();
                last_tick = Instant::now();
            }
        }

        info!("audio thread stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::output::types::PlaybackInfo;

    /// A deck with no output device, as on a machine without audio.
    fn silent_deck() -> (Deck, Receiver<OutputEvent>) {
        let (tx, rx) = mpsc::channel();
        let info = Arc::new(Mutex::new(PlaybackInfo::default()));
        (Deck::new(None, info, tx), rx)
    }

    fn drain(rx: &Receiver<OutputEvent>) -> Vec<OutputEvent> {
        rx.try_iter().collect()
    }

    fn settled(ticket: u64, result: Result<(), OutputError>) -> OutputEvent {
        OutputEvent::PlaySettled {
            ticket: PlayTicket(ticket),
            result,
        }
    }

    #[test]
    fn play_without_device_settles_no_device() {
        let (mut deck, rx) = silent_deck();
        deck.play(PlayTicket(1));
        assert_eq!(drain(&rx), [settled(1, Err(OutputError::NoDevice))]);
    }

    #[test]
    fn network_source_is_rejected_when_play_settles() {
        let (mut deck, rx) = silent_deck();
        deck.set_source("https://x", LoadId(3));
        // A failed load announces no metadata.
        assert!(drain(&rx).is_empty());

        deck.play(PlayTicket(2));
        assert_eq!(
            drain(&rx),
            [settled(
                2,
                Err(OutputError::UnsupportedSource("https://x".to_string()))
            )]
        );
    }

    #[test]
    fn load_errors_are_reported_per_source() {
        let (mut deck, rx) = silent_deck();

        deck.set_source("   ", LoadId(1));
        deck.play(PlayTicket(1));
        deck.set_source("/music/a.ogg", LoadId(2));
        deck.play(PlayTicket(2));

        assert_eq!(
            drain(&rx),
            [
                settled(1, Err(OutputError::NoSource)),
                settled(2, Err(OutputError::NoDevice)),
            ]
        );
    }

    #[test]
    fn idle_deck_reports_no_progress() {
        let (mut deck, rx) = silent_deck();
        deck.tick();
        deck.set_source("/music/a.ogg", LoadId(1));
        deck.play(PlayTicket(1));
        let _ = drain(&rx);

        deck.tick();
        deck.seek(Duration::from_secs(5));
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn pause_publishes_a_stopped_clock() {
        let (mut deck, _rx) = silent_deck();
        deck.pause();
        let info = deck.info.lock().unwrap().clone();
        assert!(!info.playing);
        assert_eq!(info.position, Duration::ZERO);
    }
}
