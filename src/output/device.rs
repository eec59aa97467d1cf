use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;

use super::thread::spawn_audio_thread;
use super::types::{
    AudioCmd, AudioOutput, LoadId, OutputEvent, PlayTicket, PlaybackHandle, PlaybackInfo,
};

/// Handle to the audio thread. Commands are fire-and-forget; getters read
/// the state the thread publishes into the shared `PlaybackHandle`.
pub struct RodioOutput {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioOutput {
    /// Start the audio thread. The returned receiver yields the output's
    /// lifecycle events and must be drained by the event loop.
    pub fn spawn(audio_settings: AudioSettings) -> (Self, Receiver<OutputEvent>) {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<OutputEvent>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle = spawn_audio_thread(rx, event_tx, playback_info.clone(), audio_settings);

        let output = Self {
            tx,
            playback: playback_info,
            join: Mutex::new(Some(audio_handle)),
        };
        (output, event_rx)
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(e) = self.tx.send(cmd) {
            warn!(command = ?e.0, "audio thread is gone; command dropped");
        }
    }

    fn update(&self, f: impl FnOnce(&mut PlaybackInfo)) {
        if let Ok(mut info) = self.playback.lock() {
            f(&mut info);
        }
    }

    fn read<T>(&self, f: impl FnOnce(&PlaybackInfo) -> T, fallback: T) -> T {
        self.playback.lock().map(|info| f(&info)).unwrap_or(fallback)
    }

    /// Fade out, stop the audio thread and wait for it to exit.
    pub fn quit_softly(&self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl AudioOutput for RodioOutput {
    fn set_source(&mut self, locator: &str, load: LoadId) {
        // A new source has no position or length until the thread loads it.
        self.update(|info| {
            info.position = Duration::ZERO;
            info.duration = None;
            info.playing = false;
        });
        self.send(AudioCmd::SetSource(locator.to_string(), load));
    }

    fn play(&mut self, ticket: PlayTicket) {
        self.send(AudioCmd::Play(ticket));
    }

    fn pause(&mut self) {
        self.update(|info| info.playing = false);
        self.send(AudioCmd::Pause);
    }

    fn current_time(&self) -> f64 {
        self.read(|info| info.position.as_secs_f64(), 0.0)
    }

    fn set_current_time(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let to = Duration::from_secs_f64(seconds.max(0.0));
        self.update(|info| info.position = to);
        self.send(AudioCmd::Seek(to));
    }

    fn duration(&self) -> Option<f64> {
        self.read(|info| info.duration.map(|d| d.as_secs_f64()), None)
    }

    fn volume(&self) -> f64 {
        self.read(|info| info.volume as f64, 1.0)
    }

    fn set_volume(&mut self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0) as f32;
        self.update(|info| info.volume = volume);
        self.send(AudioCmd::SetVolume(volume));
    }
}
