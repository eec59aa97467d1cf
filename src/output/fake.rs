//! In-memory `AudioOutput` that records what it was asked to do. Play
//! requests never settle on their own; tests feed `PlaySettled` back to the
//! controller explicitly.

use super::types::{AudioOutput, LoadId, PlayTicket};

#[derive(Debug)]
pub(crate) struct FakeOutput {
    pub sources: Vec<String>,
    pub loads: Vec<LoadId>,
    pub play_requests: Vec<PlayTicket>,
    pub pauses: usize,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub volume: f64,
}

impl Default for FakeOutput {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            loads: Vec::new(),
            play_requests: Vec::new(),
            pauses: 0,
            current_time: 0.0,
            duration: None,
            volume: 1.0,
        }
    }
}

impl FakeOutput {
    pub fn source(&self) -> Option<&str> {
        self.sources.last().map(String::as_str)
    }

    pub fn last_load(&self) -> Option<LoadId> {
        self.loads.last().copied()
    }

    pub fn last_ticket(&self) -> Option<PlayTicket> {
        self.play_requests.last().copied()
    }
}

impl AudioOutput for FakeOutput {
    fn set_source(&mut self, locator: &str, load: LoadId) {
        self.sources.push(locator.to_string());
        self.loads.push(load);
        self.current_time = 0.0;
        self.duration = None;
    }

    fn play(&mut self, ticket: PlayTicket) {
        self.play_requests.push(ticket);
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }
}
