//! Audio output: the `AudioOutput` capability driven by the playback
//! controller, and `RodioOutput`, which implements it on top of a `rodio`
//! sink owned by a dedicated audio thread.

mod device;
mod sink;
mod thread;
mod types;

pub use device::RodioOutput;
pub use types::{AudioOutput, LoadId, OutputError, OutputEvent, PlayTicket};

#[cfg(test)]
pub(crate) mod fake;
