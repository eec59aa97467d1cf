//! Utilities for turning a track locator into a `rodio` sink.
//!
//! Opening and decoding happen here so the audio thread only deals with
//! ready sinks and typed errors.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::OutputError;

/// Map a locator to a local file path. Only plain paths and `file://`
/// URLs are playable.
pub(crate) fn resolve_source(locator: &str) -> Result<PathBuf, OutputError> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(OutputError::NoSource);
    }
    if let Some(path) = locator.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if locator.contains("://") {
        return Err(OutputError::UnsupportedSource(locator.to_string()));
    }
    Ok(PathBuf::from(locator))
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, OutputError> {
    let locator = path.display().to_string();
    let file = File::open(path).map_err(|e| OutputError::Open {
        locator: locator.clone(),
        reason: e.to_string(),
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| OutputError::Decode {
        locator,
        reason: e.to_string(),
    })
}

/// Length of the file at `path`: the decoder's own estimate when it has
/// one, otherwise the container properties.
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    if let Some(d) = open_decoder(path).ok().and_then(|d| d.total_duration()) {
        return Some(d);
    }
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<Sink, OutputError> {
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = open_decoder(path)?.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
