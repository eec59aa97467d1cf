use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// A playable item: display metadata plus the locator handed to the output.
///
/// Tracks are never edited in place; a changed track is a new `Track`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Track {
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// Pre-formatted length, e.g. `"3:45"`. Empty when unknown.
    #[serde(default)]
    pub duration: String,
    pub source: String,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        duration: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            duration: duration.into(),
            source: source.into(),
        }
    }

    /// `"Artist - Title"`, or just the title when the artist is blank.
    pub fn label(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("no playlist source at {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid playlist manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
