//! TOML playlist manifests.
//!
//! ```toml
//! [[track]]
//! title = "Sunset Dreams"
//! artist = "Ambient Waves"
//! duration = "3:45"
//! source = "music/sunset-dreams.ogg"
//! ```
//!
//! Relative `source` paths are resolved against the manifest's directory.

use std::path::Path;

use serde::Deserialize;

use super::model::{LibraryError, Track};

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "track")]
    tracks: Vec<Track>,
}

pub fn load_manifest(path: &Path) -> Result<Vec<Track>, LibraryError> {
    let text = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    parse_manifest(&text, base).map_err(|source| LibraryError::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn parse_manifest(text: &str, base: &Path) -> Result<Vec<Track>, toml::de::Error> {
    let manifest: Manifest = toml::from_str(text)?;
    Ok(manifest
        .tracks
        .into_iter()
        .map(|mut t| {
            t.source = resolve_source(&t.source, base);
            t
        })
        .collect())
}

fn resolve_source(source: &str, base: &Path) -> String {
    if source.contains("://") || Path::new(source).is_absolute() || base.as_os_str().is_empty() {
        return source.to_string();
    }
    base.join(source).display().to_string()
}
