//! Playlist sources: the `Track` record plus helpers that build an initial
//! playlist from a directory scan or a TOML manifest.

mod manifest;
mod model;
mod scan;

use std::path::Path;

pub use manifest::load_manifest;
pub use model::*;
pub use scan::scan;

use crate::config::LibrarySettings;

/// Load a playlist from `path`: a `.toml` file is read as a manifest,
/// anything else is scanned as a directory.
pub fn load(path: &Path, settings: &LibrarySettings) -> Result<Vec<Track>, LibraryError> {
    let is_manifest = path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

    if is_manifest {
        load_manifest(path)
    } else if path.is_dir() {
        Ok(scan(path, settings))
    } else {
        Err(LibraryError::NotFound(path.to_path_buf()))
    }
}
