use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::player::format_time;

use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Read title/artist tags and the stream length. Unreadable files keep the
/// file-stem title and an unknown duration.
fn read_tags(path: &Path, track: &mut Track) {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable tags");
            return;
        }
    };

    track.duration = format_time(tagged.properties().duration().as_secs_f64());

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        if let Some(v) = tag.title() {
            if !v.trim().is_empty() {
                track.title = v.trim().to_string();
            }
        }
        if let Some(v) = tag.artist() {
            track.artist = v.trim().to_string();
        }
    }
}

/// Walk `dir` and build a track for every audio file, sorted by label.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        let mut track = Track::new(title, "", "", path.display().to_string());
        read_tags(path, &mut track);
        tracks.push(track);
    }

    tracks.sort_by_key(|t| t.label().to_lowercase());
    debug!(dir = %dir.display(), count = tracks.len(), "library scan finished");
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// Write a placeholder file; its contents are not decodable audio.
    fn touch(dir: &Path, name: &str) {
        if let Some(parent) = Path::new(name).parent() {
            fs::create_dir_all(dir.join(parent)).unwrap();
        }
        fs::write(dir.join(name), b"not audio").unwrap();
    }

    fn titles(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn audio_extensions_match_case_insensitively() {
        let settings = LibrarySettings::default();
        for name in ["a.mp3", "a.MP3", "a.flac", "a.wav", "a.ogg"] {
            assert!(is_audio_file(Path::new(name), &settings), "{name}");
        }
        assert!(!is_audio_file(Path::new("a.txt"), &settings));
        assert!(!is_audio_file(Path::new("a"), &settings));
    }

    #[test]
    fn extensions_tolerate_leading_dots_and_blanks() {
        let settings = LibrarySettings {
            extensions: vec![".Opus".into(), "  ".into()],
            ..LibrarySettings::default()
        };
        assert!(is_audio_file(Path::new("a.opus"), &settings));
        assert!(!is_audio_file(Path::new("a.mp3"), &settings));
    }

    #[test]
    fn untagged_files_fall_back_to_stem_and_sort_by_label() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "b.MP3");
        touch(dir.path(), "A.ogg");
        touch(dir.path(), "notes.txt");

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(titles(&tracks), ["A", "b"]);
        assert!(tracks[0].source.ends_with("A.ogg"));
        assert_eq!(tracks[0].artist, "");
        assert_eq!(tracks[0].duration, "");
    }

    #[test]
    fn hidden_entries_can_be_skipped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), ".secret.mp3");
        touch(dir.path(), ".cache/inside.mp3");
        touch(dir.path(), "shown.mp3");

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        assert_eq!(titles(&scan(dir.path(), &settings)), ["shown"]);
        assert_eq!(scan(dir.path(), &LibrarySettings::default()).len(), 3);
    }

    #[test]
    fn depth_limits_apply() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "top.mp3");
        touch(dir.path(), "d1/one.mp3");
        touch(dir.path(), "d1/d2/two.mp3");

        let flat = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        assert_eq!(titles(&scan(dir.path(), &flat)), ["top"]);

        // Depth 0 is the root itself, so 2 reaches d1's files only.
        let capped = LibrarySettings {
            max_depth: Some(2),
            ..LibrarySettings::default()
        };
        assert_eq!(titles(&scan(dir.path(), &capped)), ["one", "top"]);
    }
}
