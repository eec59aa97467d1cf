//! Input dispatch: turns terminal key and mouse events into player commands.
//!
//! A mapped key is consumed by the event loop; anything unmapped yields
//! `None` and is ignored.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::ui::HitMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlayPause,
    Previous,
    Next,
    VolumeUp,
    VolumeDown,
    /// Seek to a fraction (0..=1) of the current track.
    SeekTo(f64),
    /// Set the volume to a percentage.
    SetVolume(f64),
    /// Make a playlist entry current.
    Select(usize),
    BrowseDown,
    BrowseUp,
    SelectBrowsed,
    RemoveBrowsed,
    Shuffle,
    ToggleAutoplay,
    TogglePlaylist,
    Quit,
}

pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }

    let cmd = match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => Command::TogglePlayPause,
        KeyCode::Left | KeyCode::Char('h') => Command::Previous,
        KeyCode::Right | KeyCode::Char('l') => Command::Next,
        KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => Command::VolumeUp,
        KeyCode::Down | KeyCode::Char('-') => Command::VolumeDown,
        KeyCode::Char('j') => Command::BrowseDown,
        KeyCode::Char('k') => Command::BrowseUp,
        KeyCode::Enter => Command::SelectBrowsed,
        KeyCode::Char('d') | KeyCode::Delete => Command::RemoveBrowsed,
        KeyCode::Char('s') => Command::Shuffle,
        KeyCode::Char('a') => Command::ToggleAutoplay,
        KeyCode::Char('v') | KeyCode::Tab => Command::TogglePlaylist,
        KeyCode::Char(c @ '0'..='9') => {
            let tenths = c.to_digit(10).unwrap_or(0) as f64;
            Command::SeekTo(tenths / 10.0)
        }
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

/// Left clicks on the seek bar, the volume slider or a playlist row.
pub fn map_mouse(event: MouseEvent, hits: &HitMap) -> Option<Command> {
    if event.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }

    if let Some(fraction) = hits.progress_fraction(event.column, event.row) {
        return Some(Command::SeekTo(fraction));
    }
    if let Some(fraction) = hits.volume_fraction(event.column, event.row) {
        return Some(Command::SetVolume((fraction * 100.0).round()));
    }
    hits.playlist_row(event.column, event.row)
        .map(Command::Select)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn transport_shortcuts() {
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(Command::TogglePlayPause));
        assert_eq!(map_key(key(KeyCode::Left)), Some(Command::Previous));
        assert_eq!(map_key(key(KeyCode::Right)), Some(Command::Next));
        assert_eq!(map_key(key(KeyCode::Up)), Some(Command::VolumeUp));
        assert_eq!(map_key(key(KeyCode::Down)), Some(Command::VolumeDown));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(map_key(key(KeyCode::Char('x'))), None);
        assert_eq!(map_key(key(KeyCode::F(5))), None);
        assert_eq!(map_key(key(KeyCode::Home)), None);
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn ctrl_c_quits() {
        let ev = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key(ev), Some(Command::Quit));
    }

    #[test]
    fn digits_seek_in_tenths() {
        assert_eq!(map_key(key(KeyCode::Char('0'))), Some(Command::SeekTo(0.0)));
        assert_eq!(map_key(key(KeyCode::Char('5'))), Some(Command::SeekTo(0.5)));
        assert_eq!(map_key(key(KeyCode::Char('9'))), Some(Command::SeekTo(0.9)));
    }

    #[test]
    fn clicks_map_to_regions() {
        let hits = HitMap {
            progress: Rect::new(0, 5, 13, 3),
            volume: Rect::new(0, 8, 13, 3),
            playlist: Some(Rect::new(0, 11, 20, 6)),
            playlist_offset: 3,
            playlist_len: 10,
        };

        // Inner columns of both bars are 1..=11.
        assert_eq!(map_mouse(click(6, 6), &hits), Some(Command::SeekTo(0.5)));
        assert_eq!(map_mouse(click(6, 9), &hits), Some(Command::SetVolume(50.0)));
        // First inner playlist row is 12; offset 3 means it shows entry 3.
        assert_eq!(map_mouse(click(4, 13), &hits), Some(Command::Select(4)));
        assert_eq!(map_mouse(click(40, 1), &hits), None);
    }

    #[test]
    fn only_left_presses_count() {
        let hits = HitMap {
            progress: Rect::new(0, 5, 13, 3),
            ..HitMap::default()
        };
        let mut ev = click(6, 6);
        ev.kind = MouseEventKind::Up(MouseButton::Left);
        assert_eq!(map_mouse(ev, &hits), None);
        ev.kind = MouseEventKind::Down(MouseButton::Right);
        assert_eq!(map_mouse(ev, &hits), None);
    }
}
