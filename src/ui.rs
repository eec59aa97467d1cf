//! UI rendering helpers for the terminal user interface.
//!
//! `draw` renders the presentation model with `ratatui` and reports where
//! the clickable widgets ended up, so mouse input can be hit-tested against
//! the frame that was actually shown.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::player::PlaybackState;

/// Screen regions that react to clicks, as laid out by the last `draw`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitMap {
    pub progress: Rect,
    pub volume: Rect,
    /// The playlist panel, when it is shown.
    pub playlist: Option<Rect>,
    /// Playlist index rendered on the first inner row of the panel.
    pub playlist_offset: usize,
    pub playlist_len: usize,
}

impl HitMap {
    pub fn progress_fraction(&self, column: u16, row: u16) -> Option<f64> {
        contains(self.progress, column, row)
            .then(|| fraction_in(self.progress, column))
            .flatten()
    }

    pub fn volume_fraction(&self, column: u16, row: u16) -> Option<f64> {
        contains(self.volume, column, row)
            .then(|| fraction_in(self.volume, column))
            .flatten()
    }

    /// Playlist index under a click, skipping the panel's border rows.
    pub fn playlist_row(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.playlist?;
        if !contains(area, column, row) || area.height < 3 {
            return None;
        }
        let first = area.y + 1;
        let last = area.y + area.height - 2;
        if row < first || row > last {
            return None;
        }
        let index = self.playlist_offset + (row - first) as usize;
        (index < self.playlist_len).then_some(index)
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

/// Where `column` falls across the inner (unbordered) width of `rect`, as a
/// fraction in 0..=1: the first inner column is 0, the last is 1. Clicks on
/// the borders clamp to the ends.
pub fn fraction_in(rect: Rect, column: u16) -> Option<f64> {
    if rect.width < 3 {
        return None;
    }
    let inner_x = rect.x + 1;
    let last_step = f64::from((rect.width - 3).max(1));
    let offset = f64::from(column) - f64::from(inner_x);
    Some((offset / last_step).clamp(0.0, 1.0))
}

fn controls_text(controls: &ControlsSettings) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next".to_string(),
        format!("[+/-] volume ±{}", controls.volume_step),
        "[0-9] seek".to_string(),
        "[j/k] browse".to_string(),
        "[enter] play selected".to_string(),
        "[d] remove".to_string(),
        "[s] shuffle".to_string(),
        "[a] autoplay".to_string(),
        "[v] playlist".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

fn transport_label(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Stopped => "Stopped",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
    }
}

fn now_playing_text(app: &App) -> String {
    let song = match &app.now_playing {
        Some(track) => track.label(),
        None => "Nothing loaded".to_string(),
    };

    let mut status = vec![
        transport_label(app.playback).to_string(),
        format!("AUTOPLAY: {}", if app.autoplay { "On" } else { "Off" }),
    ];
    if app.follow_playback {
        status.push("CURSOR: Follow".to_string());
    } else {
        status.push("CURSOR: Free-roam".to_string());
    }
    if let Some(src) = &app.source_label {
        status.push(format!("Source: {}", src));
    }

    format!("{}\n{}", song, status.join(" • "))
}

/// `Gauge::ratio` panics outside 0..=1.
fn gauge_ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// First visible playlist index, keeping the browse cursor centered when
/// the list is taller than the panel.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Render the entire UI into `frame` and return the clickable regions.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) -> HitMap {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" playdeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let now_playing = Paragraph::new(now_playing_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[1]);

    let progress = Gauge::default()
        .block(Block::bordered().title(" progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(gauge_ratio(app.progress_percent))
        .label(format!("{} / {}", app.elapsed, app.total));
    frame.render_widget(progress, chunks[2]);

    let volume = Gauge::default()
        .block(Block::bordered().title(" volume "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(gauge_ratio(app.volume_percent))
        .label(format!(
            "{:.0}% ({})",
            app.volume_percent,
            app.volume_icon.label()
        ));
    frame.render_widget(volume, chunks[3]);

    let mut hits = HitMap {
        progress: chunks[2],
        volume: chunks[3],
        playlist: None,
        playlist_offset: 0,
        playlist_len: app.tracks.len(),
    };

    if app.playlist_visible && chunks[4].height >= 3 {
        let area = chunks[4];
        let total = app.tracks.len();
        let inner_height = area.height.saturating_sub(2) as usize;
        let selected = app.selected.min(total.saturating_sub(1));
        let (start, end) = visible_window(total, inner_height, selected);

        let items: Vec<ListItem> = app.tracks[start..end]
            .iter()
            .enumerate()
            .map(|(i, track)| {
                let index = start + i;
                let text = format!("{:>3}. {}  {}", index + 1, track.label(), track.duration);
                if app.active == Some(index) {
                    ListItem::new(format!("♪ {}", text))
                        .style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    ListItem::new(format!("  {}", text))
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" playlist "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected - start));
        }
        frame.render_stateful_widget(list, area, &mut state);

        hits.playlist = Some(area);
        hits.playlist_offset = start;
    }

    let footer = Paragraph::new(controls_text(controls_settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Track;
    use crate::player::ViewEvent;
    use ratatui::{Terminal, backend::TestBackend};

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track::new(format!("Song {i}"), "Band", "1:00", format!("/music/{i}.mp3")))
            .collect()
    }

    #[test]
    fn fraction_spans_the_inner_width() {
        // Inner columns 1..=11.
        let r = Rect::new(0, 0, 13, 3);
        assert_eq!(fraction_in(r, 1), Some(0.0));
        assert_eq!(fraction_in(r, 6), Some(0.5));
        assert_eq!(fraction_in(r, 11), Some(1.0));
        assert_eq!(fraction_in(r, 12), Some(1.0));
        assert_eq!(fraction_in(Rect::new(4, 0, 3, 3), 5), Some(0.0));
        // Left border clamps to the start.
        assert_eq!(fraction_in(r, 0), Some(0.0));
        assert_eq!(fraction_in(Rect::new(0, 0, 2, 3), 1), None);
    }

    #[test]
    fn fractions_require_the_click_inside_the_widget() {
        let hits = HitMap {
            progress: Rect::new(2, 4, 13, 3),
            ..HitMap::default()
        };
        assert_eq!(hits.progress_fraction(8, 5), Some(0.5));
        assert_eq!(hits.progress_fraction(13, 5), Some(1.0));
        assert_eq!(hits.progress_fraction(8, 7), None);
        assert_eq!(hits.progress_fraction(1, 5), None);
        assert_eq!(hits.volume_fraction(8, 5), None);
    }

    #[test]
    fn playlist_rows_skip_borders_and_past_the_end() {
        let hits = HitMap {
            playlist: Some(Rect::new(0, 10, 30, 6)),
            playlist_offset: 2,
            playlist_len: 5,
            ..HitMap::default()
        };
        assert_eq!(hits.playlist_row(3, 10), None);
        assert_eq!(hits.playlist_row(3, 11), Some(2));
        assert_eq!(hits.playlist_row(3, 13), Some(4));
        assert_eq!(hits.playlist_row(3, 14), None);
        assert_eq!(hits.playlist_row(3, 15), None);
    }

    #[test]
    fn visible_window_centers_selection() {
        assert_eq!(visible_window(3, 10, 2), (0, 3));
        assert_eq!(visible_window(20, 4, 0), (0, 4));
        assert_eq!(visible_window(20, 4, 10), (8, 12));
        assert_eq!(visible_window(20, 4, 19), (16, 20));
    }

    #[test]
    fn draw_reports_regions_and_playlist_window() {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut app = App::new();
        app.apply(ViewEvent::PlaylistChanged(tracks(40)));
        app.apply(ViewEvent::ActiveIndex(Some(30)));
        app.apply(ViewEvent::PlaylistVisible(true));

        let mut hits = HitMap::default();
        terminal
            .draw(|f| {
                hits = draw(f, &app, &UiSettings::default(), &ControlsSettings::default());
            })
            .unwrap();

        assert_eq!(hits.progress, Rect::new(0, 7, 80, 3));
        assert_eq!(hits.volume, Rect::new(0, 10, 80, 3));
        let playlist = hits.playlist.expect("playlist shown");
        assert_eq!(playlist, Rect::new(0, 13, 80, 13));
        assert_eq!(hits.playlist_len, 40);
        // 11 inner rows centered on entry 30.
        assert_eq!(hits.playlist_offset, 25);
        assert_eq!(hits.playlist_row(5, 14), Some(25));
    }

    #[test]
    fn hidden_playlist_is_not_clickable() {
        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = App::new();
        app.apply(ViewEvent::PlaylistChanged(tracks(3)));

        let mut hits = HitMap::default();
        terminal
            .draw(|f| {
                hits = draw(f, &app, &UiSettings::default(), &ControlsSettings::default());
            })
            .unwrap();
        assert_eq!(hits.playlist, None);
    }
}
