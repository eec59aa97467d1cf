use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::output::RodioOutput;
use crate::player::{PlaybackController, ViewEvent};

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Held until return so buffered log lines are flushed.
    let _log_guard = logging::init();
    let settings = settings::load_settings();

    let path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    info!(path = %path.display(), "starting");

    let tracks = startup::load_playlist(&path, &settings);
    let (output, output_rx) = RodioOutput::spawn(settings.audio.clone());
    let mut controller = PlaybackController::new(output, tracks);

    let mut app = App::new();
    app.set_source_label(path.display().to_string());
    startup::apply_defaults(&mut controller, &mut app, &settings);

    let (view_tx, view_rx) = mpsc::channel::<ViewEvent>();
    controller.subscribe(move |ev| {
        // The receiver lives as long as the event loop.
        let _ = view_tx.send(ev.clone());
    });
    controller.start();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut controller,
        &view_rx,
        &output_rx,
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    run_result
}
