//! playdeck: a terminal music player built around a single-threaded
//! playback controller driving a `rodio` output.

mod app;
mod config;
mod input;
mod library;
mod output;
mod player;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
