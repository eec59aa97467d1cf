//! Application module: exposes the presentation model used by the TUI.
//!
//! The `App` model lives in `app::model` and folds the controller's view
//! events into what the terminal draws, plus a browse cursor over the
//! playlist.

mod model;

pub use model::*;
