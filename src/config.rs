//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive runtime
//! behavior and helpers to load configuration from disk.

mod load;
mod schema;

pub use load::resolve_config_path;
pub(crate) use load::xdg_dir;
pub use schema::*;
