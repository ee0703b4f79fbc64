//! CLI subcommand implementations.

pub mod curve;
pub mod eat;
pub mod export;
pub mod import;
pub mod prefs;
pub mod profile;
pub mod sleep;
pub mod status;
pub mod util;
