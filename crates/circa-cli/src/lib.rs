//! circa CLI library.
//!
//! This crate provides the CLI interface for the circa scheduling engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, EatAction, PrefsAction, ProfileAction, SleepAction};
pub use config::Config;
