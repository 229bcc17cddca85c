//! Worklog sync CLI library.
//!
//! This crate provides the `wsync` command-line interface: configuration,
//! client wiring and report rendering around the sync engine.

mod cli;
pub mod commands;
mod config;
pub mod connect;

pub use cli::{Cli, Commands, PlanArgs, SyncArgs, WindowArgs};
pub use config::Config;
