//! CLI subcommand implementations.

pub mod duration;
pub mod plan;
pub mod sync;
