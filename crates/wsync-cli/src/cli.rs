//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Exports time tracker entries as issue worklogs, exactly once.
///
/// Each exported worklog carries a `[cid:<entry id>]` tag in its description,
/// so re-running a sync over the same days never duplicates work.
#[derive(Debug, Parser)]
#[command(name = "wsync", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show what a sync would export, without writing anything.
    ///
    /// The window and all listed dates are in UTC.
    Plan(PlanArgs),

    /// Export missing worklogs.
    ///
    /// Worklog dates and start times are the entry's UTC start, not the
    /// local wall clock.
    Sync(SyncArgs),

    /// Convert duration strings (e.g. "1w 2d 3h") to seconds.
    Duration {
        /// Duration strings; a day is 5 hours and a week is 5 days.
        #[arg(required = true)]
        values: Vec<String>,
    },
}

/// Options shared by commands that reconcile a window.
#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    /// Days before and after today (UTC) to reconcile [default: from config, 14].
    #[arg(long)]
    pub days: Option<u32>,

    /// Print machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Delete worklogs in the window that carry no correlation tag.
    #[arg(long)]
    pub cleanup_orphaned: bool,

    /// Print the plan and stop.
    #[arg(long)]
    pub dry_run: bool,
}
