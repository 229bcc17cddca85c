//! Sync command: export missing worklogs for a window.

use std::io::Write;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use wsync_core::{SyncWindow, format_duration};
use wsync_engine::{
    CancellationToken, ExecutionReport, ItemOutcome, ItemStatus, SyncPlan, Synchronizer,
};

use crate::cli::SyncArgs;
use crate::commands::plan::{write_plan, write_plan_json};

/// Runs a sync; `cleanup_orphaned` already merges the flag with config.
///
/// Returns an error after printing the report if any entry failed.
pub async fn run<W: Write>(
    writer: &mut W,
    synchronizer: &Synchronizer,
    window: SyncWindow,
    args: &SyncArgs,
    cleanup_orphaned: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let plan = synchronizer
        .plan(window, cancel)
        .await
        .context("failed to plan sync")?;

    if args.dry_run {
        return if args.window.json {
            write_plan_json(writer, &plan)
        } else {
            write_plan(writer, &plan)
        };
    }

    let report = synchronizer
        .execute(&plan, cleanup_orphaned, cancel)
        .await
        .context("sync failed")?;
    info!(
        succeeded = report.succeeded,
        skipped = report.skipped,
        failed = report.failed,
        deleted = report.deleted,
        "sync finished"
    );

    if args.window.json {
        write_report_json(writer, &plan, &report)?;
    } else {
        write_report(writer, &report)?;
    }

    if report.has_failures() {
        bail!(
            "{} of {} entries failed to export",
            report.failed,
            report.items.len()
        );
    }
    Ok(())
}

/// Renders the execution report for humans.
pub fn write_report<W: Write>(writer: &mut W, report: &ExecutionReport) -> Result<()> {
    writeln!(
        writer,
        "Exported {}, skipped {}, failed {}, deleted {}",
        report.succeeded, report.skipped, report.failed, report.deleted
    )?;
    for item in &report.items {
        writeln!(writer, "  {}", item_line(item))?;
    }
    if !report.deleted_ids.is_empty() {
        let ids: Vec<_> = report.deleted_ids.iter().map(ToString::to_string).collect();
        writeln!(writer, "Deleted worklogs: {}", ids.join(", "))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct SyncOutput<'a> {
    plan: &'a SyncPlan,
    report: &'a ExecutionReport,
}

pub fn write_report_json<W: Write>(
    writer: &mut W,
    plan: &SyncPlan,
    report: &ExecutionReport,
) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &SyncOutput { plan, report })
        .context("failed to encode sync report")?;
    writeln!(writer)?;
    Ok(())
}

fn item_line(item: &ItemOutcome) -> String {
    let (label, detail) = match &item.status {
        ItemStatus::Exported { remote_id } => ("exported", format!(" -> {remote_id}")),
        ItemStatus::SkippedUnmapped { reason } => ("skipped", format!(" ({reason})")),
        ItemStatus::Failed { error } => ("failed", format!(" ({error})")),
    };
    format!(
        "{label:<8}  {}  {}  {}{detail}",
        item.entry_id,
        format_duration(item.duration_seconds),
        item.description
    )
}
