//! Plan command: reconcile a window and show what would be exported.

use std::io::Write;

use anyhow::{Context, Result};

use wsync_core::{SyncWindow, TimeEntry, correlation, format_duration};
use wsync_engine::{CancellationToken, SyncPlan, Synchronizer};

pub async fn run<W: Write>(
    writer: &mut W,
    synchronizer: &Synchronizer,
    window: SyncWindow,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let plan = synchronizer
        .plan(window, cancel)
        .await
        .context("failed to plan sync")?;
    if json {
        write_plan_json(writer, &plan)
    } else {
        write_plan(writer, &plan)
    }
}

/// Renders the plan for humans.
pub fn write_plan<W: Write>(writer: &mut W, plan: &SyncPlan) -> Result<()> {
    let reconciliation = &plan.reconciliation;

    writeln!(
        writer,
        "Window: {} to {} (UTC)",
        plan.window.first_date(),
        plan.window.last_date()
    )?;

    if reconciliation.is_up_to_date() {
        writeln!(writer, "Nothing to export.")?;
    } else {
        writeln!(writer, "To export: {}", reconciliation.to_export.len())?;
        for entry in &reconciliation.to_export {
            writeln!(writer, "  {}", entry_line(entry))?;
        }
    }
    writeln!(writer, "Already synced: {}", reconciliation.already_synced.len())?;

    if !reconciliation.running.is_empty() {
        writeln!(writer, "Running, not exported: {}", reconciliation.running.len())?;
        for entry in &reconciliation.running {
            writeln!(
                writer,
                "  {}  {}",
                entry.interval.start.format("%Y-%m-%d %H:%M"),
                entry.description
            )?;
        }
    }

    if !reconciliation.orphaned.is_empty() {
        writeln!(writer, "Orphaned worklogs: {}", reconciliation.orphaned.len())?;
        for record in &reconciliation.orphaned {
            writeln!(
                writer,
                "  {}  {}  {}  {}",
                record.remote_id,
                record.start_date,
                format_duration(record.duration_seconds),
                record.description
            )?;
        }
    }

    if !reconciliation.unmatched.is_empty() {
        writeln!(
            writer,
            "Tagged worklogs without a local entry: {}",
            reconciliation.unmatched.len()
        )?;
        for record in &reconciliation.unmatched {
            writeln!(
                writer,
                "  {}  {}  {}  entry {}",
                record.remote_id,
                record.start_date,
                format_duration(record.duration_seconds),
                correlation::extract_id(&record.description).unwrap_or("?")
            )?;
        }
    }

    Ok(())
}

pub fn write_plan_json<W: Write>(writer: &mut W, plan: &SyncPlan) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, plan).context("failed to encode plan")?;
    writeln!(writer)?;
    Ok(())
}

fn entry_line(entry: &TimeEntry) -> String {
    let seconds = entry.duration().map_or(0, |duration| duration.num_seconds());
    format!(
        "{}  {}  [{}] {}",
        entry.interval.start.format("%Y-%m-%d %H:%M"),
        format_duration(seconds),
        entry.task_ref.as_deref().unwrap_or("no task"),
        entry.description
    )
}
