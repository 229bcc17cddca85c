//! Duration command: evaluate duration strings with the workday convention.

use std::io::Write;

use anyhow::Result;

use wsync_core::{format_duration, parse_duration};

pub fn run<W: Write>(writer: &mut W, values: &[String]) -> Result<()> {
    for value in values {
        let seconds = parse_duration(Some(value));
        writeln!(writer, "{value}: {seconds}s ({})", format_duration(seconds))?;
    }
    Ok(())
}
