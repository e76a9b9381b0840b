use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::core::constants::output_formats;
use crate::core::error::{LinkScoutError, Result};
use crate::core::types::MatchSet;
use crate::pipeline::RunSummary;

/// JSON document written with `--format json`.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    count: usize,
    sources: JsonSources,
    matches: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct JsonSources {
    processed: usize,
    skipped: usize,
}

/// Matches in output order: sorted on request, set order otherwise.
pub fn ordered(matches: &MatchSet, sort: bool) -> Vec<&str> {
    if sort {
        matches.sorted()
    } else {
        matches.iter().collect()
    }
}

/// One match per line, newline-terminated.
pub fn write_text<W: Write>(writer: &mut W, matches: &[&str]) -> io::Result<()> {
    for entry in matches {
        writeln!(writer, "{entry}")?;
    }
    Ok(())
}

pub fn write_json<W: Write>(
    writer: &mut W,
    matches: &[&str],
    summary: &RunSummary,
) -> Result<()> {
    let report = JsonReport {
        count: matches.len(),
        sources: JsonSources {
            processed: summary.processed,
            skipped: summary.skipped,
        },
        matches: matches.to_vec(),
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer).map_err(|e| LinkScoutError::io("<output>", e))?;
    Ok(())
}

/// Write the final matches to `output`, or stdout when no path is given.
///
/// Failing to create the output file is an error; nothing is written to
/// stdout in that case.
pub fn write_matches(
    matches: &MatchSet,
    summary: &RunSummary,
    format: &str,
    sort: bool,
    output: Option<&Path>,
) -> Result<()> {
    let entries = ordered(matches, sort);

    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| LinkScoutError::io(path, e))?;
            let mut writer = BufWriter::new(file);
            render(&mut writer, &entries, summary, format)?;
            writer.flush().map_err(|e| LinkScoutError::io(path, e))
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            render(&mut writer, &entries, summary, format)?;
            writer.flush().map_err(|e| LinkScoutError::io("<stdout>", e))
        }
    }
}

fn render<W: Write>(
    writer: &mut W,
    entries: &[&str],
    summary: &RunSummary,
    format: &str,
) -> Result<()> {
    match format {
        output_formats::JSON => write_json(writer, entries, summary),
        _ => write_text(writer, entries).map_err(|e| LinkScoutError::io("<output>", e)),
    }
}
