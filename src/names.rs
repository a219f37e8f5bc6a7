//! Name extraction module (standalone `extract` subcommand).
//! Reads a registration CSV, collects every "Team Member N Name" cell,
//! normalizes and de-duplicates them, and writes one name per line.
//! Placeholder cells ("-", ".") and blanks are dropped.

use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Cells meaning "no team member here".
const SENTINELS: [&str; 2] = ["-", "."];

/// Header of the n-th (1-based) member name column.
pub fn member_column(n: usize) -> String {
    format!("Team Member {n} Name")
}

/// Default output path: input stem lower-cased with `.txt`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}.txt"))
}

/// Trims and title-cases a name: the first letter of every word is upper-cased,
/// the rest lower-cased. Any non-letter starts a new word ("o'neil" -> "O'Neil").
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for c in raw.trim().chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Collects unique normalized names from the member columns of a CSV source.
pub fn collect_names<R: std::io::Read>(source: R, members: usize) -> Result<BTreeSet<String>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers = reader.headers().context("Failed to read CSV header row")?.clone();

    let mut columns = Vec::new();
    for n in 1..=members {
        let header = member_column(n);
        match headers.iter().position(|h| h.trim() == header) {
            Some(idx) => columns.push(idx),
            None => warn!(column = %header, "column not found, skipping"),
        }
    }
    if columns.is_empty() {
        bail!("None of the {} team member name columns were found", members);
    }

    let mut names = BTreeSet::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", row + 2))?;
        for &idx in &columns {
            let Some(cell) = record.get(idx) else { continue };
            let name = title_case(cell);
            if name.is_empty() || SENTINELS.contains(&name.as_str()) {
                continue;
            }
            names.insert(name);
        }
    }
    Ok(names)
}

/// Runs the extraction end to end and returns the path written.
pub fn extract(input: &Path, output: Option<&Path>, members: usize) -> Result<PathBuf> {
    let file = fs::File::open(input)
        .with_context(|| format!("Failed to open input table {}", input.display()))?;
    let names = collect_names(file, members)
        .with_context(|| format!("Failed to extract names from {}", input.display()))?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    let body = names.iter().map(String::as_str).collect::<Vec<_>>().join("\n");
    fs::write(&output, body)
        .with_context(|| format!("Failed to write name list {}", output.display()))?;

    info!(count = names.len(), path = %output.display(), "wrote name list");
    Ok(output)
}
