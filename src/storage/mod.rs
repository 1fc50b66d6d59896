//! Export layer.
//!
//! Serialises the ledger to the one-line-per-round text log. The format
//! is write-only; nothing in the crate reads it back.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::types::Round;

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "bacbo_log.txt";

/// Format one entry: `<n>|C:<code>|M:<code>|T:<time>[ | <note>]`.
pub fn format_line(index: usize, round: &Round) -> String {
    let mut line = format!(
        "{}|C:{}|M:{}|T:{}",
        index,
        round.casino.code(),
        round.mine.code(),
        round.timestamp
    );
    if let Some(note) = round.note.as_deref().filter(|n| !n.is_empty()) {
        line.push_str(" | ");
        line.push_str(note);
    }
    line
}

/// Render rounds (newest first) as `\n`-joined lines numbered from 1.
pub fn export_text<'a>(rounds: impl IntoIterator<Item = &'a Round>) -> String {
    rounds
        .into_iter()
        .enumerate()
        .map(|(i, r)| format_line(i + 1, r))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the export to a file.
pub fn write_export<'a>(
    rounds: impl IntoIterator<Item = &'a Round>,
    path: Option<&str>,
) -> Result<usize> {
    let path = path.unwrap_or(DEFAULT_EXPORT_FILE);
    let text = export_text(rounds);
    let lines = if text.is_empty() { 0 } else { text.lines().count() };

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory for {path}"))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write export to {path}"))?;

    info!(path, lines, "Ledger exported");
    Ok(lines)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
