//! Reading-order list shared between extraction and consolidation.
//!
//! The list is a plain text file with one fragment file name per line, in the
//! order the package manifest declares them. Nothing is deduplicated, sorted,
//! or checked against the filesystem here; consolidation decides what to do
//! with entries that turn out to be missing.

use anyhow::{Context, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Reduce manifest hrefs to bare file names, preserving order and duplicates.
pub fn resolve_order<I, S>(hrefs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    hrefs
        .into_iter()
        .map(|href| fragment_basename(href.as_ref()).to_string())
        .collect()
}

/// Last path component of an href; both `/` and `\` count as separators.
pub fn fragment_basename(href: &str) -> &str {
    href.rsplit(['/', '\\']).next().unwrap_or(href)
}

pub fn write_order_list(path: &Path, order: &[String]) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create order list {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for name in order {
        writeln!(writer, "{name}")
            .with_context(|| format!("Failed to write order list {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush order list {}", path.display()))?;
    info!(path = %path.display(), entries = order.len(), "Saved fragment order");
    Ok(())
}

/// Read an order list back; blank lines are ignored and entries are trimmed.
pub fn read_order_list(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read(path)
        .with_context(|| format!("Failed to read order list {}", path.display()))?;
    let order: Vec<String> = String::from_utf8_lossy(&raw)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    debug!(path = %path.display(), entries = order.len(), "Loaded fragment order");
    Ok(order)
}
