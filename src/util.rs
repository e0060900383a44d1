use anyhow::{Context, Result};
use std::path::Path;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

/// True when `path` has one of `extensions` (compared case-insensitively, without the dot).
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase()),
        Some(ext) if extensions.contains(&ext.as_str())
    )
}
