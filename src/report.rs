//! Per-fragment outcomes of a consolidation run, optionally saved as JSON.

use crate::classify::SkipReason;
use crate::config::ConsolidationMode;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentOutcome {
    Accepted { lines: usize, chars: usize },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Serialize)]
pub struct FragmentReport {
    pub name: String,
    pub outcome: FragmentOutcome,
}

/// Per-directory summary of one consolidation run.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationReport {
    pub dir: PathBuf,
    pub mode: ConsolidationMode,
    pub fragments: Vec<FragmentReport>,
    pub total_chars: usize,
    pub segments: Vec<PathBuf>,
}

impl ConsolidationReport {
    pub fn accepted(&self) -> impl Iterator<Item = &FragmentReport> {
        self.fragments
            .iter()
            .filter(|fragment| matches!(fragment.outcome, FragmentOutcome::Accepted { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.fragments.len() - self.accepted().count()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))
    }
}
