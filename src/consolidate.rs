//! Consolidation of extracted fragments into segment files.
//!
//! A book directory holds the fragment files plus the order list written at
//! extraction time. Fragments are visited strictly in list order; each one is
//! classified independently, survivors are appended behind a chapter marker,
//! and the resulting text is handed to the [`SegmentWriter`].

use crate::classify::{Policy, SkipReason, Verdict};
use crate::config::AppConfig;
use crate::order::read_order_list;
use crate::report::{ConsolidationReport, FragmentOutcome, FragmentReport};
use crate::segments::SegmentWriter;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct Consolidator {
    policy: Policy,
    chapter_markers: bool,
    order_file_name: String,
    segment_base_name: String,
    segment_limit: Option<usize>,
    report_file_name: Option<String>,
}

impl Consolidator {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            policy: Policy::from_config(cfg),
            chapter_markers: cfg.chapter_markers,
            order_file_name: cfg.order_file_name.clone(),
            segment_base_name: cfg.segment_base_name.clone(),
            segment_limit: cfg.segment_limit(),
            report_file_name: cfg.write_report.then(|| cfg.report_file_name.clone()),
        }
    }

    /// Consolidate one book directory and replace its segment files.
    pub fn run(&self, dir: &Path) -> Result<ConsolidationReport> {
        let order_path = dir.join(&self.order_file_name);
        let order = read_order_list(&order_path)
            .with_context(|| format!("No usable fragment order in {}", dir.display()))?;
        info!(
            dir = %dir.display(),
            fragments = order.len(),
            mode = %self.policy.mode(),
            "Consolidating book"
        );

        let (text, fragments) = self.consolidate_fragments(dir, &order);
        let total_chars = text.chars().count();

        let writer = SegmentWriter::new(dir, &self.segment_base_name, self.segment_limit);
        let segments = writer.write(&text)?;
        drop(text);

        let report = ConsolidationReport {
            dir: dir.to_path_buf(),
            mode: self.policy.mode(),
            fragments,
            total_chars,
            segments,
        };
        info!(
            dir = %dir.display(),
            accepted = report.accepted().count(),
            skipped = report.skipped_count(),
            total_chars,
            segments = report.segments.len(),
            "Finished consolidation"
        );

        if let Some(name) = &self.report_file_name {
            let path = dir.join(name);
            report.write_json(&path)?;
            debug!(path = %path.display(), "Wrote consolidation report");
        }
        Ok(report)
    }

    /// Build the consolidated text for `order`, one outcome per entry.
    pub fn consolidate_fragments(
        &self,
        dir: &Path,
        order: &[String],
    ) -> (String, Vec<FragmentReport>) {
        let mut combined = String::new();
        let mut reports = Vec::with_capacity(order.len());

        for name in order {
            let verdict = match read_fragment(&dir.join(name)) {
                Ok(content) => self.policy.classify(&content),
                Err(reason) => Verdict::Skip(reason),
            };

            let outcome = match verdict {
                Verdict::Accept(lines) => {
                    let body = lines.join("\n");
                    let chars = body.chars().count();
                    if self.chapter_markers {
                        combined.push_str(&chapter_marker(name));
                    }
                    combined.push_str(&body);
                    combined.push('\n');
                    debug!(fragment = %name, lines = lines.len(), chars, "Accepted fragment");
                    FragmentOutcome::Accepted {
                        lines: lines.len(),
                        chars,
                    }
                }
                Verdict::Skip(reason) => {
                    match &reason {
                        SkipReason::Missing | SkipReason::Unreadable { .. } => {
                            warn!(fragment = %name, "Skipping fragment: {reason}")
                        }
                        _ => info!(fragment = %name, "Skipping fragment: {reason}"),
                    }
                    FragmentOutcome::Skipped(reason)
                }
            };

            reports.push(FragmentReport {
                name: name.clone(),
                outcome,
            });
        }

        (combined, reports)
    }
}

pub fn chapter_marker(name: &str) -> String {
    format!("\n\nChapter: {name}\n\n")
}

/// Fragment content with undecodable bytes replaced by U+FFFD.
fn read_fragment(path: &Path) -> std::result::Result<String, SkipReason> {
    if !path.is_file() {
        return Err(SkipReason::Missing);
    }
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => Err(SkipReason::Unreadable {
            error: err.to_string(),
        }),
    }
}
