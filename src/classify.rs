//! Noise classification for extracted fragments.
//!
//! A fragment either yields cleaned prose lines or a [`SkipReason`]. Skips are
//! ordinary outcomes, not errors: markup-only pages, copyright boilerplate and
//! short-line pages such as indices or footnote lists all end up here.

use crate::config::{AppConfig, ConsolidationMode};
use crate::markup::{markup_density, strip_basic, strip_structural};
use serde::Serialize;

/// Why a fragment was left out of the consolidated text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
    /// Listed in the order file but absent on disk.
    Missing,
    Unreadable { error: String },
    /// Zero-length content; density is undefined.
    Empty,
    MarkupHeavy { density: f64 },
    /// Nothing readable survived tag stripping.
    NoText,
    Copyright { keyword: String },
    IndexLike { lines: usize, mean_line_chars: f64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Missing => write!(f, "not found"),
            SkipReason::Unreadable { error } => write!(f, "unreadable ({error})"),
            SkipReason::Empty => write!(f, "empty"),
            SkipReason::MarkupHeavy { density } => {
                write!(f, "mainly markup ({:.0}% tags)", density * 100.0)
            }
            SkipReason::NoText => write!(f, "no readable text"),
            SkipReason::Copyright { keyword } => write!(f, "copyright page ({keyword:?})"),
            SkipReason::IndexLike {
                lines,
                mean_line_chars,
            } => write!(
                f,
                "index or footnotes ({lines} lines, {mean_line_chars:.1} chars/line)"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accept(Vec<String>),
    Skip(SkipReason),
}

/// Inclusion rules for one consolidation mode.
#[derive(Debug, Clone)]
pub struct Policy {
    mode: ConsolidationMode,
    markup_threshold: f64,
    copyright_keywords: Vec<String>,
    min_lines: usize,
    min_mean_line_chars: usize,
}

impl Policy {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            mode: cfg.mode,
            markup_threshold: cfg.markup_threshold(),
            copyright_keywords: cfg
                .copyright_keywords
                .iter()
                .map(|keyword| keyword.trim())
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string)
                .collect(),
            min_lines: cfg.min_lines,
            min_mean_line_chars: cfg.min_mean_line_chars,
        }
    }

    pub fn mode(&self) -> ConsolidationMode {
        self.mode
    }

    pub fn classify(&self, content: &str) -> Verdict {
        let Some(density) = markup_density(content) else {
            return Verdict::Skip(SkipReason::Empty);
        };
        if density > self.markup_threshold {
            return Verdict::Skip(SkipReason::MarkupHeavy { density });
        }

        let lines = match self.mode {
            ConsolidationMode::Basic => strip_basic(content),
            ConsolidationMode::Filtered => strip_structural(content),
        };
        if lines.is_empty() {
            return Verdict::Skip(SkipReason::NoText);
        }

        if self.mode == ConsolidationMode::Filtered {
            if let Some(keyword) = self.copyright_keyword(&lines) {
                return Verdict::Skip(SkipReason::Copyright { keyword });
            }
            let mean_line_chars = mean_line_chars(&lines);
            if lines.len() < self.min_lines || mean_line_chars < self.min_mean_line_chars as f64 {
                return Verdict::Skip(SkipReason::IndexLike {
                    lines: lines.len(),
                    mean_line_chars,
                });
            }
        }

        Verdict::Accept(lines)
    }

    fn copyright_keyword(&self, lines: &[String]) -> Option<String> {
        let haystack = lines.join("\n").to_lowercase();
        self.copyright_keywords
            .iter()
            .find(|keyword| haystack.contains(&keyword.to_lowercase()))
            .cloned()
    }
}

fn mean_line_chars(lines: &[String]) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    let total: usize = lines.iter().map(|line| line.chars().count()).sum();
    total as f64 / lines.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_PARAGRAPH: &str =
        "<p>Real text here that is definitely long enough to pass the line-length heuristic for sure.</p>";

    fn policy(mode: ConsolidationMode) -> Policy {
        let cfg = AppConfig {
            mode,
            ..AppConfig::default()
        };
        Policy::from_config(&cfg)
    }

    fn paragraphs(body: &str, count: usize) -> String {
        format!("<html><body>{}</body></html>", body.repeat(count))
    }

    #[test]
    fn long_prose_is_accepted() {
        let content = paragraphs(LONG_PARAGRAPH, 6);
        match policy(ConsolidationMode::Filtered).classify(&content) {
            Verdict::Accept(lines) => {
                assert_eq!(lines.len(), 6);
                assert!(lines[0].starts_with("Real text here"));
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    #[test]
    fn pure_markup_is_skipped_in_both_modes() {
        let content = "<html><head></head><body></body></html>";
        for mode in [ConsolidationMode::Basic, ConsolidationMode::Filtered] {
            assert!(matches!(
                policy(mode).classify(content),
                Verdict::Skip(SkipReason::MarkupHeavy { .. })
            ));
        }
    }

    #[test]
    fn empty_fragment_is_skipped_without_dividing() {
        assert_eq!(
            policy(ConsolidationMode::Basic).classify(""),
            Verdict::Skip(SkipReason::Empty)
        );
    }

    #[test]
    fn copyright_page_is_skipped_regardless_of_length() {
        let mut content = paragraphs(LONG_PARAGRAPH, 10);
        content.push_str("<p>All rights reserved © 2020</p>");
        assert_eq!(
            policy(ConsolidationMode::Filtered).classify(&content),
            Verdict::Skip(SkipReason::Copyright {
                keyword: "all rights reserved".to_string()
            })
        );
    }

    #[test]
    fn copyright_match_ignores_case() {
        let content = paragraphs(
            "<p>This edition carries isbn 978-0-00-000000-0 on every line of it, twice over.</p>",
            6,
        );
        assert!(matches!(
            policy(ConsolidationMode::Filtered).classify(&content),
            Verdict::Skip(SkipReason::Copyright { .. })
        ));
    }

    #[test]
    fn few_short_lines_are_index_like() {
        let content = paragraphs("<p>Index ab</p>", 3);
        match policy(ConsolidationMode::Filtered).classify(&content) {
            Verdict::Skip(SkipReason::IndexLike {
                lines,
                mean_line_chars,
            }) => {
                assert_eq!(lines, 3);
                assert!((mean_line_chars - 8.0).abs() < 1e-9);
            }
            other => panic!("expected index skip, got {other:?}"),
        }
    }

    #[test]
    fn many_short_lines_are_still_index_like() {
        let content = paragraphs("<p>Apples, 12</p>", 40);
        assert!(matches!(
            policy(ConsolidationMode::Filtered).classify(&content),
            Verdict::Skip(SkipReason::IndexLike { lines: 40, .. })
        ));
    }

    #[test]
    fn six_fifty_char_lines_are_accepted() {
        let line = "x".repeat(50);
        let content = paragraphs(&format!("<p>{line}</p>"), 6);
        assert!(matches!(
            policy(ConsolidationMode::Filtered).classify(&content),
            Verdict::Accept(lines) if lines.len() == 6
        ));
    }

    #[test]
    fn basic_mode_skips_neither_copyright_nor_short_pages() {
        let content = "<p>All rights reserved © 2020</p>\n<p>7</p>";
        assert_eq!(
            policy(ConsolidationMode::Basic).classify(content),
            Verdict::Accept(vec!["All rights reserved © 2020".to_string()])
        );
    }

    #[test]
    fn basic_mode_page_numbers_only_leave_no_text() {
        let content = "12\n13\n<b>14</b>\n";
        assert_eq!(
            policy(ConsolidationMode::Basic).classify(content),
            Verdict::Skip(SkipReason::NoText)
        );
    }

    #[test]
    fn density_threshold_follows_mode() {
        // 2 tag chars out of 3 total: density 0.667.
        let content = "<>a";
        assert!(matches!(
            policy(ConsolidationMode::Basic).classify(content),
            Verdict::Skip(SkipReason::MarkupHeavy { .. })
        ));
        assert!(matches!(
            policy(ConsolidationMode::Filtered).classify(content),
            Verdict::Skip(SkipReason::IndexLike { lines: 1, .. })
        ));
    }
}
