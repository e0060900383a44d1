//! Markup measurement and tag stripping for extracted fragments.
//!
//! Two stripping strategies exist side by side. `strip_basic` removes every
//! tag and keeps the source line structure; `strip_structural` flattens the
//! document and rebuilds lines from block-closing tags, which copes far better
//! with XHTML that puts a whole chapter on one physical line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest `<...>` run on a single line: starts at `<`, ends at the next `>`.
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>\n]*>").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<!DOCTYPE[^>]*>").unwrap());
static RE_STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static RE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static RE_BLOCK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:div|p|h[1-6]|a|span)\b[^>]*>").unwrap());
static RE_BLOCK_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(?:div|p|h[1-6]|a|span)\s*>").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<link\b[^>]*>").unwrap());

/// Share of `content` (in characters) taken up by tag-like substrings.
///
/// Returns `None` for empty content, where the ratio is undefined.
pub fn markup_density(content: &str) -> Option<f64> {
    let total = content.chars().count();
    if total == 0 {
        return None;
    }
    let tagged: usize = RE_TAG
        .find_iter(content)
        .map(|tag| tag.as_str().chars().count())
        .sum();
    Some(tagged as f64 / total as f64)
}

/// Remove every tag, then drop blank lines and bare page numbers.
pub fn strip_basic(content: &str) -> Vec<String> {
    let text = RE_TAG.replace_all(content, "");
    text.lines()
        .filter(|line| !line.trim().is_empty() && !is_page_number(line))
        .map(str::to_string)
        .collect()
}

/// Flatten whitespace, turn block ends into line breaks and drop everything else
/// that is not readable text. Returned lines are trimmed and non-empty.
pub fn strip_structural(content: &str) -> Vec<String> {
    let text = RE_WHITESPACE.replace_all(content, " ");
    let text = RE_DOCTYPE.replace_all(&text, "");
    let text = RE_STYLE_BLOCK.replace_all(&text, "");
    let text = RE_COMMENT.replace_all(&text, "");
    let text = RE_LINK.replace_all(&text, "");
    let text = RE_BLOCK_OPEN.replace_all(&text, "");
    let text = RE_BLOCK_CLOSE.replace_all(&text, "\n");
    let text = RE_TAG.replace_all(&text, "");
    let text = text.replace("&nbsp;", " ");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// ASCII digits only, ignoring surrounding indentation.
fn is_page_number(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit())
}
