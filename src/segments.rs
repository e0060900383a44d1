//! Size-bounded segment files.
//!
//! Consolidated text is repacked into `<base>_<n>.txt` files without ever
//! splitting a line. A line counts as its characters plus the newline that
//! terminates it; a segment rolls over before the line that would bring it to
//! the limit. A line longer than the limit still lands whole in a segment of
//! its own.

use crate::util::ensure_dir;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs::{self, File};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct SegmentWriter {
    dir: PathBuf,
    base_name: String,
    limit: Option<usize>,
}

impl SegmentWriter {
    /// `limit` is the per-segment character budget; `None` writes a single segment.
    pub fn new(dir: &Path, base_name: &str, limit: Option<usize>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            base_name: base_name.to_string(),
            limit,
        }
    }

    pub fn segment_path(&self, number: usize) -> PathBuf {
        self.dir.join(format!("{}_{}.txt", self.base_name, number))
    }

    /// Delete every `<base>_<n>.txt` in the target directory.
    pub fn remove_stale(&self) -> Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }
        let pattern = Regex::new(&format!(r"^{}_\d+\.txt$", regex::escape(&self.base_name)))
            .context("Failed to build segment name pattern")?;

        let mut removed = 0usize;
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to list {}", self.dir.display()))?;
            let name = entry.file_name();
            if !pattern.is_match(&name.to_string_lossy()) {
                continue;
            }
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove stale segment {}", path.display()))?;
            debug!(path = %path.display(), "Removed stale segment");
            removed += 1;
        }
        Ok(removed)
    }

    /// Replace any previous segments with `text`, returning the files written in order.
    pub fn write(&self, text: &str) -> Result<Vec<PathBuf>> {
        ensure_dir(&self.dir)?;
        let removed = self.remove_stale()?;
        if removed > 0 {
            info!(dir = %self.dir.display(), removed, "Cleared previous segments");
        }

        let mut written: Vec<PathBuf> = Vec::new();
        let mut segment: Option<(LineWriter<File>, usize)> = None;

        for line in split_lines(text) {
            let cost = line.chars().count() + 1;
            let rollover = match &segment {
                None => true,
                Some((_, used)) => self.limit.is_some_and(|limit| used + cost >= limit),
            };

            if rollover {
                if let Some((mut finished, _)) = segment.take() {
                    finished.flush().context("Failed to flush segment")?;
                }
                let path = self.segment_path(written.len() + 1);
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create segment {}", path.display()))?;
                written.push(path);
                segment = Some((LineWriter::new(file), 0));
            }

            if let Some((writer, used)) = segment.as_mut() {
                writeln!(writer, "{line}").context("Failed to write segment line")?;
                *used += cost;
            }
        }

        if let Some((mut finished, _)) = segment.take() {
            finished.flush().context("Failed to flush segment")?;
        }

        info!(
            dir = %self.dir.display(),
            base = %self.base_name,
            segments = written.len(),
            "Saved consolidated segments"
        );
        Ok(written)
    }
}

/// Lines of `text`; a single trailing newline does not produce an extra empty line.
fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|path| fs::read_to_string(path).expect("segment should be readable"))
            .collect()
    }

    fn sample_text() -> String {
        let mut text = String::new();
        for idx in 0..40 {
            text.push_str(&format!("line {idx} {}\n", "word ".repeat(idx % 7)));
        }
        text
    }

    #[test]
    fn concatenated_segments_rebuild_the_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = sample_text();
        let writer = SegmentWriter::new(dir.path(), "book_segment", Some(120));
        let paths = writer.write(&text).expect("write");

        assert!(paths.len() > 1);
        assert_eq!(read_all(&paths).concat(), text);
    }

    #[test]
    fn segments_stay_below_the_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = SegmentWriter::new(dir.path(), "book_segment", Some(120));
        let paths = writer.write(&sample_text()).expect("write");

        for content in read_all(&paths) {
            assert!(content.chars().count() < 120, "segment too large: {content:?}");
            assert!(content.ends_with('\n'));
        }
    }

    #[test]
    fn segments_are_numbered_from_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = SegmentWriter::new(dir.path(), "part", Some(10));
        let paths = writer.write("aaaa\nbbbb\ncccc\n").expect("write");

        let names: Vec<String> = paths
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["part_1.txt", "part_2.txt", "part_3.txt"]);
    }

    #[test]
    fn oversized_line_gets_its_own_segment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let long = "x".repeat(50);
        let text = format!("short\n{long}\ntail\n");
        let writer = SegmentWriter::new(dir.path(), "book_segment", Some(20));
        let paths = writer.write(&text).expect("write");

        assert_eq!(
            read_all(&paths),
            vec!["short\n".to_string(), format!("{long}\n"), "tail\n".to_string()]
        );
    }

    #[test]
    fn oversized_first_line_still_starts_at_segment_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let long = "y".repeat(30);
        let writer = SegmentWriter::new(dir.path(), "book_segment", Some(10));
        let paths = writer.write(&format!("{long}\nz\n")).expect("write");

        assert_eq!(paths[0], writer.segment_path(1));
        assert_eq!(read_all(&paths), vec![format!("{long}\n"), "z\n".to_string()]);
    }

    #[test]
    fn unbounded_limit_writes_one_segment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = sample_text();
        let writer = SegmentWriter::new(dir.path(), "book_segment", None);
        let paths = writer.write(&text).expect("write");

        assert_eq!(paths.len(), 1);
        assert_eq!(read_all(&paths).concat(), text);
    }

    #[test]
    fn blank_lines_are_preserved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = "\n\nChapter: a.xhtml\n\nbody\n";
        let writer = SegmentWriter::new(dir.path(), "book_segment", Some(1_000));
        let paths = writer.write(text).expect("write");
        assert_eq!(read_all(&paths), vec![text.to_string()]);
    }

    #[test]
    fn missing_trailing_newline_is_normalized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = SegmentWriter::new(dir.path(), "book_segment", None);
        let paths = writer.write("one\ntwo").expect("write");
        assert_eq!(read_all(&paths), vec!["one\ntwo\n".to_string()]);
    }

    #[test]
    fn empty_text_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = SegmentWriter::new(dir.path(), "book_segment", Some(100));
        assert!(writer.write("").expect("write").is_empty());
    }

    #[test]
    fn rerun_replaces_stale_segments_and_keeps_other_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("book_segment_7.txt"), "stale").expect("seed stale");
        fs::write(dir.path().join("book_segment_notes.txt"), "keep").expect("seed other");
        fs::write(dir.path().join("chapter.xhtml"), "<p>keep</p>").expect("seed fragment");

        let text = sample_text();
        let writer = SegmentWriter::new(dir.path(), "book_segment", Some(200));
        let first = writer.write(&text).expect("first write");
        let first_contents = read_all(&first);
        let second = writer.write(&text).expect("second write");

        assert_eq!(first, second);
        assert_eq!(read_all(&second), first_contents);
        assert!(!dir.path().join("book_segment_7.txt").exists());
        assert!(dir.path().join("book_segment_notes.txt").exists());
        assert!(dir.path().join("chapter.xhtml").exists());
    }

    #[test]
    fn shorter_rerun_drops_extra_segments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = SegmentWriter::new(dir.path(), "book_segment", Some(10));
        let many = writer.write("aaaa\nbbbb\ncccc\ndddd\n").expect("first write");
        assert_eq!(many.len(), 4);

        let few = writer.write("aaaa\n").expect("second write");
        assert_eq!(few.len(), 1);
        assert!(!writer.segment_path(2).exists());
        assert!(!writer.segment_path(4).exists());
    }
}
