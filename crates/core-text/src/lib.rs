//! Line-oriented text buffer.
//!
//! The buffer is an ordered `Vec<String>`, one entry per logical line without
//! its terminating newline. Columns are *char* indices into a line (not bytes,
//! not display cells); helpers in `column` convert between the two.
//!
//! Invariants:
//! * The buffer is never empty. An empty document is a single empty line, and
//!   every mutation that would leave zero lines re-inserts one empty line.
//! * Indices passed to the range operations must satisfy `i <= line_count()`.
//!   Callers clamp before calling; a violation is a programming error and
//!   panics.

use std::collections::TryReserveError;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

pub mod column;
pub mod motion;
pub mod tabs;

/// A cursor-like location: line index plus char column within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
    pub fn origin() -> Self {
        Self { line: 0, col: 0 }
    }
}

/// Ordered sequence of text lines owned by a single editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// A document holding one empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Build from owned lines. An empty vector becomes a single empty line.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut buf = Self { lines };
        buf.ensure_non_empty();
        buf
    }

    /// Split `text` on `\n` (a trailing `\r` is dropped from each line). A single
    /// trailing newline does not produce an extra empty line.
    pub fn from_text(text: &str) -> Self {
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = body
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self::from_lines(lines)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Borrow line `idx`. Panics when `idx >= line_count()`.
    pub fn line(&self, idx: usize) -> &str {
        assert!(
            idx < self.lines.len(),
            "line index {idx} out of range ({} lines)",
            self.lines.len()
        );
        &self.lines[idx]
    }

    /// Number of chars in line `idx`.
    pub fn line_len(&self, idx: usize) -> usize {
        self.line(idx).chars().count()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Copy `count` lines starting at `start` (clamped to the end of the buffer).
    pub fn get_lines(&self, start: usize, count: usize) -> Vec<String> {
        self.check_index(start);
        let end = (start + count).min(self.lines.len());
        self.lines[start..end].to_vec()
    }

    /// Replace line `idx` wholesale.
    pub fn set_line(&mut self, idx: usize, text: String) {
        assert!(idx < self.lines.len(), "set_line index {idx} out of range");
        self.lines[idx] = text;
    }

    /// Replace `count` lines at `start` with `new_lines`. `count` is clamped to
    /// the lines available, so `start == line_count()` appends.
    pub fn replace_lines(&mut self, start: usize, count: usize, new_lines: Vec<String>) {
        self.check_index(start);
        let end = (start + count).min(self.lines.len());
        self.lines.splice(start..end, new_lines);
        self.ensure_non_empty();
    }

    pub fn insert_lines(&mut self, start: usize, new_lines: Vec<String>) {
        self.replace_lines(start, 0, new_lines);
    }

    /// Remove `count` lines at `start`, returning them.
    pub fn delete_lines(&mut self, start: usize, count: usize) -> Vec<String> {
        self.check_index(start);
        let end = (start + count).min(self.lines.len());
        let removed: Vec<String> = self.lines.drain(start..end).collect();
        self.ensure_non_empty();
        removed
    }

    /// Reserve room for `additional` more lines without aborting on failure.
    pub fn try_reserve_lines(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.lines.try_reserve(additional)
    }

    /// Content checksum used for the modified indicator.
    pub fn checksum(&self) -> u64 {
        let mut h = DefaultHasher::new();
        for l in &self.lines {
            h.write(l.as_bytes());
            h.write_u8(b'\n');
        }
        h.finish()
    }

    /// Join lines with `\n` (no trailing newline).
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    fn check_index(&self, idx: usize) {
        assert!(
            idx <= self.lines.len(),
            "line index {idx} out of range ({} lines)",
            self.lines.len()
        );
    }

    fn ensure_non_empty(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let b = LineBuffer::from_text("");
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line(0), "");
    }

    #[test]
    fn from_text_drops_single_trailing_newline_and_cr() {
        let b = LineBuffer::from_text("a\r\nb\n");
        assert_eq!(b.lines(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn deleting_every_line_leaves_one_empty_line() {
        let mut b = buf(&["one", "two", "three"]);
        let removed = b.delete_lines(0, 3);
        assert_eq!(removed.len(), 3);
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line(0), "");
    }

    #[test]
    fn replacing_with_nothing_keeps_invariant() {
        let mut b = buf(&["x"]);
        b.replace_lines(0, 1, Vec::new());
        assert_eq!(b.lines(), &[String::new()]);
    }

    #[test]
    fn replace_at_end_appends() {
        let mut b = buf(&["a", "b"]);
        b.replace_lines(2, 0, vec!["c".into()]);
        assert_eq!(b.to_text(), "a\nb\nc");
    }

    #[test]
    fn replace_splices_middle() {
        let mut b = buf(&["a", "b", "c", "d"]);
        b.replace_lines(1, 2, vec!["X".into()]);
        assert_eq!(b.to_text(), "a\nX\nd");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        let mut b = buf(&["a"]);
        b.insert_lines(5, vec!["z".into()]);
    }

    #[test]
    fn checksum_tracks_content() {
        let a = buf(&["ab", "c"]);
        let b = buf(&["a", "bc"]);
        assert_ne!(a.checksum(), b.checksum(), "line boundaries participate");
        assert_eq!(a.checksum(), buf(&["ab", "c"]).checksum());
    }
}
