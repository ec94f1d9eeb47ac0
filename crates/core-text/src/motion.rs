//! Cursor motion helpers.
//!
//! These operate purely on a `LineBuffer` + `Position` pair and are free of
//! editor state (policy such as line wrapping is decided by the caller).

use crate::{LineBuffer, Position, column};

/// Word characters for word motions and delete-word.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Column of the next word start on `line` at or after `col`: skip the rest of
/// the current word, then the gap after it. Stops at end of line.
pub fn next_word_start(line: &str, col: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let mut i = col.min(chars.len());
    while i < chars.len() && is_word_char(chars[i]) {
        i += 1;
    }
    while i < chars.len() && !is_word_char(chars[i]) {
        i += 1;
    }
    i
}

/// Column of the start of the word before `col` on `line`.
pub fn prev_word_start(line: &str, col: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let mut i = col.min(chars.len());
    while i > 0 && !is_word_char(chars[i - 1]) {
        i -= 1;
    }
    while i > 0 && is_word_char(chars[i - 1]) {
        i -= 1;
    }
    i
}

/// Move to the next word start, crossing to the following line at end of line.
pub fn word_right(buf: &LineBuffer, pos: &mut Position) {
    let line = buf.line(pos.line);
    if pos.col >= column::char_len(line) {
        if pos.line + 1 < buf.line_count() {
            pos.line += 1;
            pos.col = 0;
        }
        return;
    }
    pos.col = next_word_start(line, pos.col);
}

/// Move to the previous word start, crossing to the end of the previous line
/// from column 0.
pub fn word_left(buf: &LineBuffer, pos: &mut Position) {
    if pos.col == 0 {
        if pos.line > 0 {
            pos.line -= 1;
            pos.col = buf.line_len(pos.line);
        }
        return;
    }
    let line = buf.line(pos.line);
    pos.col = prev_word_start(line, pos.col.min(column::char_len(line)));
}

/// Column of the first non-blank char (line length for blank lines).
pub fn first_non_blank(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn word_right_skips_word_and_gap() {
        let b = buf(&["foo  bar.baz", "next"]);
        let mut p = Position::new(0, 0);
        word_right(&b, &mut p);
        assert_eq!(p.col, 5);
        word_right(&b, &mut p);
        assert_eq!(p.col, 9);
        word_right(&b, &mut p);
        assert_eq!(p.col, 12);
        word_right(&b, &mut p);
        assert_eq!(p, Position::new(1, 0));
    }

    #[test]
    fn word_left_crosses_lines() {
        let b = buf(&["alpha beta", "gamma"]);
        let mut p = Position::new(1, 0);
        word_left(&b, &mut p);
        assert_eq!(p, Position::new(0, 10));
        word_left(&b, &mut p);
        assert_eq!(p.col, 6);
        word_left(&b, &mut p);
        assert_eq!(p.col, 0);
    }

    #[test]
    fn first_non_blank_on_blank_line() {
        assert_eq!(first_non_blank("   "), 3);
        assert_eq!(first_non_blank("  x"), 2);
    }
}
