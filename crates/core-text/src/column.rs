//! Char-column helpers.
//!
//! Every column the editor stores is a char index. These helpers translate a
//! column to a byte offset before slicing so multi-byte UTF-8 text never gets
//! split inside a code point. Columns past the end clamp to the line length.

/// Byte offset of char column `col` (clamped to `s.len()`).
pub fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(b, _)| b)
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Chars `[from, to)` of `s`; both ends clamp.
pub fn slice(s: &str, from: usize, to: usize) -> &str {
    if to <= from {
        return "";
    }
    let a = byte_index(s, from);
    let b = byte_index(s, to);
    &s[a..b]
}

/// Split at char column `col` (clamped).
pub fn split_at(s: &str, col: usize) -> (&str, &str) {
    s.split_at(byte_index(s, col))
}

/// Return `s` with `text` inserted at `col`. When `col` is past the end the gap
/// is padded with spaces (straight-cursor editing past end of line).
pub fn insert_at(s: &str, col: usize, text: &str) -> String {
    let len = char_len(s);
    let mut out = String::with_capacity(s.len() + text.len() + col.saturating_sub(len));
    if col > len {
        out.push_str(s);
        out.extend(std::iter::repeat_n(' ', col - len));
        out.push_str(text);
    } else {
        let (head, tail) = split_at(s, col);
        out.push_str(head);
        out.push_str(text);
        out.push_str(tail);
    }
    out
}

/// Return `s` without chars `[from, to)`.
pub fn remove_range(s: &str, from: usize, to: usize) -> String {
    let a = byte_index(s, from);
    let b = byte_index(s, to.max(from));
    let mut out = String::with_capacity(s.len() - (b - a));
    out.push_str(&s[..a]);
    out.push_str(&s[b..]);
    out
}

/// Count of leading space chars.
pub fn leading_spaces(s: &str) -> usize {
    s.chars().take_while(|c| *c == ' ').count()
}

/// Char at column `col`, if any.
pub fn char_at(s: &str, col: usize) -> Option<char> {
    s.chars().nth(col)
}

/// Convert a byte offset (must be a char boundary) into a char column.
pub fn col_of_byte(s: &str, byte: usize) -> usize {
    s[..byte.min(s.len())].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multibyte_columns() {
        let s = "héllo";
        assert_eq!(byte_index(s, 2), 3);
        assert_eq!(slice(s, 1, 3), "él");
        assert_eq!(col_of_byte(s, 3), 2);
    }

    #[test]
    fn insert_past_end_pads() {
        assert_eq!(insert_at("ab", 4, "x"), "ab  x");
        assert_eq!(insert_at("ab", 1, "x"), "axb");
    }

    #[test]
    fn remove_range_clamps() {
        assert_eq!(remove_range("abcdef", 1, 3), "adef");
        assert_eq!(remove_range("abc", 2, 10), "ab");
        assert_eq!(remove_range("abc", 5, 7), "abc");
    }

    #[test]
    fn leading_space_count() {
        assert_eq!(leading_spaces("    x"), 4);
        assert_eq!(leading_spaces("\tx"), 0);
    }
}
