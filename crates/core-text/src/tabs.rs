//! Tab expansion on load and re-packing on save.

/// Tab stop width used for files on disk.
pub const FILE_TAB_WIDTH: usize = 8;

/// Expand every `\t` to spaces up to the next multiple of `width`. Returns the
/// expanded line and whether any tab was seen.
pub fn expand_tabs(line: &str, width: usize) -> (String, bool) {
    if !line.contains('\t') {
        return (line.to_string(), false);
    }
    let width = width.max(1);
    let mut out = String::with_capacity(line.len() + width);
    let mut col = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let n = width - col % width;
            out.extend(std::iter::repeat_n(' ', n));
            col += n;
        } else {
            out.push(ch);
            col += 1;
        }
    }
    (out, true)
}

/// Re-pack the leading whitespace of `line` into tabs of `width` columns.
/// Only leading indentation is touched so string literals keep their spaces.
pub fn pack_leading_tabs(line: &str, width: usize) -> String {
    let width = width.max(1);
    let indent = crate::column::leading_spaces(line);
    if indent < width {
        return line.to_string();
    }
    let tabs = indent / width;
    let spaces = indent % width;
    let mut out = String::with_capacity(line.len());
    out.extend(std::iter::repeat_n('\t', tabs));
    out.extend(std::iter::repeat_n(' ', spaces));
    out.push_str(&line[indent..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_to_next_stop() {
        let (s, seen) = expand_tabs("a\tb", 8);
        assert!(seen);
        assert_eq!(s, "a       b");
        let (s, seen) = expand_tabs("plain", 8);
        assert!(!seen);
        assert_eq!(s, "plain");
    }

    #[test]
    fn packs_leading_indent_only() {
        assert_eq!(pack_leading_tabs("          x  y", 8), "\t  x  y");
        assert_eq!(pack_leading_tabs("   x", 8), "   x");
    }

    #[test]
    fn expand_then_pack_restores_indent() {
        let (s, _) = expand_tabs("\t\tfoo", FILE_TAB_WIDTH);
        assert_eq!(pack_leading_tabs(&s, FILE_TAB_WIDTH), "\t\tfoo");
    }
}
