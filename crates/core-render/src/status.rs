//! Status line composition.
//!
//! Normal format: `*name  Row: r/total  Col: c  message`, where the leading
//! marker is `*` for a modified buffer and a space otherwise, and `r`/`c` are
//! 1-based. While a prompt is open the status row shows the prompt label and
//! the input instead. The result is truncated to the terminal width by display
//! cells.

use core_state::{EditorState, Mode};
use unicode_width::UnicodeWidthChar;

/// What the status row shows, plus where the terminal cursor goes when the
/// status row owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    /// Cursor cell within the status row (prompt input), if any.
    pub cursor: Option<u16>,
}

pub fn compose_status(state: &EditorState, width: usize) -> StatusLine {
    match state.mode {
        Mode::Prompt(kind) => {
            let label = kind.label();
            let input = state.prompt.text();
            let text = format!("{label}{input}");
            let before: String = label
                .chars()
                .chain(input.chars().take(state.prompt.cursor()))
                .collect();
            let cursor = display_width(&before).min(width.saturating_sub(1));
            StatusLine {
                text: truncate_to_width(&text, width),
                cursor: Some(cursor as u16),
            }
        }
        Mode::ReplaceConfirm => StatusLine {
            text: truncate_to_width("Replace? (y/n/a/q)", width),
            cursor: None,
        },
        Mode::Normal => {
            let marker = if state.modified { '*' } else { ' ' };
            let mut text = format!(
                "{marker}{}  Row: {}/{}  Col: {}",
                state.display_name(),
                state.cursor.line + 1,
                state.buffer.line_count(),
                state.cursor.col + 1,
            );
            if let Some(msg) = state.message() {
                text.push_str("  ");
                text.push_str(msg);
            }
            StatusLine {
                text: truncate_to_width(&text, width),
                cursor: None,
            }
        }
    }
}

pub fn display_width(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Longest prefix of `s` occupying at most `width` cells.
pub fn truncate_to_width(s: &str, width: usize) -> String {
    let mut used = 0usize;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}
