//! Frame production.
//!
//! `Renderer::render` turns the focused session into the bytes needed to bring
//! the terminal up to date:
//! 1. When the viewport moved by a few lines and nothing is selected, the
//!    cached rows are shifted and the terminal is told to scroll the text area
//!    (`ESC D` / `ESC M` inside a scroll region) so only entering rows repaint.
//! 2. Every text row is compared with its cached `(highlight, text)` pair and
//!    repainted when it differs. Rows carrying a highlight always repaint.
//! 3. The status line repaints when its text changed.
//! 4. The terminal cursor is placed on the buffer cursor (or the prompt input).
//!
//! The viewport must already satisfy its invariants (`Viewport::recompute`).

use crate::row_cache::{Highlight, RowCache, RowEntry};
use crate::status::{compose_status, display_width};
use crate::writer::Writer;
use anyhow::Result;
use core_model::EditorSession;
use core_state::{EditorState, Mode};
use tracing::trace;
use unicode_width::UnicodeWidthChar;

/// Largest viewport shift, as a fraction of the text height, handled by
/// scrolling the terminal instead of repainting.
const SCROLL_SHIFT_DIVISOR: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub frames: u64,
    pub rows_painted: u64,
    pub scroll_shifts: u64,
    /// Rows painted by the most recent frame.
    pub last_rows_painted: usize,
    pub last_status_painted: bool,
}

#[derive(Debug, Default)]
pub struct Renderer {
    cache: RowCache,
    prev_status: Option<String>,
    stats: RenderStats,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what the screen shows; the next frame repaints everything.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
        self.prev_status = None;
        trace!(target: "render", "cache_invalidated");
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn render(&mut self, session: &EditorSession) -> Result<Vec<u8>> {
        let state = &session.state;
        let view = &session.view;
        let (width, height) = (view.width, view.height);
        if self.cache.ensure_geometry(width, height) {
            self.prev_status = None;
        }

        let mut w = Writer::new();
        w.show_cursor(false);

        let highlighted = state.mark.is_some() || state.mode == Mode::ReplaceConfirm;
        if let Some(prev_top) = self.cache.top
            && prev_top != view.top
            && !highlighted
        {
            let delta = view.top as isize - prev_top as isize;
            if delta.unsigned_abs() <= height / SCROLL_SHIFT_DIVISOR {
                emit_scroll(&mut w, delta, height);
                self.cache.shift_for_scroll(delta);
                self.stats.scroll_shifts += 1;
                trace!(target: "render.scroll", delta, "scroll_shift");
            }
        }

        let mut painted = 0usize;
        for row in 0..height {
            let line = view.top + row;
            let entry = if line < state.buffer.line_count() {
                let text = visible_slice(state.buffer.line(line), view.margin, width);
                RowEntry {
                    highlight: row_highlight(state, line, view.margin, width),
                    text,
                }
            } else {
                RowEntry {
                    highlight: Highlight::None,
                    text: String::new(),
                }
            };
            let stale = self.cache.get(row) != Some(&entry);
            if stale || entry.highlight != Highlight::None {
                paint_row(&mut w, row as u16, &entry);
                self.cache.store(row, entry);
                painted += 1;
            }
        }
        self.cache.top = Some(view.top);

        let status = compose_status(state, width);
        let status_painted = self.prev_status.as_deref() != Some(status.text.as_str());
        if status_painted {
            w.move_to(0, height as u16);
            w.reverse(true);
            w.print(status.text.clone());
            w.clear_to_eol();
            w.reverse(false);
            self.prev_status = Some(status.text.clone());
        }

        match status.cursor {
            Some(x) => w.move_to(x, height as u16),
            None => {
                let line = state.buffer.line(state.cursor.line);
                let before: String = line
                    .chars()
                    .skip(view.margin)
                    .take(state.cursor.col.saturating_sub(view.margin))
                    .collect();
                // Overhang columns past the end of the line are blank cells.
                let overhang = state
                    .cursor
                    .col
                    .saturating_sub(view.margin.max(line.chars().count()));
                let x = (display_width(&before) + overhang).min(width.saturating_sub(1));
                w.move_to(x as u16, view.row as u16);
            }
        }
        w.show_cursor(true);

        self.stats.frames += 1;
        self.stats.rows_painted += painted as u64;
        self.stats.last_rows_painted = painted;
        self.stats.last_status_painted = status_painted;
        trace!(target: "render", rows = painted, status = status_painted, "frame");
        w.into_bytes()
    }
}

fn emit_scroll(w: &mut Writer, delta: isize, height: usize) {
    let bottom = (height - 1) as u16;
    w.scroll_region(Some((0, bottom)));
    if delta > 0 {
        w.move_to(0, bottom);
        for _ in 0..delta {
            w.pan_up();
        }
    } else {
        w.move_to(0, 0);
        for _ in 0..delta.unsigned_abs() {
            w.pan_down();
        }
    }
    w.scroll_region(None);
}

/// Chars of `line` from column `margin` that fit in `width` cells.
pub fn visible_slice(line: &str, margin: usize, width: usize) -> String {
    let mut used = 0usize;
    let mut out = String::new();
    for c in line.chars().skip(margin) {
        let cw = c.width().unwrap_or(0);
        if used + cw > width {
            break;
        }
        used += cw;
        out.push(c);
    }
    out
}

fn row_highlight(state: &EditorState, line: usize, margin: usize, width: usize) -> Highlight {
    if state.mode == Mode::ReplaceConfirm {
        return match &state.replace {
            Some(run) if run.at.line == line => {
                Highlight::for_columns(run.at.col, Some(run.at.col + run.len), margin, width)
            }
            _ => Highlight::None,
        };
    }
    state
        .selection()
        .and_then(|sel| sel.columns_on(line))
        .map(|(from, to)| Highlight::for_columns(from, to, margin, width))
        .unwrap_or_default()
}

fn paint_row(w: &mut Writer, row: u16, entry: &RowEntry) {
    w.move_to(0, row);
    let chars: Vec<char> = entry.text.chars().collect();
    match entry.highlight.range(chars.len()) {
        None => w.print(entry.text.clone()),
        Some((a, b)) => {
            w.print(chars[..a].iter().collect::<String>());
            w.reverse(true);
            if a == b && entry.highlight == Highlight::Whole {
                w.print(" ");
            } else {
                w.print(chars[a..b].iter().collect::<String>());
            }
            w.reverse(false);
            w.print(chars[b..].iter().collect::<String>());
        }
    }
    w.clear_to_eol();
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::CursorPolicy;
    use core_model::{EditorSession, ScreenLayout};
    use core_state::{EditorState, SelectionKind};
    use core_text::LineBuffer;

    fn session(n: usize, rows: u16) -> EditorSession {
        let lines = (0..n).map(|i| format!("line {i}")).collect();
        let st = EditorState::new(LineBuffer::from_lines(lines), 10);
        EditorSession::new(st, ScreenLayout::new(40, rows))
    }

    #[test]
    fn first_frame_paints_every_row_then_nothing() {
        let mut s = session(30, 6);
        let mut r = Renderer::new();
        r.render(&s).unwrap();
        assert_eq!(r.stats().last_rows_painted, 5);
        assert!(r.stats().last_status_painted);
        s.settle(CursorPolicy::Clamped);
        r.render(&s).unwrap();
        assert_eq!(r.stats().last_rows_painted, 0);
        assert!(!r.stats().last_status_painted);
    }

    #[test]
    fn edited_line_alone_repaints() {
        let mut s = session(30, 6);
        let mut r = Renderer::new();
        r.render(&s).unwrap();
        s.state.buffer.set_line(2, "changed".into());
        let bytes = String::from_utf8(r.render(&s).unwrap()).unwrap();
        assert_eq!(r.stats().last_rows_painted, 1);
        assert!(bytes.contains("changed"));
    }

    #[test]
    fn small_scroll_shifts_cache() {
        let mut s = session(30, 6);
        let mut r = Renderer::new();
        s.state.cursor.line = 4;
        s.settle(CursorPolicy::Clamped);
        r.render(&s).unwrap();
        s.state.cursor.line = 6;
        s.settle(CursorPolicy::Clamped);
        assert_eq!(s.view.top, 2);
        let bytes = String::from_utf8(r.render(&s).unwrap()).unwrap();
        assert_eq!(r.stats().scroll_shifts, 1);
        assert_eq!(r.stats().last_rows_painted, 2, "only entering rows");
        assert!(bytes.contains("\x1b[1;5r\x1b[5;1H\x1bD\x1bD\x1b[r"));
    }

    #[test]
    fn selected_rows_always_repaint() {
        let mut s = session(10, 6);
        let mut r = Renderer::new();
        s.state.set_mark(SelectionKind::Linewise);
        s.state.cursor.line = 1;
        r.render(&s).unwrap();
        r.render(&s).unwrap();
        assert_eq!(r.stats().last_rows_painted, 2);
    }

    #[test]
    fn invalidate_forces_full_repaint() {
        let s = session(3, 6);
        let mut r = Renderer::new();
        r.render(&s).unwrap();
        r.invalidate();
        r.render(&s).unwrap();
        assert_eq!(r.stats().last_rows_painted, 5);
        assert!(r.stats().last_status_painted);
    }

    #[test]
    fn visible_slice_respects_margin_and_wide_chars() {
        assert_eq!(visible_slice("abcdef", 2, 3), "cde");
        assert_eq!(visible_slice("日本語", 0, 5), "日本");
    }
}
