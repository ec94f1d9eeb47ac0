//! Motion sub-dispatch (cursor movement).
//!
//! Column handling follows the session's `CursorPolicy`: clamped cursors wrap
//! left/right across line boundaries, straight cursors may sit past the end of
//! a line and never wrap. Plain motions drop a characterwise mark; a linewise
//! mark stays so the cursor can extend it.

use super::DispatchResult;
use crate::MotionKind;
use core_model::EditorSession;
use core_state::{SelectionKind, SharedContext};
use core_text::motion;
use tracing::trace;

pub(super) fn handle_motion(
    session: &mut EditorSession,
    ctx: &SharedContext,
    kind: MotionKind,
    extend: bool,
) -> DispatchResult {
    let policy = ctx.settings.cursor_policy;
    let EditorSession { state, view } = session;
    if extend {
        if state.mark.is_none() {
            state.set_mark(SelectionKind::Characterwise);
        }
    } else if state
        .mark
        .is_some_and(|m| m.kind == SelectionKind::Characterwise)
    {
        state.clear_mark();
    }

    let last = state.buffer.line_count() - 1;
    let len = state.buffer.line_len(state.cursor.line);
    if !policy.allows_overhang() {
        state.cursor.col = state.cursor.col.min(len);
    }
    let cur = &mut state.cursor;
    match kind {
        MotionKind::Up => cur.line = cur.line.saturating_sub(1),
        MotionKind::Down => cur.line = (cur.line + 1).min(last),
        MotionKind::Left => {
            if cur.col > 0 {
                cur.col -= 1;
            } else if policy.wraps_lines() && cur.line > 0 {
                cur.line -= 1;
                cur.col = state.buffer.line_len(cur.line);
            }
        }
        MotionKind::Right => {
            if policy.allows_overhang() || cur.col < len {
                cur.col += 1;
            } else if policy.wraps_lines() && cur.line < last {
                cur.line += 1;
                cur.col = 0;
            }
        }
        MotionKind::Home => {
            let first = motion::first_non_blank(state.buffer.line(cur.line));
            cur.col = if cur.col == first { 0 } else { first };
        }
        MotionKind::End => cur.col = len,
        MotionKind::FirstLine => {
            cur.line = 0;
            cur.col = 0;
        }
        MotionKind::LastLine => {
            cur.line = last;
            cur.col = state.buffer.line_len(last);
        }
        MotionKind::WordLeft => motion::word_left(&state.buffer, cur),
        MotionKind::WordRight => motion::word_right(&state.buffer, cur),
        MotionKind::PageUp => view.page(state, -1),
        MotionKind::PageDown => view.page(state, 1),
        MotionKind::ScrollUp => view.scroll_by(state, -1),
        MotionKind::ScrollDown => view.scroll_by(state, 1),
    }
    trace!(target: "actions.dispatch", ?kind, line = state.cursor.line, col = state.cursor.col, "motion");
    DispatchResult::dirty()
}

/// Mouse press: move to the clicked cell and drop the mark.
pub(super) fn click(session: &mut EditorSession, column: u16, row: u16) -> DispatchResult {
    let EditorSession { state, view } = session;
    match view.position_at(state, column, row) {
        Some(pos) => {
            state.clear_mark();
            state.cursor = pos;
            DispatchResult::dirty()
        }
        None => DispatchResult::clean(),
    }
}

/// Mouse drag: extend a characterwise selection to the cell under the pointer.
pub(super) fn drag(session: &mut EditorSession, column: u16, row: u16) -> DispatchResult {
    let EditorSession { state, view } = session;
    match view.position_at(state, column, row) {
        Some(pos) => {
            if state.mark.is_none() {
                state.set_mark(SelectionKind::Characterwise);
            }
            state.cursor = pos;
            DispatchResult::dirty()
        }
        None => DispatchResult::clean(),
    }
}

pub(super) fn scroll(session: &mut EditorSession, lines: isize) -> DispatchResult {
    session.view.scroll_by(&mut session.state, lines);
    DispatchResult::dirty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::{CursorPolicy, Settings};
    use core_model::ScreenLayout;
    use core_state::EditorState;
    use core_text::{LineBuffer, Position};

    fn session(lines: &[&str]) -> EditorSession {
        let buf = LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect());
        EditorSession::new(EditorState::new(buf, 10), ScreenLayout::new(40, 10))
    }

    fn ctx(policy: CursorPolicy) -> SharedContext {
        SharedContext::new(Settings {
            cursor_policy: policy,
            ..Settings::default()
        })
    }

    #[test]
    fn clamped_left_right_wrap_lines() {
        let mut s = session(&["ab", "cd"]);
        let c = ctx(CursorPolicy::Clamped);
        s.state.cursor = Position::new(0, 2);
        handle_motion(&mut s, &c, MotionKind::Right, false);
        assert_eq!(s.state.cursor, Position::new(1, 0));
        handle_motion(&mut s, &c, MotionKind::Left, false);
        assert_eq!(s.state.cursor, Position::new(0, 2));
    }

    #[test]
    fn straight_cursor_overhangs_and_stops_at_col_zero() {
        let mut s = session(&["ab", "cd"]);
        let c = ctx(CursorPolicy::Straight);
        s.state.cursor = Position::new(0, 2);
        handle_motion(&mut s, &c, MotionKind::Right, false);
        assert_eq!(s.state.cursor, Position::new(0, 3));
        s.state.cursor = Position::new(1, 0);
        handle_motion(&mut s, &c, MotionKind::Left, false);
        assert_eq!(s.state.cursor, Position::new(1, 0));
    }

    #[test]
    fn home_toggles_between_indent_and_column_zero() {
        let mut s = session(&["    x = 1"]);
        let c = ctx(CursorPolicy::Clamped);
        s.state.cursor.col = 7;
        handle_motion(&mut s, &c, MotionKind::Home, false);
        assert_eq!(s.state.cursor.col, 4);
        handle_motion(&mut s, &c, MotionKind::Home, false);
        assert_eq!(s.state.cursor.col, 0);
        handle_motion(&mut s, &c, MotionKind::Home, false);
        assert_eq!(s.state.cursor.col, 4);
    }

    #[test]
    fn shift_motion_sets_and_plain_motion_drops_characterwise_mark() {
        let mut s = session(&["hello"]);
        let c = ctx(CursorPolicy::Clamped);
        handle_motion(&mut s, &c, MotionKind::Right, true);
        handle_motion(&mut s, &c, MotionKind::Right, true);
        let sel = s.state.selection().unwrap();
        assert_eq!((sel.start.col, sel.end.col), (0, 2));
        handle_motion(&mut s, &c, MotionKind::Right, false);
        assert!(s.state.mark.is_none());
    }

    #[test]
    fn linewise_mark_survives_plain_motion() {
        let mut s = session(&["a", "b", "c"]);
        let c = ctx(CursorPolicy::Clamped);
        s.state.set_mark(SelectionKind::Linewise);
        handle_motion(&mut s, &c, MotionKind::Down, false);
        assert_eq!(s.state.selection().unwrap().line_range(), (0, 2));
    }

    #[test]
    fn click_and_drag_select() {
        let mut s = session(&["alpha", "beta"]);
        click(&mut s, 1, 0);
        assert_eq!(s.state.cursor, Position::new(0, 1));
        drag(&mut s, 2, 1);
        let sel = s.state.selection().unwrap();
        assert_eq!((sel.start, sel.end), (Position::new(0, 1), Position::new(1, 2)));
        assert_eq!(click(&mut s, 0, 8), DispatchResult::clean(), "row past the buffer");
    }
}
