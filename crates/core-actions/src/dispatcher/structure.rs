//! Bracket matching and comment toggling.

use super::DispatchResult;
use core_state::{EditorState, SharedContext, UndoTag};
use core_text::{LineBuffer, Position, column};
use tracing::trace;

const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

/// Position of the bracket balancing the one at `pos`, scanning at most
/// `max_lines` lines beyond the starting line.
pub fn find_matching_bracket(buf: &LineBuffer, pos: Position, max_lines: usize) -> Option<Position> {
    let here = column::char_at(buf.line(pos.line), pos.col)?;
    let (open, close, forward) = PAIRS.iter().find_map(|&(o, c)| {
        if here == o {
            Some((o, c, true))
        } else if here == c {
            Some((o, c, false))
        } else {
            None
        }
    })?;
    let mut depth = 0usize;
    let mut step = |ch: char| {
        if ch == open {
            if forward { depth += 1 } else { depth -= 1 }
        } else if ch == close {
            if forward { depth -= 1 } else { depth += 1 }
        }
        depth == 0
    };
    if forward {
        let end = (pos.line + max_lines + 1).min(buf.line_count());
        for idx in pos.line..end {
            let start = if idx == pos.line { pos.col } else { 0 };
            for (col, ch) in buf.line(idx).chars().enumerate().skip(start) {
                if (ch == open || ch == close) && step(ch) {
                    return Some(Position::new(idx, col));
                }
            }
        }
    } else {
        let lo = pos.line.saturating_sub(max_lines);
        for idx in (lo..=pos.line).rev() {
            let chars: Vec<char> = buf.line(idx).chars().collect();
            let end = if idx == pos.line { pos.col + 1 } else { chars.len() };
            for col in (0..end.min(chars.len())).rev() {
                let ch = chars[col];
                if (ch == open || ch == close) && step(ch) {
                    return Some(Position::new(idx, col));
                }
            }
        }
    }
    None
}

pub(super) fn bracket_match(state: &mut EditorState, ctx: &SharedContext) -> DispatchResult {
    match find_matching_bracket(&state.buffer, state.cursor, ctx.settings.bracket_scan_lines) {
        Some(pos) => {
            state.cursor = pos;
            trace!(target: "actions.dispatch", line = pos.line, col = pos.col, "bracket_match");
        }
        None => state.set_message("No matching bracket"),
    }
    DispatchResult::dirty()
}

/// Comment or uncomment the selected lines (or the cursor line). The marker
/// goes at the smallest indentation of the non-blank lines; if every non-blank
/// line already carries it there, it is removed instead.
pub(super) fn toggle_comment(state: &mut EditorState, ctx: &SharedContext) -> DispatchResult {
    let marker = ctx.settings.comment.as_str();
    let bare = marker.trim_end();
    if bare.is_empty() {
        state.set_message("No comment marker set");
        return DispatchResult::dirty();
    }
    let (start, end) = match state.selection() {
        Some(sel) => sel.line_range(),
        None => (state.cursor.line, state.cursor.line + 1),
    };
    let lines = state.buffer.get_lines(start, end - start);
    let Some(indent) = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| column::leading_spaces(l))
        .min()
    else {
        return DispatchResult::clean();
    };
    let uncomment = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .all(|l| l[indent..].starts_with(bare));

    let mut shifts = Vec::with_capacity(lines.len());
    let updated: Vec<String> = lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                shifts.push(0isize);
                return l.clone();
            }
            let (lead, rest) = l.split_at(indent);
            if uncomment {
                let stripped = rest
                    .strip_prefix(marker)
                    .unwrap_or_else(|| &rest[bare.len()..]);
                shifts.push(-((rest.len() - stripped.len()) as isize));
                format!("{lead}{stripped}")
            } else {
                shifts.push(marker.chars().count() as isize);
                format!("{lead}{marker}{rest}")
            }
        })
        .collect();

    state.seal_undo();
    state.record_lines(start, end - start, UndoTag::Comment, false);
    state.buffer.replace_lines(start, end - start, updated);
    let line = state.cursor.line;
    if (start..end).contains(&line) && state.cursor.col >= indent {
        let shift = shifts[line - start];
        state.cursor.col = state.cursor.col.saturating_add_signed(shift).max(indent);
    }
    trace!(target: "actions.dispatch", start, end, uncomment, "toggle_comment");
    DispatchResult::dirty()
}
