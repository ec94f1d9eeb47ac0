//! Text mutation: insert, split, join, delete, tab / indent.
//!
//! Undo recording conventions:
//! * Single-line edits snapshot the line with a per-kind tag so a run of them
//!   on one line coalesces (typing a word is one undo step).
//! * Splits and joins change the line count and always start a new entry.
//! * With an active selection, typing / Enter / Backspace / Delete first delete
//!   the selection; the follow-up edit is chained to it.

use super::DispatchResult;
use super::clipboard::delete_selection;
use crate::{EditError, EditKind};
use core_state::{EditorState, SharedContext, UndoTag};
use core_text::{column, motion};
use tracing::trace;

pub(super) fn handle_edit(
    state: &mut EditorState,
    ctx: &SharedContext,
    kind: EditKind,
) -> Result<DispatchResult, EditError> {
    let result = match kind {
        EditKind::InsertChar(c) => {
            let chain = replace_selection(state);
            insert_char(state, c, chain)
        }
        EditKind::Enter => {
            let chain = replace_selection(state);
            split_line(state, ctx, chain)
        }
        EditKind::Backspace => {
            if replace_selection(state) {
                return Ok(DispatchResult::dirty());
            }
            backspace(state)
        }
        EditKind::Delete => {
            if replace_selection(state) {
                return Ok(DispatchResult::dirty());
            }
            delete_forward(state)
        }
        EditKind::DeleteWord => {
            state.clear_mark();
            delete_word(state)
        }
        EditKind::Tab => match state.selection() {
            Some(sel) => {
                let (start, end) = sel.line_range();
                indent_lines(state, ctx.settings.tab_size, start, end)
            }
            None => insert_tab(state, ctx.settings.tab_size),
        },
        EditKind::BackTab => match state.selection() {
            Some(sel) => {
                let (start, end) = sel.line_range();
                dedent_lines(state, ctx.settings.tab_size, start, end, UndoTag::Dedent)
            }
            None => {
                let line = state.cursor.line;
                dedent_lines(state, ctx.settings.tab_size, line, line + 1, UndoTag::BackTab)
            }
        },
        // Routed to the clipboard module by the dispatcher.
        EditKind::DeleteLine => DispatchResult::clean(),
    };
    Ok(result)
}

/// Delete a non-empty selection. Returns whether anything was deleted; the
/// mark is gone either way.
fn replace_selection(state: &mut EditorState) -> bool {
    match state.selection() {
        Some(sel) if !sel.is_empty() => delete_selection(state, false).is_some(),
        _ => {
            state.clear_mark();
            false
        }
    }
}

fn insert_char(state: &mut EditorState, c: char, chain: bool) -> DispatchResult {
    let line = state.cursor.line;
    state.record_lines(line, 1, UndoTag::Insert, chain);
    let mut buf = [0u8; 4];
    let text = column::insert_at(state.buffer.line(line), state.cursor.col, c.encode_utf8(&mut buf));
    state.buffer.set_line(line, text);
    state.cursor.col += 1;
    trace!(target: "actions.dispatch", line, col = state.cursor.col, "insert_char");
    DispatchResult::dirty()
}

fn split_line(state: &mut EditorState, ctx: &SharedContext, chain: bool) -> DispatchResult {
    let line = state.cursor.line;
    let original = state.buffer.line(line).to_string();
    let (head, tail) = column::split_at(&original, state.cursor.col);
    let settings = &ctx.settings;
    let (indent, tail) = if settings.autoindent {
        let mut indent = column::leading_spaces(head);
        if settings.opens_block(head.trim_end()) {
            indent += settings.tab_size;
        }
        (indent, tail.trim_start_matches(' '))
    } else {
        (0, tail)
    };
    let mut new_line = " ".repeat(indent);
    new_line.push_str(tail);
    let head = head.to_string();
    state.record_restore(line, vec![original], 2, UndoTag::Break, chain);
    state.buffer.replace_lines(line, 1, vec![head, new_line]);
    state.cursor.line = line + 1;
    state.cursor.col = indent;
    trace!(target: "actions.dispatch", line, indent, "split_line");
    DispatchResult::dirty()
}

fn backspace(state: &mut EditorState) -> DispatchResult {
    let line = state.cursor.line;
    let col = state.cursor.col;
    if col == 0 {
        if line == 0 {
            return DispatchResult::clean();
        }
        join_lines(state, line - 1);
        return DispatchResult::dirty();
    }
    if col > state.buffer.line_len(line) {
        // Overhang: nothing to delete yet.
        state.cursor.col -= 1;
        return DispatchResult::dirty();
    }
    state.record_lines(line, 1, UndoTag::Backspace, false);
    let text = column::remove_range(state.buffer.line(line), col - 1, col);
    state.buffer.set_line(line, text);
    state.cursor.col -= 1;
    DispatchResult::dirty()
}

fn delete_forward(state: &mut EditorState) -> DispatchResult {
    let line = state.cursor.line;
    let col = state.cursor.col;
    if col >= state.buffer.line_len(line) {
        if line + 1 >= state.buffer.line_count() {
            return DispatchResult::clean();
        }
        join_lines(state, line);
        return DispatchResult::dirty();
    }
    state.record_lines(line, 1, UndoTag::Delete, false);
    let text = column::remove_range(state.buffer.line(line), col, col + 1);
    state.buffer.set_line(line, text);
    DispatchResult::dirty()
}

fn delete_word(state: &mut EditorState) -> DispatchResult {
    let line = state.cursor.line;
    let col = state.cursor.col;
    let text = state.buffer.line(line);
    if col >= column::char_len(text) {
        if line + 1 >= state.buffer.line_count() {
            return DispatchResult::clean();
        }
        join_lines(state, line);
        return DispatchResult::dirty();
    }
    let end = motion::next_word_start(text, col).max(col + 1);
    let text = column::remove_range(text, col, end);
    state.record_lines(line, 1, UndoTag::Break, false);
    state.buffer.set_line(line, text);
    DispatchResult::dirty()
}

/// Append line `upper + 1` to line `upper`. The cursor lands on the seam; a
/// straight cursor past the end pads the upper line up to its column.
fn join_lines(state: &mut EditorState, upper: usize) {
    let first = state.buffer.line(upper).to_string();
    let second = state.buffer.line(upper + 1).to_string();
    let seam = if state.cursor.line == upper {
        state.cursor.col.max(column::char_len(&first))
    } else {
        column::char_len(&first)
    };
    let joined = column::insert_at(&first, seam, &second);
    state.record_restore(upper, vec![first, second], 1, UndoTag::Break, false);
    state.buffer.replace_lines(upper, 2, vec![joined]);
    state.cursor.line = upper;
    state.cursor.col = seam;
    trace!(target: "actions.dispatch", line = upper, col = seam, "join_lines");
}

/// Spaces up to the next tab stop, inserted at the cursor (or the line end
/// when the cursor overhangs it).
fn insert_tab(state: &mut EditorState, tab_size: usize) -> DispatchResult {
    let tab_size = tab_size.max(1);
    let line = state.cursor.line;
    let col = state.cursor.col;
    let n = tab_size - col % tab_size;
    let at = col.min(state.buffer.line_len(line));
    state.record_lines(line, 1, UndoTag::Tab, false);
    let text = column::insert_at(state.buffer.line(line), at, &" ".repeat(n));
    state.buffer.set_line(line, text);
    state.cursor.col = col + n;
    DispatchResult::dirty()
}

/// Prefix every non-empty line in `[start, end)` with one tab stop of spaces.
fn indent_lines(state: &mut EditorState, tab_size: usize, start: usize, end: usize) -> DispatchResult {
    let pad = " ".repeat(tab_size.max(1));
    state.seal_undo();
    state.record_lines(start, end - start, UndoTag::Indent, false);
    for idx in start..end {
        let text = state.buffer.line(idx);
        if text.is_empty() {
            continue;
        }
        let indented = format!("{pad}{text}");
        state.buffer.set_line(idx, indented);
        if state.cursor.line == idx {
            state.cursor.col += pad.len();
        }
        if let Some(mark) = state.mark.as_mut()
            && mark.anchor.line == idx
        {
            mark.anchor.col += pad.len();
        }
    }
    trace!(target: "actions.dispatch", start, end, "indent");
    DispatchResult::dirty()
}

/// Remove leading spaces back to the previous tab stop on each line in
/// `[start, end)`.
fn dedent_lines(
    state: &mut EditorState,
    tab_size: usize,
    start: usize,
    end: usize,
    tag: UndoTag,
) -> DispatchResult {
    let tab_size = tab_size.max(1);
    let cuts: Vec<usize> = (start..end)
        .map(|idx| {
            let lead = column::leading_spaces(state.buffer.line(idx));
            if lead == 0 { 0 } else { lead - (lead - 1) / tab_size * tab_size }
        })
        .collect();
    if cuts.iter().all(|n| *n == 0) {
        return DispatchResult::clean();
    }
    state.seal_undo();
    state.record_lines(start, end - start, tag, false);
    for (idx, n) in (start..end).zip(cuts) {
        if n == 0 {
            continue;
        }
        let text = state.buffer.line(idx)[n..].to_string();
        state.buffer.set_line(idx, text);
        if state.cursor.line == idx {
            state.cursor.col = state.cursor.col.saturating_sub(n);
        }
        if let Some(mark) = state.mark.as_mut()
            && mark.anchor.line == idx
        {
            mark.anchor.col = mark.anchor.col.saturating_sub(n);
        }
    }
    trace!(target: "actions.dispatch", start, end, "dedent");
    DispatchResult::dirty()
}
