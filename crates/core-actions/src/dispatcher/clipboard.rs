//! Cut / copy / paste and line deletion through the shared clipboard.
//!
//! Linewise content (mark-toggle selections, deleted lines) is pasted above the
//! cursor line. Characterwise content is spliced into the cursor line: its
//! first piece joins the text before the cursor, its last piece the text after.

use super::DispatchResult;
use crate::EditError;
use core_state::{EditorState, SelectionKind, SelectionSpan, SharedContext, UndoTag};
use core_text::{LineBuffer, Position, column};
use tracing::trace;

pub(super) fn toggle_mark(state: &mut EditorState) -> DispatchResult {
    if state.mark.is_some() {
        state.clear_mark();
    } else {
        state.set_mark(SelectionKind::Linewise);
    }
    DispatchResult::dirty()
}

/// Text covered by `sel`, one entry per line.
fn selected_text(buf: &LineBuffer, sel: &SelectionSpan) -> Vec<String> {
    let (start, end) = sel.line_range();
    match sel.kind {
        SelectionKind::Linewise => buf.get_lines(start, end - start),
        SelectionKind::Characterwise => (start..end)
            .map(|idx| {
                let line = buf.line(idx);
                match sel.columns_on(idx) {
                    Some((from, Some(to))) => column::slice(line, from, to).to_string(),
                    Some((from, None)) => column::slice(line, from, usize::MAX).to_string(),
                    None => String::new(),
                }
            })
            .collect(),
    }
}

/// Remove the selected text and drop the mark. Returns the removed content and
/// whether it was linewise, or `None` for an empty selection.
pub(super) fn delete_selection(state: &mut EditorState, chain: bool) -> Option<(Vec<String>, bool)> {
    let sel = state.selection()?;
    state.clear_mark();
    if sel.is_empty() {
        return None;
    }
    let removed = selected_text(&state.buffer, &sel);
    let (start, end) = sel.line_range();
    match sel.kind {
        SelectionKind::Linewise => {
            // Removing every line leaves one empty line behind; undo must replace it.
            let span = usize::from(start == 0 && end == state.buffer.line_count());
            state.cursor = Position::new(start, 0);
            state.record_restore(start, removed.clone(), span, UndoTag::Break, chain);
            state.buffer.delete_lines(start, end - start);
            state.cursor.line = start.min(state.buffer.line_count() - 1);
        }
        SelectionKind::Characterwise => {
            let original = state.buffer.get_lines(start, end - start);
            let head = column::slice(&original[0], 0, sel.start.col);
            let tail = column::slice(&original[original.len() - 1], sel.end.col, usize::MAX);
            let joined = format!("{head}{tail}");
            let col = column::char_len(head);
            state.cursor = Position::new(start, col);
            state.record_restore(start, original, 1, UndoTag::Break, chain);
            state.buffer.replace_lines(start, end - start, vec![joined]);
        }
    }
    trace!(target: "actions.dispatch", start, end, kind = ?sel.kind, "selection_deleted");
    Some((removed, sel.kind == SelectionKind::Linewise))
}

/// Delete the cursor line into the clipboard. Consecutive deletes accumulate.
pub(super) fn delete_line(
    state: &mut EditorState,
    ctx: &mut SharedContext,
    appending: bool,
) -> Result<DispatchResult, EditError> {
    state.clear_mark();
    let line = state.cursor.line;
    let text = state.buffer.line(line).to_string();
    let only = state.buffer.line_count() == 1;
    state.cursor.col = 0;
    state.record_restore(line, vec![text.clone()], usize::from(only), UndoTag::Break, false);
    if only {
        state.buffer.set_line(line, String::new());
    } else {
        state.buffer.delete_lines(line, 1);
    }
    state.cursor.line = line.min(state.buffer.line_count() - 1);

    let clip = &mut ctx.clipboard;
    if appending && clip.linewise {
        clip.lines.try_reserve(1)?;
        clip.lines.push(text);
    } else {
        clip.set(vec![text], true);
    }
    state.clipboard_append = true;
    trace!(target: "actions.dispatch", line, clipboard_lines = clip.lines.len(), "delete_line");
    Ok(DispatchResult::dirty())
}

pub(super) fn cut(
    state: &mut EditorState,
    ctx: &mut SharedContext,
    appending: bool,
) -> Result<DispatchResult, EditError> {
    if state.mark.is_none() {
        return delete_line(state, ctx, appending);
    }
    if let Some((lines, linewise)) = delete_selection(state, false) {
        let n = lines.len();
        ctx.clipboard.set(lines, linewise);
        state.set_message(format!("Cut {n} line(s)"));
    }
    Ok(DispatchResult::dirty())
}

pub(super) fn copy(state: &mut EditorState, ctx: &mut SharedContext) -> Result<DispatchResult, EditError> {
    let (lines, linewise) = match state.selection() {
        Some(sel) if !sel.is_empty() => (
            selected_text(&state.buffer, &sel),
            sel.kind == SelectionKind::Linewise,
        ),
        Some(_) => return Ok(DispatchResult::clean()),
        None => (vec![state.buffer.line(state.cursor.line).to_string()], true),
    };
    let n = lines.len();
    ctx.clipboard.set(lines, linewise);
    state.clear_mark();
    state.set_message(format!("Copied {n} line(s)"));
    Ok(DispatchResult::dirty())
}

pub(super) fn paste(state: &mut EditorState, ctx: &SharedContext) -> Result<DispatchResult, EditError> {
    let clip = &ctx.clipboard;
    if clip.is_empty() {
        state.set_message("Clipboard empty");
        return Ok(DispatchResult::dirty());
    }
    let mut lines = Vec::new();
    lines.try_reserve(clip.lines.len())?;
    lines.extend(clip.lines.iter().cloned());
    state.buffer.try_reserve_lines(lines.len())?;

    let chain = match state.selection() {
        Some(sel) if !sel.is_empty() => delete_selection(state, false).is_some(),
        _ => {
            state.clear_mark();
            false
        }
    };
    let n = lines.len();
    let at = state.cursor.line;
    if clip.linewise {
        state.record_remove(at, n, UndoTag::Break, chain);
        state.buffer.insert_lines(at, lines);
        state.cursor = Position::new(at + n, 0);
    } else {
        let current = state.buffer.line(at).to_string();
        let padded = column::insert_at(&current, state.cursor.col, "");
        let (head, tail) = column::split_at(&padded, state.cursor.col);
        let head_len = column::char_len(head);
        let last_len = column::char_len(&lines[n - 1]);
        let mut spliced = lines;
        spliced[0].insert_str(0, head);
        spliced[n - 1].push_str(tail);
        state.record_restore(at, vec![current], n, UndoTag::Break, chain);
        state.buffer.replace_lines(at, 1, spliced);
        let col = if n == 1 { head_len + last_len } else { last_len };
        state.cursor = Position::new(at + n - 1, col);
    }
    trace!(target: "actions.dispatch", line = at, lines = n, linewise = clip.linewise, "paste");
    Ok(DispatchResult::dirty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::Settings;
    use pretty_assertions::assert_eq;

    fn state(lines: &[&str]) -> EditorState {
        EditorState::new(
            LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect()),
            100,
        )
    }

    fn lines(st: &EditorState) -> Vec<&str> {
        st.buffer.lines().iter().map(String::as_str).collect()
    }

    #[test]
    fn characterwise_cut_and_paste_splices() {
        let mut st = state(&["one two", "three four"]);
        let mut ctx = SharedContext::new(Settings::default());
        st.cursor = Position::new(0, 4);
        st.set_mark(SelectionKind::Characterwise);
        st.cursor = Position::new(1, 6);
        cut(&mut st, &mut ctx, false).unwrap();
        assert_eq!(lines(&st), vec!["one four"]);
        assert_eq!(ctx.clipboard.lines, vec!["two".to_string(), "three ".to_string()]);
        assert!(!ctx.clipboard.linewise);
        assert_eq!(st.cursor, Position::new(0, 4));
        paste(&mut st, &ctx).unwrap();
        assert_eq!(lines(&st), vec!["one two", "three four"]);
        assert_eq!(st.cursor, Position::new(1, 6));
    }

    #[test]
    fn single_piece_paste_lands_after_text() {
        let mut st = state(&["ac"]);
        let mut ctx = SharedContext::new(Settings::default());
        ctx.clipboard.set(vec!["b".into()], false);
        st.cursor.col = 1;
        paste(&mut st, &ctx).unwrap();
        assert_eq!(lines(&st), vec!["abc"]);
        assert_eq!(st.cursor.col, 2);
        assert!(st.undo());
        assert_eq!(lines(&st), vec!["ac"]);
    }

    #[test]
    fn consecutive_delete_lines_accumulate() {
        let mut st = state(&["a", "b", "c"]);
        let mut ctx = SharedContext::new(Settings::default());
        delete_line(&mut st, &mut ctx, false).unwrap();
        let appending = std::mem::take(&mut st.clipboard_append);
        delete_line(&mut st, &mut ctx, appending).unwrap();
        assert_eq!(ctx.clipboard.lines, vec!["a".to_string(), "b".to_string()]);
        delete_line(&mut st, &mut ctx, false).unwrap();
        assert_eq!(ctx.clipboard.lines, vec!["c".to_string()]);
        assert_eq!(lines(&st), vec![""]);
    }

    #[test]
    fn deleting_only_line_undoes_to_original() {
        let mut st = state(&["solo"]);
        let mut ctx = SharedContext::new(Settings::default());
        delete_line(&mut st, &mut ctx, false).unwrap();
        assert_eq!(lines(&st), vec![""]);
        assert!(st.undo());
        assert_eq!(lines(&st), vec!["solo"]);
    }

    #[test]
    fn copy_without_mark_takes_cursor_line() {
        let mut st = state(&["x", "y"]);
        let mut ctx = SharedContext::new(Settings::default());
        st.cursor.line = 1;
        copy(&mut st, &mut ctx).unwrap();
        assert_eq!(ctx.clipboard.lines, vec!["y".to_string()]);
        assert!(ctx.clipboard.linewise);
        assert!(!st.modified);
    }

    #[test]
    fn paste_over_selection_is_one_undo_step() {
        let mut st = state(&["a", "b", "c"]);
        let mut ctx = SharedContext::new(Settings::default());
        ctx.clipboard.set(vec!["X".into()], true);
        st.cursor.line = 1;
        st.set_mark(SelectionKind::Linewise);
        paste(&mut st, &ctx).unwrap();
        assert_eq!(lines(&st), vec!["a", "X", "c"]);
        assert!(st.undo());
        assert_eq!(lines(&st), vec!["a", "b", "c"]);
    }
}
