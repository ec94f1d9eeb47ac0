//! Per-buffer editor state: lines, cursor, mark, undo log, and file metadata.
//!
//! Session-spanning data (clipboard, settings, last search strings) lives in
//! `SharedContext`, which the dispatcher receives by `&mut` alongside the
//! active `EditorState`. Nothing here is global.
//!
//! Edits flow through `record_restore` / `record_remove` *before* the buffer is
//! touched so the undo log captures pre-edit content. `modified` is set eagerly
//! on every recorded edit and recomputed from the content checksum after an
//! undo/redo, so undoing back to the saved text clears the indicator.

use core_config::Settings;
use core_text::{LineBuffer, Position};
use std::path::PathBuf;
use tracing::{debug, trace};

pub mod undo;
pub use undo::{Splice, UndoEntry, UndoLog, UndoTag};

/// How a mark-anchored selection extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Whole lines from the anchor line through the cursor line.
    Linewise,
    /// From the anchor position up to (excluding) the cursor position.
    Characterwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub anchor: Position,
    pub kind: SelectionKind,
}

/// Normalized selection (start <= end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSpan {
    pub start: Position,
    pub end: Position,
    pub kind: SelectionKind,
}

impl SelectionSpan {
    pub fn new(mut a: Position, mut b: Position, kind: SelectionKind) -> Self {
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        Self {
            start: a,
            end: b,
            kind,
        }
    }

    /// Half-open line range `(first, last + 1)` touched by the selection.
    pub fn line_range(&self) -> (usize, usize) {
        (self.start.line, self.end.line + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.kind == SelectionKind::Characterwise && self.start == self.end
    }

    /// Selected column range on `line`: `(from, Some(to))` is half-open,
    /// `(from, None)` extends to the end of the line. `None` when `line` lies
    /// outside the selection.
    pub fn columns_on(&self, line: usize) -> Option<(usize, Option<usize>)> {
        if line < self.start.line || line > self.end.line {
            return None;
        }
        match self.kind {
            SelectionKind::Linewise => Some((0, None)),
            SelectionKind::Characterwise => {
                let from = if line == self.start.line { self.start.col } else { 0 };
                let to = (line == self.end.line).then_some(self.end.col);
                Some((from, to))
            }
        }
    }
}

/// Clipboard shared across all sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    pub lines: Vec<String>,
    /// Whole-line content pasted above the cursor line.
    pub linewise: bool,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
    pub fn clear(&mut self) {
        self.lines = Vec::new();
        self.linewise = false;
    }
    pub fn set(&mut self, lines: Vec<String>, linewise: bool) {
        self.lines = lines;
        self.linewise = linewise;
    }
}

/// State shared by every open session.
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    pub clipboard: Clipboard,
    pub settings: Settings,
    pub find_pattern: String,
    pub replace_with: String,
}

impl SharedContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }
}

/// Which question an open prompt is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Find,
    ReplacePattern,
    ReplaceWith,
    Goto,
    SaveAs,
    Open,
    Settings,
    /// Save-as target exists; answer y/n.
    ConfirmOverwrite,
    /// Quit with unsaved changes; answer y/n/s.
    ConfirmQuit,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Find => "Find: ",
            PromptKind::ReplacePattern => "Replace: ",
            PromptKind::ReplaceWith => "With: ",
            PromptKind::Goto => "Goto line: ",
            PromptKind::SaveAs => "Save as: ",
            PromptKind::Open => "Open file: ",
            PromptKind::Settings => "Case, Autoindent, Tab, Comment, Write tabs, Regex, Straight: ",
            PromptKind::ConfirmOverwrite => "File exists, overwrite? (y/n) ",
            PromptKind::ConfirmQuit => "Content changed, quit without saving? (y/n/s) ",
        }
    }

    /// Single-key answers rather than an edited line.
    pub fn is_confirmation(self) -> bool {
        matches!(self, PromptKind::ConfirmOverwrite | PromptKind::ConfirmQuit)
    }
}

/// Input mode of the dispatcher state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Prompt(PromptKind),
    /// Interactive replace: awaiting y/n/a/q for the highlighted match.
    ReplaceConfirm,
}

/// Single-line input edited while a prompt is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptLine {
    text: String,
    /// Char index of the input cursor.
    cursor: usize,
}

impl PromptLine {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn insert(&mut self, ch: char) {
        self.text = core_text::column::insert_at(&self.text, self.cursor, &ch.to_string());
        self.cursor += 1;
    }
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.text = core_text::column::remove_range(&self.text, self.cursor - 1, self.cursor);
            self.cursor -= 1;
        }
    }
    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.text = core_text::column::remove_range(&self.text, self.cursor, self.cursor + 1);
        }
    }
    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }
    pub fn home(&mut self) {
        self.cursor = 0;
    }
    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

/// Progress of an interactive replace run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceRun {
    /// Position of the match awaiting an answer.
    pub at: Position,
    /// Length in chars of that match.
    pub len: usize,
    pub count: usize,
    /// Replace all remaining matches without asking.
    pub all: bool,
}

/// One editing session: a buffer plus everything tied to it.
#[derive(Debug)]
pub struct EditorState {
    pub buffer: LineBuffer,
    pub cursor: Position,
    pub mark: Option<Mark>,
    pub file_name: Option<PathBuf>,
    pub modified: bool,
    /// Pack leading spaces back into tabs on save (set when the file had tabs).
    pub write_tabs: bool,
    pub mode: Mode,
    pub prompt: PromptLine,
    pub replace: Option<ReplaceRun>,
    /// Last event appended to the clipboard by a line delete/cut.
    pub clipboard_append: bool,
    message: Option<String>,
    saved_checksum: u64,
    undo: UndoLog,
}

impl EditorState {
    pub fn new(buffer: LineBuffer, undo_limit: usize) -> Self {
        let saved_checksum = buffer.checksum();
        Self {
            buffer,
            cursor: Position::origin(),
            mark: None,
            file_name: None,
            modified: false,
            write_tabs: false,
            mode: Mode::Normal,
            prompt: PromptLine::default(),
            replace: None,
            clipboard_append: false,
            message: None,
            saved_checksum,
            undo: UndoLog::new(undo_limit),
        }
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file_name = Some(path);
        self
    }

    /// Display name for the status line.
    pub fn display_name(&self) -> String {
        self.file_name
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    pub fn set_message<S: Into<String>>(&mut self, msg: S) {
        let msg = msg.into();
        debug!(target: "state", message = %msg, "status_message");
        self.message = Some(msg);
    }
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Current normalized selection, if a mark is set.
    pub fn selection(&self) -> Option<SelectionSpan> {
        self.mark
            .map(|m| SelectionSpan::new(m.anchor, self.cursor, m.kind))
    }

    pub fn set_mark(&mut self, kind: SelectionKind) {
        self.mark = Some(Mark {
            anchor: self.cursor,
            kind,
        });
    }

    pub fn clear_mark(&mut self) {
        self.mark = None;
    }

    /// Content equals the last saved (or loaded) content.
    pub fn mark_saved(&mut self) {
        self.saved_checksum = self.buffer.checksum();
        self.modified = false;
    }

    /// Recompute `modified` from the content checksum.
    pub fn refresh_modified(&mut self) {
        self.modified = self.buffer.checksum() != self.saved_checksum;
    }

    /// Record that lines `[line, line + span)` are about to be replaced; undo
    /// restores `saved`.
    pub fn record_restore(&mut self, line: usize, saved: Vec<String>, span: usize, tag: UndoTag, chain: bool) {
        let col = self.cursor.col;
        self.undo.record(
            line,
            Splice::Restore { span, lines: saved },
            tag,
            col,
            chain,
        );
        self.modified = true;
    }

    /// Record that `count` lines are about to be inserted at `line`; undo
    /// removes them.
    pub fn record_remove(&mut self, line: usize, count: usize, tag: UndoTag, chain: bool) {
        let col = self.cursor.col;
        self.undo.record(line, Splice::Remove { count }, tag, col, chain);
        self.modified = true;
    }

    /// Shorthand: snapshot `count` lines at `line` before modifying them in place.
    pub fn record_lines(&mut self, line: usize, count: usize, tag: UndoTag, chain: bool) {
        // A coalesced record keeps the older snapshot; skip the copy.
        if !self.would_coalesce(line, tag) {
            let saved = self.buffer.get_lines(line, count);
            self.record_restore(line, saved, count, tag, chain);
        } else {
            self.modified = true;
        }
    }

    fn would_coalesce(&self, line: usize, tag: UndoTag) -> bool {
        tag != UndoTag::Break
            && !self.undo.is_sealed()
            && self
                .undo
                .last()
                .is_some_and(|e| e.tag == tag && e.line == line)
    }

    /// Force the next record to start a new entry.
    pub fn seal_undo(&mut self) {
        self.undo.seal();
    }

    pub fn undo(&mut self) -> bool {
        let applied = self.undo.undo(&mut self.buffer, &mut self.cursor);
        if applied {
            self.after_history_step();
        }
        applied
    }

    pub fn redo(&mut self) -> bool {
        let applied = self.undo.redo(&mut self.buffer, &mut self.cursor);
        if applied {
            self.after_history_step();
        }
        applied
    }

    fn after_history_step(&mut self) {
        self.clear_mark();
        self.refresh_modified();
        trace!(target: "state.undo", modified = self.modified, "history_step_applied");
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// Drop undo/redo history (memory reclaim).
    pub fn discard_history(&mut self) {
        self.undo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(lines: &[&str]) -> EditorState {
        EditorState::new(
            LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect()),
            100,
        )
    }

    #[test]
    fn selection_normalizes_and_reports_line_range() {
        let mut st = state(&["0", "1", "2", "3", "4", "5", "6"]);
        st.cursor = Position::new(5, 0);
        st.set_mark(SelectionKind::Linewise);
        st.cursor = Position::new(2, 0);
        let sel = st.selection().unwrap();
        assert_eq!(sel.start.line, 2);
        assert_eq!(sel.line_range(), (2, 6));
    }

    #[test]
    fn characterwise_columns_per_line() {
        let sel = SelectionSpan::new(
            Position::new(3, 1),
            Position::new(1, 4),
            SelectionKind::Characterwise,
        );
        assert_eq!(sel.columns_on(1), Some((4, None)));
        assert_eq!(sel.columns_on(2), Some((0, None)));
        assert_eq!(sel.columns_on(3), Some((0, Some(1))));
        assert_eq!(sel.columns_on(4), None);
    }

    #[test]
    fn typing_run_on_one_line_is_one_entry() {
        let mut st = state(&[""]);
        for ch in "hello".chars() {
            st.record_lines(0, 1, UndoTag::Insert, false);
            let line = format!("{}{ch}", st.buffer.line(0));
            st.buffer.set_line(0, line);
            st.cursor.col += 1;
        }
        assert_eq!(st.undo_depth(), 1);
        assert!(st.modified);
        assert!(st.undo());
        assert_eq!(st.buffer.line(0), "");
        assert!(!st.modified, "back at saved content");
    }

    #[test]
    fn undo_clears_mark() {
        let mut st = state(&["a"]);
        st.record_lines(0, 1, UndoTag::Break, false);
        st.buffer.set_line(0, "b".into());
        st.set_mark(SelectionKind::Linewise);
        st.undo();
        assert!(st.mark.is_none());
    }

    #[test]
    fn prompt_line_editing() {
        let mut p = PromptLine::with_text("ac");
        p.left();
        p.insert('b');
        assert_eq!(p.text(), "abc");
        p.home();
        p.delete();
        assert_eq!(p.text(), "bc");
        p.end();
        p.backspace();
        assert_eq!(p.text(), "b");
        assert_eq!(p.cursor(), 1);
    }
}
