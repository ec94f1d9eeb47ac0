//! Line-range undo / redo log.
//!
//! Each entry describes how to *reverse* one edit by splicing lines:
//! * `Splice::Restore { span, lines }`: replace `span` current lines at `line`
//!   with the saved `lines` (undo of a modification or deletion; `span == 0`
//!   re-inserts).
//! * `Splice::Remove { count }`: delete `count` lines at `line` (undo of an
//!   insertion).
//!
//! Coalescing: a `record` call whose tag and line equal the newest entry's is a
//! no-op, because the pending entry already holds the pre-edit content of that
//! line. `UndoTag::Break` never coalesces, and neither does the first record
//! after an undo/redo (the log is *sealed* until the next push).
//!
//! Chaining: an entry with `chain == true` is undone together with the entry
//! below it. The bottom entry of a logical step carries `chain == false`, so
//! `undo` pops until it has consumed a non-chained entry.
//!
//! Both stacks are bounded; the oldest entry is evicted when full.

use core_text::{LineBuffer, Position};
use std::collections::VecDeque;
use tracing::trace;

/// Coalescing key recorded with each entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UndoTag {
    /// Always starts a new entry.
    Break,
    Insert,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Indent,
    Dedent,
    Comment,
}

impl UndoTag {
    /// Range operations: undoing them leaves the cursor line where it is.
    pub fn is_reflow(self) -> bool {
        matches!(self, UndoTag::Indent | UndoTag::Dedent | UndoTag::Comment)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Splice {
    Restore { span: usize, lines: Vec<String> },
    Remove { count: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoEntry {
    pub line: usize,
    pub splice: Splice,
    pub tag: UndoTag,
    /// Cursor column to restore.
    pub col: usize,
    pub chain: bool,
}

#[derive(Debug)]
pub struct UndoLog {
    undo: VecDeque<UndoEntry>,
    redo: VecDeque<UndoEntry>,
    limit: usize,
    sealed: bool,
}

impl UndoLog {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
            sealed: false,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
    pub fn limit(&self) -> usize {
        self.limit
    }
    pub fn last(&self) -> Option<&UndoEntry> {
        self.undo.back()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Start a fresh entry on the next `record` regardless of tag/line.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Drop all history (memory reclaim).
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.sealed = false;
    }

    /// Record the reverse of an edit about to happen. Returns false when the
    /// call coalesced into the pending entry.
    pub fn record(&mut self, line: usize, splice: Splice, tag: UndoTag, col: usize, chain: bool) -> bool {
        if !self.sealed
            && tag != UndoTag::Break
            && let Some(last) = self.undo.back()
            && last.tag == tag
            && last.line == line
        {
            trace!(target: "state.undo", line, ?tag, "record_coalesced");
            return false;
        }
        if self.undo.len() >= self.limit {
            self.undo.pop_front();
            trace!(target: "state.undo", "undo_log_trimmed");
        }
        self.undo.push_back(UndoEntry {
            line,
            splice,
            tag,
            col,
            chain,
        });
        self.sealed = false;
        if !self.redo.is_empty() {
            self.redo.clear();
            trace!(target: "state.undo", "redo_cleared_on_new_edit");
        }
        trace!(target: "state.undo", line, ?tag, chain, undo_depth = self.undo.len(), "record_push");
        true
    }

    /// Undo one logical step. Returns false when there was nothing to undo.
    pub fn undo(&mut self, buf: &mut LineBuffer, cursor: &mut Position) -> bool {
        let applied = transfer(&mut self.undo, &mut self.redo, self.limit, buf, cursor);
        if applied {
            self.sealed = true;
            trace!(target: "state.undo", undo_depth = self.undo.len(), redo_depth = self.redo.len(), "undo");
        }
        applied
    }

    /// Redo one logical step. Returns false when there was nothing to redo.
    pub fn redo(&mut self, buf: &mut LineBuffer, cursor: &mut Position) -> bool {
        let applied = transfer(&mut self.redo, &mut self.undo, self.limit, buf, cursor);
        if applied {
            self.sealed = true;
            trace!(target: "state.undo", undo_depth = self.undo.len(), redo_depth = self.redo.len(), "redo");
        }
        applied
    }
}

/// Pop entries from `from` until a non-chained one is consumed, applying each
/// and pushing its inverse onto `to`.
fn transfer(
    from: &mut VecDeque<UndoEntry>,
    to: &mut VecDeque<UndoEntry>,
    limit: usize,
    buf: &mut LineBuffer,
    cursor: &mut Position,
) -> bool {
    let mut pushed = 0usize;
    let mut chain = true;
    while chain {
        let Some(entry) = from.pop_back() else {
            break;
        };
        chain = entry.chain;
        let line = entry.line.min(buf.line_count());
        let before_len = buf.line_count();
        let inverse = match entry.splice {
            Splice::Restore { span, lines } => {
                let current = if line < before_len {
                    buf.get_lines(line, span)
                } else {
                    Vec::new()
                };
                let removed = current.len();
                buf.replace_lines(line, span, lines);
                let occupied = buf.line_count() + removed - before_len;
                if current.is_empty() {
                    Splice::Remove { count: occupied }
                } else {
                    Splice::Restore {
                        span: occupied,
                        lines: current,
                    }
                }
            }
            Splice::Remove { count } => {
                let removed = if line < before_len {
                    buf.delete_lines(line, count)
                } else {
                    Vec::new()
                };
                let occupied = buf.line_count() + removed.len() - before_len;
                Splice::Restore {
                    span: occupied,
                    lines: removed,
                }
            }
        };
        let forward_col = cursor.col;
        if !entry.tag.is_reflow() {
            cursor.line = line.min(buf.line_count() - 1);
        }
        cursor.col = entry.col;
        if to.len() >= limit {
            to.pop_front();
        }
        to.push_back(UndoEntry {
            line: entry.line,
            splice: inverse,
            tag: entry.tag,
            col: forward_col,
            // The first entry moved becomes the bottom of the mirrored chain.
            chain: pushed > 0,
        });
        pushed += 1;
    }
    if cursor.line >= buf.line_count() {
        cursor.line = buf.line_count() - 1;
    }
    pushed > 0
}
