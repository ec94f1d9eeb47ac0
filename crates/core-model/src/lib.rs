//! Session and viewport model.
//!
//! An `EditorSession` pairs one `EditorState` with the `Viewport` that shows
//! it. The `Workspace` owns every open session (the multi-buffer shell) and
//! knows which one receives input.
//!
//! Viewport invariants, restored by `Viewport::recompute` after every event and
//! before rendering:
//! * `top <= cursor.line < top + height`
//! * `margin <= col < margin + width` where `col` is the (policy adjusted)
//!   cursor column
//! * `row == cursor.line - top`
//!
//! Vertical scrolling preserves the cursor's previous screen row when the cursor
//! leaves the window (smooth scroll, no re-centering). Horizontal scrolling
//! looks ahead by a quarter of the width so typing at the right edge does not
//! shift the view on every key.

use core_config::CursorPolicy;
use core_state::EditorState;
use std::path::PathBuf;
use tracing::debug;

mod layout;
pub use layout::ScreenLayout;

/// Visible window onto a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First buffer line shown.
    pub top: usize,
    /// Screen row (0-based within the text area) holding the cursor line.
    pub row: usize,
    /// Horizontal scroll offset in chars.
    pub margin: usize,
    /// Text rows (status line excluded).
    pub height: usize,
    /// Text columns.
    pub width: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            top: 0,
            row: 0,
            margin: 0,
            height: height.max(1),
            width: width.max(1),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.row = self.row.min(self.height - 1);
    }

    /// Clamp the cursor into the buffer and bring it into view.
    pub fn recompute(&mut self, state: &mut EditorState, policy: CursorPolicy) {
        let total = state.buffer.line_count();
        if state.cursor.line >= total {
            state.cursor.line = total - 1;
        }
        if !policy.allows_overhang() {
            let len = state.buffer.line_len(state.cursor.line);
            state.cursor.col = state.cursor.col.min(len);
        }
        let col = state.cursor.col;

        let quarter = (self.width / 4).max(1);
        if col >= self.margin + self.width {
            self.margin = col + quarter - self.width;
        } else if col < self.margin {
            self.margin = col.saturating_sub(self.width / 4);
        }

        let line = state.cursor.line;
        if line < self.top || line >= self.top + self.height {
            let keep_row = self.row.min(self.height - 1);
            self.top = line.saturating_sub(keep_row);
        }
        self.row = line - self.top;
    }

    /// Scroll the window by `delta` lines, dragging the cursor along. The cursor
    /// keeps its screen row where the buffer allows.
    pub fn scroll_by(&mut self, state: &mut EditorState, delta: isize) {
        let total = state.buffer.line_count();
        let max_top = total.saturating_sub(1);
        let new_top = self.top.saturating_add_signed(delta).min(max_top);
        let moved = new_top as isize - self.top as isize;
        self.top = new_top;
        state.cursor.line = state
            .cursor
            .line
            .saturating_add_signed(moved)
            .min(total - 1);
        debug!(target: "render.scroll", delta, top = self.top, "viewport_scrolled");
    }

    /// Move the cursor a page up (`-1`) or down (`1`), keeping its screen row.
    /// The window stops with the last line on the bottom row.
    pub fn page(&mut self, state: &mut EditorState, direction: isize) {
        let step = self.height as isize * direction;
        let total = state.buffer.line_count();
        state.cursor.line = state
            .cursor
            .line
            .saturating_add_signed(step)
            .min(total - 1);
        self.top = self
            .top
            .saturating_add_signed(step)
            .min(total.saturating_sub(self.height));
    }

    /// Buffer position under a screen cell, if that row shows a line.
    pub fn position_at(&self, state: &EditorState, column: u16, row: u16) -> Option<core_text::Position> {
        let row = row as usize;
        if row >= self.height {
            return None;
        }
        let line = self.top + row;
        (line < state.buffer.line_count())
            .then(|| core_text::Position::new(line, self.margin + column as usize))
    }
}

/// One buffer shown in one viewport.
#[derive(Debug)]
pub struct EditorSession {
    pub state: EditorState,
    pub view: Viewport,
}

impl EditorSession {
    pub fn new(state: EditorState, layout: ScreenLayout) -> Self {
        Self {
            state,
            view: Viewport::new(layout.text_width(), layout.text_height()),
        }
    }

    /// Restore viewport invariants for the current cursor.
    pub fn settle(&mut self, policy: CursorPolicy) {
        self.view.recompute(&mut self.state, policy);
    }
}

/// What the process reports once the last session closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The final session was never named; its content goes to stdout.
    Content(String),
    /// Name of the final session's file.
    FileName(PathBuf),
}

/// Every open session plus the focused one.
#[derive(Debug, Default)]
pub struct Workspace {
    sessions: Vec<EditorSession>,
    active: usize,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Add a session and focus it.
    pub fn open(&mut self, session: EditorSession) {
        self.sessions.push(session);
        self.active = self.sessions.len() - 1;
        debug!(target: "runtime", sessions = self.sessions.len(), "session_opened");
    }

    /// Focused session. Panics when the workspace is empty.
    pub fn active(&self) -> &EditorSession {
        &self.sessions[self.active]
    }

    pub fn active_mut(&mut self) -> &mut EditorSession {
        &mut self.sessions[self.active]
    }

    pub fn sessions(&self) -> &[EditorSession] {
        &self.sessions
    }

    /// Focus the next session, wrapping around.
    pub fn next(&mut self) {
        if !self.sessions.is_empty() {
            self.active = (self.active + 1) % self.sessions.len();
        }
    }

    /// Focus session `idx`; out-of-range indices are ignored.
    pub fn focus(&mut self, idx: usize) {
        if idx < self.sessions.len() {
            self.active = idx;
        }
    }

    /// Close the focused session. Returns the exit outcome when it was the last.
    pub fn close_active(&mut self) -> Option<ExitOutcome> {
        if self.sessions.is_empty() {
            return None;
        }
        let closed = self.sessions.remove(self.active);
        debug!(target: "runtime", remaining = self.sessions.len(), "session_closed");
        if self.sessions.is_empty() {
            return Some(match closed.state.file_name {
                Some(path) => ExitOutcome::FileName(path),
                None => ExitOutcome::Content(closed.state.buffer.to_text()),
            });
        }
        if self.active >= self.sessions.len() {
            self.active = 0;
        }
        None
    }

    /// Apply a terminal size change to every session.
    pub fn resize(&mut self, layout: ScreenLayout) {
        for s in &mut self.sessions {
            s.view.resize(layout.text_width(), layout.text_height());
        }
    }
}
