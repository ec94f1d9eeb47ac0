//! Multi-buffer shell: owns every session and the shared context, routes
//! events to the focused session and handles what crosses sessions.
//!
//! Errors never escape `handle_event`: an `EditError` becomes a status message
//! on the focused session. Running out of memory also drops that session's
//! undo history and the clipboard, the two largest reclaimable allocations.

use crate::{Action, DispatchResult, EditError, dispatch, io_ops, translate_event};
use core_events::Event;
use core_model::{EditorSession, ExitOutcome, ScreenLayout, Workspace};
use core_state::{EditorState, Mode, SharedContext};
use core_text::LineBuffer;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// What the event loop does after one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue {
        /// Cached screen state is stale (resize, redraw, session switch).
        repaint_all: bool,
    },
    /// Redraw requested: re-query the screen size, then repaint everything.
    Redraw,
    /// The last session closed.
    Exit(ExitOutcome),
}

#[derive(Debug)]
pub struct Shell {
    pub workspace: Workspace,
    pub ctx: SharedContext,
    layout: ScreenLayout,
}

impl Shell {
    pub fn new(ctx: SharedContext, layout: ScreenLayout) -> Self {
        Self {
            workspace: Workspace::new(),
            ctx,
            layout,
        }
    }

    pub fn layout(&self) -> ScreenLayout {
        self.layout
    }

    /// Focused session. Panics when no session is open.
    pub fn active(&self) -> &EditorSession {
        self.workspace.active()
    }

    pub fn active_mut(&mut self) -> &mut EditorSession {
        self.workspace.active_mut()
    }

    /// Open `path` in a new focused session. Failures leave an empty buffer
    /// carrying a message rather than aborting.
    pub fn open_path(&mut self, path: &Path) {
        let limit = self.ctx.settings.undo_limit;
        let state = if path.is_dir() {
            match io_ops::list_dir(path) {
                Ok(names) => {
                    let mut st = EditorState::new(LineBuffer::from_lines(names), limit);
                    st.set_message(format!("Directory {}", path.display()));
                    st
                }
                Err(e) => failed_open(limit, e),
            }
        } else {
            match io_ops::read_lines(path) {
                Ok(loaded) => {
                    let n = loaded.lines.len();
                    let mut st = EditorState::new(LineBuffer::from_lines(loaded.lines), limit)
                        .with_file(path.to_path_buf());
                    st.write_tabs = loaded.had_tabs;
                    st.set_message(format!("{n} lines"));
                    st
                }
                Err(EditError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                    let mut st = EditorState::new(LineBuffer::new(), limit).with_file(path.to_path_buf());
                    st.set_message("New file");
                    st
                }
                Err(e) => failed_open(limit, e),
            }
        };
        info!(target: "io", path = %path.display(), "session_for_path");
        self.open_state(state);
    }

    /// Open an unnamed session holding `text` (piped standard input).
    pub fn open_text(&mut self, text: &str) {
        let limit = self.ctx.settings.undo_limit;
        let state = match io_ops::lines_from_text(text) {
            Ok(loaded) => {
                let mut st = EditorState::new(LineBuffer::from_lines(loaded.lines), limit);
                st.write_tabs = loaded.had_tabs;
                st
            }
            Err(e) => failed_open(limit, e),
        };
        self.open_state(state);
    }

    pub fn open_empty(&mut self) {
        let state = EditorState::new(LineBuffer::new(), self.ctx.settings.undo_limit);
        self.open_state(state);
    }

    fn open_state(&mut self, state: EditorState) {
        let mut session = EditorSession::new(state, self.layout);
        session.settle(self.ctx.settings.cursor_policy);
        self.workspace.open(session);
    }

    pub fn handle_event(&mut self, event: &Event) -> Step {
        if let Event::Resize(cols, rows) = *event {
            self.layout = ScreenLayout::new(cols, rows);
            self.workspace.resize(self.layout);
            debug!(target: "runtime", cols, rows, "resized");
            return self.settled(true);
        }
        if self.workspace.is_empty() {
            return Step::Continue { repaint_all: false };
        }
        let mode = self.workspace.active().state.mode;
        match translate_event(mode, event) {
            Some(action) => self.apply(action),
            None => Step::Continue { repaint_all: false },
        }
    }

    /// Dispatch `action` to the focused session and carry out any cross-session
    /// request in the result.
    pub fn apply(&mut self, action: Action) -> Step {
        if self.workspace.is_empty() {
            return Step::Continue { repaint_all: false };
        }
        let result = match dispatch(self.workspace.active_mut(), &mut self.ctx, action) {
            Ok(r) => r,
            Err(e) => {
                self.report(e);
                DispatchResult::dirty()
            }
        };
        let mut repaint_all = result.buffer_replaced;
        if result.quit {
            if let Some(outcome) = self.workspace.close_active() {
                return Step::Exit(outcome);
            }
            repaint_all = true;
        }
        if result.next_buffer {
            self.workspace.next();
            repaint_all = true;
        }
        if let Some(path) = result.open {
            self.open_path(&path);
            repaint_all = true;
        }
        if result.redraw {
            self.settle_active();
            return Step::Redraw;
        }
        self.settled(repaint_all)
    }

    fn settled(&mut self, repaint_all: bool) -> Step {
        self.settle_active();
        Step::Continue { repaint_all }
    }

    fn settle_active(&mut self) {
        if !self.workspace.is_empty() {
            let policy = self.ctx.settings.cursor_policy;
            self.workspace.active_mut().settle(policy);
        }
    }

    fn report(&mut self, err: EditError) {
        warn!(target: "actions.dispatch", error = %err, "edit_failed");
        let state = &mut self.workspace.active_mut().state;
        if matches!(err, EditError::OutOfMemory) {
            state.discard_history();
            self.ctx.clipboard.clear();
            state.set_message("Out of memory: undo history and clipboard discarded");
        } else {
            state.set_message(err.to_string());
        }
    }

    /// Recover from a panic raised while handling an event: return the focused
    /// session to normal mode and tell the user.
    pub fn recover(&mut self, what: &str) {
        if self.workspace.is_empty() {
            return;
        }
        let session = self.workspace.active_mut();
        session.state.mode = Mode::Normal;
        session.state.replace = None;
        session.state.set_message(format!("Internal error: {what}"));
        let policy = self.ctx.settings.cursor_policy;
        session.settle(policy);
    }
}

fn failed_open(limit: usize, err: EditError) -> EditorState {
    let mut st = EditorState::new(LineBuffer::new(), limit);
    st.set_message(err.to_string());
    st
}
