//! Editing actions: the vocabulary the dispatcher understands, the default
//! key bindings producing it, and the multi-buffer shell driving both.
//!
//! Flow for one input event:
//! 1. `key_translator::translate_event` maps the event to an `Action` using
//!    the focused session's `Mode` (normal keys, prompt line editing, or the
//!    y/n/a/q answers of an interactive replace).
//! 2. `dispatcher::dispatch` applies the action to that session and the
//!    `SharedContext`, returning a `DispatchResult` or an `EditError`.
//! 3. `Shell` turns errors into status messages, performs the requests the
//!    dispatcher cannot satisfy alone (open another file, switch or close a
//!    session) and settles the viewport.

pub mod dispatcher;
pub mod error;
pub mod io_ops;
pub mod key_translator;
pub mod shell;

pub use dispatcher::{DispatchResult, dispatch};
pub use error::EditError;
pub use key_translator::{translate_event, translate_key};
pub use shell::{Shell, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    FirstLine,
    LastLine,
    WordLeft,
    WordRight,
    /// Scroll the view one line, dragging the cursor along.
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    InsertChar(char),
    /// Split the line at the cursor.
    Enter,
    Backspace,
    Delete,
    DeleteWord,
    /// Spaces to the next tab stop, or indent the selected lines.
    Tab,
    /// Remove one tab stop of indentation.
    BackTab,
    DeleteLine,
}

/// Line editing inside an open prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptInput {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Submit,
}

/// Answer to the interactive replace question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceAnswer {
    Yes,
    No,
    All,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Motion { kind: MotionKind, extend: bool },
    Edit(EditKind),
    ToggleMark,
    Cut,
    Copy,
    Paste,
    Find,
    FindAgain,
    Replace,
    Goto,
    Undo,
    Redo,
    Save,
    SaveAs,
    Open,
    NextBuffer,
    BracketMatch,
    ToggleComment,
    Settings,
    Redraw,
    Quit,
    ForceQuit,
    /// Leave the current prompt or replace run, or drop the mark.
    Cancel,
    Prompt(PromptInput),
    ReplaceAnswer(ReplaceAnswer),
    /// Mouse press at a screen cell.
    Click { column: u16, row: u16 },
    /// Mouse drag to a screen cell.
    Drag { column: u16, row: u16 },
    /// Wheel scroll by a signed number of lines.
    Scroll(isize),
}

impl Action {
    pub fn motion(kind: MotionKind) -> Self {
        Action::Motion {
            kind,
            extend: false,
        }
    }

    pub fn extend(kind: MotionKind) -> Self {
        Action::Motion { kind, extend: true }
    }

    /// True for actions that only move the cursor or view.
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Action::Motion { .. }
                | Action::Click { .. }
                | Action::Drag { .. }
                | Action::Scroll(_)
        )
    }
}
