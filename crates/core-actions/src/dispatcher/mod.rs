//! Dispatcher applying an `Action` to one session.
//!
//! Sub-modules by concern:
//! * `motion`    - cursor movement, selection extension, mouse
//! * `edit`      - character and line mutations, tab / indent
//! * `clipboard` - cut / copy / paste / delete-line
//! * `search`    - find, find-again, interactive replace
//! * `prompt`    - prompt line editing and submission (goto, save, settings)
//! * `structure` - bracket matching and comment toggling
//! * `undo`      - undo / redo
//!
//! Every mutation records its inverse in the session's undo log before the
//! buffer is touched. The dispatcher never performs terminal I/O; requests it
//! cannot satisfy on one session (open another file, switch or close the
//! session) travel back to the shell in `DispatchResult`.

use crate::{Action, EditError, EditKind};
use core_model::EditorSession;
use core_state::{Mode, PromptKind, SharedContext};
use std::path::PathBuf;
use tracing::trace;

mod clipboard;
mod edit;
mod motion;
mod prompt;
mod search;
mod structure;
mod undo;

pub use search::{compile_pattern, find_from};
pub use structure::find_matching_bracket;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    pub dirty: bool,
    /// Close the session.
    pub quit: bool,
    /// Screen contents can no longer be trusted; repaint everything.
    pub buffer_replaced: bool,
    /// Focus the next session.
    pub next_buffer: bool,
    /// Open this path in a new session.
    pub open: Option<PathBuf>,
    /// The terminal may have changed size; ask it again before repainting.
    pub redraw: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }
    pub fn clean() -> Self {
        Self::default()
    }
    pub fn quit() -> Self {
        Self {
            dirty: true,
            quit: true,
            ..Self::default()
        }
    }
    pub fn buffer_replaced() -> Self {
        Self {
            dirty: true,
            buffer_replaced: true,
            ..Self::default()
        }
    }
    pub fn redraw() -> Self {
        Self {
            dirty: true,
            buffer_replaced: true,
            redraw: true,
            ..Self::default()
        }
    }
    pub fn next_buffer() -> Self {
        Self {
            dirty: true,
            next_buffer: true,
            ..Self::default()
        }
    }
    pub fn open(path: PathBuf) -> Self {
        Self {
            dirty: true,
            open: Some(path),
            ..Self::default()
        }
    }
}

/// Apply `action` to `session`. Errors leave the session consistent; the
/// caller reports them.
pub fn dispatch(
    session: &mut EditorSession,
    ctx: &mut SharedContext,
    action: Action,
) -> Result<DispatchResult, EditError> {
    let state = &mut session.state;
    trace!(target: "actions.dispatch", ?action, mode = ?state.mode, "dispatch");
    // Only an uninterrupted run of line deletes accumulates in the clipboard.
    let appending = std::mem::take(&mut state.clipboard_append);

    match action {
        Action::Cancel => return Ok(prompt::cancel(state)),
        Action::Prompt(input) => return prompt::input(state, ctx, input),
        Action::ReplaceAnswer(answer) => return search::answer(state, ctx, answer),
        Action::Redraw => return Ok(DispatchResult::redraw()),
        _ if state.mode != Mode::Normal => return Ok(DispatchResult::clean()),
        _ => {}
    }
    state.clear_message();

    match action {
        Action::Motion { kind, extend } => Ok(motion::handle_motion(session, ctx, kind, extend)),
        Action::Click { column, row } => Ok(motion::click(session, column, row)),
        Action::Drag { column, row } => Ok(motion::drag(session, column, row)),
        Action::Scroll(lines) => Ok(motion::scroll(session, lines)),
        Action::Edit(EditKind::DeleteLine) => clipboard::delete_line(state, ctx, appending),
        Action::Edit(kind) => edit::handle_edit(state, ctx, kind),
        Action::ToggleMark => Ok(clipboard::toggle_mark(state)),
        Action::Cut => clipboard::cut(state, ctx, appending),
        Action::Copy => clipboard::copy(state, ctx),
        Action::Paste => clipboard::paste(state, ctx),
        Action::Find => Ok(search::start_find(state, ctx)),
        Action::FindAgain => search::find_again(state, ctx),
        Action::Replace => Ok(search::start_replace(state, ctx)),
        Action::Goto => Ok(prompt::open(state, PromptKind::Goto, "")),
        Action::Undo => Ok(undo::handle_undo(state)),
        Action::Redo => Ok(undo::handle_redo(state)),
        Action::Save => prompt::save(state),
        Action::SaveAs => {
            let name = state.display_name();
            Ok(prompt::open(state, PromptKind::SaveAs, &name))
        }
        Action::Open => Ok(prompt::open(state, PromptKind::Open, "")),
        Action::NextBuffer => Ok(DispatchResult::next_buffer()),
        Action::BracketMatch => Ok(structure::bracket_match(state, ctx)),
        Action::ToggleComment => Ok(structure::toggle_comment(state, ctx)),
        Action::Settings => {
            let line = core_config::format_settings_line(&ctx.settings, state.write_tabs);
            Ok(prompt::open(state, PromptKind::Settings, &line))
        }
        Action::Quit => Ok(prompt::quit(state)),
        Action::ForceQuit => Ok(DispatchResult::quit()),
        Action::Cancel
        | Action::Prompt(_)
        | Action::ReplaceAnswer(_)
        | Action::Redraw => Ok(DispatchResult::clean()),
    }
}
