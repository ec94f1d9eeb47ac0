//! Undo / redo dispatch.

use super::DispatchResult;
use core_state::EditorState;

pub(super) fn handle_undo(state: &mut EditorState) -> DispatchResult {
    if !state.undo() {
        state.set_message("Nothing to undo");
    }
    DispatchResult::dirty()
}

pub(super) fn handle_redo(state: &mut EditorState) -> DispatchResult {
    if !state.redo() {
        state.set_message("Nothing to redo");
    }
    DispatchResult::dirty()
}
