//! Line prompts: opening, editing, submitting and cancelling.
//!
//! A prompt owns the input while it is open; nothing reaches the buffer until
//! Enter submits it. Cancelling returns to normal mode with no change. The two
//! confirmation prompts take a single answer character instead of a line.

use super::{DispatchResult, search};
use crate::{EditError, PromptInput, io_ops};
use core_config::apply_settings_line;
use core_state::{EditorState, Mode, PromptKind, PromptLine, SharedContext};
use core_text::Position;
use std::path::PathBuf;
use tracing::{debug, info};

pub(super) fn open(state: &mut EditorState, kind: PromptKind, initial: &str) -> DispatchResult {
    state.mode = Mode::Prompt(kind);
    state.prompt = PromptLine::with_text(initial);
    debug!(target: "actions.dispatch", ?kind, "prompt_opened");
    DispatchResult::dirty()
}

fn close(state: &mut EditorState) {
    state.mode = Mode::Normal;
    state.prompt = PromptLine::default();
}

/// Esc: leave a prompt or replace run untouched, or drop the mark.
pub(super) fn cancel(state: &mut EditorState) -> DispatchResult {
    match state.mode {
        Mode::Prompt(_) => close(state),
        Mode::ReplaceConfirm => return search::finish(state),
        Mode::Normal => state.clear_mark(),
    }
    DispatchResult::dirty()
}

pub(super) fn input(
    state: &mut EditorState,
    ctx: &mut SharedContext,
    input: PromptInput,
) -> Result<DispatchResult, EditError> {
    let Mode::Prompt(kind) = state.mode else {
        return Ok(DispatchResult::clean());
    };
    if kind.is_confirmation() {
        return match input {
            PromptInput::Char(c) => confirm(state, kind, c),
            _ => Ok(DispatchResult::clean()),
        };
    }
    let line = &mut state.prompt;
    match input {
        PromptInput::Char(c) => line.insert(c),
        PromptInput::Backspace => line.backspace(),
        PromptInput::Delete => line.delete(),
        PromptInput::Left => line.left(),
        PromptInput::Right => line.right(),
        PromptInput::Home => line.home(),
        PromptInput::End => line.end(),
        PromptInput::Submit => return submit(state, ctx, kind),
    }
    Ok(DispatchResult::dirty())
}

fn submit(state: &mut EditorState, ctx: &mut SharedContext, kind: PromptKind) -> Result<DispatchResult, EditError> {
    let text = state.prompt.text().to_string();
    close(state);
    debug!(target: "actions.dispatch", ?kind, "prompt_submitted");
    match kind {
        PromptKind::Find => {
            if text.is_empty() {
                return Ok(DispatchResult::dirty());
            }
            ctx.find_pattern = text;
            let from = state.cursor;
            search::find(state, ctx, from)
        }
        PromptKind::ReplacePattern => {
            if text.is_empty() {
                return Ok(DispatchResult::dirty());
            }
            search::compile_pattern(&text, &ctx.settings)?;
            ctx.find_pattern = text;
            Ok(open(state, PromptKind::ReplaceWith, &ctx.replace_with))
        }
        PromptKind::ReplaceWith => {
            ctx.replace_with = text;
            search::begin_replace(state, ctx)
        }
        PromptKind::Goto => goto(state, &text),
        PromptKind::SaveAs => {
            if text.is_empty() {
                return Ok(DispatchResult::dirty());
            }
            let path = PathBuf::from(&text);
            if path.exists() && state.file_name.as_ref() != Some(&path) {
                return Ok(open(state, PromptKind::ConfirmOverwrite, &text));
            }
            save_to(state, path)
        }
        PromptKind::Open => {
            if text.is_empty() {
                return Ok(DispatchResult::dirty());
            }
            Ok(DispatchResult::open(PathBuf::from(text)))
        }
        PromptKind::Settings => {
            let changed = apply_settings_line(&text, &mut ctx.settings, &mut state.write_tabs);
            info!(target: "config", changed, settings = ?ctx.settings, "settings_applied");
            state.set_message(format!("{changed} setting(s) changed"));
            Ok(DispatchResult::dirty())
        }
        PromptKind::ConfirmOverwrite | PromptKind::ConfirmQuit => Ok(DispatchResult::dirty()),
    }
}

fn confirm(state: &mut EditorState, kind: PromptKind, answer: char) -> Result<DispatchResult, EditError> {
    let answer = answer.to_ascii_lowercase();
    match (kind, answer) {
        (PromptKind::ConfirmOverwrite, 'y') => {
            let path = PathBuf::from(state.prompt.text());
            close(state);
            save_to(state, path)
        }
        (PromptKind::ConfirmQuit, 'y') => {
            close(state);
            Ok(DispatchResult::quit())
        }
        (PromptKind::ConfirmQuit, 's') => {
            close(state);
            let path = state.file_name.clone().ok_or(EditError::NoFileName)?;
            save_to(state, path)?;
            Ok(DispatchResult::quit())
        }
        (_, 'n') => {
            close(state);
            Ok(DispatchResult::dirty())
        }
        _ => Ok(DispatchResult::clean()),
    }
}

/// 1-based line number; numbers past the end go to the last line.
fn goto(state: &mut EditorState, text: &str) -> Result<DispatchResult, EditError> {
    let n = text
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| EditError::InvalidLineNumber(text.to_string()))?;
    let line = (n - 1).min(state.buffer.line_count() - 1);
    state.clear_mark();
    state.cursor = Position::new(line, 0);
    Ok(DispatchResult::dirty())
}

pub(super) fn save(state: &mut EditorState) -> Result<DispatchResult, EditError> {
    match state.file_name.clone() {
        Some(path) => save_to(state, path),
        None => Ok(open(state, PromptKind::SaveAs, "")),
    }
}

fn save_to(state: &mut EditorState, path: PathBuf) -> Result<DispatchResult, EditError> {
    let bytes = io_ops::write_atomic(&path, state.buffer.lines(), state.write_tabs)?;
    let lines = state.buffer.line_count();
    state.file_name = Some(path);
    state.mark_saved();
    state.set_message(format!("Saved {lines} lines, {bytes} bytes"));
    info!(target: "io", file = %state.display_name(), lines, bytes, "saved");
    Ok(DispatchResult::dirty())
}

/// Quit, asking first when there are unsaved changes.
pub(super) fn quit(state: &mut EditorState) -> DispatchResult {
    if state.modified {
        open(state, PromptKind::ConfirmQuit, "")
    } else {
        DispatchResult::quit()
    }
}
