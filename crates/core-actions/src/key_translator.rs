//! Default key bindings: `Event` + `Mode` -> `Action`.
//!
//! The table is stateless. What a key means depends only on the mode of the
//! focused session:
//! * `Normal`: motions (shift extends the selection), edits, Ctrl-letter
//!   commands.
//! * `Prompt(_)`: single-line editing of the prompt input; Enter submits.
//!   Confirmation prompts receive their answers as plain characters.
//! * `ReplaceConfirm`: `y` / `n` / `a` / `q`.
//!
//! `Esc` maps to `Action::Cancel` everywhere, and so does Ctrl-]. A raw VT100
//! stream can only tell a lone `Esc` from a sequence introducer by reading the
//! byte after it, so Ctrl-] is the cancel key that acts at once. Resize events
//! are handled by the shell before translation and never reach this table.

use crate::{Action, EditKind, MotionKind, PromptInput, ReplaceAnswer};
use core_events::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEventKind};
use core_state::Mode;

/// Lines moved per wheel notch.
pub const WHEEL_LINES: isize = 3;

pub fn translate_event(mode: Mode, event: &Event) -> Option<Action> {
    match event {
        Event::Key(key) => translate_key(mode, key),
        Event::Mouse(m) if mode == Mode::Normal => match m.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Action::Click {
                column: m.column,
                row: m.row,
            }),
            MouseEventKind::Drag(MouseButton::Left) => Some(Action::Drag {
                column: m.column,
                row: m.row,
            }),
            MouseEventKind::ScrollUp => Some(Action::Scroll(-WHEEL_LINES)),
            MouseEventKind::ScrollDown => Some(Action::Scroll(WHEEL_LINES)),
            _ => None,
        },
        Event::Mouse(_) => None,
        Event::Redraw => Some(Action::Redraw),
        Event::Resize(..) => None,
    }
}

pub fn translate_key(mode: Mode, key: &KeyEvent) -> Option<Action> {
    let ctrl_bracket =
        key.code == KeyCode::Char(']') && key.mods.contains(KeyModifiers::CTRL);
    if key.code == KeyCode::Esc || ctrl_bracket {
        return Some(Action::Cancel);
    }
    match mode {
        Mode::Normal => normal(key),
        Mode::Prompt(_) => prompt(key),
        Mode::ReplaceConfirm => replace_confirm(key),
    }
}

fn normal(key: &KeyEvent) -> Option<Action> {
    let ctrl = key.mods.contains(KeyModifiers::CTRL);
    let shift = key.mods.contains(KeyModifiers::SHIFT);
    let alt = key.mods.contains(KeyModifiers::ALT);
    let motion = |kind| Some(Action::Motion { kind, extend: shift });
    match key.code {
        KeyCode::Char(c) if ctrl => ctrl_command(c),
        KeyCode::Char('q') | KeyCode::Char('Q') if alt => Some(Action::ForceQuit),
        KeyCode::Char(_) if alt => None,
        KeyCode::Char(c) => Some(Action::Edit(EditKind::InsertChar(c))),
        KeyCode::Enter => Some(Action::Edit(EditKind::Enter)),
        KeyCode::Backspace => Some(Action::Edit(EditKind::Backspace)),
        KeyCode::Delete => Some(Action::Edit(EditKind::Delete)),
        KeyCode::Tab if shift => Some(Action::Edit(EditKind::BackTab)),
        KeyCode::Tab => Some(Action::Edit(EditKind::Tab)),
        KeyCode::BackTab => Some(Action::Edit(EditKind::BackTab)),
        KeyCode::Up if ctrl => motion(MotionKind::ScrollUp),
        KeyCode::Down if ctrl => motion(MotionKind::ScrollDown),
        KeyCode::Left if ctrl => motion(MotionKind::WordLeft),
        KeyCode::Right if ctrl => motion(MotionKind::WordRight),
        KeyCode::Home if ctrl => motion(MotionKind::FirstLine),
        KeyCode::End if ctrl => motion(MotionKind::LastLine),
        KeyCode::Up => motion(MotionKind::Up),
        KeyCode::Down => motion(MotionKind::Down),
        KeyCode::Left => motion(MotionKind::Left),
        KeyCode::Right => motion(MotionKind::Right),
        KeyCode::Home => motion(MotionKind::Home),
        KeyCode::End => motion(MotionKind::End),
        KeyCode::PageUp => motion(MotionKind::PageUp),
        KeyCode::PageDown => motion(MotionKind::PageDown),
        KeyCode::Esc | KeyCode::Insert | KeyCode::F(_) => None,
    }
}

fn ctrl_command(c: char) -> Option<Action> {
    Some(match c {
        'w' => Action::Edit(EditKind::DeleteWord),
        'y' => Action::Edit(EditKind::DeleteLine),
        'l' => Action::ToggleMark,
        'x' => Action::Cut,
        'c' => Action::Copy,
        'v' => Action::Paste,
        'f' => Action::Find,
        'n' => Action::FindAgain,
        'r' => Action::Replace,
        'g' => Action::Goto,
        'z' => Action::Undo,
        'e' => Action::Redo,
        's' => Action::Save,
        'a' => Action::SaveAs,
        'o' => Action::Open,
        't' => Action::NextBuffer,
        'k' => Action::BracketMatch,
        'p' => Action::ToggleComment,
        'b' => Action::Settings,
        'd' => Action::Redraw,
        'q' => Action::Quit,
        '\\' => Action::ForceQuit,
        _ => return None,
    })
}

fn prompt(key: &KeyEvent) -> Option<Action> {
    if key.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) {
        return None;
    }
    let input = match key.code {
        KeyCode::Char(c) => PromptInput::Char(c),
        KeyCode::Enter => PromptInput::Submit,
        KeyCode::Backspace => PromptInput::Backspace,
        KeyCode::Delete => PromptInput::Delete,
        KeyCode::Left => PromptInput::Left,
        KeyCode::Right => PromptInput::Right,
        KeyCode::Home => PromptInput::Home,
        KeyCode::End => PromptInput::End,
        _ => return None,
    };
    Some(Action::Prompt(input))
}

fn replace_confirm(key: &KeyEvent) -> Option<Action> {
    let answer = match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => ReplaceAnswer::Yes,
        KeyCode::Char('n') | KeyCode::Char('N') => ReplaceAnswer::No,
        KeyCode::Char('a') | KeyCode::Char('A') => ReplaceAnswer::All,
        KeyCode::Char('q') | KeyCode::Char('Q') => ReplaceAnswer::Quit,
        _ => return None,
    };
    Some(Action::ReplaceAnswer(answer))
}
