//! Adapter over crossterm's blocking terminal event reader.

use crate::{EventSource, map_mods};
use anyhow::Result;
use core_events::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use crossterm::event::{
    self as cevent, Event as CEvent, KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind,
    MouseButton as CButton, MouseEvent as CMouseEvent, MouseEventKind as CMouseKind,
};
use std::collections::VecDeque;
use tracing::trace;

#[derive(Debug, Default)]
pub struct CrosstermEvents {
    /// Characters of a bracketed paste still to be delivered.
    queued: VecDeque<Event>,
}

impl CrosstermEvents {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> Result<Event> {
        loop {
            if let Some(ev) = self.queued.pop_front() {
                return Ok(ev);
            }
            let raw = cevent::read()?;
            if let CEvent::Paste(text) = &raw {
                trace!(target: "input", len = text.len(), "paste");
                self.queued.extend(text.chars().map(|c| match c {
                    '\n' | '\r' => Event::key(KeyCode::Enter),
                    '\t' => Event::key(KeyCode::Tab),
                    c => Event::char(c),
                }));
                continue;
            }
            if let Some(ev) = map_event(raw) {
                return Ok(ev);
            }
        }
    }
}

/// Translate one crossterm event; `None` for events the editor ignores.
pub(crate) fn map_event(ev: CEvent) -> Option<Event> {
    match ev {
        CEvent::Key(k) => map_key(k).map(Event::Key),
        CEvent::Mouse(m) => map_mouse(m),
        CEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        CEvent::FocusGained => Some(Event::Redraw),
        CEvent::FocusLost | CEvent::Paste(_) => None,
    }
}

fn map_key(k: CKeyEvent) -> Option<KeyEvent> {
    if k.kind == KeyEventKind::Release {
        return None;
    }
    let mut mods = map_mods(k.modifiers);
    let code = match k.code {
        CKeyCode::Char(c) => {
            if mods.contains(KeyModifiers::CTRL) {
                KeyCode::Char(c.to_ascii_lowercase())
            } else {
                // Shift is already folded into the character.
                mods.remove(KeyModifiers::SHIFT);
                KeyCode::Char(c)
            }
        }
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Insert => KeyCode::Insert,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::BackTab => {
            mods.remove(KeyModifiers::SHIFT);
            KeyCode::BackTab
        }
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        CKeyCode::F(n) => KeyCode::F(n),
        _ => return None,
    };
    Some(KeyEvent { code, mods })
}

fn map_button(b: CButton) -> MouseButton {
    match b {
        CButton::Left => MouseButton::Left,
        CButton::Middle => MouseButton::Middle,
        CButton::Right => MouseButton::Right,
    }
}

fn map_mouse(m: CMouseEvent) -> Option<Event> {
    let kind = match m.kind {
        CMouseKind::Down(b) => MouseEventKind::Down(map_button(b)),
        CMouseKind::Up(b) => MouseEventKind::Up(map_button(b)),
        CMouseKind::Drag(b) => MouseEventKind::Drag(map_button(b)),
        CMouseKind::ScrollUp => MouseEventKind::ScrollUp,
        CMouseKind::ScrollDown => MouseEventKind::ScrollDown,
        CMouseKind::Moved | CMouseKind::ScrollLeft | CMouseKind::ScrollRight => return None,
    };
    Some(Event::Mouse(MouseEvent {
        kind,
        column: m.column,
        row: m.row,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers as CMods};

    fn key(code: CKeyCode, mods: CMods) -> CEvent {
        CEvent::Key(CKeyEvent {
            code,
            modifiers: mods,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn ctrl_letter_normalizes_case() {
        assert_eq!(
            map_event(key(CKeyCode::Char('S'), CMods::CONTROL | CMods::SHIFT)),
            Some(Event::key_with(
                KeyCode::Char('s'),
                KeyModifiers::CTRL | KeyModifiers::SHIFT
            ))
        );
    }

    #[test]
    fn shifted_char_drops_shift() {
        assert_eq!(
            map_event(key(CKeyCode::Char('A'), CMods::SHIFT)),
            Some(Event::char('A'))
        );
    }

    #[test]
    fn resize_and_focus() {
        assert_eq!(map_event(CEvent::Resize(100, 40)), Some(Event::Resize(100, 40)));
        assert_eq!(map_event(CEvent::FocusGained), Some(Event::Redraw));
    }

    #[test]
    fn release_events_are_ignored() {
        let ev = CEvent::Key(CKeyEvent {
            code: CKeyCode::Char('a'),
            modifiers: CMods::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(map_event(ev), None);
    }
}
