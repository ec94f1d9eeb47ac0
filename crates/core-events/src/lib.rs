//! Core event types consumed by the editing engine.
//!
//! The engine never sees raw bytes or backend-specific event types. Input
//! sources (`core-input`) decode whatever their transport produces into this
//! vocabulary: key presses with modifier flags, mouse reports, and a synthetic
//! `Redraw` used when the terminal was resized or otherwise disturbed.

use std::fmt;

/// Top-level event enum consumed by the central event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Terminal resized (columns, rows). Handled as a full redraw.
    Resize(u16, u16),
    /// Repaint everything (external interruption, explicit request).
    Redraw,
}

impl Event {
    /// Convenience constructor for an unmodified key.
    pub fn key(code: KeyCode) -> Self {
        Event::Key(KeyEvent::plain(code))
    }
    /// Convenience constructor for a modified key.
    pub fn key_with(code: KeyCode, mods: KeyModifiers) -> Self {
        Event::Key(KeyEvent { code, mods })
    }
    /// Printable character event.
    pub fn char(c: char) -> Self {
        Event::key(KeyCode::Char(c))
    }
    /// Ctrl + letter.
    pub fn ctrl(c: char) -> Self {
        Event::key_with(KeyCode::Char(c), KeyModifiers::CTRL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// 0-based screen column.
    pub column: u16,
    /// 0-based screen row.
    pub row: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
        }
    }
}

/// Logical key representations. Control letters arrive as `Char` + `CTRL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Insert,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}
