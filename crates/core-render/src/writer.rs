//! VT100 command writer.
//!
//! Collects ordered terminal commands for one frame and serializes them to a
//! byte vector with crossterm's `queue!`. Nothing is written to a terminal
//! here; the caller hands the bytes to its transport in one write.
//!
//! Consecutive prints are merged into a single command.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveTo(u16, u16),
    /// Erase from the cursor to the end of the line.
    ClearToEol,
    Print(String),
    Reverse(bool),
    ShowCursor(bool),
    /// Restrict scrolling to rows `top..=bottom` (0-based); `None` resets.
    ScrollRegion(Option<(u16, u16)>),
    /// Index (`ESC D`): at the bottom of the region, content moves up a line.
    PanUp,
    /// Reverse index (`ESC M`): at the top of the region, content moves down.
    PanDown,
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }
    pub fn clear_to_eol(&mut self) {
        self.cmds.push(Command::ClearToEol);
    }
    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if s.is_empty() {
            return;
        }
        if let Some(Command::Print(prev)) = self.cmds.last_mut() {
            prev.push_str(&s);
        } else {
            self.cmds.push(Command::Print(s));
        }
    }
    pub fn reverse(&mut self, on: bool) {
        self.cmds.push(Command::Reverse(on));
    }
    pub fn show_cursor(&mut self, on: bool) {
        self.cmds.push(Command::ShowCursor(on));
    }
    pub fn scroll_region(&mut self, region: Option<(u16, u16)>) {
        self.cmds.push(Command::ScrollRegion(region));
    }
    pub fn pan_up(&mut self) {
        self.cmds.push(Command::PanUp);
    }
    pub fn pan_down(&mut self) {
        self.cmds.push(Command::PanDown);
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    /// Serialize every queued command.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        for c in self.cmds {
            match c {
                Command::MoveTo(x, y) => queue!(out, MoveTo(x, y))?,
                Command::ClearToEol => queue!(out, Clear(ClearType::UntilNewLine))?,
                Command::Print(s) => queue!(out, Print(s))?,
                Command::Reverse(true) => queue!(out, SetAttribute(Attribute::Reverse))?,
                Command::Reverse(false) => queue!(out, SetAttribute(Attribute::NoReverse))?,
                Command::ShowCursor(true) => queue!(out, Show)?,
                Command::ShowCursor(false) => queue!(out, Hide)?,
                Command::ScrollRegion(Some((top, bottom))) => {
                    queue!(out, Print(format!("\x1b[{};{}r", top + 1, bottom + 1)))?
                }
                Command::ScrollRegion(None) => queue!(out, Print("\x1b[r"))?,
                Command::PanUp => queue!(out, Print("\x1bD"))?,
                Command::PanDown => queue!(out, Print("\x1bM"))?,
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_prints_merge() {
        let mut w = Writer::new();
        w.move_to(0, 0);
        w.print("ab");
        w.print("c");
        w.reverse(true);
        w.print("x");
        assert_eq!(
            w.commands(),
            &[
                Command::MoveTo(0, 0),
                Command::Print("abc".into()),
                Command::Reverse(true),
                Command::Print("x".into()),
            ]
        );
    }

    #[test]
    fn serializes_vt100_sequences() {
        let mut w = Writer::new();
        w.move_to(4, 2);
        w.print("hi");
        w.clear_to_eol();
        w.scroll_region(Some((0, 22)));
        w.pan_up();
        w.scroll_region(None);
        let bytes = String::from_utf8(w.into_bytes().unwrap()).unwrap();
        assert!(bytes.starts_with("\x1b[3;5Hhi"));
        assert!(bytes.contains("\x1b[K"));
        assert!(bytes.contains("\x1b[1;23r\x1bD\x1b[r"));
    }
}
