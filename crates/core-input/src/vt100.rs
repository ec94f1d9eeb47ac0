//! Raw VT100 byte stream decoder.
//!
//! Decoding table:
//! * `0x0d` / `0x0a` Enter, `0x09` Tab, `0x7f` / `0x08` Backspace,
//!   `0x01..=0x1a` Ctrl+letter, `0x1c..=0x1f` Ctrl+`\ ] ^ _`.
//! * `ESC [` CSI: arrows `A-D`, `H`/`F` home/end, `Z` back-tab, `n~` editing
//!   and function keys, an optional `;m` xterm modifier parameter.
//! * `ESC O` SS3: `P-S` F1-F4, arrows, home/end.
//! * `ESC [ M b x y` X10 mouse and `ESC [ < b;x;y M|m` SGR mouse.
//! * Any other byte starts a UTF-8 scalar passed through as a character.
//!
//! A lone `ESC` followed by anything else decodes to `Esc`; the following
//! byte is decoded on its own afterwards. Reads block without a timeout, so
//! `Esc` is only reported once the next byte arrives, and an `Esc` typed just
//! before `[` or `O` is read as a sequence introducer. Ctrl-] (`0x1d`) arrives
//! as a single byte and is the cancel key that takes effect immediately.

use crate::{EventSource, xterm_mods};
use anyhow::Result;
use core_events::{Event, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use core_terminal::Transport;
use tracing::trace;

pub struct Vt100Decoder<T: Transport> {
    transport: T,
    pending: Option<u8>,
}

impl<T: Transport> Vt100Decoder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: None,
        }
    }

    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn byte(&mut self) -> Result<u8> {
        match self.pending.take() {
            Some(b) => Ok(b),
            None => self.transport.read_byte(),
        }
    }

    fn decode(&mut self) -> Result<Option<Event>> {
        let b = self.byte()?;
        let ev = match b {
            0x1b => return self.escape(),
            b'\r' | b'\n' => Event::key(KeyCode::Enter),
            b'\t' => Event::key(KeyCode::Tab),
            0x7f | 0x08 => Event::key(KeyCode::Backspace),
            0x01..=0x1a => Event::ctrl((b'a' + b - 1) as char),
            0x1c => Event::ctrl('\\'),
            0x1d => Event::ctrl(']'),
            0x1e => Event::ctrl('^'),
            0x1f => Event::ctrl('_'),
            0x00 => return Ok(None),
            _ => return self.utf8(b),
        };
        Ok(Some(ev))
    }

    fn escape(&mut self) -> Result<Option<Event>> {
        match self.byte()? {
            b'[' => self.csi(),
            b'O' => Ok(self.ss3()?.map(Event::key)),
            other => {
                self.pending = Some(other);
                Ok(Some(Event::key(KeyCode::Esc)))
            }
        }
    }

    fn ss3(&mut self) -> Result<Option<KeyCode>> {
        Ok(match self.byte()? {
            b'P' => Some(KeyCode::F(1)),
            b'Q' => Some(KeyCode::F(2)),
            b'R' => Some(KeyCode::F(3)),
            b'S' => Some(KeyCode::F(4)),
            b'A' => Some(KeyCode::Up),
            b'B' => Some(KeyCode::Down),
            b'C' => Some(KeyCode::Right),
            b'D' => Some(KeyCode::Left),
            b'H' => Some(KeyCode::Home),
            b'F' => Some(KeyCode::End),
            _ => None,
        })
    }

    fn csi(&mut self) -> Result<Option<Event>> {
        let first = self.byte()?;
        match first {
            b'M' => return self.x10_mouse(),
            b'<' => return self.sgr_mouse(),
            _ => {}
        }
        let mut params: Vec<u32> = vec![0];
        let mut b = first;
        loop {
            match b {
                b'0'..=b'9' => {
                    if let Some(p) = params.last_mut() {
                        *p = p.saturating_mul(10).saturating_add((b - b'0') as u32);
                    }
                }
                b';' => params.push(0),
                0x40..=0x7e => break,
                _ => {
                    trace!(target: "input", byte = b, "csi_unexpected_byte");
                    return Ok(None);
                }
            }
            b = self.byte()?;
        }
        let mods = params.get(1).map(|m| xterm_mods(*m)).unwrap_or_else(KeyModifiers::empty);
        let code = match b {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'Z' => KeyCode::BackTab,
            b'~' => match params[0] {
                1 | 7 => KeyCode::Home,
                2 => KeyCode::Insert,
                3 => KeyCode::Delete,
                4 | 8 => KeyCode::End,
                5 => KeyCode::PageUp,
                6 => KeyCode::PageDown,
                n @ 11..=15 => KeyCode::F((n - 10) as u8),
                n @ 17..=21 => KeyCode::F((n - 11) as u8),
                n @ 23..=24 => KeyCode::F((n - 12) as u8),
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(Event::key_with(code, mods)))
    }

    fn x10_mouse(&mut self) -> Result<Option<Event>> {
        let cb = self.byte()?.wrapping_sub(32) as u32;
        let x = self.byte()?.wrapping_sub(33) as u16;
        let y = self.byte()?.wrapping_sub(33) as u16;
        Ok(mouse_event(cb, x, y, cb & 3 == 3))
    }

    fn sgr_mouse(&mut self) -> Result<Option<Event>> {
        let mut fields = [0u32; 3];
        let mut idx = 0usize;
        let release = loop {
            match self.byte()? {
                b @ b'0'..=b'9' => {
                    fields[idx] = fields[idx].saturating_mul(10).saturating_add((b - b'0') as u32);
                }
                b';' if idx < 2 => idx += 1,
                b'M' => break false,
                b'm' => break true,
                _ => return Ok(None),
            }
        };
        let x = fields[1].saturating_sub(1).min(u16::MAX as u32) as u16;
        let y = fields[2].saturating_sub(1).min(u16::MAX as u32) as u16;
        Ok(mouse_event(fields[0], x, y, release))
    }

    fn utf8(&mut self, lead: u8) -> Result<Option<Event>> {
        let extra = match lead {
            0xc0..=0xdf => 1,
            0xe0..=0xef => 2,
            0xf0..=0xf7 => 3,
            0x80..=0xbf | 0xf8..=0xff => return Ok(None),
            _ => 0,
        };
        let mut bytes = vec![lead];
        for _ in 0..extra {
            bytes.push(self.byte()?);
        }
        Ok(std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .map(Event::char))
    }
}

fn mouse_event(cb: u32, column: u16, row: u16, release: bool) -> Option<Event> {
    let button = match cb & 3 {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        _ => MouseButton::Right,
    };
    let kind = if cb & 64 != 0 {
        if cb & 1 == 0 {
            MouseEventKind::ScrollUp
        } else {
            MouseEventKind::ScrollDown
        }
    } else if release {
        MouseEventKind::Up(button)
    } else if cb & 32 != 0 {
        MouseEventKind::Drag(button)
    } else {
        MouseEventKind::Down(button)
    };
    Some(Event::Mouse(MouseEvent { kind, column, row }))
}

impl<T: Transport> EventSource for Vt100Decoder<T> {
    fn next_event(&mut self) -> Result<Event> {
        loop {
            if let Some(ev) = self.decode()? {
                trace!(target: "input", ?ev, "decoded");
                return Ok(ev);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::ScriptedTransport;
    use pretty_assertions::assert_eq;

    fn decode_all(bytes: &[u8]) -> Vec<Event> {
        let mut d = Vt100Decoder::new(ScriptedTransport::new(bytes));
        let mut out = Vec::new();
        while let Ok(ev) = d.next_event() {
            out.push(ev);
        }
        out
    }

    #[test]
    fn control_bytes_and_text() {
        assert_eq!(
            decode_all(b"a\r\x7f\x13\x1c\x1d"),
            vec![
                Event::char('a'),
                Event::key(KeyCode::Enter),
                Event::key(KeyCode::Backspace),
                Event::ctrl('s'),
                Event::ctrl('\\'),
                Event::ctrl(']'),
            ]
        );
    }

    #[test]
    fn csi_keys_with_modifiers() {
        assert_eq!(
            decode_all(b"\x1b[A\x1b[1;2B\x1b[1;5C\x1b[3~\x1b[6~\x1b[Z\x1b[15~"),
            vec![
                Event::key(KeyCode::Up),
                Event::key_with(KeyCode::Down, KeyModifiers::SHIFT),
                Event::key_with(KeyCode::Right, KeyModifiers::CTRL),
                Event::key(KeyCode::Delete),
                Event::key(KeyCode::PageDown),
                Event::key(KeyCode::BackTab),
                Event::key(KeyCode::F(5)),
            ]
        );
    }

    #[test]
    fn ss3_function_keys() {
        assert_eq!(
            decode_all(b"\x1bOP\x1bOH"),
            vec![Event::key(KeyCode::F(1)), Event::key(KeyCode::Home)]
        );
    }

    #[test]
    fn lone_escape_then_next_byte() {
        assert_eq!(
            decode_all(b"\x1bq"),
            vec![Event::key(KeyCode::Esc), Event::char('q')]
        );
    }

    #[test]
    fn utf8_passthrough() {
        assert_eq!(
            decode_all("é日".as_bytes()),
            vec![Event::char('é'), Event::char('日')]
        );
    }

    #[test]
    fn x10_and_sgr_mouse() {
        let evs = decode_all(b"\x1b[M !!\x1b[<0;5;3M\x1b[<32;6;3M\x1b[<65;1;1M\x1b[<0;5;3m");
        assert_eq!(
            evs,
            vec![
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column: 0,
                    row: 0
                }),
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column: 4,
                    row: 2
                }),
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Drag(MouseButton::Left),
                    column: 5,
                    row: 2
                }),
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::ScrollDown,
                    column: 0,
                    row: 0
                }),
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Up(MouseButton::Left),
                    column: 4,
                    row: 2
                }),
            ]
        );
    }
}
