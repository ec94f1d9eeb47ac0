//! Terminal transport abstraction and the stdio implementation.
//!
//! The editing engine only needs a byte pipe and a screen size. `Transport`
//! is that narrow interface; `StdioTransport` implements it on the process
//! terminal with crossterm handling raw mode, and `ScriptedTransport` replays
//! canned input for tests.
//!
//! `query_screen_size` discovers the screen size over the pipe itself by
//! parking the cursor in the far corner and asking for a cursor position
//! report, which works on any VT100-compatible endpoint.

use anyhow::{Result, bail};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::collections::VecDeque;
use std::io::{Read, Write, stdin, stdout};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub rows: u16,
    pub cols: u16,
}

pub trait Transport {
    /// Block until one input byte is available.
    fn read_byte(&mut self) -> Result<u8>;
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    fn screen_size(&mut self) -> Result<ScreenSize>;
    /// Switch to raw mode (and the alternate screen where supported).
    fn enter(&mut self) -> Result<()>;
    /// Restore the mode saved by `enter`.
    fn leave(&mut self) -> Result<()>;
}

/// Ask the terminal for its size with a cursor position report.
///
/// Sends `ESC 7 ESC[999;999H ESC[6n ESC 8` and parses `ESC[rows;colsR`.
/// Bytes arriving before the report (type-ahead) are discarded.
pub fn query_screen_size<T: Transport + ?Sized>(t: &mut T) -> Result<ScreenSize> {
    t.write(b"\x1b7\x1b[999;999H\x1b[6n\x1b8")?;
    // Skip to the report's CSI introducer.
    loop {
        if t.read_byte()? == 0x1b && t.read_byte()? == b'[' {
            break;
        }
    }
    let mut fields = [0u32; 2];
    let mut idx = 0usize;
    loop {
        match t.read_byte()? {
            b @ b'0'..=b'9' => {
                fields[idx] = fields[idx].saturating_mul(10).saturating_add((b - b'0') as u32);
            }
            b';' if idx == 0 => idx = 1,
            b'R' if idx == 1 => break,
            other => bail!("malformed cursor position report (byte {other:#04x})"),
        }
    }
    let size = ScreenSize {
        rows: fields[0].min(u16::MAX as u32) as u16,
        cols: fields[1].min(u16::MAX as u32) as u16,
    };
    debug!(target: "io", rows = size.rows, cols = size.cols, "screen_size_reported");
    Ok(size)
}

/// The process terminal: stdin for input, stdout for output.
pub struct StdioTransport {
    entered: bool,
    /// Discover the size with a cursor position report instead of the OS query.
    probe_size: bool,
}

impl StdioTransport {
    pub fn new(probe_size: bool) -> Self {
        Self {
            entered: false,
            probe_size,
        }
    }
}

impl Transport for StdioTransport {
    fn read_byte(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        loop {
            match stdin().lock().read(&mut b) {
                Ok(0) => bail!("terminal input closed"),
                Ok(_) => return Ok(b[0]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut out = stdout().lock();
        out.write_all(bytes)?;
        out.flush()?;
        Ok(())
    }

    fn screen_size(&mut self) -> Result<ScreenSize> {
        if !self.probe_size {
            match crossterm::terminal::size() {
                Ok((cols, rows)) if cols > 0 && rows > 0 => return Ok(ScreenSize { rows, cols }),
                Ok(_) => {}
                Err(e) => warn!(target: "io", error = %e, "terminal_size_query_failed"),
            }
        }
        query_screen_size(self)
    }

    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// RAII guard restoring the terminal even on early return or panic unwind.
pub struct TerminalGuard<'a, T: Transport + ?Sized> {
    transport: &'a mut T,
}

impl<'a, T: Transport + ?Sized> TerminalGuard<'a, T> {
    pub fn enter(transport: &'a mut T) -> Result<Self> {
        transport.enter()?;
        Ok(Self { transport })
    }

    pub fn transport(&mut self) -> &mut T {
        self.transport
    }
}

impl<T: Transport + ?Sized> Drop for TerminalGuard<'_, T> {
    fn drop(&mut self) {
        let _ = self.transport.leave();
    }
}

/// In-memory transport: replays queued input, records output.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    input: VecDeque<u8>,
    pub output: Vec<u8>,
    pub size: Option<ScreenSize>,
    pub entered: bool,
}

impl ScriptedTransport {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }
}

impl Transport for ScriptedTransport {
    fn read_byte(&mut self) -> Result<u8> {
        match self.input.pop_front() {
            Some(b) => Ok(b),
            None => bail!("scripted input exhausted"),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn screen_size(&mut self) -> Result<ScreenSize> {
        match self.size {
            Some(s) => Ok(s),
            None => query_screen_size(self),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.entered = true;
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        self.entered = false;
        Ok(())
    }
}
