//! Input sources producing `core_events::Event`s.
//!
//! The event loop pulls one event at a time through `EventSource`. Two
//! sources exist:
//! * `Vt100Decoder`: decodes the raw byte stream of any `Transport` with a
//!   fixed escape-sequence table (control bytes, CSI / SS3 keys, X10 and SGR
//!   mouse reports, UTF-8 text).
//! * `CrosstermEvents`: adapts crossterm's own terminal event reader.

use anyhow::Result;
use core_events::{Event, KeyModifiers};
use crossterm::event::KeyModifiers as CMods;

mod crossterm_events;
mod vt100;

pub use crossterm_events::CrosstermEvents;
pub use vt100::Vt100Decoder;

pub trait EventSource {
    /// Block until the next event is available.
    fn next_event(&mut self) -> Result<Event>;
}

pub(crate) fn map_mods(m: CMods) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CMods::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CMods::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CMods::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}

/// Modifier flags from an xterm modifier parameter (`1 + bitmask`).
pub(crate) fn xterm_mods(param: u32) -> KeyModifiers {
    let bits = param.saturating_sub(1);
    let mut out = KeyModifiers::empty();
    if bits & 1 != 0 {
        out |= KeyModifiers::SHIFT;
    }
    if bits & 2 != 0 {
        out |= KeyModifiers::ALT;
    }
    if bits & 4 != 0 {
        out |= KeyModifiers::CTRL;
    }
    out
}
