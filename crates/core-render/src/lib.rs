//! Incremental VT100 rendering of one editor session.
//!
//! Components:
//! - `row_cache`: per-row `(highlight, text)` snapshot of what the terminal
//!   shows, shifted in place when the viewport scrolls.
//! - `status`: status line text (modified marker, name, position, message,
//!   prompt input) truncated to the screen width.
//! - `writer`: ordered terminal commands serialized with crossterm.
//! - `render_engine`: `Renderer`, which diffs a session against the cache and
//!   produces the bytes for one frame.
//!
//! The renderer never talks to the terminal itself; it returns bytes and the
//! caller writes them through its transport.

pub mod render_engine;
pub mod row_cache;
pub mod status;
pub mod writer;

pub use render_engine::{RenderStats, Renderer};
pub use row_cache::{Highlight, RowCache, RowEntry};
pub use status::{StatusLine, compose_status};
