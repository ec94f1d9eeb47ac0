//! Configuration loading and editing settings.
//!
//! Two layers:
//! * `ConfigFile`: the on-disk `tinyed.toml` (`[editor]` table), parsed with
//!   serde. Unknown fields are ignored; a missing or malformed file falls back
//!   to defaults so a bad config never blocks editing.
//! * `Settings`: the runtime option set the dispatcher consults. Built from the
//!   config file, adjusted by CLI overrides, and edited interactively through
//!   the settings prompt (`format_settings_line` / `apply_settings_line`).
//!
//! The settings prompt edits a comma separated line:
//! `case, autoindent, tab size, comment, write tabs, regex, straight cursor`.
//! Flags accept `y`/`n` (also `yes`/`no`, `true`/`false`, `1`/`0`). Empty or
//! unparsable fields keep their previous value.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Cursor column policy across vertical motions and at line ends.
///
/// * `Clamped`: the column is clamped to the line length after every event and
///   left/right wrap across line boundaries.
/// * `Straight`: the column may overhang the end of a short line; left/right
///   never wrap. Typing in the overhang pads the line with spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorPolicy {
    #[default]
    Clamped,
    Straight,
}

impl CursorPolicy {
    /// The single predicate deciding whether a column may exceed the line length.
    pub fn allows_overhang(self) -> bool {
        matches!(self, CursorPolicy::Straight)
    }
    /// Whether left/right cross line boundaries.
    pub fn wraps_lines(self) -> bool {
        matches!(self, CursorPolicy::Clamped)
    }
}

/// Runtime editing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub case_sensitive: bool,
    pub autoindent: bool,
    pub tab_size: usize,
    pub comment: String,
    pub regex: bool,
    pub cursor_policy: CursorPolicy,
    /// Maximum undo (and redo) entries retained.
    pub undo_limit: usize,
    /// Trimmed line endings that trigger an extra indent step on Enter.
    pub block_openers: Vec<String>,
    /// Maximum lines scanned by bracket matching in either direction.
    pub bracket_scan_lines: usize,
}

pub const DEFAULT_TAB_SIZE: usize = 4;
pub const DEFAULT_UNDO_LIMIT: usize = 500;
pub const DEFAULT_BRACKET_SCAN_LINES: usize = 2000;

impl Default for Settings {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            autoindent: true,
            tab_size: DEFAULT_TAB_SIZE,
            comment: "# ".to_string(),
            regex: false,
            cursor_policy: CursorPolicy::Clamped,
            undo_limit: DEFAULT_UNDO_LIMIT,
            block_openers: vec![":".to_string(), "{".to_string()],
            bracket_scan_lines: DEFAULT_BRACKET_SCAN_LINES,
        }
    }
}

impl Settings {
    /// True when `trimmed` ends with one of the configured block openers.
    pub fn opens_block(&self, trimmed: &str) -> bool {
        self.block_openers
            .iter()
            .any(|m| !m.is_empty() && trimmed.ends_with(m.as_str()))
    }
}

fn flag(b: bool) -> &'static str {
    if b { "y" } else { "n" }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Render the settings prompt line for the current values.
pub fn format_settings_line(settings: &Settings, write_tabs: bool) -> String {
    format!(
        "{}, {}, {}, {}, {}, {}, {}",
        flag(settings.case_sensitive),
        flag(settings.autoindent),
        settings.tab_size,
        settings.comment.trim_end(),
        flag(write_tabs),
        flag(settings.regex),
        flag(settings.cursor_policy.allows_overhang()),
    )
}

/// Apply an edited settings line. Returns the number of fields that changed a
/// value. Fields that are empty or fail to parse are left untouched.
pub fn apply_settings_line(line: &str, settings: &mut Settings, write_tabs: &mut bool) -> usize {
    fn set_flag(slot: &mut bool, raw: &str) -> bool {
        match parse_flag(raw) {
            Some(v) if *slot != v => {
                *slot = v;
                true
            }
            _ => false,
        }
    }
    let mut changed = 0usize;
    for (idx, raw) in line.split(',').map(str::trim).enumerate() {
        if raw.is_empty() {
            continue;
        }
        let did_change = match idx {
            0 => set_flag(&mut settings.case_sensitive, raw),
            1 => set_flag(&mut settings.autoindent, raw),
            2 => match raw.parse::<usize>() {
                Ok(n) if (1..=32).contains(&n) && settings.tab_size != n => {
                    settings.tab_size = n;
                    true
                }
                _ => false,
            },
            3 => {
                // Comment markers get one separating space.
                let marker = format!("{raw} ");
                if settings.comment != marker {
                    settings.comment = marker;
                    true
                } else {
                    false
                }
            }
            4 => set_flag(write_tabs, raw),
            5 => set_flag(&mut settings.regex, raw),
            6 => {
                let mut straight = settings.cursor_policy.allows_overhang();
                let flipped = set_flag(&mut straight, raw);
                settings.cursor_policy = if straight {
                    CursorPolicy::Straight
                } else {
                    CursorPolicy::Clamped
                };
                flipped
            }
            _ => false,
        };
        if did_change {
            changed += 1;
        }
    }
    changed
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tab_size")]
    pub tab_size: usize,
    #[serde(default = "EditorConfig::default_true")]
    pub autoindent: bool,
    #[serde(default = "EditorConfig::default_true")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub regex: bool,
    #[serde(default = "EditorConfig::default_comment")]
    pub comment: String,
    #[serde(default)]
    pub straight_cursor: bool,
    #[serde(default = "EditorConfig::default_undo_limit")]
    pub undo_limit: usize,
    #[serde(default = "EditorConfig::default_block_openers")]
    pub block_openers: Vec<String>,
    #[serde(default = "EditorConfig::default_bracket_scan_lines")]
    pub bracket_scan_lines: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: Self::default_tab_size(),
            autoindent: true,
            case_sensitive: true,
            regex: false,
            comment: Self::default_comment(),
            straight_cursor: false,
            undo_limit: Self::default_undo_limit(),
            block_openers: Self::default_block_openers(),
            bracket_scan_lines: Self::default_bracket_scan_lines(),
        }
    }
}

impl EditorConfig {
    const fn default_tab_size() -> usize {
        DEFAULT_TAB_SIZE
    }
    const fn default_true() -> bool {
        true
    }
    fn default_comment() -> String {
        "# ".to_string()
    }
    const fn default_undo_limit() -> usize {
        DEFAULT_UNDO_LIMIT
    }
    fn default_block_openers() -> Vec<String> {
        vec![":".to_string(), "{".to_string()]
    }
    const fn default_bracket_scan_lines() -> usize {
        DEFAULT_BRACKET_SCAN_LINES
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("tinyed.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("tinyed").join("tinyed.toml");
    }
    PathBuf::from("tinyed.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(target: "config", path = %path.display(), "config_loaded");
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Runtime settings derived from the file values (tab size and undo limit
    /// clamp to at least 1).
    pub fn settings(&self) -> Settings {
        let e = &self.file.editor;
        Settings {
            case_sensitive: e.case_sensitive,
            autoindent: e.autoindent,
            tab_size: e.tab_size.clamp(1, 32),
            comment: e.comment.clone(),
            regex: e.regex,
            cursor_policy: if e.straight_cursor {
                CursorPolicy::Straight
            } else {
                CursorPolicy::Clamped
            },
            undo_limit: e.undo_limit.max(1),
            block_openers: e.block_openers.clone(),
            bracket_scan_lines: e.bracket_scan_lines.max(1),
        }
    }
}
