//! File collaborator: load, atomic save, directory listing.
//!
//! Loading expands tabs (width `FILE_TAB_WIDTH`) and reports whether any were
//! seen so saving can pack leading indentation back into tabs. Saving writes a
//! sibling temporary file and renames it over the destination, so a failed
//! write never leaves a truncated file behind.

use crate::EditError;
use core_text::tabs::{FILE_TAB_WIDTH, expand_tabs, pack_leading_tabs};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub lines: Vec<String>,
    /// At least one tab was expanded.
    pub had_tabs: bool,
}

/// Read `path` into lines (see `lines_from_text`).
pub fn read_lines(path: &Path) -> Result<LoadedFile, EditError> {
    let text = fs::read_to_string(path).map_err(|e| {
        error!(target: "io", path = %path.display(), error = %e, "file_read_failed");
        EditError::io(path, e)
    })?;
    let loaded = lines_from_text(&text)?;
    debug!(target: "io", path = %path.display(), lines = loaded.lines.len(), had_tabs = loaded.had_tabs, "file_loaded");
    Ok(loaded)
}

/// Split `text` into tab-expanded lines. A single trailing newline does not
/// produce an extra empty line and `\r\n` endings are accepted.
pub fn lines_from_text(text: &str) -> Result<LoadedFile, EditError> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    let mut lines = Vec::new();
    lines.try_reserve(body.matches('\n').count() + 1)?;
    let mut had_tabs = false;
    for raw in body.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let (line, tabs) = expand_tabs(raw, FILE_TAB_WIDTH);
        had_tabs |= tabs;
        lines.push(line);
    }
    Ok(LoadedFile { lines, had_tabs })
}

/// Write `lines` (each terminated by `\n`) to `path` through a temporary
/// sibling file. Returns the number of bytes written.
pub fn write_atomic(path: &Path, lines: &[String], pack_tabs: bool) -> Result<usize, EditError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let io_err = |e: std::io::Error| {
        error!(target: "io", path = %path.display(), error = %e, "file_write_failed");
        EditError::io(path, e)
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    if let Ok(meta) = fs::metadata(path) {
        // Keep the destination's permissions across the rename.
        tmp.as_file().set_permissions(meta.permissions()).map_err(io_err)?;
    }
    let mut written = 0usize;
    {
        let mut out = std::io::BufWriter::new(tmp.as_file_mut());
        for line in lines {
            let text = if pack_tabs {
                pack_leading_tabs(line, FILE_TAB_WIDTH)
            } else {
                line.clone()
            };
            out.write_all(text.as_bytes()).map_err(io_err)?;
            out.write_all(b"\n").map_err(io_err)?;
            written += text.len() + 1;
        }
        out.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    debug!(target: "io", path = %path.display(), bytes = written, lines = lines.len(), "file_saved");
    Ok(written)
}

/// Sorted entry names of directory `path`; directories carry a trailing `/`.
pub fn list_dir(path: &Path) -> Result<Vec<String>, EditError> {
    let entries = fs::read_dir(path).map_err(|e| EditError::io(path, e))?;
    let mut names = vec!["../".to_string()];
    for entry in entries {
        let entry = entry.map_err(|e| EditError::io(path, e))?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            name.push('/');
        }
        names.push(name);
    }
    names[1..].sort();
    debug!(target: "io", path = %path.display(), entries = names.len() - 1, "directory_listed");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn load_expands_tabs_and_strips_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        fs::write(&path, "a\r\n\tb\n").unwrap();
        let loaded = read_lines(&path).unwrap();
        assert_eq!(loaded.lines, vec!["a".to_string(), "        b".to_string()]);
        assert!(loaded.had_tabs);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_lines(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, EditError::Io { .. }));
    }

    #[test]
    fn save_round_trips_and_packs_tabs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let lines = vec!["x".to_string(), "         y".to_string()];
        let n = write_atomic(&path, &lines, true).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "x\n\t y\n");
        assert_eq!(n, written.len());
        write_atomic(&path, &lines, false).unwrap();
        assert_eq!(read_lines(&path).unwrap().lines, lines);
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("f.txt");
        assert!(matches!(
            write_atomic(&path, &["a".to_string()], false),
            Err(EditError::Io { .. })
        ));
    }

    #[test]
    fn directory_listing_is_sorted_with_parent_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        assert_eq!(
            list_dir(dir.path()).unwrap(),
            vec!["../".to_string(), "a/".to_string(), "b.txt".to_string()]
        );
    }
}
