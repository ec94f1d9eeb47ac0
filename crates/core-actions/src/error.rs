//! Recoverable editing failures.
//!
//! None of these end the session: the shell turns each one into a status
//! message. `OutOfMemory` additionally makes the shell drop undo history and
//! the clipboard.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Bad pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid line number: {0}")]
    InvalidLineNumber(String),
    #[error("No file name")]
    NoFileName,
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Out of memory")]
    OutOfMemory,
}

impl EditError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EditError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::collections::TryReserveError> for EditError {
    fn from(_: std::collections::TryReserveError) -> Self {
        EditError::OutOfMemory
    }
}

impl From<regex::Error> for EditError {
    fn from(e: regex::Error) -> Self {
        EditError::InvalidPattern(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let e = EditError::io("notes.txt", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(e.to_string().starts_with("notes.txt: "));
        assert_eq!(EditError::NoFileName.to_string(), "No file name");
        assert_eq!(
            EditError::InvalidLineNumber("x".into()).to_string(),
            "Invalid line number: x"
        );
    }

    #[test]
    fn regex_errors_become_invalid_pattern() {
        let e: EditError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(e, EditError::InvalidPattern(_)));
    }
}
