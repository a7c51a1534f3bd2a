//! Error Handling Module
//!
//! Every fallible operation in this crate returns [`MistyError`]. The variants
//! map one-to-one onto the failure classes a caller can act on:
//!
//! - [`ErrorKind::Transport`]: the request never produced an HTTP status
//! - [`ErrorKind::RemoteRejection`]: the device answered with a non-success status
//! - [`ErrorKind::Decode`]: a body that had to be JSON (or a known shape) was not
//! - [`ErrorKind::Io`]: a local directory or file operation failed
//! - [`ErrorKind::InvalidInput`]: a local argument was rejected before sending
//! - [`ErrorKind::Transcription`]: the offline recognizer failed
//!
//! # Example
//!
//! ```rust
//! use misty_client::error::{ErrorKind, MistyError};
//!
//! let error = MistyError::rejection(404, "not found");
//! assert_eq!(error.kind(), ErrorKind::RemoteRejection);
//! assert_eq!(error.status(), Some(404));
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse failure classification, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    RemoteRejection,
    Decode,
    Io,
    InvalidInput,
    Transcription,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::RemoteRejection => "remote-rejection",
            Self::Decode => "decode",
            Self::Io => "io",
            Self::InvalidInput => "invalid-input",
            Self::Transcription => "transcription",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the Misty client.
#[derive(Error, Debug)]
pub enum MistyError {
    /// Network-level failure (DNS, refused connection, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The device answered with a status outside the 2xx range.
    #[error("remote rejected request with status {status}: {body}")]
    RemoteRejection { status: u16, body: String },

    /// A body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Local filesystem failure.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid local input (filename, header, URL, log settings).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The speech recognizer failed on an input file.
    #[error("transcription error: {0}")]
    Transcription(String),
}

impl MistyError {
    /// Create a remote rejection error.
    pub fn rejection(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteRejection {
            status,
            body: body.into(),
        }
    }

    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::RemoteRejection { .. } => ErrorKind::RemoteRejection,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Io { .. } => ErrorKind::Io,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Transcription(_) => ErrorKind::Transcription,
        }
    }

    /// HTTP status of a remote rejection, if any.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::RemoteRejection { .. })
    }
}

impl From<reqwest::Error> for MistyError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for MistyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_every_variant() {
        assert_eq!(
            MistyError::Transport("refused".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(MistyError::rejection(500, "").kind(), ErrorKind::RemoteRejection);
        assert_eq!(MistyError::Decode("eof".into()).kind(), ErrorKind::Decode);
        assert_eq!(
            MistyError::io("/tmp/x", std::io::Error::other("boom")).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            MistyError::InvalidInput("empty".into()).kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn status_only_for_rejections() {
        assert_eq!(MistyError::rejection(503, "busy").status(), Some(503));
        assert_eq!(MistyError::Transport("dns".into()).status(), None);
    }

    #[test]
    fn io_error_message_names_path() {
        let err = MistyError::io("out/a.wav", std::io::Error::other("disk full"));
        let msg = err.to_string();
        assert!(msg.contains("out/a.wav"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ErrorKind::RemoteRejection.to_string(), "remote-rejection");
        assert_eq!(ErrorKind::Io.as_str(), "io");
    }
}
