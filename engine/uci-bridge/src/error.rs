//! Errors raised while talking to the engine process.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to launch engine {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Engine closed its output before sending `uciok`")]
    HandshakeFailed,

    #[error("Engine has not completed the handshake")]
    NotReady,

    #[error("Engine terminated before sending a move")]
    Terminated,

    #[error("Malformed engine reply: {0:?}")]
    MalformedReply(String),

    #[error("Engine I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EngineError {
    /// Whether the engine streams can no longer be trusted after this error.
    ///
    /// A malformed terminal line still ends the cycle cleanly, so it leaves the
    /// engine usable; anything that breaks the stream does not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EngineError::MalformedReply(_) | EngineError::NotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_and_io_errors_are_fatal() {
        assert!(EngineError::Terminated.is_fatal());
        assert!(EngineError::Io(io::Error::from(io::ErrorKind::BrokenPipe)).is_fatal());
        assert!(EngineError::HandshakeFailed.is_fatal());
    }

    #[test]
    fn malformed_reply_is_not_fatal() {
        assert!(!EngineError::MalformedReply("bestmove".into()).is_fatal());
    }
}
