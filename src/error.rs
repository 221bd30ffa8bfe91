use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Step of the probe a failure happened in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Connecting,
    Handshaking,
    Probing,
    Classifying,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Connecting => "connecting",
            Phase::Handshaking => "handshaking",
            Phase::Probing => "probing",
            Phase::Classifying => "classifying",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),
    #[error("i/o failure: {0}")]
    Io(#[source] std::io::Error),
    #[error("connection closed by peer")]
    Closed,
    #[error("truncated record: expected {expected} bytes, received {received}")]
    Truncated { expected: usize, received: usize },
    #[error("record declares {declared} payload bytes, limit is {limit}")]
    Oversized { declared: usize, limit: usize },
    #[error("handshake incomplete after {records} records: {reason}")]
    HandshakeIncomplete { records: usize, reason: String },
    #[error("timed out while {phase}")]
    Timeout { phase: Phase },
}

/// Serializable category of a [`ProbeError`], reported alongside the verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConnectionFailure,
    IoFailure,
    Truncated,
    Oversized,
    HandshakeIncomplete,
    Timeout,
}

impl ProbeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::Connect(_) => ErrorKind::ConnectionFailure,
            ProbeError::Io(_) | ProbeError::Closed => ErrorKind::IoFailure,
            ProbeError::Truncated { .. } => ErrorKind::Truncated,
            ProbeError::Oversized { .. } => ErrorKind::Oversized,
            ProbeError::HandshakeIncomplete { .. } => ErrorKind::HandshakeIncomplete,
            ProbeError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Errors that end the stream mid-conversation rather than a local failure.
    pub fn is_stream_end(&self) -> bool {
        matches!(self, ProbeError::Closed | ProbeError::Truncated { .. })
    }
}
