use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    /// Malformed or unsupported request
    #[error("Protocol error: {0}")]
    ProtocolError(String),
    /// Idle connection
    #[error("Timeout: {0}")]
    TimeoutError(String),
    /// Listener could not be opened
    #[error("Failed to bind {addr}: {source}")]
    BindError {
        addr: String,
        source: std::io::Error,
    },
    /// Root directory missing or not a directory
    #[error("Root directory {} is not usable: {reason}", .path.display())]
    RootError { path: PathBuf, reason: String },
}

impl ServerError {
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        ServerError::BindError {
            addr: addr.into(),
            source,
        }
    }

    /// The peer went away or the socket broke; nothing to answer.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ServerError::IOError(e) if matches!(
            e.kind(),
            std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::UnexpectedEof
        ))
    }
}

