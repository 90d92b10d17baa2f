//! Zone error types.

use std::path::PathBuf;

use tern_proto::ResponseCode;
use thiserror::Error;

/// Errors that can occur during zone operations.
///
/// Prerequisite and update outcomes such as NXRRSET are not errors; the
/// update engine returns them as [`ResponseCode`] values. These are the
/// failures around it.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// No zone encloses the requested name.
    #[error("zone not found: {name}")]
    ZoneNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// A zone with this origin is already registered.
    #[error("zone already exists: {name}")]
    ZoneExists {
        /// The zone origin.
        name: String,
    },

    /// Invalid zone data.
    #[error("invalid zone data: {message}")]
    InvalidZone {
        /// Description of the problem.
        message: String,
    },

    /// A lookup source file could not be parsed.
    #[error("{path}:{line}: {message}")]
    ParseError {
        /// File being read.
        path: PathBuf,
        /// Line number where the error occurred.
        line: usize,
        /// Description of the error.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] tern_proto::Error),
}

impl ZoneError {
    /// Creates a new invalid zone error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidZone {
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Returns the appropriate DNS response code for this error.
    pub fn response_code(&self) -> ResponseCode {
        match self {
            Self::ZoneNotFound { .. } => ResponseCode::NotAuth,
            Self::ZoneExists { .. } => ResponseCode::YXDomain,
            Self::InvalidZone { .. } | Self::Protocol(_) => ResponseCode::FormErr,
            Self::ParseError { .. } | Self::Io(_) => ResponseCode::ServFail,
        }
    }
}

/// Result type for zone operations.
pub type Result<T> = std::result::Result<T, ZoneError>;
