// crates/tetherwire/src/errors.rs
//! Error codec: transport-safe snapshots of thrown errors.
//!
//! Errors cannot cross the channel as values, so the encode side captures
//! `{name, message, stack}` and the decode side reconstructs an error of an
//! equivalent category. The category registry is a small closed set; unknown
//! names always decode as `Generic`. Exact type identity is lost across
//! incompatible runtimes by design.

use std::backtrace::Backtrace;
use std::error;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// The closed set of error categories that survive the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Generic,
    Type,
    Range,
    Syntax,
    Reference,
}

impl ErrorKind {
    /// Stable wire name for this category.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Generic => "Error",
            ErrorKind::Type => "TypeError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Reference => "ReferenceError",
        }
    }

    /// Look up a category by wire name, falling back to `Generic`.
    pub fn from_name(name: &str) -> ErrorKind {
        match name {
            "TypeError" => ErrorKind::Type,
            "RangeError" => ErrorKind::Range,
            "SyntaxError" => ErrorKind::Syntax,
            "ReferenceError" => ErrorKind::Reference,
            _ => ErrorKind::Generic,
        }
    }
}

/// An error raised by an exposed target, or reconstructed from the wire.
#[derive(Debug, Clone)]
pub struct RemoteError {
    kind: ErrorKind,
    message: String,
    stack: String,
}

impl RemoteError {
    /// Create an error of the given category, capturing the current
    /// backtrace as the stack text.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Backtrace::capture().to_string(),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl error::Error for RemoteError {}

/// Transport-safe snapshot of a thrown error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub name: String,
    pub message: String,
    pub stack: String,
}

impl ErrorDescriptor {
    /// Encode side of the codec.
    pub fn capture(err: &RemoteError) -> Self {
        Self {
            name: err.kind().name().to_string(),
            message: err.message().to_string(),
            stack: err.stack().to_string(),
        }
    }

    /// Decode side: reconstruct an equivalent error, keeping the transported
    /// message and overwriting the local stack with the transported text.
    pub fn into_error(self) -> RemoteError {
        RemoteError {
            kind: ErrorKind::from_name(&self.name),
            message: self.message,
            stack: self.stack,
        }
    }
}
