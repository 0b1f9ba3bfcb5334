use crate::{
    db::{CacheError, CompileError, CursorError, RemoteError},
    traits::RecordError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured runtime error with a stable internal classification.
/// Every module-level error funnels into this type at the crate boundary;
/// callers branch on `class`/`origin`, not on message text.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    /// Construct an error with an explicit classification.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a cursor-origin invariant violation.
    pub(crate) fn cursor_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Cursor,
            message.into(),
        )
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Referenced row or collection does not exist.
    NotFound,

    /// Request is well-formed but not expressible against the store.
    Unsupported,

    /// Internal state reached a combination the design forbids.
    InvariantViolation,

    /// Unexpected failure inside this crate or a collaborator payload.
    Internal,

    /// A collaborator was reachable but refused or failed to serve.
    Unavailable,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Internal => "internal",
            Self::Unavailable => "unavailable",
        };

        f.write_str(s)
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Compile,
    Remote,
    Cache,
    Record,
    Cursor,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Compile => "compile",
            Self::Remote => "remote",
            Self::Cache => "cache",
            Self::Record => "record",
            Self::Cursor => "cursor",
        };

        f.write_str(s)
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Self::new(err.class(), ErrorOrigin::Compile, err.to_string())
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        Self::new(err.class(), ErrorOrigin::Remote, err.to_string())
    }
}

impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        Self::new(err.class(), ErrorOrigin::Cache, err.to_string())
    }
}

impl From<RecordError> for Error {
    fn from(err: RecordError) -> Self {
        Self::new(err.class(), ErrorOrigin::Record, err.to_string())
    }
}

impl From<CursorError> for Error {
    fn from(err: CursorError) -> Self {
        Self::new(err.class(), ErrorOrigin::Cursor, err.to_string())
    }
}
