//! Remote executor boundary.
//!
//! Cursor logic MUST NOT depend on any concrete transport. Everything the
//! core needs from the store flows through `RemoteExecutor`; transports,
//! signing, and retry policy live behind it.

use crate::{
    db::{AttrMap, ReadConsistency},
    error::ErrorClass,
};
use thiserror::Error as ThisError;

///
/// ContinuationToken
/// Opaque resume cursor minted by the store. Never inspected, never
/// fabricated by this crate; it only travels back on the next request.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

///
/// Page
///
/// One page of a select result: ordered `(item name, attribute map)` rows
/// plus the store's resume token. No token means the final page; an empty
/// row list with a token present is NOT final.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Page {
    pub rows: Vec<(String, AttrMap)>,
    pub next_token: Option<ContinuationToken>,
}

impl Page {
    /// A final page carrying these rows.
    #[must_use]
    pub fn final_page(rows: Vec<(String, AttrMap)>) -> Self {
        Self {
            rows,
            next_token: None,
        }
    }

    /// A page that continues at `token`.
    #[must_use]
    pub fn partial(rows: Vec<(String, AttrMap)>, token: ContinuationToken) -> Self {
        Self {
            rows,
            next_token: Some(token),
        }
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.next_token.is_none()
    }
}

///
/// SelectOptions
/// Per-request execution options forwarded to the store.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectOptions {
    pub token: Option<ContinuationToken>,
    pub consistency: ReadConsistency,
}

impl SelectOptions {
    #[must_use]
    pub const fn new(consistency: ReadConsistency) -> Self {
        Self {
            token: None,
            consistency,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: ContinuationToken) -> Self {
        self.token = Some(token);
        self
    }
}

///
/// RemoteExecutor
///
/// The store, as seen from the cursor: paginated selects, scalar counts,
/// and the row write-back used by update/delete-over-results. Synchronous,
/// blocking, no timeouts at this layer.
///

pub trait RemoteExecutor: Send + Sync {
    /// Execute a compiled select, resuming at `opts.token` when present.
    fn select(&self, query: &str, opts: &SelectOptions) -> Result<Page, RemoteError>;

    /// Execute a compiled `count(*)` select and return the scalar total.
    fn select_count(&self, query: &str, opts: &SelectOptions) -> Result<u64, RemoteError>;

    /// Persist a full row snapshot under `collection`/`name`.
    fn put_row(&self, collection: &str, name: &str, attrs: &AttrMap) -> Result<(), RemoteError>;

    /// Delete the row stored under `collection`/`name`.
    fn delete_row(&self, collection: &str, name: &str) -> Result<(), RemoteError>;
}

///
/// RemoteError
///

#[derive(Debug, ThisError)]
pub enum RemoteError {
    /// The store parsed the request and refused it (unknown attribute,
    /// malformed expression, over-budget comparisons, ...).
    #[error("store rejected query ({code}): {message}")]
    Rejected { code: String, message: String },

    /// The store did not recognize the supplied continuation token.
    #[error("store rejected continuation token: {0}")]
    InvalidToken(String),

    /// The request never completed.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl RemoteError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Rejected { .. } | Self::InvalidToken(_) => ErrorClass::Unsupported,
            Self::Transport(_) => ErrorClass::Unavailable,
        }
    }
}
