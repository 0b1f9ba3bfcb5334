//! Core runtime for MistDB: values, record traits, query compilation, and
//! the cache-reconciled result-set cursor exported via the `prelude`.

// public exports are one module level down
pub mod db;
pub mod error;
pub mod obs;
pub mod traits;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Maximum number of comparisons the store accepts in one select.
///
/// An `in` list spends one comparison per candidate, which is what bounds
/// `search` to small result sets.
pub const MAX_COMPARISONS: usize = 20;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, caches, codecs, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{AttrMap, Overlay, Predicate, ReadConsistency, Session},
        traits::{Path, RecordKind, RecordValue},
        types::Id,
        value::Value,
    };
}
