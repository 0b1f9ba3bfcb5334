//! MistDB — a typed, cache-aware client for eventually-consistent
//! attribute stores.
//!
//! The store is reached only through paginated select requests; MistDB's
//! job is everything between those requests and your types:
//!
//! - a declarative query surface (`Session::load`) compiled to the store's
//!   select language, including the `itemName()` identity pseudo-column
//! - a lazy result-set cursor that walks continuation tokens on demand and
//!   layers count/search/update/delete/paginate on top of one primitive
//! - cache-aside reconciliation that lets a local snapshot override the
//!   eventually-consistent remote answer after a read-after-write
//! - recast dispatch, so each row hydrates into the concrete record
//!   variant its discriminator attribute names
//!
//! Transports, request signing, and attribute typing live behind the
//! `RemoteExecutor` and `RecordCache` traits; this crate never sees a wire
//! format.

// public exports are one module level down
pub use mistdb_core::{MAX_COMPARISONS, db, error, obs, traits, types, value};

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
///

pub mod prelude {
    pub use mistdb_core::prelude::*;
}
