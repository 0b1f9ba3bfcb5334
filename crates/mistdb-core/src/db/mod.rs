mod attrs;
mod cache;
mod consistency;
mod cursor;
mod factory;
mod overlay;
mod predicate;
mod query;
mod remote;
mod session;

pub use attrs::AttrMap;
pub use cache::{CacheError, MemoryCache, RecordCache};
pub use consistency::ReadConsistency;
pub use cursor::{CursorError, ResultSet};
pub use factory::{from_remote, from_snapshot};
pub use overlay::Overlay;
pub use predicate::{
    CompareOp, ComparePredicate, FieldRef, OrderDirection, OrderSpec, Predicate,
};
pub use query::{CompileError, ITEM_NAME, LoadQuery, SelectExpr, SelectOutput};
pub use remote::{ContinuationToken, Page, RemoteError, RemoteExecutor, SelectOptions};
pub use session::Session;
