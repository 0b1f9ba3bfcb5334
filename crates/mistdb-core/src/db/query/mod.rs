mod fluent;
mod select;

pub use fluent::LoadQuery;
pub use select::{CompileError, ITEM_NAME, SelectExpr, SelectOutput};
