use crate::value::Value;
use derive_more::{Deref, DerefMut, IntoIterator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// AttrMap
///
/// Ordered attribute map: the row currency of the whole crate.
///
/// - Field order is canonical (sorted by name), so snapshots are
///   deterministic regardless of insertion order.
/// - The item name is never an entry; identity travels beside the map.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, IntoIterator, PartialEq, Serialize,
)]
pub struct AttrMap(BTreeMap<String, Value>);

impl AttrMap {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insertion, for fixtures and overlay construction.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    /// Borrow a field's text content, if present and textual.
    #[must_use]
    pub fn get_text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_text)
    }
}

impl FromIterator<(String, Value)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
