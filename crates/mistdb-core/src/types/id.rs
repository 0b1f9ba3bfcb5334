use crate::{traits::RecordKind, value::Value};
use serde::{Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::{LazyLock, Mutex},
};
use ulid::Ulid;

///
/// GENERATOR is lazily initiated with a Mutex
/// it has to keep state so freshly minted names stay monotonic
///

static GENERATOR: LazyLock<Mutex<ulid::Generator>> =
    LazyLock::new(|| Mutex::new(ulid::Generator::new()));

///
/// Id
///
/// Typed item name for a record.
///
/// ## Purpose
/// `Id<R>` is a *boundary type*:
/// - used at query, cache, and write-back boundaries
/// - enforces record-kind correctness at compile time
/// - prevents accidental mixing of item names across collections
///
/// ## Storage model
/// - The store knows only the raw item-name string
/// - `Id<R>` never appears inside an attribute map; the identity
///   pseudo-field exists only in the query language
///

pub struct Id<R: RecordKind> {
    name: String,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Id<R>
where
    R: RecordKind,
{
    /// Construct a typed item name from its raw string form.
    ///
    /// ## Invariant
    /// Callers must already know that `name` addresses a row in
    /// `R::COLLECTION`. This function does **not** validate existence.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }

    /// Mint a fresh item name using the global monotonic ULID generator.
    #[must_use]
    pub fn generate() -> Self {
        let mut generator = GENERATOR.lock().expect("ulid generator mutex poisoned");
        let ulid = generator.generate().unwrap_or_else(|_| Ulid::new());

        Self::new(ulid.to_string())
    }

    /// Borrow the raw item-name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Consume the typed wrapper, returning the raw item name.
    #[must_use]
    pub fn into_name(self) -> String {
        self.name
    }

    /// Convert this item name into a semantic `Value`.
    ///
    /// Intended for identity predicates and diagnostics.
    #[must_use]
    pub fn as_value(&self) -> Value {
        Value::Text(self.name.clone())
    }
}

impl<R: RecordKind> Clone for Id<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R: RecordKind> fmt::Debug for Id<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id<{}>({})", R::PATH, self.name)
    }
}

impl<R: RecordKind> fmt::Display for Id<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<R: RecordKind> PartialEq for Id<R> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<R: RecordKind> Eq for Id<R> {}

impl<R: RecordKind> PartialOrd for Id<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: RecordKind> Ord for Id<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl<R: RecordKind> Hash for Id<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<R: RecordKind> Serialize for Id<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Planet;

    #[test]
    fn generated_names_are_distinct_and_monotonic() {
        let a = Id::<Planet>::generate();
        let b = Id::<Planet>::generate();

        assert_ne!(a, b);
        assert!(a < b, "later mint should sort after earlier mint");
    }

    #[test]
    fn display_is_the_raw_name() {
        let id = Id::<Planet>::new("P1");

        assert_eq!(id.to_string(), "P1");
        assert_eq!(id.as_str(), "P1");
    }

    #[test]
    fn as_value_projects_to_text() {
        let id = Id::<Planet>::new("P1");

        assert_eq!(id.as_value(), Value::Text("P1".to_string()));
    }
}
