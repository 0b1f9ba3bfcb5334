use crate::{
    db::AttrMap,
    traits::{RecordError, RecordValue},
    value::Value,
};
use derive_more::Deref;

///
/// Overlay
///
/// Post-instantiation field assignments applied to every record a cursor
/// yields, after hydration and before delivery. Assignment order across
/// keys is unspecified; fields are independent. Overlaid values are never
/// persisted unless the caller explicitly writes the record back.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct Overlay(AttrMap);

impl Overlay {
    #[must_use]
    pub const fn new() -> Self {
        Self(AttrMap::new())
    }

    #[must_use]
    pub const fn from_attrs(attrs: AttrMap) -> Self {
        Self(attrs)
    }

    /// Builder-style assignment.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.0.insert(field.into(), value);
        self
    }

    pub(crate) fn apply<R: RecordValue>(&self, record: &mut R) -> Result<(), RecordError> {
        for (field, value) in self.0.iter() {
            record.set_attr(field, value.clone())?;
        }

        Ok(())
    }
}
