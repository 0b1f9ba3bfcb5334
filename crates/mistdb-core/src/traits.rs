use crate::{db::AttrMap, error::ErrorClass, types::Id, value::Value};
use thiserror::Error as ThisError;

// ============================================================================
// FOUNDATIONAL KINDS
// ============================================================================
//
// These traits define *where* something lives in the system,
// not what data it contains.
//

///
/// Path
/// Fully-qualified type path, used in diagnostics and error messages.
///

pub trait Path {
    const PATH: &'static str;
}

// ============================================================================
// RECORD IDENTITY & SHAPE
// ============================================================================

///
/// RecordCtor
///
/// Concrete-variant constructor resolved by recast dispatch.
///

pub type RecordCtor<R> = fn(&Id<R>, &AttrMap) -> Result<R, RecordError>;

///
/// RecordKind
///
/// Static metadata binding a record type to its remote collection.
///
/// ## Recast
/// When `RECAST_FIELD` names a discriminator attribute, each row's value for
/// that attribute selects the concrete variant via `resolve_variant`: one
/// explicit lookup, resolved once per row. An absent, non-text, or
/// unrecognized discriminator falls back to the nominal
/// `RecordValue::from_attrs` constructor.
///

pub trait RecordKind: Path + Sized + 'static {
    /// Remote collection (domain) the record lives in.
    const COLLECTION: &'static str;

    /// Attribute whose value selects the concrete variant, if any.
    const RECAST_FIELD: Option<&'static str> = None;

    /// Resolve a discriminator value to a concrete-variant constructor.
    #[must_use]
    fn resolve_variant(_tag: &str) -> Option<RecordCtor<Self>> {
        None
    }
}

///
/// RecordValue
///
/// Runtime hydration contract for a record type.
///
/// ## Semantics
/// - `from_attrs` is the nominal constructor; recast dispatch may route
///   around it to a variant constructor
/// - `to_attrs` must return the full persistable snapshot, including the
///   recast discriminator when one is declared
/// - the item name is never part of the snapshot
///

pub trait RecordValue: RecordKind {
    /// Build the nominal record from an attribute map.
    fn from_attrs(id: &Id<Self>, attrs: &AttrMap) -> Result<Self, RecordError>;

    /// Snapshot every persistable attribute of this record.
    fn to_attrs(&self) -> AttrMap;

    /// The item name this record was hydrated under.
    fn id(&self) -> &Id<Self>;

    /// Assign one field by name, as used by overlays and bulk updates.
    fn set_attr(&mut self, field: &str, value: Value) -> Result<(), RecordError>;
}

///
/// RecordError
/// Hydration and field-assignment failures owned by record types.
///

#[derive(Debug, ThisError)]
pub enum RecordError {
    #[error("missing required attribute '{field}' (record {record})")]
    MissingAttribute {
        record: &'static str,
        field: &'static str,
    },

    #[error("attribute '{field}' holds a {found} value where {expected} was expected (record {record})")]
    AttributeType {
        record: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown field '{field}' (record {record})")]
    UnknownField {
        record: &'static str,
        field: String,
    },
}

impl RecordError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingAttribute { .. } | Self::AttributeType { .. } => ErrorClass::Internal,
            Self::UnknownField { .. } => ErrorClass::Unsupported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorOrigin};

    #[test]
    fn record_errors_map_to_record_origin() {
        let err: Error = RecordError::UnknownField {
            record: "fixtures::Planet",
            field: "ring_count".to_string(),
        }
        .into();

        assert_eq!(err.origin, ErrorOrigin::Record);
        assert_eq!(err.class, ErrorClass::Unsupported);
        assert!(err.message.contains("ring_count"));
    }
}
