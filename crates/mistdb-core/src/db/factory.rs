//! Record factory: recast dispatch and snapshot re-hydration.
//!
//! Both entry points run the same single-lookup resolution; the difference
//! is provenance. Remote rows may carry any discriminator the store
//! returns, while cached snapshots were written post-recast and are assumed
//! already well-formed.

use crate::{
    db::AttrMap,
    error::Error,
    traits::{RecordCtor, RecordKind, RecordValue},
    types::Id,
};

/// Build a typed record from a freshly fetched remote row.
pub fn from_remote<R: RecordValue>(id: &Id<R>, attrs: &AttrMap) -> Result<R, Error> {
    build(id, attrs)
}

/// Re-hydrate a typed record from a cached snapshot.
pub fn from_snapshot<R: RecordValue>(id: &Id<R>, snapshot: &AttrMap) -> Result<R, Error> {
    build(id, snapshot)
}

fn build<R: RecordValue>(id: &Id<R>, attrs: &AttrMap) -> Result<R, Error> {
    let record = match recast_ctor::<R>(attrs) {
        Some(ctor) => ctor(id, attrs)?,
        None => R::from_attrs(id, attrs)?,
    };

    Ok(record)
}

/// One explicit lookup from discriminator value to variant constructor.
/// Absent, non-text, or unrecognized discriminators select the nominal type.
fn recast_ctor<R: RecordKind>(attrs: &AttrMap) -> Option<RecordCtor<R>> {
    let field = R::RECAST_FIELD?;
    let tag = attrs.get_text(field)?;

    R::resolve_variant(tag)
}
