//! Module: query::fluent
//! Responsibility: session-bound fluent load-query builder.
//! Does not own: compilation, fetching, or reconciliation.
//! Boundary: the declarative surface callers use to obtain a cursor.

use crate::{
    db::{
        Overlay, ReadConsistency, Session,
        cursor::ResultSet,
        predicate::{OrderDirection, OrderSpec, Predicate},
        query::select::SelectExpr,
    },
    traits::RecordValue,
    types::Id,
    value::Value,
};
use std::marker::PhantomData;

///
/// LoadQuery
///
/// Purely declarative: collects predicate, ordering, windowing, consistency,
/// and overlay, then hands a lazy cursor back from `results`. No request is
/// made until the cursor's first advance. Field names are accepted as
/// strings; the store validates them remotely.
///

pub struct LoadQuery<'a, R: RecordValue> {
    session: &'a Session,
    predicate: Option<Predicate>,
    order: Option<OrderSpec>,
    limit: Option<u32>,
    consistency: ReadConsistency,
    overlay: Overlay,
    _marker: PhantomData<fn() -> R>,
}

impl<'a, R> LoadQuery<'a, R>
where
    R: RecordValue,
{
    pub(crate) const fn new(session: &'a Session) -> Self {
        Self {
            session,
            predicate: None,
            order: None,
            limit: None,
            consistency: ReadConsistency::Eventual,
            overlay: Overlay::new(),
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Predicate refinement
    // ------------------------------------------------------------------

    /// Add a predicate, implicitly AND-ing with any existing predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = match self.predicate.take() {
            Some(existing) => Some(existing & predicate),
            None => Some(predicate),
        };
        self
    }

    /// Explicit AND combinator for predicates.
    #[must_use]
    pub fn and(self, predicate: Predicate) -> Self {
        self.filter(predicate)
    }

    /// Constrain to a single typed item name.
    #[must_use]
    pub fn by_id(self, id: &Id<R>) -> Self {
        self.filter(Predicate::identity_eq(id.as_str()))
    }

    /// Constrain to multiple typed item names.
    #[must_use]
    pub fn by_ids<I>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = Id<R>>,
    {
        self.filter(Predicate::identity_in(ids.into_iter().map(Id::into_name)))
    }

    // ------------------------------------------------------------------
    // Ordering and windowing
    // ------------------------------------------------------------------

    /// Sort ascending by `field`, replacing any previous sort key.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order = Some(OrderSpec::asc(field));
        self
    }

    /// Sort descending by `field`, replacing any previous sort key.
    #[must_use]
    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order = Some(OrderSpec::desc(field));
        self
    }

    /// Sort by the identity pseudo-field.
    #[must_use]
    pub fn order_by_identity(mut self, direction: OrderDirection) -> Self {
        self.order = Some(OrderSpec::identity(direction));
        self
    }

    /// Set or replace the result limit.
    #[must_use]
    pub const fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    // ------------------------------------------------------------------
    // Execution policy
    // ------------------------------------------------------------------

    /// Ask the store for read-after-write consistency on every fetch.
    #[must_use]
    pub const fn consistent(mut self) -> Self {
        self.consistency = ReadConsistency::Strong;
        self
    }

    /// Overlay one field assignment onto every yielded record.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.overlay = self.overlay.set(field, value);
        self
    }

    /// Replace the whole overlay.
    #[must_use]
    pub fn overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = overlay;
        self
    }

    // ------------------------------------------------------------------
    // Terminal
    // ------------------------------------------------------------------

    /// Finalize into a lazy result-set cursor. Nothing is fetched yet.
    #[must_use]
    pub fn results(self) -> ResultSet<'a, R> {
        let mut expr = SelectExpr::new(R::COLLECTION);
        expr.predicate = self.predicate;
        expr.order = self.order;
        expr.limit = self.limit;

        ResultSet::from_query(self.session, expr, self.consistency, self.overlay)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        db::{MemoryCache, Page, Predicate, Session},
        test_support::{MockExecutor, Planet, planet_attrs},
        types::Id,
        value::Value,
    };
    use std::sync::Arc;

    fn harness() -> (Arc<MockExecutor>, Session) {
        let executor = Arc::new(MockExecutor::new());
        let session = Session::new(executor.clone(), Arc::new(MemoryCache::new()));

        (executor, session)
    }

    fn page(names: &[&str]) -> Page {
        Page::final_page(
            names
                .iter()
                .map(|name| ((*name).to_string(), planet_attrs("blue")))
                .collect(),
        )
    }

    #[test]
    fn results_are_lazy_until_first_advance() {
        let (executor, session) = harness();
        executor.script_select("select * from `planets`", None, page(&["P1"]));

        let mut results = session.load::<Planet>().results();
        assert_eq!(executor.select_call_count(), 0, "construction fetches nothing");

        let _ = results.try_next().unwrap();
        assert_eq!(executor.select_call_count(), 1);
    }

    #[test]
    fn filter_and_composes_conjunctions_in_order() {
        let (executor, session) = harness();
        executor.script_select(
            "select * from `planets` where `color` = 'blue' and `mass` > 10",
            None,
            page(&["P1"]),
        );

        let records = session
            .load::<Planet>()
            .filter(Predicate::eq("color", Value::Text("blue".into())))
            .and(Predicate::gt("mass", Value::Uint(10)))
            .results()
            .to_vec()
            .unwrap();

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn by_ids_constrains_through_the_identity_pseudo_field() {
        let (executor, session) = harness();
        executor.script_select(
            "select * from `planets` where itemName() in ('P1','P2')",
            None,
            page(&["P1", "P2"]),
        );

        let records = session
            .load::<Planet>()
            .by_ids(vec![Id::new("P1"), Id::new("P2")])
            .results()
            .to_vec()
            .unwrap();

        assert_eq!(records.len(), 2);
    }

    #[test]
    fn ordering_and_limit_render_into_the_select() {
        let (executor, session) = harness();
        executor.script_select(
            "select * from `planets` where `color` = 'blue' order by `mass` desc limit 5",
            None,
            page(&["P1"]),
        );

        let records = session
            .load::<Planet>()
            .filter(Predicate::eq("color", Value::Text("blue".into())))
            .order_by_desc("mass")
            .limit(5)
            .results()
            .to_vec()
            .unwrap();

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn later_order_by_replaces_the_earlier_sort_key() {
        let (executor, session) = harness();
        executor.script_select(
            "select * from `planets` order by `mass`",
            None,
            page(&["P1"]),
        );

        let records = session
            .load::<Planet>()
            .order_by("color")
            .order_by("mass")
            .results()
            .to_vec()
            .unwrap();

        assert_eq!(records.len(), 1);
    }
}
