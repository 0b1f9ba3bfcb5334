//! Result-set cursor: the lazy front of every query.
//!
//! `try_next` is the only primitive; count/search/update/delete/to_vec are
//! built strictly on top of it (plus, where noted, one extra compiled
//! select). A cursor is single-threaded by construction (every call
//! mutates the page window) and shares nothing with its siblings except
//! the session's cache.


use crate::{
    db::{
        AttrMap, Overlay, Predicate, ReadConsistency, Session,
        factory,
        query::{SelectExpr, SelectOutput},
        remote::{ContinuationToken, Page, SelectOptions},
    },
    error::{Error, ErrorClass},
    obs::sink::MetricsEvent,
    traits::RecordValue,
    types::Id,
};
use std::marker::PhantomData;
use thiserror::Error as ThisError;

///
/// CursorError
/// Misuse of the cursor surface; state-machine corruption raises
/// `Error::cursor_invariant` instead.
///

#[derive(Debug, ThisError)]
pub enum CursorError {
    #[error("paginate requires a fresh cursor; this one has already fetched or fast-forwarded")]
    AlreadyIterated,

    #[error("page-backed cursors cannot paginate")]
    PageBackedPagination,

    #[error("page window exceeds the representable row offset")]
    PageWindowOverflow,
}

impl CursorError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::AlreadyIterated | Self::PageBackedPagination | Self::PageWindowOverflow => {
                ErrorClass::Unsupported
            }
        }
    }
}

///
/// CursorSource
///
/// Entry point into the state machine: a compiled query or a raw page
/// supplied by the caller. Mutually exclusive by construction.
///

enum CursorSource {
    Query(SelectExpr),
    /// Raw page; taken on first fetch.
    Page(Option<Page>),
}

///
/// CursorState
///
/// Persistent states of the machine. Fetching/Refetching are transient
/// inside `try_next`; the client is synchronous, so they are never
/// observable between calls. Exhausted is terminal and sticky.
///

enum CursorState {
    Unfetched,
    Ready { page: Page, pos: usize },
    Exhausted,
}

/// What `try_next` decided to do with the current state.
enum Advance {
    Yield,
    Initial,
    Refetch(ContinuationToken),
    Exhaust,
}

///
/// ResultSet
///

pub struct ResultSet<'a, R: RecordValue> {
    session: &'a Session,
    source: CursorSource,
    state: CursorState,
    consistency: ReadConsistency,
    overlay: Overlay,
    /// Token planted by `paginate`, consumed by the first real fetch.
    planted: Option<ContinuationToken>,
    _marker: PhantomData<fn() -> R>,
}

impl<'a, R> ResultSet<'a, R>
where
    R: RecordValue,
{
    pub(crate) fn from_query(
        session: &'a Session,
        expr: SelectExpr,
        consistency: ReadConsistency,
        overlay: Overlay,
    ) -> Self {
        Self {
            session,
            source: CursorSource::Query(expr),
            state: CursorState::Unfetched,
            consistency,
            overlay,
            planted: None,
            _marker: PhantomData,
        }
    }

    pub(crate) fn from_page(
        session: &'a Session,
        page: Page,
        consistency: ReadConsistency,
        overlay: Overlay,
    ) -> Self {
        Self {
            session,
            source: CursorSource::Page(Some(page)),
            state: CursorState::Unfetched,
            consistency,
            overlay,
            planted: None,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // The primitive
    // ------------------------------------------------------------------

    /// Advance the cursor by one record.
    ///
    /// `Ok(None)` is end-of-sequence and is permanent: once exhausted the
    /// cursor never refetches. A fetch failure leaves the page window
    /// untouched, so the same call can be retried.
    pub fn try_next(&mut self) -> Result<Option<R>, Error> {
        loop {
            let advance = match &self.state {
                CursorState::Unfetched => Advance::Initial,
                CursorState::Exhausted => Advance::Exhaust,
                CursorState::Ready { page, pos } => {
                    if *pos < page.rows.len() {
                        Advance::Yield
                    } else if let Some(token) = &page.next_token {
                        Advance::Refetch(token.clone())
                    } else {
                        Advance::Exhaust
                    }
                }
            };

            match advance {
                Advance::Yield => break,
                Advance::Initial => {
                    let page = self.initial_page()?;
                    self.state = CursorState::Ready { page, pos: 0 };
                }
                Advance::Refetch(token) => {
                    let page = self.fetch_page(Some(token))?;
                    self.state = CursorState::Ready { page, pos: 0 };
                }
                Advance::Exhaust => {
                    self.state = CursorState::Exhausted;
                    return Ok(None);
                }
            }
        }

        let CursorState::Ready { page, pos } = &mut self.state else {
            return Err(Error::cursor_invariant("advance chose yield without a ready page"));
        };
        let (name, attrs) = page.rows[*pos].clone();
        *pos += 1;

        let mut record = self.resolve_row(name, attrs)?;
        self.overlay.apply(&mut record)?;

        Ok(Some(record))
    }

    /// True once the cursor has permanently reached end-of-sequence.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.state, CursorState::Exhausted)
    }

    // ------------------------------------------------------------------
    // Draining operations (destructive by contract)
    // ------------------------------------------------------------------

    /// Count the records this cursor selects, fully consuming it.
    ///
    /// With `extra`, one additional scalar count is issued over
    /// `itemName() in (drained ids) and extra`; an empty drain short-circuits
    /// to zero since the store cannot express an empty `in` list.
    pub fn count(&mut self, extra: Option<Predicate>) -> Result<u64, Error> {
        let names = self.drain_names()?;

        let Some(extra) = extra else {
            return Ok(names.len() as u64);
        };
        if names.is_empty() {
            return Ok(0);
        }

        let mut expr = SelectExpr::new(R::COLLECTION);
        expr.output = SelectOutput::Count;
        expr.predicate = Some(Predicate::identity_in(names) & extra);
        let query = expr.compile().map_err(Error::from)?;

        self.session
            .select_count(R::COLLECTION, &query, &SelectOptions::new(self.consistency))
    }

    /// Narrow the drained result set with an extra predicate, producing a
    /// fresh cursor over `itemName() in (drained ids) and extra`.
    ///
    /// The identity list spends the per-select comparison budget, so this
    /// is only valid on small result sets; larger ones fail compilation
    /// here, before any request is made.
    pub fn search(&mut self, extra: Predicate) -> Result<ResultSet<'a, R>, Error> {
        let names = self.drain_names()?;

        if names.is_empty() {
            // Nothing to narrow; hand back an already-empty cursor.
            return Ok(Self::from_page(
                self.session,
                Page::final_page(Vec::new()),
                self.consistency,
                self.overlay.clone(),
            ));
        }

        let mut expr = SelectExpr::new(R::COLLECTION);
        expr.predicate = Some(Predicate::identity_in(names) & extra);
        expr.compile().map_err(Error::from)?;

        Ok(Self::from_query(
            self.session,
            expr,
            self.consistency,
            self.overlay.clone(),
        ))
    }

    /// Assign `changes` to every selected record and persist each one.
    ///
    /// Not atomic: the first failure aborts the drain with every earlier
    /// record already persisted. Returns how many rows were written.
    pub fn update(&mut self, changes: &AttrMap) -> Result<u64, Error> {
        let mut updated = 0u64;

        while let Some(mut record) = self.try_next()? {
            for (field, value) in changes.iter() {
                record.set_attr(field, value.clone())?;
            }

            let snapshot = record.to_attrs();
            let name = record.id().as_str().to_string();
            self.session.put_row(R::COLLECTION, &name, &snapshot)?;

            if let Err(err) = self.session.cache().set(R::COLLECTION, &name, &snapshot) {
                tracing::warn!(
                    collection = R::COLLECTION,
                    name = %name,
                    error = %err,
                    "cache refresh after update failed; entry may be stale"
                );
            }
            updated += 1;
        }

        Ok(updated)
    }

    /// Delete every selected record. Same partial-failure contract as
    /// `update`. Returns how many rows were deleted.
    pub fn delete(&mut self) -> Result<u64, Error> {
        let mut deleted = 0u64;

        while let Some(record) = self.try_next()? {
            let name = record.id().as_str().to_string();
            self.session.delete_row(R::COLLECTION, &name)?;

            if let Err(err) = self.session.cache().evict(R::COLLECTION, &name) {
                tracing::warn!(
                    collection = R::COLLECTION,
                    name = %name,
                    error = %err,
                    "cache eviction after delete failed; entry may linger"
                );
            }
            deleted += 1;
        }

        Ok(deleted)
    }

    /// Drain everything that remains, in order.
    pub fn to_vec(&mut self) -> Result<Vec<R>, Error> {
        let mut records = Vec::new();
        while let Some(record) = self.try_next()? {
            records.push(record);
        }

        Ok(records)
    }

    // ------------------------------------------------------------------
    // Pagination fast-forward
    // ------------------------------------------------------------------

    /// Fast-forward a fresh cursor to the start of page `page_number`
    /// (1-based) of `page_size` rows, chainably.
    ///
    /// Sets the cursor's limit to `page_size` when none was set. For pages
    /// past the first, one count-projection select is issued purely to
    /// harvest the continuation token at the page boundary; a result set
    /// shorter than the skipped window exhausts the cursor immediately.
    pub fn paginate(&mut self, page_size: u32, page_number: u32) -> Result<&mut Self, Error> {
        if !matches!(self.state, CursorState::Unfetched) || self.planted.is_some() {
            return Err(CursorError::AlreadyIterated.into());
        }
        let CursorSource::Query(expr) = &mut self.source else {
            return Err(CursorError::PageBackedPagination.into());
        };

        if expr.limit.is_none() {
            expr.limit = Some(page_size);
        }
        if page_number <= 1 {
            return Ok(self);
        }

        let skip = page_size
            .checked_mul(page_number - 1)
            .ok_or(CursorError::PageWindowOverflow)?;

        let mut probe = SelectExpr::new(expr.collection.clone());
        probe.output = SelectOutput::Count;
        probe.predicate = expr.predicate.clone();
        probe.order = expr.order.clone();
        probe.limit = Some(skip);
        let query = probe.compile().map_err(Error::from)?;

        let page = self
            .session
            .select(R::COLLECTION, &query, &SelectOptions::new(self.consistency))?;

        match page.next_token {
            Some(token) => self.planted = Some(token),
            None => self.state = CursorState::Exhausted,
        }

        Ok(self)
    }

    // ------------------------------------------------------------------
    // Fetch plumbing
    // ------------------------------------------------------------------

    fn initial_page(&mut self) -> Result<Page, Error> {
        let planted = self.planted.take();

        if let CursorSource::Page(slot) = &mut self.source {
            return slot
                .take()
                .ok_or_else(|| Error::cursor_invariant("raw result page consumed twice"));
        }

        self.fetch_page(planted)
    }

    fn fetch_page(&self, token: Option<ContinuationToken>) -> Result<Page, Error> {
        let CursorSource::Query(expr) = &self.source else {
            return Err(Error::cursor_invariant("page-backed cursor cannot fetch"));
        };

        let query = expr.compile().map_err(Error::from)?;
        let mut opts = SelectOptions::new(self.consistency);
        if let Some(token) = token {
            opts = opts.with_token(token);
        }

        self.session.select(R::COLLECTION, &query, &opts)
    }

    // ------------------------------------------------------------------
    // Cache-aside reconciliation
    // ------------------------------------------------------------------

    /// Resolve one remote row through the cache.
    ///
    /// A hit wins outright: the cached snapshot may reflect a local write
    /// the eventually-consistent select has not caught up with, so the
    /// remote attributes are discarded. A miss builds from the remote row
    /// and populates the cache best-effort. A backend failure is logged and
    /// re-raised, never treated as a miss.
    fn resolve_row(&self, name: String, attrs: AttrMap) -> Result<R, Error> {
        let id = Id::<R>::new(name);

        match self.session.cache().get(R::COLLECTION, id.as_str()) {
            Ok(Some(snapshot)) => {
                self.session.record(MetricsEvent::CacheHit {
                    collection: R::COLLECTION,
                });

                factory::from_snapshot(&id, &snapshot)
            }
            Ok(None) => {
                self.session.record(MetricsEvent::CacheMiss {
                    collection: R::COLLECTION,
                });

                let record = factory::from_remote(&id, &attrs)?;
                let snapshot = record.to_attrs();
                if let Err(err) = self.session.cache().set(R::COLLECTION, id.as_str(), &snapshot) {
                    tracing::warn!(
                        collection = R::COLLECTION,
                        name = %id,
                        error = %err,
                        "cache population failed; continuing with remote row"
                    );
                }

                Ok(record)
            }
            Err(err) => {
                self.session.record(MetricsEvent::CacheFault {
                    collection: R::COLLECTION,
                });
                tracing::error!(
                    collection = R::COLLECTION,
                    name = %id,
                    error = %err,
                    "cache lookup failed"
                );

                Err(err.into())
            }
        }
    }

    fn drain_names(&mut self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        while let Some(record) = self.try_next()? {
            names.push(record.id().as_str().to_string());
        }

        Ok(names)
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> Option<usize> {
        match &self.state {
            CursorState::Ready { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

impl<R: RecordValue> Iterator for ResultSet<'_, R> {
    type Item = Result<R, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}

impl<R: RecordValue> std::fmt::Debug for ResultSet<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSet").finish_non_exhaustive()
    }
}
