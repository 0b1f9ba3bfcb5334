use crate::{
    db::{
        AttrMap, Overlay, ReadConsistency,
        cache::RecordCache,
        cursor::ResultSet,
        query::LoadQuery,
        remote::{Page, RemoteExecutor, SelectOptions},
    },
    error::Error,
    obs::sink::{MetricsEvent, MetricsSink},
    traits::RecordValue,
};
use std::sync::Arc;

///
/// Session
///
/// Process-wide client handle with policy (debug, metrics) and execution
/// routing. Owns the remote executor and the shared record cache; every
/// cursor borrows the session, and across cursors the cache is the only
/// shared mutable state.
///

pub struct Session {
    executor: Arc<dyn RemoteExecutor>,
    cache: Arc<dyn RecordCache>,
    debug: bool,
    metrics: Option<&'static dyn MetricsSink>,
}

impl Session {
    #[must_use]
    pub fn new(executor: Arc<dyn RemoteExecutor>, cache: Arc<dyn RecordCache>) -> Self {
        Self {
            executor,
            cache,
            debug: false,
            metrics: None,
        }
    }

    /// Enable verbose execution logging on stdout.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Route instrumentation events into `sink`.
    #[must_use]
    pub fn metrics_sink(mut self, sink: &'static dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Start a declarative load query against `R`'s collection.
    #[must_use]
    pub fn load<R: RecordValue>(&self) -> LoadQuery<'_, R> {
        LoadQuery::new(self)
    }

    /// Wrap an already-fetched raw page in a cursor.
    ///
    /// This is the raw-result entry point; it is mutually exclusive with a
    /// declarative query and the returned cursor cannot refetch or paginate.
    #[must_use]
    pub fn load_page<R: RecordValue>(&self, page: Page) -> ResultSet<'_, R> {
        ResultSet::from_page(self, page, ReadConsistency::Eventual, Overlay::new())
    }

    // ------------------------------------------------------------------
    // Execution routing (cursor-facing)
    // ------------------------------------------------------------------

    pub(crate) fn cache(&self) -> &dyn RecordCache {
        self.cache.as_ref()
    }

    pub(crate) fn select(
        &self,
        collection: &'static str,
        query: &str,
        opts: &SelectOptions,
    ) -> Result<Page, Error> {
        self.debug_log(format!(
            "select on {collection} (consistency={:?}, resumed={}): {query}",
            opts.consistency,
            opts.token.is_some(),
        ));

        let page = self.executor.select(query, opts).map_err(Error::from)?;
        self.record(MetricsEvent::PageFetched {
            collection,
            rows: page.rows.len() as u64,
        });

        Ok(page)
    }

    pub(crate) fn select_count(
        &self,
        collection: &'static str,
        query: &str,
        opts: &SelectOptions,
    ) -> Result<u64, Error> {
        self.debug_log(format!("count on {collection}: {query}"));

        let total = self.executor.select_count(query, opts).map_err(Error::from)?;
        self.record(MetricsEvent::CountExecuted { collection });

        Ok(total)
    }

    pub(crate) fn put_row(
        &self,
        collection: &'static str,
        name: &str,
        attrs: &AttrMap,
    ) -> Result<(), Error> {
        self.debug_log(format!("put {collection}/{name}"));

        self.executor
            .put_row(collection, name, attrs)
            .map_err(Error::from)?;
        self.record(MetricsEvent::RowPersisted { collection });

        Ok(())
    }

    pub(crate) fn delete_row(&self, collection: &'static str, name: &str) -> Result<(), Error> {
        self.debug_log(format!("delete {collection}/{name}"));

        self.executor
            .delete_row(collection, name)
            .map_err(Error::from)?;
        self.record(MetricsEvent::RowDeleted { collection });

        Ok(())
    }

    pub(crate) fn record(&self, event: MetricsEvent) {
        if let Some(sink) = self.metrics {
            sink.record(event);
        }
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.debug {
            println!("[debug] {}", s.as_ref());
        }
    }
}
