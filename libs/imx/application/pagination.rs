//! Paginated listing engine
//!
//! Drives one backend list call per page until the upstream is exhausted.
//! Continuation runs in two phases:
//!
//! 1. Forward: follow `cursor` while the page reports `remaining > 0`.
//! 2. Sweep: once the cursor is exhausted, clear it and bound the next page by
//!    the last record's updated-at timestamp (`before`). Only assets sweep;
//!    collections and orders stop once `remaining` reaches 0.
//!
//! An empty page ends the walk in either phase. Boundaries are inclusive, so
//! a record whose timestamp equals `before` is returned again by the upstream
//! and kept.

use crate::domain::{
    Asset, AssetFilters, Collection, CollectionFilters, Continuation, Order, OrderFilters, Page,
    Record, ResourceKind,
};
use crate::infrastructure::client::{self, ClientError, MarketplaceBackend, SharedBackend};
use crate::infrastructure::shutdown::ShutdownManager;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Filter sets that can fetch one page of their record kind
#[async_trait]
pub trait PageQuery: Send + Sync {
    type Item: Record;

    async fn fetch_page(
        &self,
        backend: &dyn MarketplaceBackend,
        continuation: &Continuation,
    ) -> client::Result<Page<Self::Item>>;

    /// Maximum number of records to accumulate; 0 means no cap
    fn record_cap(&self) -> usize {
        0
    }
}

#[async_trait]
impl PageQuery for AssetFilters {
    type Item = Asset;

    async fn fetch_page(
        &self,
        backend: &dyn MarketplaceBackend,
        continuation: &Continuation,
    ) -> client::Result<Page<Asset>> {
        backend.list_assets(self, continuation).await
    }
}

#[async_trait]
impl PageQuery for CollectionFilters {
    type Item = Collection;

    async fn fetch_page(
        &self,
        backend: &dyn MarketplaceBackend,
        continuation: &Continuation,
    ) -> client::Result<Page<Collection>> {
        backend.list_collections(self, continuation).await
    }
}

#[async_trait]
impl PageQuery for OrderFilters {
    type Item = Order;

    async fn fetch_page(
        &self,
        backend: &dyn MarketplaceBackend,
        continuation: &Continuation,
    ) -> client::Result<Page<Order>> {
        backend.list_orders(self, continuation).await
    }

    fn record_cap(&self) -> usize {
        self.page_size
    }
}

/// Filters plus the state threaded between pages
#[derive(Debug, Clone)]
pub struct QueryConfig<F: PageQuery> {
    pub filters: F,
    pub continuation: Continuation,
    pub results: Vec<F::Item>,
}

impl<F: PageQuery> QueryConfig<F> {
    pub fn new(filters: F) -> Self {
        Self {
            filters,
            continuation: Continuation::default(),
            results: Vec::new(),
        }
    }
}

/// Why a listing stopped early
#[derive(Error, Debug)]
pub enum PaginationFailure {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("listing cancelled")]
    Cancelled,
}

/// A failed listing, carrying the records fetched before the failure
#[derive(Debug)]
pub struct PaginationError<R> {
    pub kind: ResourceKind,
    pub cause: PaginationFailure,
    pub partial: Vec<R>,
}

impl<R> PaginationError<R> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, PaginationFailure::Cancelled)
    }

    pub fn into_partial(self) -> Vec<R> {
        self.partial
    }
}

impl<R> fmt::Display for PaginationError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listing {} failed after {} records: {}",
            self.kind,
            self.partial.len(),
            self.cause
        )
    }
}

impl<R: fmt::Debug> std::error::Error for PaginationError<R> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Accumulated records, or the failure with whatever was fetched first
pub type ListResult<T> = std::result::Result<Vec<T>, PaginationError<T>>;

/// Runs listings against one backend
pub struct Paginator {
    backend: SharedBackend,
    shutdown: ShutdownManager,
    max_pages: Option<usize>,
}

impl Paginator {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            shutdown: ShutdownManager::new(),
            max_pages: None,
        }
    }

    /// Check `shutdown` before every page
    pub fn with_shutdown(mut self, shutdown: ShutdownManager) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Stop after `max_pages` fetches and return what was accumulated
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub async fn list_assets(&self, filters: AssetFilters) -> ListResult<Asset> {
        self.run(QueryConfig::new(filters)).await
    }

    pub async fn list_collections(&self, filters: CollectionFilters) -> ListResult<Collection> {
        self.run(QueryConfig::new(filters)).await
    }

    pub async fn list_orders(&self, filters: OrderFilters) -> ListResult<Order> {
        self.run(QueryConfig::new(filters)).await
    }

    /// Fetch pages until the walk terminates
    pub async fn run<F: PageQuery>(&self, mut query: QueryConfig<F>) -> ListResult<F::Item> {
        let kind = <F::Item as Record>::KIND;
        let cap = query.filters.record_cap();
        let mut pages = 0usize;

        loop {
            if !self.shutdown.is_running() {
                warn!(
                    "Listing {} cancelled after {} records",
                    kind,
                    query.results.len()
                );
                return Err(PaginationError {
                    kind,
                    cause: PaginationFailure::Cancelled,
                    partial: query.results,
                });
            }

            if let Some(max_pages) = self.max_pages {
                if pages >= max_pages {
                    warn!(
                        "Listing {} stopped at the {} page limit with {} records",
                        kind,
                        max_pages,
                        query.results.len()
                    );
                    return Ok(query.results);
                }
            }

            let page = match query
                .filters
                .fetch_page(self.backend.as_ref(), &query.continuation)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!("Failed to fetch {} page {}: {}", kind, pages + 1, e);
                    return Err(PaginationError {
                        kind,
                        cause: PaginationFailure::Client(e),
                        partial: query.results,
                    });
                }
            };
            pages += 1;

            if page.is_empty() {
                debug!("{} page {} is empty, listing complete", kind, pages);
                break;
            }

            let Page {
                result,
                cursor,
                remaining,
            } = page;

            debug!(
                "{} page {}: {} records, first updated {}, last updated {}, remaining {}",
                kind,
                pages,
                result.len(),
                result.first().and_then(Record::updated_at).unwrap_or("-"),
                result.last().and_then(Record::updated_at).unwrap_or("-"),
                remaining
            );

            query.results.extend(result);
            query.continuation.cursor = Some(cursor).filter(|c| !c.is_empty());

            let more = if cap > 0 {
                query.results.truncate(cap);
                query.results.len() < cap
            } else {
                true
            };

            if !more {
                debug!("{} cap of {} reached", kind, cap);
                break;
            }

            if remaining > 0 {
                continue;
            }

            if !kind.has_time_boundary() {
                break;
            }

            let boundary = query
                .results
                .last()
                .and_then(Record::updated_at)
                .map(str::to_string);

            match boundary {
                Some(before) => {
                    debug!("{} cursor exhausted, sweeping before {}", kind, before);
                    query.continuation.cursor = None;
                    query.continuation.before = Some(before);
                }
                None => {
                    warn!("Last {} record has no updated timestamp, ending listing", kind);
                    break;
                }
            }
        }

        info!(
            "Listed {} {} in {} page(s)",
            query.results.len(),
            kind,
            pages
        );
        Ok(query.results)
    }
}
