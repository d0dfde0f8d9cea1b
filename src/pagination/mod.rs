//! Pagination execution: drives count and limited execution against the
//! host query engine and assembles the result envelope.

pub mod options;

pub use options::PaginatorOptions;

use log::debug;
use serde::Serialize;
use thiserror::Error;
use validator::Validate;

use crate::config::PaginatorConfig;
use crate::entity_catalog::EntityCatalog;
use crate::query_augmenter::{Params, QueryAugmenter, QueryAugmenterError};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Host query engine interface.
///
/// The engine parses and executes the final query text with its parameter
/// bindings. Calls are synchronous and treated as opaque, fail-fast
/// operations; retry and timeout policy belongs to the engine itself.
pub trait QueryEngine {
    type Row;

    /// Execute the full, unpaginated query
    fn execute(&self, query: &str, params: &Params) -> Result<Vec<Self::Row>, BoxError>;

    /// Execute with an optional row limit and a zero-based starting offset.
    /// The offset applies even when no limit was set.
    fn execute_paged(
        &self,
        query: &str,
        params: &Params,
        limit: Option<u32>,
        offset: u64,
    ) -> Result<Vec<Self::Row>, BoxError>;
}

#[derive(Debug, Error)]
pub enum PaginateError {
    #[error(transparent)]
    Augment(#[from] QueryAugmenterError),

    #[error("Invalid pagination options: {0}")]
    InvalidOptions(#[from] validator::ValidationErrors),

    #[error("Query engine error: {0}")]
    Engine(#[source] BoxError),
}

/// One page of results plus the metadata needed to render the paginated set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub total_pages: u32,
    pub current_page: u32,
    pub per_page: Option<u32>,
    /// Total matching row count, across all pages
    pub count: usize,
    pub data: Vec<T>,
}

/// Pagination front end.
///
/// Holds only the boolean-token configuration; every `paginate` call builds
/// its own augmentation state, so one `Paginator` may serve independent
/// concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginatorConfig,
}

impl Paginator {
    pub fn new(config: PaginatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// Augment `query` with the options, then execute it against `engine`:
    /// once unpaginated to obtain the total row count, once with
    /// limit/offset for the page data.
    ///
    /// `params` carries any parameters the caller had already bound on the
    /// base query; generated bindings are merged on top.
    pub fn paginate<E: QueryEngine>(
        &self,
        engine: &E,
        catalog: &dyn EntityCatalog,
        query: &str,
        params: Params,
        options: &PaginatorOptions,
    ) -> Result<Page<E::Row>, PaginateError> {
        options.validate()?;

        let augmented = QueryAugmenter::new(catalog, &self.config).augment(query, options)?;
        let mut bound = params;
        for (reference, value) in augmented.params {
            bound.insert(reference, value);
        }

        // The count executes the full query and counts rows. Intentionally
        // simple: it materializes the whole result set, which is a known
        // scalability limitation of this strategy.
        let rows = engine
            .execute(&augmented.text, &bound)
            .map_err(PaginateError::Engine)?;
        let count = rows.len();

        let total_pages = match options.per_page {
            Some(per_page) => count.div_ceil(per_page as usize) as u32,
            None => 1,
        };
        let offset = options
            .per_page
            .map(|per_page| u64::from(options.page) * u64::from(per_page) - u64::from(per_page))
            .unwrap_or(0);
        debug!(
            "pagination: count={count} total_pages={total_pages} page={} offset={offset}",
            options.page
        );

        let data = engine
            .execute_paged(&augmented.text, &bound, options.per_page, offset)
            .map_err(PaginateError::Engine)?;

        Ok(Page {
            total_pages,
            current_page: options.page,
            per_page: options.per_page,
            count,
            data,
        })
    }
}
