//! querypager - Dynamic filtering, searching, ordering and pagination for
//! entity queries
//!
//! This crate takes an already-written entity query (`SELECT u FROM User u`),
//! augments it with caller-supplied filters, free-text search, ordering and
//! pagination options, and drives a host query engine to produce a paginated
//! result envelope. It provides:
//! - Clause extraction that preserves hand-written WHERE/GROUP BY/ORDER BY
//!   fragments ahead of anything generated
//! - Dotted-path resolution against entity metadata (left joins for to-many
//!   associations, correlated subqueries for to-one filters)
//! - Parameterized predicate generation (AND-combined filters, OR-combined
//!   search)
//! - Group-by correctness under to-many joins

pub mod config;
pub mod entity_catalog;
pub mod pagination;
pub mod query_augmenter;

pub use config::{ConfigError, PaginatorConfig};
pub use entity_catalog::{
    AssociationSchema, Cardinality, EntityCatalog, EntitySchema, FieldType, MemoryCatalog,
};
pub use pagination::{Page, PaginateError, Paginator, PaginatorOptions, QueryEngine};
pub use query_augmenter::{AugmentedQuery, Params, QueryAugmenter, QueryAugmenterError};
