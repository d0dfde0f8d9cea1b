//! The query augmentation engine.
//!
//! Rewrites an already-written entity query with caller-supplied filters,
//! search, ordering and grouping, producing new query text plus the
//! parameters bound while generating predicates. All per-call mutable state
//! (alias counters, join list, parameter bindings) lives in an
//! [`AugmentContext`] constructed fresh for every call; nothing is retained
//! across calls.

pub mod clause_extractor;
pub mod composer;
pub mod errors;
pub mod path_resolver;
pub mod predicate_builder;

pub use clause_extractor::QueryShape;
pub use errors::QueryAugmenterError;
pub use path_resolver::{AliasAllocator, AugmentContext, FilterTarget, SubqueryScope};
pub use predicate_builder::Combinator;

use log::debug;

use crate::config::PaginatorConfig;
use crate::entity_catalog::EntityCatalog;
use crate::pagination::PaginatorOptions;

/// Ordered key/value map. Keys keep their insertion order, which makes
/// generated parameter aliases and predicate order deterministic.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// The rewritten query text plus the parameters bound while generating it.
/// The caller's own pre-bound parameters are not included.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedQuery {
    pub text: String,
    pub params: Params,
}

/// Stateless augmentation front end over a catalog and a configuration.
///
/// Cheap to construct; hold one per call or share one across threads, both
/// are fine — every `augment` call builds its own working state.
pub struct QueryAugmenter<'a> {
    catalog: &'a dyn EntityCatalog,
    config: &'a PaginatorConfig,
}

impl<'a> QueryAugmenter<'a> {
    pub fn new(catalog: &'a dyn EntityCatalog, config: &'a PaginatorConfig) -> Self {
        Self { catalog, config }
    }

    /// Augment `query` with the filter/search/order options, returning the
    /// recomposed text and generated parameter bindings.
    ///
    /// Errors abort immediately; no partial query text is produced.
    pub fn augment(
        &self,
        query: &str,
        options: &PaginatorOptions,
    ) -> Result<AugmentedQuery, QueryAugmenterError> {
        let shape = clause_extractor::extract(self.catalog, query)?;
        let mut ctx = AugmentContext::new(self.catalog, shape.preregistered_joins.clone());

        let filter_sentence = predicate_builder::build_predicate(
            &mut ctx,
            self.config,
            &shape.root_entity,
            &shape.root_alias,
            &options.filters,
            Combinator::And,
        )?;
        let search_sentence = predicate_builder::build_predicate(
            &mut ctx,
            self.config,
            &shape.root_entity,
            &shape.root_alias,
            &options.search,
            Combinator::Or,
        )?;

        // A mandatory ORDER BY always wins; the requested order is then
        // ignored without resolving it (and without joining for it).
        let order_by_sentence = if shape.mandatory_order_by.is_some() {
            String::new()
        } else {
            let requested = options
                .order_by
                .clone()
                .unwrap_or_else(|| shape.root_identifiers.join(", "));
            composer::build_order_by(&mut ctx, &shape, &requested, &options.order)?
        };

        let has_joins = shape.has_preexisting_joins || !ctx.join_sql.is_empty();
        let text = composer::compose(
            &shape,
            &ctx.join_sql,
            &filter_sentence,
            &search_sentence,
            &order_by_sentence,
            has_joins,
        );
        debug!("augmented query: {text}");

        Ok(AugmentedQuery {
            text,
            params: ctx.params,
        })
    }
}
