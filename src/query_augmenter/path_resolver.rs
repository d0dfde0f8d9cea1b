//! Resolves dotted field/association paths against entity metadata.
//!
//! Filtering and ordering follow different policies:
//! - Filtering a to-one association nests a correlated subquery with a fresh
//!   alias per traversal (never deduplicated).
//! - Filtering a to-many association registers a LEFT JOIN, once per target
//!   entity per call, and later traversals reuse the same join alias.
//! - Ordering joins through to-one associations and rejects to-many ones.

use std::collections::HashMap;

use super::errors::QueryAugmenterError;
use super::Params;
use crate::entity_catalog::{Cardinality, EntityCatalog, EntitySchema};

/// Two independent monotonically increasing counters, scoped to one
/// augmentation call: one for parameter aliases, one for association aliases.
#[derive(Debug)]
pub struct AliasAllocator {
    param_seq: u32,
    join_seq: u32,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self {
            param_seq: 1,
            join_seq: 1,
        }
    }

    pub fn next_param(&mut self) -> String {
        let reference = format!("prm_ref{}", self.param_seq);
        self.param_seq += 1;
        reference
    }

    pub fn next_join(&mut self) -> String {
        let reference = format!("cls_ref{}", self.join_seq);
        self.join_seq += 1;
        reference
    }
}

impl Default for AliasAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call mutable state threaded through resolution and predicate
/// building. A fresh context is constructed for every augmentation call;
/// nothing here outlives it.
pub struct AugmentContext<'a> {
    catalog: &'a dyn EntityCatalog,
    pub aliases: AliasAllocator,
    /// Generated `LEFT JOIN` fragments, in registration order
    pub join_sql: String,
    /// Target entity -> join alias, seeded with pre-existing joins
    joined: HashMap<String, String>,
    /// Parameters bound while building predicates
    pub params: Params,
}

impl<'a> AugmentContext<'a> {
    pub fn new(catalog: &'a dyn EntityCatalog, preregistered: HashMap<String, String>) -> Self {
        Self {
            catalog,
            aliases: AliasAllocator::new(),
            join_sql: String::new(),
            joined: preregistered,
            params: Params::new(),
        }
    }

    pub fn schema(&self, entity: &str) -> Result<&'a EntitySchema, QueryAugmenterError> {
        self.catalog
            .entity_schema(entity)
            .ok_or_else(|| QueryAugmenterError::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    /// Register a LEFT JOIN for `owner_alias.association`, deduplicated by
    /// target entity. Returns the join alias to resolve against.
    fn register_join(&mut self, owner_alias: &str, association: &str, target: &str) -> String {
        if let Some(existing) = self.joined.get(target) {
            return existing.clone();
        }
        let reference = self.aliases.next_join();
        self.join_sql
            .push_str(&format!(" LEFT JOIN {owner_alias}.{association} {reference}"));
        self.joined.insert(target.to_string(), reference.clone());
        reference
    }
}

/// One to-one traversal that must be rendered as a correlated subquery
#[derive(Debug, Clone, PartialEq)]
pub struct SubqueryScope {
    /// Owning reference, e.g. `u.profile`
    pub source: String,
    pub target_entity: String,
    /// Fresh alias for this subquery only
    pub alias: String,
}

/// A filter/search path resolved down to a terminal field, plus the to-one
/// subquery scopes (outermost first) the comparison must be wrapped in.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTarget {
    /// Entity owning the terminal field
    pub entity: String,
    /// Alias the terminal field is referenced through
    pub alias: String,
    pub field: String,
    pub subqueries: Vec<SubqueryScope>,
}

impl FilterTarget {
    pub fn field_reference(&self) -> String {
        format!("{}.{}", self.alias, self.field)
    }
}

/// Resolve a dotted path for filtering purposes.
pub fn resolve_filter_path(
    ctx: &mut AugmentContext,
    entity: &str,
    alias: &str,
    path: &str,
) -> Result<FilterTarget, QueryAugmenterError> {
    let mut entity = entity.to_string();
    let mut alias = alias.to_string();
    let mut subqueries = Vec::new();
    let mut rest = path;

    loop {
        let schema = ctx.schema(&entity)?;
        let Some((head, tail)) = rest.split_once('.') else {
            if !schema.has_field(rest) {
                return Err(QueryAugmenterError::UnknownField {
                    entity,
                    field: rest.to_string(),
                });
            }
            return Ok(FilterTarget {
                entity,
                alias,
                field: rest.to_string(),
                subqueries,
            });
        };

        let association =
            schema
                .association(head)
                .ok_or_else(|| QueryAugmenterError::UnknownAssociation {
                    entity: entity.clone(),
                    association: head.to_string(),
                })?;

        match association.cardinality {
            Cardinality::ToOne => {
                let sub_alias = ctx.aliases.next_join();
                subqueries.push(SubqueryScope {
                    source: format!("{alias}.{head}"),
                    target_entity: association.target_entity.clone(),
                    alias: sub_alias.clone(),
                });
                entity = association.target_entity.clone();
                alias = sub_alias;
            }
            Cardinality::ToMany => {
                let target = association.target_entity.clone();
                let join_alias = ctx.register_join(&alias, head, &target);
                entity = target;
                alias = join_alias;
            }
        }
        rest = tail;
    }
}

/// Resolve a dotted path for ordering purposes, returning a plain field
/// reference.
pub fn resolve_order_path(
    ctx: &mut AugmentContext,
    entity: &str,
    alias: &str,
    path: &str,
) -> Result<String, QueryAugmenterError> {
    let schema = ctx.schema(entity)?;
    let Some((head, tail)) = path.split_once('.') else {
        if !schema.has_field(path) {
            return Err(QueryAugmenterError::UnknownField {
                entity: entity.to_string(),
                field: path.to_string(),
            });
        }
        return Ok(format!("{alias}.{path}"));
    };

    let association =
        schema
            .association(head)
            .ok_or_else(|| QueryAugmenterError::UnknownAssociation {
                entity: entity.to_string(),
                association: head.to_string(),
            })?;

    match association.cardinality {
        Cardinality::ToOne => {
            let target = association.target_entity.clone();
            let join_alias = ctx.register_join(alias, head, &target);
            resolve_order_path(ctx, &target, &join_alias, tail)
        }
        Cardinality::ToMany => Err(QueryAugmenterError::InvalidOrderByAssociation {
            association: head.to_string(),
        }),
    }
}
