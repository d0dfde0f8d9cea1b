//! Recomposes the final query text from the extracted shape and the
//! generated fragments.
//!
//! Fixed clause order: body through the FROM clause, generated association
//! joins, mandatory WHERE, filter predicate, search predicate, GROUP BY,
//! ORDER BY. Mandatory fragments always come ahead of (ORDER BY: instead of)
//! anything generated.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::clause_extractor::QueryShape;
use super::errors::QueryAugmenterError;
use super::path_resolver::{resolve_order_path, AugmentContext};

/// Tokens accepted as a descending order request
pub const DESCENDING_TOKENS: [&str; 10] = [
    "D",
    "DESC",
    "DESCENT",
    "DESCEND",
    "DESCENDENT",
    "DESCENDING",
    "DOWN",
    "L",
    "LOWER",
    "-1",
];

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static AFTER_OPEN_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\( ").unwrap());
static BEFORE_CLOSE_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" \)").unwrap());

/// Build the computed ORDER BY sentence. Only called when no mandatory
/// ORDER BY fragment was extracted; comma-separated segments are resolved
/// independently so composite identifiers order correctly.
pub fn build_order_by(
    ctx: &mut AugmentContext,
    shape: &QueryShape,
    order_by: &str,
    order: &str,
) -> Result<String, QueryAugmenterError> {
    let references = order_by
        .split(',')
        .map(|segment| {
            resolve_order_path(ctx, &shape.root_entity, &shape.root_alias, segment.trim())
        })
        .collect::<Result<Vec<_>, _>>()?
        .join(", ");

    let direction = if DESCENDING_TOKENS.contains(&order.to_uppercase().as_str()) {
        "DESC"
    } else {
        "ASC"
    };
    Ok(format!(" ORDER BY {references} {direction}"))
}

/// Build the GROUP BY sentence.
///
/// A mandatory fragment is completed with any root identifier fields it does
/// not already reference; grouping by the full root identifier restores
/// one-row-per-entity semantics under to-many joins. Without a mandatory
/// fragment, a GROUP BY is synthesized only when the query carries at least
/// one association join. Only the mandatory fragment's own text is scanned
/// for existing references; fields introduced by generated filters or search
/// are never considered.
pub fn build_group_by(shape: &QueryShape, has_joins: bool) -> String {
    match &shape.mandatory_group_by {
        Some(fragment) => {
            let present = referenced_fields(fragment, &shape.root_alias);
            let mut sentence = format!(" {fragment}");
            for identifier in &shape.root_identifiers {
                let reference = format!("{}.{}", shape.root_alias, identifier);
                if !present.contains(&reference) {
                    sentence.push_str(&format!(", {reference}"));
                }
            }
            sentence
        }
        None => {
            if !has_joins {
                return String::new();
            }
            let references = shape
                .root_identifiers
                .iter()
                .map(|identifier| format!("{}.{}", shape.root_alias, identifier))
                .collect::<Vec<_>>()
                .join(", ");
            format!(" GROUP BY {references}")
        }
    }
}

/// Merge everything into the final query text.
pub fn compose(
    shape: &QueryShape,
    join_sql: &str,
    filter_sentence: &str,
    search_sentence: &str,
    order_by_sentence: &str,
    has_joins: bool,
) -> String {
    let mut dql = shape.body.trim_end().to_string();
    dql.push_str(join_sql);

    if let Some(where_body) = &shape.mandatory_where {
        dql.push_str(&format!(" WHERE ({where_body})"));
    }
    if !filter_sentence.is_empty() {
        dql.push_str(if shape.mandatory_where.is_some() {
            " AND "
        } else {
            " WHERE "
        });
        dql.push_str(filter_sentence);
    }
    if !search_sentence.is_empty() {
        dql.push_str(
            if shape.mandatory_where.is_some() || !filter_sentence.is_empty() {
                " AND "
            } else {
                " WHERE "
            },
        );
        dql.push_str(search_sentence);
    }

    dql.push_str(&build_group_by(shape, has_joins));

    match &shape.mandatory_order_by {
        Some(fragment) => dql.push_str(&format!(" {fragment}")),
        None => dql.push_str(order_by_sentence),
    }

    tidy_whitespace(&dql)
}

/// Collapse whitespace runs and trim spaces adjacent to parentheses.
/// Cosmetic only; never changes query semantics.
pub fn tidy_whitespace(dql: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(dql, " ");
    let opened = AFTER_OPEN_PAREN.replace_all(&collapsed, "(");
    let closed = BEFORE_CLOSE_PAREN.replace_all(&opened, ")");
    closed.trim().to_string()
}

/// Alias-anchored field references present in a mandatory fragment.
/// A reference runs from `alias.` up to the next comma or whitespace.
fn referenced_fields(fragment: &str, alias: &str) -> HashSet<String> {
    let needle = format!("{alias}.");
    let mut references = HashSet::new();
    let mut offset = 0;
    while let Some(found) = fragment[offset..].find(&needle) {
        let begin = offset + found;
        let tail = &fragment[begin..];
        let end = tail
            .find(|c: char| c == ',' || c.is_whitespace())
            .unwrap_or(tail.len());
        if end > needle.len() {
            references.insert(tail[..end].to_string());
        }
        offset = begin + end.max(needle.len());
    }
    references
}
