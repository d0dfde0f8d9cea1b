//! Decomposes raw query text into its structural pieces.
//!
//! The scan is keyword-anchored rather than a full grammar: the first
//! `FROM <Entity> <alias>` fragment names the root, pre-existing
//! `LEFT JOIN <alias>.<association> <ref>` fragments are registered so the
//! path resolver will not duplicate them, and trailing ORDER BY / GROUP BY /
//! WHERE fragments are cut out of the working text and preserved verbatim as
//! "mandatory" clauses that outrank anything generated later.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::errors::QueryAugmenterError;
use crate::entity_catalog::EntityCatalog;

/// Alias tokens that usually indicate a missing alias in the caller's query
pub const RESERVED_ALIASES: [&str; 7] =
    ["WHERE", "JOIN", "INNER", "RIGHT", "LEFT", "GROUP", "INDEX"];

/// Matches the first `FROM <Entity> <alias>` fragment.
/// Captures: (1) entity, (2) alias
static FROM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bFROM\s+(\S+)\s+(\S+)").unwrap());

/// Matches the first WHERE keyword (word-bounded, case-insensitive)
static WHERE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bWHERE\b").unwrap());

/// Structural pieces of one query, owned by a single augmentation call.
#[derive(Debug, Clone)]
pub struct QueryShape {
    pub root_entity: String,
    pub root_alias: String,
    /// Ordered identifier fields of the root entity
    pub root_identifiers: Vec<String>,
    /// Working text: the original query with mandatory fragments removed
    pub body: String,
    /// Mandatory WHERE clause body, without the keyword
    pub mandatory_where: Option<String>,
    /// Mandatory GROUP BY fragment, including the keyword
    pub mandatory_group_by: Option<String>,
    /// Mandatory ORDER BY fragment, including the keyword
    pub mandatory_order_by: Option<String>,
    /// Target entity -> alias of a pre-existing root-alias LEFT JOIN
    pub preregistered_joins: HashMap<String, String>,
    /// Whether the original text already joined at least one association
    pub has_preexisting_joins: bool,
}

/// Extract the root settings and mandatory fragments from raw query text.
pub fn extract(
    catalog: &dyn EntityCatalog,
    query: &str,
) -> Result<QueryShape, QueryAugmenterError> {
    let captures = FROM_PATTERN
        .captures(query)
        .ok_or(QueryAugmenterError::MalformedQuery)?;
    let root_entity = captures[1].to_string();
    let root_alias = captures[2].to_string();

    if RESERVED_ALIASES.contains(&root_alias.to_uppercase().as_str()) {
        return Err(QueryAugmenterError::InvalidAlias { alias: root_alias });
    }

    let root_schema =
        catalog
            .entity_schema(&root_entity)
            .ok_or_else(|| QueryAugmenterError::UnknownEntity {
                entity: root_entity.clone(),
            })?;

    let mut preregistered_joins = HashMap::new();
    let mut has_preexisting_joins = false;
    let join_pattern = left_join_pattern(&root_alias)?;
    for captures in join_pattern.captures_iter(query) {
        let association = &captures[1];
        let Some(assoc_schema) = root_schema.association(association) else {
            continue;
        };
        has_preexisting_joins = true;
        if let Some(join_alias) = captures.get(2).map(|m| m.as_str()) {
            if !is_clause_keyword(join_alias) {
                preregistered_joins
                    .insert(assoc_schema.target_entity.clone(), join_alias.to_string());
            }
        }
    }

    let mut body = query.to_string();
    let mandatory_order_by = extract_trailing(&mut body, " ORDER BY ");
    let mandatory_group_by = extract_trailing(&mut body, " GROUP BY ");
    let mandatory_where = extract_where(&mut body);

    Ok(QueryShape {
        root_identifiers: root_schema.identifier_fields.clone(),
        root_entity,
        root_alias,
        body,
        mandatory_where,
        mandatory_group_by,
        mandatory_order_by,
        preregistered_joins,
        has_preexisting_joins,
    })
}

/// Matches `LEFT JOIN <alias>.<association> [<ref>]` on the root alias.
/// Captures: (1) association, (2) optional join alias
fn left_join_pattern(root_alias: &str) -> Result<Regex, QueryAugmenterError> {
    Regex::new(&format!(
        r"(?i)\bLEFT\s+JOIN\s+{}\.(\w+)(?:\s+(\w+))?",
        regex::escape(root_alias)
    ))
    // The alias is regex-escaped, so compilation only fails on pathological
    // input (e.g. an alias long enough to blow the compiled-size limit).
    .map_err(|_| QueryAugmenterError::InvalidAlias {
        alias: root_alias.to_string(),
    })
}

/// Tokens that can trail a join fragment without being its alias
fn is_clause_keyword(token: &str) -> bool {
    let upper = token.to_uppercase();
    RESERVED_ALIASES.contains(&upper.as_str()) || matches!(upper.as_str(), "ORDER" | "ON" | "HAVING")
}

/// Cut the last `keyword ...` fragment off the end of `body`, provided the
/// fragment contains no closing parenthesis. The guard keeps us from
/// stealing an ORDER BY / GROUP BY that lives inside a subquery rather than
/// at the outermost level.
fn extract_trailing(body: &mut String, keyword: &str) -> Option<String> {
    let pos = rfind_ascii_ci(body, keyword)?;
    let fragment = &body[pos..];
    if fragment.contains(')') {
        return None;
    }
    let fragment = fragment.trim().to_string();
    body.truncate(pos);
    Some(fragment)
}

/// Cut everything from the first WHERE keyword onward, returning the clause
/// body without the keyword. The text is removed even when the clause body
/// is empty.
fn extract_where(body: &mut String) -> Option<String> {
    let found = WHERE_PATTERN.find(body)?;
    let clause = body[found.end()..].trim().to_string();
    body.truncate(found.start());
    if clause.is_empty() {
        None
    } else {
        Some(clause)
    }
}

/// Last case-insensitive occurrence of an ASCII needle, as a byte offset
fn rfind_ascii_ci(text: &str, needle: &str) -> Option<usize> {
    let haystack = text.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .rev()
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}
