//! Turns filter and search maps into parameterized boolean expressions.
//!
//! Filters are AND-combined, search entries OR-combined. Boolean fields
//! compare against a mapped literal; every other field gets a substring
//! LIKE. Each comparison binds a fresh, call-unique parameter alias.

use log::warn;
use serde_json::Value;

use super::errors::QueryAugmenterError;
use super::path_resolver::{resolve_filter_path, AugmentContext, FilterTarget};
use super::Params;
use crate::config::PaginatorConfig;
use crate::entity_catalog::FieldType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Filters are exclusive
    And,
    /// Searches are inclusive
    Or,
}

impl Combinator {
    fn keyword(self) -> &'static str {
        match self {
            Combinator::And => " AND ",
            Combinator::Or => " OR ",
        }
    }
}

/// Build one parenthesized predicate from an ordered key/value map.
///
/// Returns an empty string for an empty map; the caller must then omit the
/// clause entirely.
pub fn build_predicate(
    ctx: &mut AugmentContext,
    config: &PaginatorConfig,
    root_entity: &str,
    root_alias: &str,
    entries: &Params,
    combinator: Combinator,
) -> Result<String, QueryAugmenterError> {
    if entries.is_empty() {
        return Ok(String::new());
    }

    let mut comparisons = Vec::with_capacity(entries.len());
    for (path, value) in entries {
        let target = resolve_filter_path(ctx, root_entity, root_alias, path)?;
        comparisons.push(render_comparison(ctx, config, &target, value)?);
    }
    Ok(format!("({})", comparisons.join(combinator.keyword())))
}

/// Render a single comparison for a resolved target, binding its parameter
/// and wrapping it in any to-one subquery scopes.
fn render_comparison(
    ctx: &mut AugmentContext,
    config: &PaginatorConfig,
    target: &FilterTarget,
    value: &Value,
) -> Result<String, QueryAugmenterError> {
    let schema = ctx.schema(&target.entity)?;
    let reference = ctx.aliases.next_param();

    let mut expr = if schema.field_type(&target.field) == Some(FieldType::Boolean) {
        let text = value_text(value);
        // False tokens win on overlap, matching construction-time precedence.
        let literal = if config.boolean_false_values.contains(&text) {
            "0"
        } else if config.boolean_true_values.contains(&text) {
            "1"
        } else {
            // Unrecognized literals match no row instead of erroring.
            warn!(
                "unrecognized boolean literal `{text}` for {}; binding sentinel -1",
                target.field_reference()
            );
            "-1"
        };
        ctx.params
            .insert(reference.clone(), Value::String(literal.to_string()));
        format!("{} = :{}", target.field_reference(), reference)
    } else {
        ctx.params.insert(
            reference.clone(),
            Value::String(format!("%{}%", value_text(value))),
        );
        format!("{} LIKE :{}", target.field_reference(), reference)
    };

    for scope in target.subqueries.iter().rev() {
        expr = format!(
            "{} IN (SELECT {} FROM {} {} WHERE {})",
            scope.source, scope.alias, scope.target_entity, scope.alias, expr
        );
    }
    Ok(expr)
}

/// String form of a filter value: strings verbatim, everything else via its
/// JSON rendering (`1` -> "1", `true` -> "true").
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
