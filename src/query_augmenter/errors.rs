use thiserror::Error;

/// Errors reported synchronously while augmenting a query.
///
/// Every kind originates from caller-supplied input (the base query text or
/// a filter/search/order key), except `UnknownEntity`, which indicates an
/// inconsistent catalog. Callers typically surface these as client-input
/// errors. Augmentation aborts on the first error with no partial query text
/// produced.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryAugmenterError {
    #[error("No FROM clause found; queries must contain `FROM <Entity> <alias>`")]
    MalformedQuery,

    #[error("Invalid root alias `{alias}` (reserved keyword; this usually means the alias is missing)")]
    InvalidAlias { alias: String },

    #[error("No entity schema found for `{entity}` (check catalog configuration)")]
    UnknownEntity { entity: String },

    #[error("`{field}` is not a field of entity `{entity}`")]
    UnknownField { entity: String, field: String },

    #[error("`{association}` is not an association of entity `{entity}`")]
    UnknownAssociation { entity: String, association: String },

    #[error("Cannot order by `{association}`: only to-one associations can be traversed in ORDER BY")]
    InvalidOrderByAssociation { association: String },
}
