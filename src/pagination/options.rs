use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::query_augmenter::Params;

/// Caller-supplied pagination options.
///
/// All fields have defaults, so this deserializes cleanly from a partial
/// JSON body or query-string map. `filters` entries are AND-combined,
/// `search` entries OR-combined; keys are dotted field/association paths
/// resolved against the root entity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PaginatorOptions {
    /// 1-based page number
    #[validate(range(min = 1, message = "page numbering starts at 1"))]
    pub page: u32,

    /// Page size; absent means unpaginated
    #[validate(range(min = 1, message = "per_page must be a positive integer"))]
    pub per_page: Option<u32>,

    /// Order direction token, matched case-insensitively against the
    /// descending token set; anything else means ascending
    pub order: String,

    /// Dotted order path; defaults to the root entity's identifier fields
    pub order_by: Option<String>,

    /// OR-combined substring conditions
    pub search: Params,

    /// AND-combined conditions
    pub filters: Params,
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: None,
            order: "ASC".to_string(),
            order_by: None,
            search: Params::new(),
            filters: Params::new(),
        }
    }
}

impl PaginatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Add one AND-combined filter entry
    pub fn filter(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(path.into(), value.into());
        self
    }

    /// Add one OR-combined search entry
    pub fn search(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.search.insert(path.into(), value.into());
        self
    }
}
