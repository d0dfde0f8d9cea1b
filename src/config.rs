use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Paginator configuration with validation.
///
/// The only tunables are the string tokens recognized as boolean literals
/// when a filtered or searched field is declared `boolean`. Tokens are
/// compared against the stringified filter value, so numeric `1` and string
/// `"1"` behave identically.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// Tokens mapped to boolean true
    #[validate(length(min = 1, message = "At least one boolean-true token is required"))]
    pub boolean_true_values: Vec<String>,

    /// Tokens mapped to boolean false
    #[validate(length(min = 1, message = "At least one boolean-false token is required"))]
    pub boolean_false_values: Vec<String>,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            boolean_true_values: vec!["1".to_string(), "true".to_string()],
            boolean_false_values: vec!["0".to_string(), "false".to_string()],
        }
    }
}

impl PaginatorConfig {
    /// Create configuration from environment variables with validation.
    ///
    /// Token lists are comma-separated, e.g.
    /// `QUERYPAGER_BOOLEAN_TRUE_VALUES=1,true,yes`.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Pull in a .env file when present; missing files are not an error.
        dotenvy::dotenv().ok();

        let config = Self {
            boolean_true_values: parse_token_list("QUERYPAGER_BOOLEAN_TRUE_VALUES", "1,true"),
            boolean_false_values: parse_token_list("QUERYPAGER_BOOLEAN_FALSE_VALUES", "0,false"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// Parse a comma-separated environment variable with a default value
fn parse_token_list(key: &str, default: &str) -> Vec<String> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
