use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EntityCatalogError {
    #[error("No entity schema found for `{entity}`")]
    Entity { entity: String },

    #[error("Failed to read catalog file: {error}")]
    ConfigRead { error: String },

    #[error("Failed to parse catalog: {error}")]
    ConfigParse { error: String },

    #[error("Invalid catalog: {message}")]
    InvalidConfig { message: String },
}
