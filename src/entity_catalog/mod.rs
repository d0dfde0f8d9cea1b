pub mod config;
pub mod entity_schema;
pub mod errors;

// Re-export commonly used types
pub use config::{AssociationDefinition, CatalogConfig, EntityDefinition};
pub use entity_schema::{
    AssociationSchema, Cardinality, EntityCatalog, EntitySchema, FieldType, MemoryCatalog,
};
pub use errors::EntityCatalogError;
