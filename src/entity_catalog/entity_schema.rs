use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Association cardinality from the owning entity to the target entity.
///
/// The distinction drives path resolution: to-one associations can be
/// filtered through a correlated subquery and ordered through a left join,
/// while to-many associations always require a left join for filtering and
/// are rejected for ordering (ordering across a fan-out is not well-defined).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// Declared type of an entity field.
///
/// Only `Boolean` changes predicate generation (equality against a mapped
/// literal instead of a LIKE substring match); the other variants exist so
/// catalogs can describe their entities faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    String,
    Integer,
    Float,
    DateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationSchema {
    /// Entity name the association points at
    pub target_entity: String,
    pub cardinality: Cardinality,
}

/// Metadata for one entity: declared fields with their types, named
/// associations, and the ordered identifier field list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    pub fields: HashMap<String, FieldType>,
    pub associations: HashMap<String, AssociationSchema>,
    /// Ordered list of identifier fields (composite identifiers supported)
    pub identifier_fields: Vec<String>,
}

impl EntitySchema {
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).copied()
    }

    pub fn association(&self, name: &str) -> Option<&AssociationSchema> {
        self.associations.get(name)
    }
}

/// Read-only entity metadata provider.
///
/// Implementations must be stable for the duration of one augmentation call;
/// they may be shared across concurrent calls.
pub trait EntityCatalog {
    fn entity_schema(&self, entity: &str) -> Option<&EntitySchema>;
}

/// In-memory `EntityCatalog`, keyed by entity name.
///
/// Usually built from a YAML definition via [`CatalogConfig`], but it can be
/// assembled programmatically by an embedding ORM layer as well.
///
/// [`CatalogConfig`]: super::config::CatalogConfig
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCatalog {
    entities: HashMap<String, EntitySchema>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: EntitySchema) {
        self.entities.insert(schema.name.clone(), schema);
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(|k| k.as_str())
    }
}

impl EntityCatalog for MemoryCatalog {
    fn entity_schema(&self, entity: &str) -> Option<&EntitySchema> {
        self.entities.get(entity)
    }
}
