//! Entity catalog configuration management.
//!
//! Catalogs are defined in YAML with the following structure:
//!
//! ```yaml
//! entities:
//!   - name: User
//!     identifiers: [id]
//!     fields:
//!       id: integer
//!       name: string
//!       active: boolean
//!     associations:
//!       profile:
//!         target: Profile
//!         cardinality: to_one
//!       roles:
//!         target: Role
//!         cardinality: to_many
//!   - name: Profile
//!     identifiers: [id]
//!     fields:
//!       id: integer
//!       name: string
//! ```
//!
//! Definitions are structurally validated before the catalog is built:
//! association targets must name declared entities and identifier fields
//! must be declared fields.

use super::entity_schema::{
    AssociationSchema, Cardinality, EntitySchema, FieldType, MemoryCatalog,
};
use super::errors::EntityCatalogError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Catalog definition loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    /// Ordered identifier field list
    #[serde(default)]
    pub identifiers: Vec<String>,
    pub fields: HashMap<String, FieldType>,
    #[serde(default)]
    pub associations: HashMap<String, AssociationDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationDefinition {
    pub target: String,
    pub cardinality: Cardinality,
}

impl CatalogConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, EntityCatalogError> {
        serde_yaml::from_str(content).map_err(|e| EntityCatalogError::ConfigParse {
            error: e.to_string(),
        })
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, EntityCatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EntityCatalogError::ConfigRead {
                error: e.to_string(),
            })?;
        Self::from_yaml_str(&content)
    }

    /// Validate the definitions and build an in-memory catalog
    pub fn build(self) -> Result<MemoryCatalog, EntityCatalogError> {
        let known: HashSet<&str> = self.entities.iter().map(|e| e.name.as_str()).collect();

        for entity in &self.entities {
            for id_field in &entity.identifiers {
                if !entity.fields.contains_key(id_field) {
                    return Err(EntityCatalogError::InvalidConfig {
                        message: format!(
                            "identifier `{}` of entity `{}` is not a declared field",
                            id_field, entity.name
                        ),
                    });
                }
            }
            for (assoc_name, assoc) in &entity.associations {
                if !known.contains(assoc.target.as_str()) {
                    return Err(EntityCatalogError::InvalidConfig {
                        message: format!(
                            "association `{}.{}` targets unknown entity `{}`",
                            entity.name, assoc_name, assoc.target
                        ),
                    });
                }
            }
        }

        let mut catalog = MemoryCatalog::new();
        for entity in self.entities {
            let associations = entity
                .associations
                .into_iter()
                .map(|(name, def)| {
                    (
                        name,
                        AssociationSchema {
                            target_entity: def.target,
                            cardinality: def.cardinality,
                        },
                    )
                })
                .collect();
            catalog.insert(EntitySchema {
                name: entity.name,
                fields: entity.fields,
                associations,
                identifier_fields: entity.identifiers,
            });
        }
        Ok(catalog)
    }
}

impl MemoryCatalog {
    /// Load and validate a catalog from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self, EntityCatalogError> {
        CatalogConfig::from_yaml_str(content)?.build()
    }

    /// Load and validate a catalog from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, EntityCatalogError> {
        CatalogConfig::from_yaml_file(path)?.build()
    }
}
