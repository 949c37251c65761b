//! YAML/JSON schema documents.
//!
//! A document lists entities in declaration order:
//!
//! ```yaml
//! entities:
//!   - name: Country
//!     fields:
//!       - { name: country_id, type: integer, primary_key: true }
//!       - { name: name, type: string }
//!     relations:
//!       - { name: brands, target: Brand, many: true }
//! ```

use super::{Entity, FieldRef, FieldType, RelationField, SchemaRegistry};
use crate::error::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Field declaration as written in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    /// `Entity.field`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

/// Relation declaration as written in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDecl {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub many: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_populates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

/// Entity declaration as written in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub relations: Vec<RelationDecl>,
}

/// A complete schema document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub entities: Vec<EntityDecl>,
}

impl SchemaDocument {
    /// Load a document, picking JSON for `.json` files and YAML otherwise
    pub fn load(path: &Path) -> Result<Self> {
        let document_error = |message: String| SchemaError::Document {
            path: path.to_path_buf(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| document_error(e.to_string()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&content).map_err(|e| document_error(e.to_string()))
        } else {
            serde_yaml_ng::from_str(&content).map_err(|e| document_error(e.to_string()))
        }
    }

    /// Convert declarations into entities and register them in order
    pub fn into_registry(self) -> Result<SchemaRegistry> {
        let entities = self
            .entities
            .into_iter()
            .map(EntityDecl::into_entity)
            .collect::<Result<Vec<_>>>()?;
        SchemaRegistry::from_entities(entities)
    }

    /// Capture a registry as a document (inverse of `into_registry`)
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        let entities = registry
            .all()
            .iter()
            .map(|entity| EntityDecl {
                name: entity.name.clone(),
                fields: entity
                    .fields
                    .iter()
                    .map(|f| FieldDecl {
                        name: f.name.clone(),
                        field_type: f.field_type,
                        nullable: f.is_nullable,
                        primary_key: f.is_primary_key(),
                        foreign_key: f.references().map(|r| r.to_string()),
                    })
                    .collect(),
                relations: entity
                    .relations
                    .iter()
                    .map(|r| RelationDecl {
                        name: r.name.clone(),
                        target: r.target.clone(),
                        many: r.is_many(),
                        back_populates: r.back_populates.clone(),
                        foreign_key: r.foreign_key.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self { entities }
    }
}

impl EntityDecl {
    fn into_entity(self) -> Result<Entity> {
        let mut builder = Entity::builder(self.name.as_str());

        for field in &self.fields {
            builder = match (&field.foreign_key, field.primary_key) {
                (Some(_), true) => {
                    return Err(SchemaError::ConflictingKeyRole {
                        entity: self.name.clone(),
                        field: field.name.clone(),
                    });
                }
                (Some(reference), false) => {
                    let target = FieldRef::parse(reference).ok_or_else(|| {
                        SchemaError::InvalidReference {
                            entity: self.name.clone(),
                            field: field.name.clone(),
                            reference: reference.clone(),
                        }
                    })?;
                    if field.nullable {
                        builder.optional_foreign_key(
                            &field.name,
                            field.field_type,
                            &target.entity,
                            &target.field,
                        )
                    } else {
                        builder.foreign_key(
                            &field.name,
                            field.field_type,
                            &target.entity,
                            &target.field,
                        )
                    }
                }
                (None, true) => builder.primary_key(&field.name, field.field_type),
                (None, false) if field.nullable => builder.optional(&field.name, field.field_type),
                (None, false) => builder.field(&field.name, field.field_type),
            };
        }

        for relation in self.relations {
            let mut declared = if relation.many {
                RelationField::many(relation.name, relation.target)
            } else {
                RelationField::one(relation.name, relation.target)
            };
            declared.back_populates = relation.back_populates;
            declared.foreign_key = relation.foreign_key;
            builder = builder.relation(declared);
        }

        builder.build()
    }
}
