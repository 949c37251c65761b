//! Fluent entity declarations.
//!
//! ```ignore
//! let order = Entity::builder("Order")
//!     .primary_key("order_id", FieldType::Integer)
//!     .foreign_key("user_id", FieldType::Integer, "User", "user_id")
//!     .field("status", FieldType::String)
//!     .relation(RelationField::one("user", "User").back_populates("orders"))
//!     .build()?;
//! ```

use super::{Entity, Field, FieldId, FieldRef, FieldRole, FieldType, RelationField};
use crate::error::{Result, SchemaError};
use ahash::AHashSet;

/// Builder for a single entity declaration
#[derive(Debug)]
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entity: Entity::new(name),
        }
    }

    fn push(mut self, name: &str, field_type: FieldType, nullable: bool, role: Option<FieldRole>) -> Self {
        let ordinal = FieldId(self.entity.fields.len() as u16);
        self.entity.fields.push(Field {
            name: name.to_string(),
            field_type,
            ordinal,
            is_nullable: nullable,
            role,
        });
        self
    }

    /// Add a primary key field
    pub fn primary_key(self, name: &str, field_type: FieldType) -> Self {
        self.push(name, field_type, false, Some(FieldRole::PrimaryKey))
    }

    /// Add a required data field
    pub fn field(self, name: &str, field_type: FieldType) -> Self {
        self.push(name, field_type, false, None)
    }

    /// Add a nullable data field
    pub fn optional(self, name: &str, field_type: FieldType) -> Self {
        self.push(name, field_type, true, None)
    }

    /// Add a required foreign key referencing `entity.field`
    pub fn foreign_key(self, name: &str, field_type: FieldType, entity: &str, field: &str) -> Self {
        let role = FieldRole::ForeignKey(FieldRef::new(entity, field));
        self.push(name, field_type, false, Some(role))
    }

    /// Add a nullable foreign key referencing `entity.field`
    pub fn optional_foreign_key(
        self,
        name: &str,
        field_type: FieldType,
        entity: &str,
        field: &str,
    ) -> Self {
        let role = FieldRole::ForeignKey(FieldRef::new(entity, field));
        self.push(name, field_type, true, Some(role))
    }

    /// Add a collection relation with no explicit reciprocal
    pub fn has_many(self, name: &str, target: &str) -> Self {
        self.relation(RelationField::many(name, target))
    }

    /// Add a single-valued relation with no explicit reciprocal
    pub fn has_one(self, name: &str, target: &str) -> Self {
        self.relation(RelationField::one(name, target))
    }

    pub fn relation(mut self, relation: RelationField) -> Self {
        self.entity.relations.push(relation);
        self
    }

    /// Finish the declaration.
    ///
    /// Field and relation names share one namespace per entity.
    pub fn build(self) -> Result<Entity> {
        let mut seen = AHashSet::new();
        let names = self
            .entity
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.entity.relations.iter().map(|r| r.name.as_str()));

        for name in names {
            if !seen.insert(name) {
                return Err(SchemaError::DuplicateField {
                    entity: self.entity.name.clone(),
                    field: name.to_string(),
                });
            }
        }

        Ok(self.entity)
    }
}
