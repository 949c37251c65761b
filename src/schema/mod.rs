//! Schema declaration model.
//!
//! This module provides:
//! - Data models for entities, typed fields and key roles
//! - Relation fields (navigation declarations with optional back-references)
//! - A fluent builder for declaring entities in code
//! - The ordered, name-indexed schema registry
//! - YAML/JSON schema documents

mod builder;
mod document;
mod registry;

pub use builder::*;
pub use document::*;
pub use registry::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an entity within a registry (its declaration index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// Unique identifier for a field within an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u16);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldId({})", self.0)
    }
}

/// Semantic field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Timestamp,
    Boolean,
    /// Nested key/value document
    Mapping,
}

impl FieldType {
    /// Label used in diagrams
    pub fn label(self) -> &'static str {
        match self {
            FieldType::String => "str",
            FieldType::Integer => "int",
            FieldType::Decimal => "decimal",
            FieldType::Timestamp => "datetime",
            FieldType::Boolean => "bool",
            FieldType::Mapping => "mapping",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "str" | "string" | "text" => Ok(FieldType::String),
            "int" | "integer" => Ok(FieldType::Integer),
            "decimal" | "numeric" => Ok(FieldType::Decimal),
            "datetime" | "timestamp" => Ok(FieldType::Timestamp),
            "bool" | "boolean" => Ok(FieldType::Boolean),
            "mapping" | "map" | "dict" | "json" => Ok(FieldType::Mapping),
            _ => Err(format!(
                "Unknown field type: {}. Valid options: string, integer, decimal, timestamp, boolean, mapping",
                s
            )),
        }
    }
}

/// Reference to a field on another entity (`Entity.field`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub entity: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Parse `Entity.field`
    pub fn parse(s: &str) -> Option<Self> {
        let (entity, field) = s.split_once('.')?;
        let (entity, field) = (entity.trim(), field.trim());
        if entity.is_empty() || field.is_empty() || field.contains('.') {
            return None;
        }
        Some(Self::new(entity, field))
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.field)
    }
}

/// Key role of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    PrimaryKey,
    ForeignKey(FieldRef),
}

/// Field definition within an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Semantic type
    pub field_type: FieldType,
    /// Position in entity (0-indexed)
    pub ordinal: FieldId,
    /// Whether the field may be absent
    pub is_nullable: bool,
    /// Primary/foreign key role, if any
    pub role: Option<FieldRole>,
}

impl Field {
    pub fn is_primary_key(&self) -> bool {
        matches!(self.role, Some(FieldRole::PrimaryKey))
    }

    /// The referenced field, if this is a foreign key
    pub fn references(&self) -> Option<&FieldRef> {
        match &self.role {
            Some(FieldRole::ForeignKey(target)) => Some(target),
            _ => None,
        }
    }
}

/// How many target instances a relation field navigates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    One,
    Many,
}

/// Navigation declaration on an entity.
///
/// A `One` relation usually sits next to a foreign key (`Order.user`), a
/// `Many` relation is the collection side (`User.orders`). `back_populates`
/// names the reciprocal relation on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationField {
    pub name: String,
    pub target: String,
    pub multiplicity: Multiplicity,
    pub back_populates: Option<String>,
    /// Local foreign key field this relation navigates, when not inferable
    pub foreign_key: Option<String>,
}

impl RelationField {
    pub fn one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            multiplicity: Multiplicity::One,
            back_populates: None,
            foreign_key: None,
        }
    }

    pub fn many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            multiplicity: Multiplicity::Many,
            ..Self::one(name, target)
        }
    }

    pub fn back_populates(mut self, reciprocal: impl Into<String>) -> Self {
        self.back_populates = Some(reciprocal.into());
        self
    }

    pub fn via(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    pub fn is_many(&self) -> bool {
        self.multiplicity == Multiplicity::Many
    }
}

/// Complete entity declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Entity name (unique within a registry)
    pub name: String,
    /// Field definitions in declaration order
    pub fields: Vec<Field>,
    /// Relation fields in declaration order
    pub relations: Vec<RelationField>,
}

impl Entity {
    /// Create a new empty entity
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Start a fluent declaration
    pub fn builder(name: impl Into<String>) -> EntityBuilder {
        EntityBuilder::new(name)
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field by ID
    pub fn field_by_id(&self, id: FieldId) -> Option<&Field> {
        self.fields.get(id.0 as usize)
    }

    /// Primary key fields in declaration order
    pub fn primary_key(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.is_primary_key()).collect()
    }

    /// Foreign key fields with their targets, in declaration order
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&Field, &FieldRef)> {
        self.fields
            .iter()
            .filter_map(|f| f.references().map(|target| (f, target)))
    }

    /// Get a relation field by name
    pub fn relation(&self, name: &str) -> Option<&RelationField> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Relation fields pointing at the given entity
    pub fn relations_to<'a, 'b>(
        &'a self,
        target: &'b str,
    ) -> impl Iterator<Item = &'a RelationField> + 'b
    where
        'a: 'b,
    {
        self.relations.iter().filter(move |r| r.target == target)
    }
}
