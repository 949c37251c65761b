//! Ordered, name-indexed storage of entity declarations.

use super::{Entity, EntityId};
use crate::error::{Result, SchemaError};
use ahash::AHashMap;

/// The canonical set of entities.
///
/// Entities keep their declaration order, which is also the order every
/// diagram renders them in.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    /// Map from entity name to entity ID
    index: AHashMap<String, EntityId>,
    /// Entities indexed by EntityId
    entities: Vec<Entity>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every entity in order, stopping at the first error
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Result<Self> {
        let mut registry = Self::new();
        for entity in entities {
            registry.register(entity)?;
        }
        Ok(registry)
    }

    /// Add an entity, returning its ID. The entity is stored as declared.
    pub fn register(&mut self, entity: Entity) -> Result<EntityId> {
        if self.index.contains_key(&entity.name) {
            return Err(SchemaError::DuplicateEntity { name: entity.name });
        }

        let id = EntityId(self.entities.len() as u32);
        self.index.insert(entity.name.clone(), id);
        self.entities.push(entity);
        Ok(id)
    }

    /// Get an entity by name
    pub fn get(&self, name: &str) -> Result<&Entity> {
        self.lookup(name).map(|(_, entity)| entity)
    }

    /// Get an entity together with its ID
    pub fn lookup(&self, name: &str) -> Result<(EntityId, &Entity)> {
        self.entity_id(name)
            .and_then(|id| self.entity(id).map(|entity| (id, entity)))
            .ok_or_else(|| SchemaError::UnknownEntity {
                name: name.to_string(),
                referenced_by: None,
            })
    }

    /// Get entity ID by name
    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.index.get(name).copied()
    }

    /// Get entity by ID
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All entities in declaration order
    pub fn all(&self) -> &[Entity] {
        &self.entities
    }

    /// Entities with their IDs, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, entity)| (EntityId(i as u32), entity))
    }

    /// Get the number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Total number of fields across all entities
    pub fn field_count(&self) -> usize {
        self.entities.iter().map(|e| e.fields.len()).sum()
    }
}
