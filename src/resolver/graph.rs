//! Relationship graph built from resolved relationships.
//!
//! Provides:
//! - Parent/child adjacency (parent = referenced entity)
//! - Dependency ordering (parents before children)
//! - Self-reference detection
//! - Many-to-many associations through associative entities

use super::{Cardinality, Relationship};
use crate::schema::{EntityId, SchemaRegistry};
use std::collections::VecDeque;

/// Dependency graph over the registry.
///
/// Self-loops are kept out of the adjacency lists so they never block
/// ordering; they are reported through [`RelationshipGraph::self_referential`].
#[derive(Debug)]
pub struct RelationshipGraph<'a> {
    registry: &'a SchemaRegistry,
    relationships: &'a [Relationship],
    /// For each entity, entities it references via FK
    pub parents: Vec<Vec<EntityId>>,
    /// For each entity, entities that reference it via FK
    pub children: Vec<Vec<EntityId>>,
}

/// Result of a topological sort
#[derive(Debug)]
pub struct DependencyOrder {
    /// Entities in dependency order (parents before children)
    pub order: Vec<EntityId>,
    /// Entities that are part of cycles (could not be ordered)
    pub cyclic: Vec<EntityId>,
}

/// Many-to-many link realised by an associative entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub left: EntityId,
    pub right: EntityId,
    /// Entity holding a foreign key to both sides
    pub via: EntityId,
    pub cardinality: Cardinality,
}

impl<'a> RelationshipGraph<'a> {
    /// Build a dependency graph from resolved relationships
    pub fn new(registry: &'a SchemaRegistry, relationships: &'a [Relationship]) -> Self {
        let n = registry.len();
        let mut parents: Vec<Vec<EntityId>> = vec![Vec::new(); n];
        let mut children: Vec<Vec<EntityId>> = vec![Vec::new(); n];

        for rel in relationships {
            if rel.is_self_reference() {
                continue;
            }
            let (child, parent) = (rel.source, rel.target);
            if !parents[child.0 as usize].contains(&parent) {
                parents[child.0 as usize].push(parent);
            }
            if !children[parent.0 as usize].contains(&child) {
                children[parent.0 as usize].push(child);
            }
        }

        Self {
            registry,
            relationships,
            parents,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn entity_name(&self, id: EntityId) -> Option<&'a str> {
        self.registry.entity(id).map(|e| e.name.as_str())
    }

    /// Entities with a foreign key to themselves
    pub fn self_referential(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .relationships
            .iter()
            .filter(|r| r.is_self_reference())
            .map(|r| r.source)
            .collect();
        ids.dedup();
        ids
    }

    /// Topological sort using Kahn's algorithm.
    ///
    /// Ties are broken by declaration order, so the result is stable.
    pub fn dependency_order(&self) -> DependencyOrder {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.parents.iter().map(|p| p.len()).collect();

        let mut queue: VecDeque<EntityId> = (0..n)
            .filter(|&i| in_degree[i] == 0)
            .map(|i| EntityId(i as u32))
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &child in &self.children[id.0 as usize] {
                in_degree[child.0 as usize] -= 1;
                if in_degree[child.0 as usize] == 0 {
                    queue.push_back(child);
                }
            }
        }

        let cyclic = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &deg)| deg > 0)
            .map(|(i, _)| EntityId(i as u32))
            .collect();

        DependencyOrder { order, cyclic }
    }

    /// Entities that reference nothing
    pub fn roots(&self) -> Vec<EntityId> {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, parents)| parents.is_empty())
            .map(|(i, _)| EntityId(i as u32))
            .collect()
    }

    /// Entities nothing references
    pub fn leaves(&self) -> Vec<EntityId> {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, children)| children.is_empty())
            .map(|(i, _)| EntityId(i as u32))
            .collect()
    }

    /// Many-to-many associations.
    ///
    /// An associative entity references exactly two other distinct entities
    /// and is itself referenced by nothing.
    pub fn associations(&self) -> Vec<Association> {
        let mut associations = Vec::new();

        for (i, parents) in self.parents.iter().enumerate() {
            if parents.len() != 2 || !self.children[i].is_empty() {
                continue;
            }
            associations.push(Association {
                left: parents[0],
                right: parents[1],
                via: EntityId(i as u32),
                cardinality: Cardinality::ManyToMany,
            });
        }

        associations
    }
}
