//! Diagram snapshot with filtering and focus capabilities.

use crate::resolver::{Association, Cardinality, Relationship};
use crate::schema::SchemaRegistry;
use ahash::{AHashMap, AHashSet};
use glob::Pattern;
use std::collections::VecDeque;

/// Information about a field for rendering
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// Type label for display
    pub field_type: String,
    /// Whether this field is a primary key
    pub is_primary_key: bool,
    /// Whether this field is a foreign key
    pub is_foreign_key: bool,
    /// Whether this field is nullable
    pub is_nullable: bool,
    /// If FK, which entity it references
    pub references_entity: Option<String>,
    /// If FK, which field it references
    pub references_field: Option<String>,
}

/// Information about a relation field for rendering
#[derive(Debug, Clone)]
pub struct RelationInfo {
    pub name: String,
    pub target: String,
    pub is_many: bool,
}

impl RelationInfo {
    /// Type label, e.g. `list[Order]`
    pub fn type_label(&self) -> String {
        if self.is_many {
            format!("list[{}]", self.target)
        } else {
            self.target.clone()
        }
    }
}

/// Information about an entity for rendering
#[derive(Debug, Clone)]
pub struct EntityInfo {
    /// Entity name
    pub name: String,
    /// All fields in declaration order
    pub fields: Vec<FieldInfo>,
    /// Relation fields in declaration order
    pub relations: Vec<RelationInfo>,
}

/// Information about an edge (one resolved relationship)
#[derive(Debug, Clone)]
pub struct EdgeInfo {
    /// Relationship name
    pub name: String,
    /// Source entity (holds the FK)
    pub from_entity: String,
    /// FK field
    pub from_field: String,
    /// Target entity (being referenced)
    pub to_entity: String,
    /// Referenced field, usually the PK
    pub to_field: String,
    pub cardinality: Cardinality,
    /// Reciprocal relation name on the target
    pub back_reference: Option<String>,
    pub is_optional: bool,
}

/// A many-to-many association between two entities
#[derive(Debug, Clone)]
pub struct AssociationInfo {
    pub left: String,
    pub right: String,
    pub via: String,
}

/// A snapshot of entities and relationships, built per export
#[derive(Debug, Default)]
pub struct Diagram {
    /// Entities in declaration order
    pub entities: Vec<EntityInfo>,
    /// Edges in resolution order
    pub edges: Vec<EdgeInfo>,
    pub associations: Vec<AssociationInfo>,
}

impl Diagram {
    /// Create a full diagram from a registry and its resolved relationships
    pub fn build(
        registry: &SchemaRegistry,
        relationships: &[Relationship],
        associations: &[Association],
    ) -> Self {
        let name_of = |id| {
            registry
                .entity(id)
                .map(|e| e.name.clone())
                .unwrap_or_default()
        };

        let entities = registry
            .all()
            .iter()
            .map(|entity| EntityInfo {
                name: entity.name.clone(),
                fields: entity
                    .fields
                    .iter()
                    .map(|field| {
                        let reference = field.references();
                        FieldInfo {
                            name: field.name.clone(),
                            field_type: field.field_type.label().to_string(),
                            is_primary_key: field.is_primary_key(),
                            is_foreign_key: reference.is_some(),
                            is_nullable: field.is_nullable,
                            references_entity: reference.map(|r| r.entity.clone()),
                            references_field: reference.map(|r| r.field.clone()),
                        }
                    })
                    .collect(),
                relations: entity
                    .relations
                    .iter()
                    .map(|r| RelationInfo {
                        name: r.name.clone(),
                        target: r.target.clone(),
                        is_many: r.is_many(),
                    })
                    .collect(),
            })
            .collect();

        let edges = relationships
            .iter()
            .map(|rel| EdgeInfo {
                name: rel.name.clone(),
                from_entity: name_of(rel.source),
                from_field: rel.source_field.clone(),
                to_entity: name_of(rel.target),
                to_field: rel.target_field.clone(),
                cardinality: rel.cardinality,
                back_reference: rel.back_reference.as_ref().map(|b| b.name.clone()),
                is_optional: rel.is_optional,
            })
            .collect();

        let associations = associations
            .iter()
            .map(|a| AssociationInfo {
                left: name_of(a.left),
                right: name_of(a.right),
                via: name_of(a.via),
            })
            .collect();

        Self {
            entities,
            edges,
            associations,
        }
    }

    /// Filter to include only entities matching the given patterns
    pub fn filter_entities(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let matching: AHashSet<String> = self
            .entities
            .iter()
            .filter(|e| patterns.iter().any(|p| p.matches(&e.name)))
            .map(|e| e.name.clone())
            .collect();

        self.retain_entities(&matching);
    }

    /// Exclude entities matching the given patterns
    pub fn exclude_entities(&mut self, patterns: &[Pattern]) {
        if patterns.is_empty() {
            return;
        }

        let remaining: AHashSet<String> = self
            .entities
            .iter()
            .filter(|e| !patterns.iter().any(|p| p.matches(&e.name)))
            .map(|e| e.name.clone())
            .collect();

        self.retain_entities(&remaining);
    }

    /// Focus on a specific entity and its relationships
    pub fn focus(&mut self, entity: &str, transitive: bool, reverse: bool, max_depth: Option<usize>) {
        if self.get_entity(entity).is_none() {
            self.entities.clear();
            self.edges.clear();
            self.associations.clear();
            return;
        }

        let mut result = AHashSet::new();
        result.insert(entity.to_string());

        let (outgoing, incoming) = self.build_adjacency_maps();

        if transitive {
            // Entities this one depends on, transitively
            traverse(&outgoing, entity, max_depth, &mut result);
        }

        if reverse {
            // Entities that depend on this one, transitively
            traverse(&incoming, entity, max_depth, &mut result);
        }

        if !transitive && !reverse {
            for map in [&outgoing, &incoming] {
                if let Some(neighbors) = map.get(entity) {
                    result.extend(neighbors.iter().cloned());
                }
            }
        }

        self.retain_entities(&result);
    }

    /// Keep only the named entities, dropping edges that lose an endpoint
    pub fn retain_entities(&mut self, keep: &AHashSet<String>) {
        self.entities.retain(|e| keep.contains(&e.name));
        self.edges
            .retain(|e| keep.contains(&e.from_entity) && keep.contains(&e.to_entity));
        self.associations.retain(|a| {
            keep.contains(&a.left) && keep.contains(&a.right) && keep.contains(&a.via)
        });
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn field_count(&self) -> usize {
        self.entities.iter().map(|e| e.fields.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get_entity(&self, name: &str) -> Option<&EntityInfo> {
        self.entities.iter().find(|e| e.name == name)
    }

    fn build_adjacency_maps(
        &self,
    ) -> (AHashMap<String, Vec<String>>, AHashMap<String, Vec<String>>) {
        let mut outgoing: AHashMap<String, Vec<String>> = AHashMap::new();
        let mut incoming: AHashMap<String, Vec<String>> = AHashMap::new();

        for edge in &self.edges {
            outgoing
                .entry(edge.from_entity.clone())
                .or_default()
                .push(edge.to_entity.clone());
            incoming
                .entry(edge.to_entity.clone())
                .or_default()
                .push(edge.from_entity.clone());
        }

        (outgoing, incoming)
    }
}

fn traverse(
    adjacency: &AHashMap<String, Vec<String>>,
    start: &str,
    max_depth: Option<usize>,
    result: &mut AHashSet<String>,
) {
    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((start.to_string(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        if let Some(neighbors) = adjacency.get(&current) {
            for neighbor in neighbors {
                if result.insert(neighbor.clone()) {
                    queue.push_back((neighbor.clone(), depth + 1));
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn chain() -> Diagram {
        let names = ["Country", "Brand", "Product", "OrderItem"];
        let entities = names
            .iter()
            .map(|n| EntityInfo {
                name: n.to_string(),
                fields: vec![pk("id")],
                relations: vec![],
            })
            .collect();
        let edges = vec![
            edge("Brand", "country_id", "Country", "id"),
            edge("Product", "brand_id", "Brand", "id"),
            edge("OrderItem", "product_id", "Product", "id"),
        ];
        Diagram {
            entities,
            edges,
            associations: vec![],
        }
    }

    fn names(diagram: &Diagram) -> Vec<&str> {
        diagram.entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_exclude_entities() {
        let mut diagram = user_orders();
        diagram.exclude_entities(&[Pattern::new("Ord*").unwrap()]);

        assert_eq!(names(&diagram), vec!["User"]);
        assert_eq!(diagram.edge_count(), 0);
    }

    #[test]
    fn test_focus_direct_neighbors() {
        let mut diagram = chain();
        diagram.focus("Brand", false, false, None);
        assert_eq!(names(&diagram), vec!["Country", "Brand", "Product"]);
    }

    #[test]
    fn test_focus_transitive_with_depth() {
        let mut diagram = chain();
        diagram.focus("OrderItem", true, false, Some(2));
        assert_eq!(names(&diagram), vec!["Brand", "Product", "OrderItem"]);
    }

    #[test]
    fn test_focus_reverse() {
        let mut diagram = chain();
        diagram.focus("Brand", false, true, None);
        assert_eq!(names(&diagram), vec!["Brand", "Product", "OrderItem"]);
        assert_eq!(diagram.edge_count(), 2);
    }

    #[test]
    fn test_focus_unknown_empties_diagram() {
        let mut diagram = chain();
        diagram.focus("Warehouse", true, true, None);
        assert!(diagram.is_empty());
    }
}
