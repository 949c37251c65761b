//! JSON format output for ERD data.

use crate::graph::diagram::Diagram;
use schemars::JsonSchema;
use serde::Serialize;

/// JSON representation of the ERD
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErdJson {
    pub entities: Vec<EntityJson>,
    pub relationships: Vec<RelationshipJson>,
    pub associations: Vec<AssociationJson>,
    pub stats: ErdStats,
}

/// JSON representation of an entity with full field details
#[derive(Debug, Serialize, JsonSchema)]
pub struct EntityJson {
    pub name: String,
    pub fields: Vec<FieldJson>,
    pub relations: Vec<RelationJson>,
}

/// JSON representation of a field
#[derive(Debug, Serialize, JsonSchema)]
pub struct FieldJson {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_field: Option<String>,
}

/// JSON representation of a relation field
#[derive(Debug, Serialize, JsonSchema)]
pub struct RelationJson {
    pub name: String,
    pub target: String,
    pub many: bool,
}

/// JSON representation of a relationship
#[derive(Debug, Serialize, JsonSchema)]
pub struct RelationshipJson {
    pub name: String,
    pub from_entity: String,
    pub from_field: String,
    pub to_entity: String,
    pub to_field: String,
    /// `many-to-one`, `one-to-one`, ...
    pub cardinality: String,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_reference: Option<String>,
}

/// JSON representation of a many-to-many association
#[derive(Debug, Serialize, JsonSchema)]
pub struct AssociationJson {
    pub left: String,
    pub right: String,
    pub via: String,
}

/// ERD statistics
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErdStats {
    pub entity_count: usize,
    pub field_count: usize,
    pub relationship_count: usize,
    pub association_count: usize,
}

/// Generate JSON output from a diagram
pub fn to_json(diagram: &Diagram) -> String {
    let erd = build_erd_json(diagram);
    serde_json::to_string_pretty(&erd).unwrap_or_else(|_| "{}".to_string())
}

/// Build the JSON structure
pub fn build_erd_json(diagram: &Diagram) -> ErdJson {
    let entities = diagram
        .entities
        .iter()
        .map(|entity| EntityJson {
            name: entity.name.clone(),
            fields: entity
                .fields
                .iter()
                .map(|f| FieldJson {
                    name: f.name.clone(),
                    field_type: f.field_type.clone(),
                    is_primary_key: f.is_primary_key,
                    is_foreign_key: f.is_foreign_key,
                    is_nullable: f.is_nullable,
                    references_entity: f.references_entity.clone(),
                    references_field: f.references_field.clone(),
                })
                .collect(),
            relations: entity
                .relations
                .iter()
                .map(|r| RelationJson {
                    name: r.name.clone(),
                    target: r.target.clone(),
                    many: r.is_many,
                })
                .collect(),
        })
        .collect();

    let relationships = diagram
        .edges
        .iter()
        .map(|e| RelationshipJson {
            name: e.name.clone(),
            from_entity: e.from_entity.clone(),
            from_field: e.from_field.clone(),
            to_entity: e.to_entity.clone(),
            to_field: e.to_field.clone(),
            cardinality: e.cardinality.to_string(),
            optional: e.is_optional,
            back_reference: e.back_reference.clone(),
        })
        .collect();

    let associations = diagram
        .associations
        .iter()
        .map(|a| AssociationJson {
            left: a.left.clone(),
            right: a.right.clone(),
            via: a.via.clone(),
        })
        .collect();

    ErdJson {
        entities,
        relationships,
        associations,
        stats: ErdStats {
            entity_count: diagram.entity_count(),
            field_count: diagram.field_count(),
            relationship_count: diagram.edge_count(),
            association_count: diagram.associations.len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::diagram::fixtures::user_orders;

    #[test]
    fn test_json_structure() {
        let erd = build_erd_json(&user_orders());

        assert_eq!(erd.entities.len(), 2);
        assert_eq!(erd.relationships.len(), 1);
        assert_eq!(erd.stats.entity_count, 2);
        assert_eq!(erd.stats.field_count, 4);
        assert_eq!(erd.entities[0].name, "User");
    }

    #[test]
    fn test_json_relationship() {
        let erd = build_erd_json(&user_orders());
        let rel = &erd.relationships[0];

        assert_eq!(rel.cardinality, "many-to-one");
        assert_eq!(rel.back_reference.as_deref(), Some("orders"));
    }

    #[test]
    fn test_json_output() {
        let output = to_json(&user_orders());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["entities"][1]["fields"][1]["references_entity"], "User");
        assert_eq!(value["entities"][0]["relations"][0]["many"], true);
        assert!(value["relationships"][0].get("back_reference").is_some());
    }
}
