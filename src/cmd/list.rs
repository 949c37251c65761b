//! List command: entities with their fields and resolved relationships.

use super::load_registry;
use schema_erd::resolver::{resolve, RelationshipGraph, ResolveOptions};
use schema_erd::schema::{EntityId, SchemaRegistry};
use anyhow::Result;
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;

/// JSON output for the list command
#[derive(Serialize, JsonSchema)]
pub struct ListJsonOutput {
    pub entities: Vec<EntityListing>,
}

/// One entity with its outgoing references
#[derive(Serialize, JsonSchema)]
pub struct EntityListing {
    pub name: String,
    pub fields: usize,
    pub relations: usize,
    /// Entities this one references through a foreign key
    pub references: Vec<String>,
    /// Entities that reference this one
    pub referenced_by: Vec<String>,
    pub self_referential: bool,
}

pub fn run(schema: Option<PathBuf>, dependency_order: bool, json: bool) -> Result<()> {
    let registry = load_registry(schema.as_deref())?;
    let relationships = resolve(&registry, &ResolveOptions::default())?;
    let graph = RelationshipGraph::new(&registry, &relationships);

    let ids: Vec<EntityId> = if dependency_order {
        let sorted = graph.dependency_order();
        sorted.order.into_iter().chain(sorted.cyclic).collect()
    } else {
        (0..registry.len()).map(|i| EntityId(i as u32)).collect()
    };

    let self_referential = graph.self_referential();
    let entities: Vec<EntityListing> = ids
        .iter()
        .filter_map(|&id| {
            let entity = registry.entity(id)?;
            Some(EntityListing {
                name: entity.name.clone(),
                fields: entity.fields.len(),
                relations: entity.relations.len(),
                references: names(&registry, &graph.parents[id.0 as usize]),
                referenced_by: names(&registry, &graph.children[id.0 as usize]),
                self_referential: self_referential.contains(&id),
            })
        })
        .collect();

    if json {
        let output = ListJsonOutput { entities };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for entity in &entities {
        let mut line = format!(
            "{:<24} {:>3} fields  {:>2} relations",
            entity.name, entity.fields, entity.relations
        );
        if !entity.references.is_empty() {
            line.push_str(&format!("  -> {}", entity.references.join(", ")));
        }
        if entity.self_referential {
            line.push_str("  (self-referential)");
        }
        println!("{}", line);
    }

    eprintln!(
        "\n{} entities, {} fields, {} relationships",
        registry.len(),
        registry.field_count(),
        relationships.len()
    );

    Ok(())
}

fn names(registry: &SchemaRegistry, ids: &[EntityId]) -> Vec<String> {
    ids.iter()
        .filter_map(|&id| registry.entity(id).map(|e| e.name.clone()))
        .collect()
}
