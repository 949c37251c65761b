//! Check command: resolve a schema and report what was found.

use super::load_registry;
use schema_erd::resolver::{resolve, Relationship, RelationshipGraph, ResolveOptions};
use schema_erd::schema::SchemaRegistry;
use anyhow::Result;
use schemars::JsonSchema;
use serde::Serialize;
use std::path::PathBuf;

/// JSON output for the check command
#[derive(Serialize, JsonSchema)]
pub struct CheckJsonOutput {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entities: usize,
    pub fields: usize,
    pub relationships: usize,
    pub bidirectional: usize,
    pub self_references: Vec<String>,
    /// `Left <-> Right via Entity`
    pub associations: Vec<String>,
    /// Entities that cannot be placed in dependency order
    pub dependency_cycles: Vec<String>,
}

pub fn run(schema: Option<PathBuf>, infer_back_references: bool, json: bool) -> Result<()> {
    let registry = load_registry(schema.as_deref())?;
    let options = ResolveOptions {
        infer_back_references,
    };

    let relationships = match resolve(&registry, &options) {
        Ok(relationships) => relationships,
        Err(e) if json => {
            let output = CheckJsonOutput {
                valid: false,
                error: Some(e.to_string()),
                entities: registry.len(),
                fields: registry.field_count(),
                relationships: 0,
                bidirectional: 0,
                self_references: Vec::new(),
                associations: Vec::new(),
                dependency_cycles: Vec::new(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let output = summarize(&registry, &relationships);

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    eprintln!("Schema check:");
    eprintln!("  Entities: {}", output.entities);
    eprintln!("  Fields: {}", output.fields);
    eprintln!(
        "  Relationships: {} ({} bidirectional)",
        output.relationships, output.bidirectional
    );
    if !output.self_references.is_empty() {
        eprintln!("  Self-references: {}", output.self_references.join(", "));
    }
    if !output.associations.is_empty() {
        eprintln!("  Associations:");
        for association in &output.associations {
            eprintln!("    - {}", association);
        }
    }
    if !output.dependency_cycles.is_empty() {
        eprintln!(
            "  Dependency cycles: {}",
            output.dependency_cycles.join(", ")
        );
    }
    eprintln!();
    eprintln!("Result: PASSED");

    Ok(())
}

fn summarize(registry: &SchemaRegistry, relationships: &[Relationship]) -> CheckJsonOutput {
    let graph = RelationshipGraph::new(registry, relationships);
    let name = |id| graph.entity_name(id).unwrap_or("?").to_string();

    CheckJsonOutput {
        valid: true,
        error: None,
        entities: registry.len(),
        fields: registry.field_count(),
        relationships: relationships.len(),
        bidirectional: relationships.iter().filter(|r| r.is_bidirectional()).count(),
        self_references: graph.self_referential().into_iter().map(name).collect(),
        associations: graph
            .associations()
            .iter()
            .map(|a| format!("{} <-> {} via {}", name(a.left), name(a.right), name(a.via)))
            .collect(),
        dependency_cycles: graph.dependency_order().cyclic.into_iter().map(name).collect(),
    }
}
