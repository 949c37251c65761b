//! Declarative entity schemas, relationship resolution and ERD export.
//!
//! The pipeline is: register entities in a [`SchemaRegistry`], derive
//! [`Relationship`]s with [`resolve`], snapshot both into a [`Diagram`] and
//! hand that to a [`DiagramExporter`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod logging;
pub mod resolver;
pub mod schema;

pub use error::{Error, ExportError, SchemaError};
pub use export::{DiagramExporter, FileExporter, RenderOptions};
pub use graph::{Diagram, Layout, OutputFormat};
pub use resolver::{resolve, Cardinality, Relationship, RelationshipGraph, ResolveOptions};
pub use schema::{Entity, SchemaRegistry};

use std::path::PathBuf;

/// Resolve a registry and build its full diagram
pub fn build_diagram(
    registry: &SchemaRegistry,
    options: &ResolveOptions,
) -> Result<Diagram, SchemaError> {
    let relationships = resolve(registry, options)?;
    let associations = RelationshipGraph::new(registry, &relationships).associations();
    Ok(Diagram::build(registry, &relationships, &associations))
}

/// Resolve, snapshot and export in one step.
///
/// Nothing is exported when resolution fails.
pub fn generate(
    registry: &SchemaRegistry,
    options: &ResolveOptions,
    exporter: &dyn DiagramExporter,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>, Error> {
    let diagram = build_diagram(registry, options)?;
    Ok(exporter.export(&diagram, formats)?)
}
