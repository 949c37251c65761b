//! Error types for schema declaration, resolution and export.

use std::path::PathBuf;

/// Errors raised while declaring or resolving a schema.
///
/// All of these point at a mistake in the schema declaration itself, so
/// callers should treat them as terminal for the current export.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("entity '{name}' is already registered")]
    DuplicateEntity { name: String },

    #[error("{}", unknown_entity_message(.name, .referenced_by.as_deref()))]
    UnknownEntity {
        name: String,
        referenced_by: Option<String>,
    },

    #[error("entity '{entity}' has no field or relation named '{field}'")]
    UnknownField { entity: String, field: String },

    #[error("entity '{entity}' declares '{field}' more than once")]
    DuplicateField { entity: String, field: String },

    #[error(
        "inconsistent relationship {entity}.{relation}: expected {expected}, found {found}"
    )]
    InconsistentCardinality {
        entity: String,
        relation: String,
        expected: String,
        found: String,
    },

    #[error("invalid reference '{reference}' on {entity}.{field}: expected 'Entity.field'")]
    InvalidReference {
        entity: String,
        field: String,
        reference: String,
    },

    #[error("field {entity}.{field} cannot be both a primary key and a foreign key")]
    ConflictingKeyRole { entity: String, field: String },

    #[error("failed to load schema document {}: {message}", .path.display())]
    Document { path: PathBuf, message: String },
}

fn unknown_entity_message(name: &str, referenced_by: Option<&str>) -> String {
    match referenced_by {
        Some(source) => format!("unknown entity '{}' (referenced by {})", name, source),
        None => format!("unknown entity '{}'", name),
    }
}

/// Errors surfaced by a diagram exporter.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Graphviz 'dot' command not found. Install Graphviz or export dot/mermaid/json/html instead")]
    GraphvizNotFound,

    #[error("Graphviz failed to render {format}: {message}")]
    Render { format: String, message: String },

    #[error("format '{0}' is binary and cannot be printed to stdout")]
    UnsupportedStdout(String),
}

/// Top-level error for library callers that run the whole pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;
