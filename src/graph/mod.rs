//! ERD (Entity-Relationship Diagram) generation module.
//!
//! This module provides:
//! - A disposable diagram snapshot of entities, fields and relationships
//! - Filtering and focus on a subset of entities
//! - Cycle detection using Tarjan's SCC algorithm
//! - Output formats: DOT (Graphviz), Mermaid, JSON, HTML

pub mod analysis;
pub mod diagram;
pub mod format;

pub use analysis::{cyclic_entities, find_cycles, Cycle};
pub use diagram::{AssociationInfo, Diagram, EdgeInfo, EntityInfo, FieldInfo, RelationInfo};
pub use format::{to_dot, to_html, to_json, to_mermaid, Layout, OutputFormat};
