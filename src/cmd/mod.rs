mod check;
mod graph;
mod list;
mod schema;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use schema_erd::catalog;
use schema_erd::schema::{SchemaDocument, SchemaRegistry};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "schema-erd")]
#[command(version)]
#[command(about = "Resolve entity relationships and export ER diagrams", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an ERD from the built-in catalog or a schema document
    Graph {
        /// Schema document (YAML or JSON). Defaults to the built-in e-commerce catalog
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// YAML config file (default: ./schema-erd.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for artifacts
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Artifact file name without extension
        #[arg(short, long)]
        name: Option<String>,

        /// Output formats, comma-separated: dot, mermaid, json, html, png, svg, pdf
        #[arg(short, long)]
        format: Option<String>,

        /// Print a single textual format to stdout instead of writing files
        #[arg(long)]
        stdout: bool,

        /// Layout direction: lr (left-right) or tb (top-bottom)
        #[arg(long)]
        layout: Option<String>,

        /// Focus on a specific entity
        #[arg(long)]
        table: Option<String>,

        /// Show transitive dependencies (entities this one references)
        #[arg(long)]
        transitive: bool,

        /// Show reverse dependencies (entities that reference this one)
        #[arg(long)]
        reverse: bool,

        /// Maximum depth for transitive/reverse traversal
        #[arg(long)]
        max_depth: Option<usize>,

        /// Only include these entities (comma-separated, supports globs)
        #[arg(short, long)]
        tables: Option<String>,

        /// Exclude these entities (comma-separated, supports globs)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Only show entities that are part of cycles
        #[arg(long)]
        cycles_only: bool,

        /// Pair unannotated collections with foreign keys by target type
        #[arg(long)]
        infer_back_references: bool,
    },

    /// List entities and their resolved relationships
    List {
        /// Schema document (YAML or JSON). Defaults to the built-in e-commerce catalog
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// List entities in dependency order (referenced entities first)
        #[arg(long)]
        dependency_order: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every reference and back-reference in a schema resolves
    Check {
        /// Schema document (YAML or JSON). Defaults to the built-in e-commerce catalog
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Pair unannotated collections with foreign keys by target type
        #[arg(long)]
        infer_back_references: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print JSON Schemas for the --json outputs
    Schema {
        /// Only print the schema for one command (graph, list, check)
        #[arg(short, long)]
        command: Option<String>,

        /// Write one <command>.schema.json file per command into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// List available schema names
        #[arg(long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Graph {
            schema,
            config,
            out_dir,
            name,
            format,
            stdout,
            layout,
            table,
            transitive,
            reverse,
            max_depth,
            tables,
            exclude,
            cycles_only,
            infer_back_references,
        } => graph::run(graph::GraphArgs {
            schema,
            config,
            out_dir,
            name,
            format,
            stdout,
            layout,
            table,
            transitive,
            reverse,
            max_depth,
            tables,
            exclude,
            cycles_only,
            infer_back_references,
        }),
        Commands::List {
            schema,
            dependency_order,
            json,
        } => list::run(schema, dependency_order, json),
        Commands::Check {
            schema,
            infer_back_references,
            json,
        } => check::run(schema, infer_back_references, json),
        Commands::Schema {
            command,
            output_dir,
            list,
        } => schema::run(command, output_dir, list),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "schema-erd", &mut io::stdout());
            Ok(())
        }
    }
}

/// Load the registry from a schema document, or the built-in catalog
pub(crate) fn load_registry(schema: Option<&Path>) -> anyhow::Result<SchemaRegistry> {
    match schema {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("schema file does not exist: {}", path.display());
            }
            let registry = SchemaDocument::load(path)?.into_registry()?;
            tracing::info!(path = %path.display(), entities = registry.len(), "loaded schema");
            Ok(registry)
        }
        None => Ok(catalog::ecommerce()?),
    }
}

/// Split a comma-separated flag into trimmed, non-empty parts
pub(crate) fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
