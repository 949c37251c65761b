//! Graph command implementation for ERD generation.

use super::{load_registry, split_list};
use schema_erd::config::ErdConfig;
use schema_erd::export::{render_text, DiagramExporter, FileExporter, RenderOptions};
use schema_erd::graph::{cyclic_entities, find_cycles, Cycle, Layout, OutputFormat};
use schema_erd::resolver::ResolveOptions;
use anyhow::{bail, Result};
use glob::Pattern;
use std::path::PathBuf;

/// Raw graph command flags
pub struct GraphArgs {
    pub schema: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub name: Option<String>,
    pub format: Option<String>,
    pub stdout: bool,
    pub layout: Option<String>,
    pub table: Option<String>,
    pub transitive: bool,
    pub reverse: bool,
    pub max_depth: Option<usize>,
    pub tables: Option<String>,
    pub exclude: Option<String>,
    pub cycles_only: bool,
    pub infer_back_references: bool,
}

/// Run the graph command
pub fn run(args: GraphArgs) -> Result<()> {
    let config = merge_config(ErdConfig::discover(args.config.as_deref())?, &args)?;

    if args.stdout && config.formats.len() != 1 {
        bail!("--stdout needs exactly one format, got {}", config.formats.len());
    }

    let registry = load_registry(args.schema.as_deref())?;
    let options = ResolveOptions {
        infer_back_references: config.infer_back_references,
    };
    let mut diagram = schema_erd::build_diagram(&registry, &options)?;

    // Apply filters
    if let Some(ref tables) = args.tables {
        diagram.filter_entities(&to_patterns(&split_list(tables))?);
    }
    if !config.exclude.is_empty() {
        diagram.exclude_entities(&to_patterns(&config.exclude)?);
    }

    // Focus on specific entity if requested
    if let Some(ref table) = args.table {
        if diagram.get_entity(table).is_none() {
            bail!("entity not found in diagram: {}", table);
        }
        diagram.focus(table, args.transitive, args.reverse, args.max_depth);
    }

    // Filter to cyclic entities only if requested
    let cycles = if args.cycles_only {
        let cycles = find_cycles(&diagram);
        let cyclic = cyclic_entities(&diagram);
        diagram.retain_entities(&cyclic);
        Some(cycles)
    } else {
        None
    };

    if diagram.is_empty() {
        eprintln!("No entities match the given filters.");
        return Ok(());
    }

    let render_options = RenderOptions {
        layout: config.layout,
        title: config.title.clone(),
    };

    if args.stdout {
        println!("{}", render_text(&diagram, config.formats[0], &render_options)?);
    } else {
        let exporter = FileExporter::new(&config.output_dir, &config.basename)
            .with_options(render_options);
        let artifacts = exporter.export(&diagram, &config.formats)?;
        for path in &artifacts {
            eprintln!("ERD written to: {}", path.display());
        }
    }

    if let Some(cycles) = cycles {
        display_cycles(&cycles);
    }

    eprintln!(
        "\nERD: {} entities, {} fields, {} relationships",
        diagram.entity_count(),
        diagram.field_count(),
        diagram.edge_count()
    );

    Ok(())
}

/// CLI flags override config file values
fn merge_config(mut config: ErdConfig, args: &GraphArgs) -> Result<ErdConfig> {
    if let Some(ref dir) = args.out_dir {
        config.output_dir = dir.clone();
    }
    if let Some(ref name) = args.name {
        config.basename = name.clone();
    }
    if let Some(ref format) = args.format {
        config.formats = OutputFormat::parse_list(format).map_err(|e| anyhow::anyhow!("{}", e))?;
    }
    if let Some(ref layout) = args.layout {
        config.layout = layout
            .parse::<Layout>()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }
    if let Some(ref exclude) = args.exclude {
        config.exclude.extend(split_list(exclude));
    }
    if args.infer_back_references {
        config.infer_back_references = true;
    }

    if config.formats.is_empty() {
        bail!("no output formats selected");
    }

    Ok(config)
}

fn to_patterns(names: &[String]) -> Result<Vec<Pattern>> {
    names
        .iter()
        .map(|name| {
            Pattern::new(name).map_err(|e| anyhow::anyhow!("invalid pattern '{}': {}", name, e))
        })
        .collect()
}

/// Display cycles in a user-friendly format
fn display_cycles(cycles: &[Cycle]) {
    if cycles.is_empty() {
        eprintln!("\nNo cycles detected.");
        return;
    }

    eprintln!("\nCycles detected ({}):", cycles.len());
    for (i, cycle) in cycles.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, cycle.display());
    }
}
