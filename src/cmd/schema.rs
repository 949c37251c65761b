//! JSON Schema generation for CLI output types.
//!
//! Schemas are generated with schemars for every command that supports
//! `--json` (or emits JSON, in the case of `graph --format json`).

use super::check::CheckJsonOutput;
use super::list::ListJsonOutput;
use anyhow::{bail, Result};
use schema_erd::graph::format::ErdJson;
use schemars::{schema_for, Schema};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// All schemas, keyed by command. BTreeMap keeps output diffable.
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();
    schemas.insert("check", schema_for!(CheckJsonOutput));
    schemas.insert("graph", schema_for!(ErdJson));
    schemas.insert("list", schema_for!(ListJsonOutput));
    schemas
}

pub fn run(command: Option<String>, output_dir: Option<PathBuf>, list: bool) -> Result<()> {
    let mut schemas = all_schemas();

    if list {
        for name in schemas.keys() {
            println!("{}", name);
        }
        return Ok(());
    }

    if let Some(ref name) = command {
        if !schemas.contains_key(name.as_str()) {
            let names: Vec<&str> = schemas.keys().copied().collect();
            bail!("unknown command '{}'. Available: {}", name, names.join(", "));
        }
        schemas.retain(|key, _| *key == name.as_str());
    }

    match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                fs::write(&path, serde_json::to_string_pretty(schema)?)?;
                eprintln!("Schema written to: {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            for schema in schemas.values() {
                println!("{}", serde_json::to_string_pretty(schema)?);
            }
        }
        None => println!("{}", serde_json::to_string_pretty(&schemas)?),
    }

    Ok(())
}
