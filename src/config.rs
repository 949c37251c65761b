//! YAML configuration for diagram generation.
//!
//! Every key is optional; CLI flags override whatever the file sets.
//!
//! ```yaml
//! output_dir: docs/erd
//! basename: shop
//! formats: [svg, mermaid]
//! layout: tb
//! exclude: ["Performance*"]
//! ```

use crate::catalog::DEFAULT_BASENAME;
use crate::graph::{Layout, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Conventional config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "schema-erd.yaml";

/// Diagram generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErdConfig {
    /// Directory artifacts are written to
    pub output_dir: PathBuf,
    /// File name without extension
    pub basename: String,
    pub formats: Vec<OutputFormat>,
    pub layout: Layout,
    /// Title for HTML output
    pub title: String,
    /// Pair unannotated collections with foreign keys by target type
    pub infer_back_references: bool,
    /// Entity glob patterns left out of the diagram
    pub exclude: Vec<String>,
}

impl Default for ErdConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            basename: DEFAULT_BASENAME.to_string(),
            formats: vec![OutputFormat::Png, OutputFormat::Pdf, OutputFormat::Dot],
            layout: Layout::LR,
            title: "Entity Relationship Diagram".to_string(),
            infer_back_references: false,
            exclude: Vec::new(),
        }
    }
}

impl ErdConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ErdConfig = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Load an explicit file, else `schema-erd.yaml` if present, else defaults
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path)
                .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e)),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    tracing::debug!(path = DEFAULT_CONFIG_FILE, "using config file");
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ErdConfig::default();
        assert_eq!(config.basename, "sustainable_ecommerce_erd");
        assert_eq!(
            config.formats,
            vec![OutputFormat::Png, OutputFormat::Pdf, OutputFormat::Dot]
        );
        assert!(!config.infer_back_references);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
basename: shop
formats: [svg, mermaid]
layout: tb
exclude:
  - "Performance*"
"#;
        let config: ErdConfig = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.basename, "shop");
        assert_eq!(config.formats, vec![OutputFormat::Svg, OutputFormat::Mermaid]);
        assert_eq!(config.layout, Layout::TB);
        assert_eq!(config.exclude, vec!["Performance*".to_string()]);
        // Unset keys keep their defaults
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "output_dir: out\ninfer_back_references: true").unwrap();

        let config = ErdConfig::load(file.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.infer_back_references);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result: Result<ErdConfig, _> = serde_yaml_ng::from_str("formats: [bmp]");
        assert!(result.is_err());
    }
}
