//! Diagram export.
//!
//! Textual formats are written directly. PNG, SVG and PDF are produced by
//! piping DOT into Graphviz, which does the actual layout and rendering.

use crate::error::ExportError;
use crate::graph::{to_dot, to_html, to_json, to_mermaid, Diagram, Layout, OutputFormat};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Consumes a diagram and produces artifacts in the requested formats.
pub trait DiagramExporter {
    /// Returns the path of every artifact written, in request order
    fn export(&self, diagram: &Diagram, formats: &[OutputFormat]) -> Result<Vec<PathBuf>, ExportError>;
}

/// Settings shared by all renderers
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub layout: Layout,
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layout: Layout::LR,
            title: "Entity Relationship Diagram".to_string(),
        }
    }
}

/// Render a textual format
pub fn render_text(
    diagram: &Diagram,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<String, ExportError> {
    match format {
        OutputFormat::Dot => Ok(to_dot(diagram, options.layout)),
        OutputFormat::Mermaid => Ok(to_mermaid(diagram)),
        OutputFormat::Json => Ok(to_json(diagram)),
        OutputFormat::Html => Ok(to_html(diagram, &options.title)),
        OutputFormat::Png | OutputFormat::Svg | OutputFormat::Pdf => {
            Err(ExportError::UnsupportedStdout(format.to_string()))
        }
    }
}

/// Writes `<dir>/<basename>.<ext>` for each requested format
#[derive(Debug, Clone)]
pub struct FileExporter {
    dir: PathBuf,
    basename: String,
    options: RenderOptions,
    dot_command: String,
}

impl FileExporter {
    pub fn new(dir: impl Into<PathBuf>, basename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            basename: basename.into(),
            options: RenderOptions::default(),
            dot_command: "dot".to_string(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the Graphviz executable
    pub fn with_dot_command(mut self, command: impl Into<String>) -> Self {
        self.dot_command = command.into();
        self
    }

    /// Artifact path for a format
    pub fn path_for(&self, format: OutputFormat) -> PathBuf {
        self.dir
            .join(format!("{}.{}", self.basename, format.extension()))
    }

    /// Pipe DOT into Graphviz and collect the rendered bytes from stdout
    fn render_with_graphviz(
        &self,
        dot_source: &str,
        format: OutputFormat,
    ) -> Result<Vec<u8>, ExportError> {
        let mut child = Command::new(&self.dot_command)
            .arg(format!("-T{}", format))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExportError::GraphvizNotFound
                } else {
                    ExportError::Render {
                        format: format.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let render_error = |message: String| ExportError::Render {
            format: format.to_string(),
            message,
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(dot_source.as_bytes())
                .map_err(|e| render_error(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| render_error(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(render_error(format!("{} ({})", output.status, stderr)));
        }

        Ok(output.stdout)
    }

    /// Render one format into memory
    fn render(&self, diagram: &Diagram, format: OutputFormat) -> Result<Vec<u8>, ExportError> {
        if format.is_rendered() {
            let dot = to_dot(diagram, self.options.layout);
            self.render_with_graphviz(&dot, format)
        } else {
            Ok(render_text(diagram, format, &self.options)?.into_bytes())
        }
    }
}

impl DiagramExporter for FileExporter {
    /// Every format is rendered before anything touches the disk. A failed
    /// write removes the artifacts already written.
    fn export(&self, diagram: &Diagram, formats: &[OutputFormat]) -> Result<Vec<PathBuf>, ExportError> {
        let mut rendered: Vec<(OutputFormat, PathBuf, Vec<u8>)> = Vec::with_capacity(formats.len());
        for &format in formats {
            let path = self.path_for(format);
            if rendered.iter().any(|(_, p, _)| *p == path) {
                continue;
            }
            let content = self.render(diagram, format)?;
            rendered.push((format, path, content));
        }

        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut artifacts = Vec::with_capacity(rendered.len());
        for (format, path, content) in rendered {
            if let Err(source) = fs::write(&path, content) {
                remove_artifacts(&artifacts);
                return Err(ExportError::Io { path, source });
            }
            tracing::info!(format = %format, path = %path.display(), "wrote artifact");
            artifacts.push(path);
        }

        Ok(artifacts)
    }
}

fn remove_artifacts(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial artifact");
        }
    }
}
