use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;
use wapispec_core::config::OutputFormat;
use wapispec_core::openapi::{self, OpenApiDocument};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to serialize document as YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Writes one `{group}.{json|yaml}` file per document.
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
    format: OutputFormat,
    indent: bool,
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat, indent: bool) -> Self {
        Self {
            dir: dir.into(),
            format,
            indent,
        }
    }

    pub fn path_for(&self, group: &str) -> PathBuf {
        self.dir.join(format!("{group}.{}", self.format.extension()))
    }

    pub fn render(&self, document: &OpenApiDocument) -> Result<String, OutputError> {
        Ok(match self.format {
            OutputFormat::Json => openapi::to_json(document, self.indent.then_some(4))?,
            OutputFormat::Yaml => openapi::to_yaml(document)?,
        })
    }

    pub fn write(&self, group: &str, document: &OpenApiDocument) -> Result<PathBuf, OutputError> {
        let content = self.render(document)?;
        create_dir(&self.dir)?;
        let path = self.path_for(group);
        fs::write(&path, content).map_err(|source| OutputError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(
            "Generated {group} API file: {} in {} format",
            path.display(),
            self.format.extension().to_uppercase()
        );
        Ok(path)
    }
}

pub(crate) fn create_dir(dir: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.display().to_string(),
        source,
    })
}
