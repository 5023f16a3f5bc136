//! Reading rig and scene data files

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Serialization formats accepted for data files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Errors reading a data file
#[derive(Error, Debug)]
pub enum DataFileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file extension for {0} (expected .json, .yaml or .yml)")]
    UnsupportedExtension(PathBuf),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Parse a JSON or YAML string
pub fn parse_data<T: DeserializeOwned>(text: &str, format: DataFormat) -> Result<T, DataFileError> {
    Ok(match format {
        DataFormat::Json => serde_json::from_str(text)?,
        DataFormat::Yaml => serde_yaml_ng::from_str(text)?,
    })
}

/// Read and parse a data file, choosing the format by extension
pub fn read_data_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataFileError> {
    let format = DataFormat::from_path(path)
        .ok_or_else(|| DataFileError::UnsupportedExtension(path.to_path_buf()))?;
    let text = fs::read_to_string(path).map_err(|source| DataFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Parsing {} as {format:?}", path.display());
    parse_data(&text, format)
}
