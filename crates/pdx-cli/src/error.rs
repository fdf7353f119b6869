use std::path::PathBuf;

use thiserror::Error;

/// Failures outside the core parser/builder: I/O, config, map tables
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pdx(#[from] pdx_core::Error),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: invalid config: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Bad row or header in a flat table such as the province definitions
    #[error("{}:{line}: {message}", .path.display())]
    Table {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: {message}", .path.display())]
    Map { path: PathBuf, message: String },

    #[error("could not find province history file '{file}' under {searched}")]
    MissingHistory { file: String, searched: String },

    #[error("could not serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
