//! Errors from reading dataset trees and writing manifests.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("no `{extension}` files found in {}", path.display())]
    EmptyDirectory { path: PathBuf, extension: String },

    #[error("label missing for training image `{image}`: expected {}", path.display())]
    MissingLabel { image: String, path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid manifest JSON at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid YAML at {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
