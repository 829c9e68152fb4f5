//! Data-source descriptor handed to the nnU-Net runner.
//!
//! ```yaml
//! modality: CT
//! dataset_name_or_id: '09'
//! datalist: /data/Task09_Spleen/Task09_Spleen_folds.json
//! dataroot: /data/Task09_Spleen
//! ```

use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODALITY: &str = "CT";
pub const DATA_SRC_FILE_NAME: &str = "data_src_cfg.yaml";

/// Numeric dataset id (`"09"` -> 9), if the identifier is numeric.
pub fn numeric_dataset_id(dataset_name_or_id: &str) -> Option<u32> {
    dataset_name_or_id.trim().parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub modality: String,
    pub dataset_name_or_id: String,
    pub datalist: PathBuf,
    pub dataroot: PathBuf,
}

impl DataSourceConfig {
    pub fn new(
        dataset_name_or_id: impl Into<String>,
        datalist: impl Into<PathBuf>,
        dataroot: impl Into<PathBuf>,
    ) -> Self {
        Self {
            modality: DEFAULT_MODALITY.to_string(),
            dataset_name_or_id: dataset_name_or_id.into(),
            datalist: datalist.into(),
            dataroot: dataroot.into(),
        }
    }

    pub fn with_modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = modality.into();
        self
    }

    /// Write the descriptor as YAML, creating the parent directory.
    pub fn write_yaml(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| DatasetError::io(parent, e))?;
        }
        let text = serde_yaml::to_string(self).map_err(|source| DatasetError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|e| DatasetError::io(path, e))?;
        tracing::info!(path = %path.display(), "data-source descriptor written");
        Ok(())
    }

    pub fn read_yaml(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        serde_yaml::from_str(&text).map_err(|source| DatasetError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}
