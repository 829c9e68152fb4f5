//! MSD-style dataset trees and manifest discovery.
//!
//! ```text
//! <dataroot>/
//!   imagesTs/   test images          -> testing[]  { image }
//!   imagesTr/   training images      -> training[] { image, label, fold }
//!   labelsTr/   labels, same names as imagesTr
//! ```

use crate::error::DatasetError;
use segprep_kernel::{Datalist, TestingCase, TrainingCase};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_TEST_DIR: &str = "imagesTs";
pub const DEFAULT_TRAIN_DIR: &str = "imagesTr";
pub const DEFAULT_LABEL_DIR: &str = "labelsTr";
pub const DEFAULT_EXTENSION: &str = ".nii.gz";
/// Prefix of macOS AppleDouble resource-fork files (`._case.nii.gz`).
pub const DEFAULT_HIDDEN_MARKER: &str = "._";

/// Where a dataset lives and which files count as cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    pub dataroot: PathBuf,
    pub test_dir: String,
    pub train_dir: String,
    pub label_dir: String,
    pub extension: String,
    pub hidden_marker: String,
    pub require_labels: bool,
}

impl DatasetLayout {
    pub fn new(dataroot: impl Into<PathBuf>) -> Self {
        Self {
            dataroot: dataroot.into(),
            test_dir: DEFAULT_TEST_DIR.to_string(),
            train_dir: DEFAULT_TRAIN_DIR.to_string(),
            label_dir: DEFAULT_LABEL_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            hidden_marker: DEFAULT_HIDDEN_MARKER.to_string(),
            require_labels: true,
        }
    }

    /// A file name is a case when it contains the image extension and does
    /// not contain the hidden-file marker anywhere.
    pub fn is_candidate(&self, name: &str) -> bool {
        name.contains(&self.extension)
            && (self.hidden_marker.is_empty() || !name.contains(&self.hidden_marker))
    }

    /// Sorted candidate file names directly under `dataroot/dir`.
    pub fn list_candidates(&self, dir: &str) -> Result<Vec<String>, DatasetError> {
        let path = self.dataroot.join(dir);
        if !path.is_dir() {
            return Err(DatasetError::MissingDirectory { path });
        }

        let mut names = Vec::new();
        let entries = fs::read_dir(&path).map_err(|e| DatasetError::io(&path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| DatasetError::io(&path, e))?;
            if !entry.path().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 file name");
                continue;
            };
            if self.is_candidate(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Build the manifest from the directory contents. Every training case
    /// starts in the default fold.
    pub fn discover(&self) -> Result<Datalist, DatasetError> {
        let test_names = self.list_candidates(&self.test_dir)?;
        if test_names.is_empty() {
            tracing::warn!(
                dir = %self.dataroot.join(&self.test_dir).display(),
                "no testing images found"
            );
        }

        let train_names = self.list_candidates(&self.train_dir)?;
        if train_names.is_empty() {
            return Err(DatasetError::EmptyDirectory {
                path: self.dataroot.join(&self.train_dir),
                extension: self.extension.clone(),
            });
        }

        let label_root = self.dataroot.join(&self.label_dir);
        if !label_root.is_dir() {
            return Err(DatasetError::MissingDirectory { path: label_root });
        }

        let testing = test_names
            .iter()
            .map(|name| TestingCase::new(relative_ref(&self.test_dir, name)))
            .collect();

        let mut training = Vec::with_capacity(train_names.len());
        for name in &train_names {
            let label_path = label_root.join(name);
            if self.require_labels && !label_path.is_file() {
                return Err(DatasetError::MissingLabel {
                    image: relative_ref(&self.train_dir, name),
                    path: label_path,
                });
            }
            training.push(TrainingCase::new(
                relative_ref(&self.train_dir, name),
                relative_ref(&self.label_dir, name),
            ));
        }

        let datalist = Datalist::new(testing, training);
        tracing::info!(
            dataroot = %self.dataroot.display(),
            testing = datalist.testing.len(),
            training = datalist.training.len(),
            "discovered dataset"
        );
        Ok(datalist)
    }
}

fn relative_ref(dir: &str, name: &str) -> String {
    format!("./{dir}/{name}")
}
