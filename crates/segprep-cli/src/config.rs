//! `segprep.toml` configuration and data-root resolution.

use segprep_dataset::{
    DATA_SRC_FILE_NAME, DEFAULT_EXTENSION, DEFAULT_MODALITY, DatasetLayout, numeric_dataset_id,
};
use segprep_kernel::{FoldPlan, RemainderPolicy, ShuffleStrategy};
use segprep_nnunet::{
    DEFAULT_PYTHON, DEFAULT_TRAIN_CONFIG, DEFAULT_TRAINER_CLASS, NnunetRunner, PlanParams,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DEFAULT_CONFIG_PATH: &str = "segprep.toml";
pub const DATA_DIR_ENV: &str = "MONAI_DATA_DIRECTORY";
pub const NNUNET_DIR_NAME: &str = "nnUNet";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to prepare data root {}: {source}", path.display())]
    DataRoot {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegprepConfig {
    pub dataset: DatasetSection,
    pub folds: FoldSection,
    pub nnunet: NnunetSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSection {
    /// Base data directory. Takes precedence over `MONAI_DATA_DIRECTORY`.
    pub data_dir: Option<PathBuf>,
    pub task: String,
    pub dataset_id: String,
    pub modality: String,
    pub extension: String,
    pub require_labels: bool,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            data_dir: None,
            task: "Task09_Spleen".to_string(),
            dataset_id: "09".to_string(),
            modality: DEFAULT_MODALITY.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            require_labels: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldSection {
    pub num_folds: u32,
    pub seed: u64,
    pub strategy: ShuffleStrategy,
    pub remainder: RemainderPolicy,
}

impl Default for FoldSection {
    fn default() -> Self {
        let plan = FoldPlan::DEFAULT;
        Self {
            num_folds: plan.num_folds,
            seed: plan.seed,
            strategy: plan.strategy,
            remainder: plan.remainder,
        }
    }
}

impl FoldSection {
    pub fn plan(&self) -> FoldPlan {
        FoldPlan::new(self.num_folds, self.seed)
            .with_strategy(self.strategy)
            .with_remainder(self.remainder)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NnunetSection {
    pub python: String,
    pub trainer_class: String,
    pub train_config: String,
    pub fold: u32,
    pub npfp: u32,
    pub n_proc: Vec<u32>,
}

impl Default for NnunetSection {
    fn default() -> Self {
        let plan = PlanParams::default();
        Self {
            python: DEFAULT_PYTHON.to_string(),
            trainer_class: DEFAULT_TRAINER_CLASS.to_string(),
            train_config: DEFAULT_TRAIN_CONFIG.to_string(),
            fold: 0,
            npfp: plan.npfp,
            n_proc: plan.n_proc,
        }
    }
}

impl NnunetSection {
    pub fn plan_params(&self) -> PlanParams {
        PlanParams {
            npfp: self.npfp,
            n_proc: self.n_proc.clone(),
        }
    }
}

impl SegprepConfig {
    /// Load `path`, or the default config file when `path` is `None`.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        if !required && !path.exists() {
            tracing::debug!("no {DEFAULT_CONFIG_PATH} found; using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn strategy(&self) -> DataRootStrategy {
        match &self.dataset.data_dir {
            Some(dir) => DataRootStrategy::Explicit(dir.clone()),
            None => DataRootStrategy::EnvOrTemp {
                var: DATA_DIR_ENV.to_string(),
            },
        }
    }
}

/// How the base data directory is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRootStrategy {
    /// Use this directory, creating it if needed.
    Explicit(PathBuf),
    /// Use `$var` (created if needed), else a temporary directory that lives
    /// as long as the returned [`DataRoot`].
    EnvOrTemp { var: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataRootSource {
    Explicit,
    Environment,
    Temporary,
}

impl std::fmt::Display for DataRootSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::Environment => write!(f, "environment"),
            Self::Temporary => write!(f, "temporary"),
        }
    }
}

/// A resolved base data directory.
#[derive(Debug)]
pub struct DataRoot {
    path: PathBuf,
    source: DataRootSource,
    _temp: Option<TempDir>,
}

impl DataRoot {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> DataRootSource {
        self.source
    }
}

impl DataRootStrategy {
    /// Resolve against `lookup`, which reads environment variables.
    pub fn resolve(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<DataRoot, ConfigError> {
        let (path, source) = match self {
            Self::Explicit(path) => (path.clone(), DataRootSource::Explicit),
            Self::EnvOrTemp { var } => match lookup(var.as_str()).filter(|v| !v.is_empty()) {
                Some(dir) => (PathBuf::from(dir), DataRootSource::Environment),
                None => {
                    let temp = tempfile::Builder::new()
                        .prefix("segprep-")
                        .tempdir()
                        .map_err(|source| ConfigError::DataRoot {
                            path: std::env::temp_dir(),
                            source,
                        })?;
                    tracing::warn!(
                        path = %temp.path().display(),
                        "{var} is unset; using a temporary data root"
                    );
                    return Ok(DataRoot {
                        path: temp.path().to_path_buf(),
                        source: DataRootSource::Temporary,
                        _temp: Some(temp),
                    });
                }
            },
        };

        fs::create_dir_all(&path).map_err(|source| ConfigError::DataRoot {
            path: path.clone(),
            source,
        })?;
        Ok(DataRoot {
            path,
            source,
            _temp: None,
        })
    }
}

/// Every path one run reads or writes, derived from the data root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPaths {
    pub root: PathBuf,
    pub dataroot: PathBuf,
    pub manifest: PathBuf,
    pub nnunet_dir: PathBuf,
    pub data_src: PathBuf,
}

impl RunPaths {
    pub fn new(root: &Path, task: &str) -> Self {
        let dataroot = root.join(task);
        Self {
            root: root.to_path_buf(),
            manifest: dataroot.join(format!("{task}_folds.json")),
            dataroot,
            nnunet_dir: root.join(NNUNET_DIR_NAME),
            data_src: root.join(NNUNET_DIR_NAME).join(DATA_SRC_FILE_NAME),
        }
    }
}

/// Loaded configuration plus the resolved data root.
#[derive(Debug)]
pub struct RunContext {
    pub config: SegprepConfig,
    pub data_root: DataRoot,
    pub paths: RunPaths,
}

impl RunContext {
    pub fn new(config: SegprepConfig, data_root: DataRoot) -> Self {
        let paths = RunPaths::new(data_root.path(), &config.dataset.task);
        Self {
            config,
            data_root,
            paths,
        }
    }

    pub fn layout(&self) -> DatasetLayout {
        let mut layout = DatasetLayout::new(&self.paths.dataroot);
        layout.extension = self.config.dataset.extension.clone();
        layout.require_labels = self.config.dataset.require_labels;
        layout
    }

    pub fn runner(&self, dry_run: bool) -> NnunetRunner {
        let nnunet = &self.config.nnunet;
        NnunetRunner::new(&self.paths.data_src, &self.paths.nnunet_dir)
            .with_python(&nnunet.python)
            .with_trainer_class(&nnunet.trainer_class)
            .with_dataset_id(numeric_dataset_id(&self.config.dataset.dataset_id))
            .with_dry_run(dry_run)
    }
}
