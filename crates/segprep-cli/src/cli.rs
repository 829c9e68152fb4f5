use crate::config::SegprepConfig;
use clap::{Args, Parser, Subcommand};
use segprep_kernel::{RemainderPolicy, ShuffleStrategy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "segprep",
    about = "segprep: deterministic cross-validation folds and nnU-Net driving for segmentation datasets",
    version
)]
pub struct Cli {
    /// Path to segprep.toml (default: ./segprep.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log at debug level unless SEGPREP_LOG/RUST_LOG say otherwise
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the resolved configuration, paths and runner availability
    Env {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan the dataset, assign folds and write the fold manifest
    Datalist {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        folds: FoldArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize the fold partition of an existing manifest
    Folds {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Manifest path (default: <data>/<task>/<task>_folds.json)
        #[arg(long)]
        manifest: Option<String>,

        /// Number of folds to group by
        #[arg(long)]
        num_folds: Option<u32>,

        /// Show the validation/training split for this fold
        #[arg(long)]
        fold: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the nnU-Net data-source descriptor (data_src_cfg.yaml)
    DataSrc {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Imaging modality recorded in the descriptor
        #[arg(long)]
        modality: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert the dataset into nnU-Net's raw layout
    Convert {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        runner: RunnerArgs,
    },

    /// Plan and preprocess the converted dataset
    Plan {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        runner: RunnerArgs,

        #[command(flatten)]
        plan: PlanArgs,
    },

    /// Train one fold under one configuration
    Train {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        runner: RunnerArgs,

        #[command(flatten)]
        train: TrainArgs,
    },

    /// Datalist, descriptor, convert, plan and train in one go
    Run {
        #[command(flatten)]
        dataset: DatasetArgs,

        #[command(flatten)]
        folds: FoldArgs,

        #[command(flatten)]
        runner: RunnerArgs,

        #[command(flatten)]
        plan: PlanArgs,

        #[command(flatten)]
        train: TrainArgs,

        /// Stop after planning
        #[arg(long)]
        skip_train: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Clone, Debug, Default)]
pub struct DatasetArgs {
    /// Base data directory (overrides config and MONAI_DATA_DIRECTORY)
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Task directory under the data root, e.g. Task09_Spleen
    #[arg(long)]
    pub task: Option<String>,

    /// nnU-Net dataset name or id, e.g. 09
    #[arg(long)]
    pub dataset_id: Option<String>,
}

impl DatasetArgs {
    pub fn apply(&self, config: &mut SegprepConfig) {
        if let Some(dir) = &self.data_dir {
            config.dataset.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(task) = &self.task {
            config.dataset.task = task.clone();
        }
        if let Some(id) = &self.dataset_id {
            config.dataset.dataset_id = id.clone();
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct FoldArgs {
    /// Number of cross-validation folds
    #[arg(long)]
    pub num_folds: Option<u32>,

    /// Shuffle seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Shuffle procedure: python (alias mt19937, cpython) or std
    #[arg(long, value_parser = str::parse::<ShuffleStrategy>)]
    pub shuffle: Option<ShuffleStrategy>,

    /// What to do with the N mod k trailing cases: retain (alias keep) or round-robin
    #[arg(long, value_parser = str::parse::<RemainderPolicy>)]
    pub remainder: Option<RemainderPolicy>,
}

impl FoldArgs {
    pub fn apply(&self, config: &mut SegprepConfig) {
        if let Some(num_folds) = self.num_folds {
            config.folds.num_folds = num_folds;
        }
        if let Some(seed) = self.seed {
            config.folds.seed = seed;
        }
        if let Some(shuffle) = self.shuffle {
            config.folds.strategy = shuffle;
        }
        if let Some(remainder) = self.remainder {
            config.folds.remainder = remainder;
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct RunnerArgs {
    /// Python interpreter with MONAI installed
    #[arg(long)]
    pub python: Option<String>,

    /// nnU-Net trainer class name
    #[arg(long)]
    pub trainer_class: Option<String>,

    /// Print runner commands instead of executing them
    #[arg(long)]
    pub dry_run: bool,
}

impl RunnerArgs {
    pub fn apply(&self, config: &mut SegprepConfig) {
        if let Some(python) = &self.python {
            config.nnunet.python = python.clone();
        }
        if let Some(trainer_class) = &self.trainer_class {
            config.nnunet.trainer_class = trainer_class.clone();
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct PlanArgs {
    /// Processes for fingerprint extraction
    #[arg(long)]
    pub npfp: Option<u32>,

    /// Processes per configuration, comma separated (e.g. 2,2,2)
    #[arg(long, value_delimiter = ',')]
    pub n_proc: Vec<u32>,
}

impl PlanArgs {
    pub fn apply(&self, config: &mut SegprepConfig) {
        if let Some(npfp) = self.npfp {
            config.nnunet.npfp = npfp;
        }
        if !self.n_proc.is_empty() {
            config.nnunet.n_proc = self.n_proc.clone();
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct TrainArgs {
    /// Network configuration, e.g. 3d_fullres
    #[arg(long)]
    pub train_config: Option<String>,

    /// Fold to train
    #[arg(long)]
    pub fold: Option<u32>,
}

impl TrainArgs {
    pub fn apply(&self, config: &mut SegprepConfig) {
        if let Some(train_config) = &self.train_config {
            config.nnunet.train_config = train_config.clone();
        }
        if let Some(fold) = self.fold {
            config.nnunet.fold = fold;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold_args(extra: &[&str]) -> FoldArgs {
        let mut argv = vec!["segprep", "datalist"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).expect("arguments should parse").command {
            Commands::Datalist { folds, .. } => folds,
            _ => panic!("expected the datalist subcommand"),
        }
    }

    #[test]
    fn shuffle_and_remainder_accept_aliases() {
        let folds = fold_args(&["--shuffle", "cpython", "--remainder", "keep"]);
        assert_eq!(folds.shuffle, Some(ShuffleStrategy::Python));
        assert_eq!(folds.remainder, Some(RemainderPolicy::Retain));

        let folds = fold_args(&["--shuffle", "StdRng", "--remainder", "round_robin"]);
        assert_eq!(folds.shuffle, Some(ShuffleStrategy::Std));
        assert_eq!(folds.remainder, Some(RemainderPolicy::RoundRobin));
    }

    #[test]
    fn unknown_shuffle_is_rejected() {
        let err = Cli::try_parse_from(["segprep", "datalist", "--shuffle", "sobol"])
            .err()
            .expect("should fail");
        assert!(err.to_string().contains("unknown shuffle strategy: sobol"), "{err}");
    }

    #[test]
    fn fold_args_override_config() {
        let mut config = SegprepConfig::default();
        fold_args(&["--shuffle", "mt19937", "--remainder", "round-robin", "--num-folds", "3"])
            .apply(&mut config);
        assert_eq!(config.folds.strategy, ShuffleStrategy::Python);
        assert_eq!(config.folds.remainder, RemainderPolicy::RoundRobin);
        assert_eq!(config.folds.num_folds, 3);
    }
}
