//! nnU-Net adapter for dataset conversion, planning and training.
//!
//! Shells out to MONAI's `nnUNetV2Runner`
//! (`python -m monai.apps.nnunet nnUNetV2Runner <step>`) and keeps no opinion
//! about what happens inside the framework.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_PYTHON: &str = "python3";
pub const RUNNER_MODULE: &str = "monai.apps.nnunet";
pub const RUNNER_CLASS: &str = "nnUNetV2Runner";
pub const DEFAULT_TRAINER_CLASS: &str = "nnUNetTrainer_10epochs";
pub const DEFAULT_TRAIN_CONFIG: &str = "3d_fullres";

/// Directory under the work dir holding converted raw datasets.
pub const RAW_DIR: &str = "nnUNet_raw_data_base";
/// Directory under the work dir holding planned/preprocessed datasets.
pub const PREPROCESSED_DIR: &str = "nnUNet_preprocessed";

/// Errors from driving the nnU-Net runner.
#[derive(Debug, thiserror::Error)]
pub enum NnunetError {
    #[error("python interpreter `{program}` is not available in PATH")]
    NotInstalled { program: String },

    #[error("nnU-Net command failed: {args} ({message})")]
    CommandFailed { args: String, message: String },

    #[error("required input missing: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("no converted dataset under {}; run convert first", path.display())]
    NotConverted { path: PathBuf },

    #[error("no preprocessed dataset under {}; run plan first", path.display())]
    NotPreprocessed { path: PathBuf },
}

/// Parameters for `plan_and_process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanParams {
    /// Processes used for fingerprint extraction.
    pub npfp: u32,
    /// Processes per configuration (2d, 3d_fullres, 3d_lowres).
    pub n_proc: Vec<u32>,
}

impl Default for PlanParams {
    fn default() -> Self {
        Self {
            npfp: 2,
            n_proc: vec![2, 2, 2],
        }
    }
}

/// One runner invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerStep {
    Convert,
    Plan(PlanParams),
    Train { config: String, fold: u32 },
}

impl RunnerStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Convert => "convert_dataset",
            Self::Plan(_) => "plan_and_process",
            Self::Train { .. } => "train_single_model",
        }
    }

    fn extra_args(&self) -> Vec<String> {
        match self {
            Self::Convert => Vec::new(),
            Self::Plan(params) => {
                let n_proc: Vec<String> = params.n_proc.iter().map(u32::to_string).collect();
                vec![
                    "--npfp".to_string(),
                    params.npfp.to_string(),
                    "--n_proc".to_string(),
                    format!("[{}]", n_proc.join(",")),
                ]
            }
            Self::Train { config, fold } => vec![
                "--config".to_string(),
                config.clone(),
                "--fold".to_string(),
                fold.to_string(),
            ],
        }
    }
}

/// The three capabilities the pipeline needs from a training framework.
pub trait TrainingDriver {
    fn convert_dataset(&self) -> Result<(), NnunetError>;
    fn plan_and_process(&self, params: &PlanParams) -> Result<(), NnunetError>;
    fn train_single_model(&self, config: &str, fold: u32) -> Result<(), NnunetError>;
}

/// Thin client around `python -m monai.apps.nnunet nnUNetV2Runner`.
#[derive(Debug, Clone)]
pub struct NnunetRunner {
    python: String,
    input_config: PathBuf,
    work_dir: PathBuf,
    trainer_class_name: String,
    dataset_id: Option<u32>,
    dry_run: bool,
}

impl NnunetRunner {
    pub fn new(input_config: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            python: DEFAULT_PYTHON.to_string(),
            input_config: input_config.into(),
            work_dir: work_dir.into(),
            trainer_class_name: DEFAULT_TRAINER_CLASS.to_string(),
            dataset_id: None,
            dry_run: false,
        }
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_trainer_class(mut self, trainer_class_name: impl Into<String>) -> Self {
        self.trainer_class_name = trainer_class_name.into();
        self
    }

    /// Restrict artifact probes to `DatasetNNN_*` with this id.
    pub fn with_dataset_id(mut self, dataset_id: Option<u32>) -> Self {
        self.dataset_id = dataset_id;
        self
    }

    /// Log commands instead of running them. Artifact probes are skipped.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns true if the interpreter can import the runner module.
    pub fn is_available(&self) -> bool {
        Command::new(&self.python)
            .args(["-c", &format!("import {RUNNER_MODULE}")])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Full argv (program first) for one step.
    pub fn render_command(&self, step: &RunnerStep) -> Vec<String> {
        let mut argv = vec![
            self.python.clone(),
            "-m".to_string(),
            RUNNER_MODULE.to_string(),
            RUNNER_CLASS.to_string(),
            step.name().to_string(),
            "--input_config".to_string(),
            self.input_config.display().to_string(),
            "--work_dir".to_string(),
            self.work_dir.display().to_string(),
            "--trainer_class_name".to_string(),
            self.trainer_class_name.clone(),
        ];
        argv.extend(step.extra_args());
        argv
    }

    /// Converted dataset directory (`<work>/nnUNet_raw_data_base/DatasetNNN_*`).
    pub fn converted_dataset_dir(&self) -> Option<PathBuf> {
        find_dataset_dir(&self.work_dir.join(RAW_DIR), self.dataset_id)
    }

    /// Preprocessed dataset directory (`<work>/nnUNet_preprocessed/DatasetNNN_*`).
    pub fn preprocessed_dataset_dir(&self) -> Option<PathBuf> {
        find_dataset_dir(&self.work_dir.join(PREPROCESSED_DIR), self.dataset_id)
    }

    fn run_step(&self, step: &RunnerStep) -> Result<(), NnunetError> {
        let argv = self.render_command(step);
        if self.dry_run {
            tracing::info!(step = step.name(), command = %argv.join(" "), "dry run");
            return Ok(());
        }

        tracing::info!(step = step.name(), command = %argv.join(" "), "running nnU-Net step");
        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .status()
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    NnunetError::NotInstalled {
                        program: self.python.clone(),
                    }
                } else {
                    NnunetError::CommandFailed {
                        args: argv.join(" "),
                        message: err.to_string(),
                    }
                }
            })?;

        if status.success() {
            tracing::info!(step = step.name(), "nnU-Net step finished");
            Ok(())
        } else {
            let message = match status.code() {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_string(),
            };
            Err(NnunetError::CommandFailed {
                args: argv.join(" "),
                message,
            })
        }
    }
}

impl TrainingDriver for NnunetRunner {
    fn convert_dataset(&self) -> Result<(), NnunetError> {
        if !self.dry_run && !self.input_config.is_file() {
            return Err(NnunetError::MissingInput {
                path: self.input_config.clone(),
            });
        }
        self.run_step(&RunnerStep::Convert)
    }

    fn plan_and_process(&self, params: &PlanParams) -> Result<(), NnunetError> {
        if !self.dry_run && self.converted_dataset_dir().is_none() {
            return Err(NnunetError::NotConverted {
                path: self.work_dir.join(RAW_DIR),
            });
        }
        self.run_step(&RunnerStep::Plan(params.clone()))
    }

    fn train_single_model(&self, config: &str, fold: u32) -> Result<(), NnunetError> {
        if !self.dry_run && self.preprocessed_dataset_dir().is_none() {
            return Err(NnunetError::NotPreprocessed {
                path: self.work_dir.join(PREPROCESSED_DIR),
            });
        }
        self.run_step(&RunnerStep::Train {
            config: config.to_string(),
            fold,
        })
    }
}

fn find_dataset_dir(root: &Path, dataset_id: Option<u32>) -> Option<PathBuf> {
    let pattern = Regex::new(r"^Dataset(\d{3})_").ok()?;
    let mut matches: Vec<PathBuf> = fs::read_dir(root)
        .ok()?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter(|entry| {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                return false;
            };
            let Some(caps) = pattern.captures(name) else {
                return false;
            };
            match dataset_id {
                Some(id) => caps[1].parse::<u32>().ok() == Some(id),
                None => true,
            }
        })
        .map(|entry| entry.path())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn runner(work: &Path) -> NnunetRunner {
        NnunetRunner::new(work.join("data_src_cfg.yaml"), work)
    }

    #[test]
    fn renders_convert_command() {
        let argv = NnunetRunner::new("/w/data_src_cfg.yaml", "/w").render_command(&RunnerStep::Convert);
        assert_eq!(
            argv,
            vec![
                "python3",
                "-m",
                "monai.apps.nnunet",
                "nnUNetV2Runner",
                "convert_dataset",
                "--input_config",
                "/w/data_src_cfg.yaml",
                "--work_dir",
                "/w",
                "--trainer_class_name",
                "nnUNetTrainer_10epochs",
            ]
        );
    }

    #[test]
    fn renders_plan_and_train_arguments() {
        let base = NnunetRunner::new("/w/cfg.yaml", "/w")
            .with_python("/opt/venv/bin/python")
            .with_trainer_class("nnUNetTrainer");

        let plan = base.render_command(&RunnerStep::Plan(PlanParams::default()));
        assert_eq!(plan[0], "/opt/venv/bin/python");
        assert_eq!(plan[4], "plan_and_process");
        assert_eq!(&plan[11..], &["--npfp", "2", "--n_proc", "[2,2,2]"]);

        let train = base.render_command(&RunnerStep::Train {
            config: "3d_fullres".to_string(),
            fold: 3,
        });
        assert_eq!(train[10], "nnUNetTrainer");
        assert_eq!(&train[11..], &["--config", "3d_fullres", "--fold", "3"]);
    }

    #[test]
    fn plan_refuses_to_run_before_conversion() {
        let tmp = TempDir::new().expect("tempdir");
        let err = runner(tmp.path())
            .plan_and_process(&PlanParams::default())
            .expect_err("should fail");
        assert!(matches!(err, NnunetError::NotConverted { .. }), "{err}");
    }

    #[test]
    fn train_refuses_to_run_before_preprocessing() {
        let tmp = TempDir::new().expect("tempdir");
        let err = runner(tmp.path())
            .train_single_model(DEFAULT_TRAIN_CONFIG, 0)
            .expect_err("should fail");
        assert!(matches!(err, NnunetError::NotPreprocessed { .. }), "{err}");
    }

    #[test]
    fn convert_requires_the_input_config() {
        let tmp = TempDir::new().expect("tempdir");
        let err = runner(tmp.path()).convert_dataset().expect_err("should fail");
        assert!(matches!(err, NnunetError::MissingInput { .. }), "{err}");
    }

    #[test]
    fn missing_interpreter_is_reported_as_not_installed() {
        let tmp = TempDir::new().expect("tempdir");
        fs::write(tmp.path().join("data_src_cfg.yaml"), "modality: CT\n").expect("cfg");
        let err = runner(tmp.path())
            .with_python("segprep-no-such-python-interpreter")
            .convert_dataset()
            .expect_err("should fail");
        assert!(matches!(err, NnunetError::NotInstalled { .. }), "{err}");
    }

    #[test]
    fn dry_run_skips_artifact_probes() {
        let tmp = TempDir::new().expect("tempdir");
        let dry = runner(tmp.path()).with_dry_run(true);
        dry.convert_dataset().expect("convert");
        dry.plan_and_process(&PlanParams::default()).expect("plan");
        dry.train_single_model(DEFAULT_TRAIN_CONFIG, 1).expect("train");
    }

    #[test]
    fn dataset_dirs_are_matched_by_id() {
        let tmp = TempDir::new().expect("tempdir");
        let raw = tmp.path().join(RAW_DIR);
        fs::create_dir_all(raw.join("Dataset009_Spleen")).expect("dataset dir");
        fs::create_dir_all(raw.join("Dataset004_Hippocampus")).expect("dataset dir");
        fs::create_dir_all(raw.join("notes")).expect("other dir");

        let any = runner(tmp.path());
        assert_eq!(
            any.converted_dataset_dir(),
            Some(raw.join("Dataset004_Hippocampus"))
        );

        let spleen = runner(tmp.path()).with_dataset_id(Some(9));
        assert_eq!(spleen.converted_dataset_dir(), Some(raw.join("Dataset009_Spleen")));

        let missing = runner(tmp.path()).with_dataset_id(Some(17));
        assert_eq!(missing.converted_dataset_dir(), None);
        assert_eq!(missing.preprocessed_dataset_dir(), None);
    }
}
