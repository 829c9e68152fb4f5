use crate::config::{ConfigError, RunContext, SegprepConfig};
use segprep_dataset::DatasetError;
use segprep_kernel::FoldError;
use segprep_nnunet::NnunetError;
use serde_json::Value;
use std::fmt::Display;
use std::path::Path;

/// Any failure a subcommand can surface.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Fold(#[from] FoldError),

    #[error(transparent)]
    Nnunet(#[from] NnunetError),
}

pub fn exit_with(err: impl Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

pub fn or_exit<T, E: Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| exit_with(e))
}

/// Load config, apply CLI overrides, resolve the data root.
pub fn load_context(
    config_path: Option<&str>,
    overrides: impl FnOnce(&mut SegprepConfig),
) -> Result<RunContext, ConfigError> {
    let mut config = SegprepConfig::load(config_path.map(Path::new))?;
    overrides(&mut config);
    let data_root = config
        .strategy()
        .resolve(|var| std::env::var(var).ok())?;
    tracing::debug!(
        root = %data_root.path().display(),
        source = %data_root.source(),
        "resolved data root"
    );
    Ok(RunContext::new(config, data_root))
}

pub fn load_context_or_exit(
    config_path: Option<&str>,
    overrides: impl FnOnce(&mut SegprepConfig),
) -> RunContext {
    or_exit(load_context(config_path, overrides))
}

pub fn print_json(payload: &Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => exit_with(format!("json serialization: {e}")),
    }
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}
