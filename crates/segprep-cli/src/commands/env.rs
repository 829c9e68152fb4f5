use crate::config::RunContext;
use crate::support::{display_path, print_json, yes_no};
use serde_json::json;

pub fn run(ctx: RunContext, json_output: bool) {
    let runner = ctx.runner(false);
    let runner_available = runner.is_available();
    let paths = &ctx.paths;

    if json_output {
        print_json(&json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_root": display_path(ctx.data_root.path()),
            "data_root_source": ctx.data_root.source(),
            "paths": paths,
            "config": ctx.config,
            "runner_available": runner_available,
        }));
        return;
    }

    let config = &ctx.config;
    println!("segprep {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!(
        "  data root: {} ({})",
        ctx.data_root.path().display(),
        ctx.data_root.source()
    );
    println!("  dataset root: {}", paths.dataroot.display());
    println!("  manifest: {}", paths.manifest.display());
    println!("  nnU-Net work dir: {}", paths.nnunet_dir.display());
    println!("  descriptor: {}", paths.data_src.display());
    println!(
        "  dataset: {} (id {}, {})",
        config.dataset.task, config.dataset.dataset_id, config.dataset.modality
    );
    println!(
        "  folds: {} (seed {}, {} shuffle, remainder {})",
        config.folds.num_folds, config.folds.seed, config.folds.strategy, config.folds.remainder
    );
    println!(
        "  trainer: {} / {} fold {}",
        config.nnunet.trainer_class, config.nnunet.train_config, config.nnunet.fold
    );
    println!(
        "  runner available ({}): {}",
        config.nnunet.python,
        yes_no(runner_available)
    );
}
