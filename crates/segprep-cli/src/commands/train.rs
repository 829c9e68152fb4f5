use crate::config::{RunContext, SegprepConfig};
use crate::support::or_exit;
use segprep_kernel::FoldError;
use segprep_nnunet::{RunnerStep, TrainingDriver};

/// The fold to train must be one the manifest actually has.
pub fn check_train_fold(config: &SegprepConfig) -> Result<(), FoldError> {
    let num_folds = config.folds.num_folds;
    if num_folds == 0 {
        return Err(FoldError::ZeroFolds);
    }
    if config.nnunet.fold >= num_folds {
        return Err(FoldError::FoldOutOfRange {
            fold: config.nnunet.fold,
            num_folds,
        });
    }
    Ok(())
}

pub fn run(ctx: RunContext, dry_run: bool) {
    or_exit(check_train_fold(&ctx.config));

    let nnunet = &ctx.config.nnunet;
    let runner = ctx.runner(dry_run);
    or_exit(runner.train_single_model(&nnunet.train_config, nnunet.fold));
    if dry_run {
        let step = RunnerStep::Train {
            config: nnunet.train_config.clone(),
            fold: nnunet.fold,
        };
        println!("{}", runner.render_command(&step).join(" "));
    } else {
        println!(
            "segprep train: done ({} fold {})",
            nnunet.train_config, nnunet.fold
        );
    }
}
