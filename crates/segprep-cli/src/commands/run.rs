//! End-to-end pipeline: manifest, descriptor, then the three runner steps.
//!
//! Steps run strictly in order and the first failure ends the run. Files
//! written before the failure are left in place.

use crate::commands::data_src::write_data_src;
use crate::commands::datalist::{DatalistOutcome, build_datalist, payload, print_summary};
use crate::commands::train::check_train_fold;
use crate::config::RunContext;
use crate::support::{CommandError, display_path, or_exit, print_json};
use segprep_nnunet::{RunnerStep, TrainingDriver};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub datalist: DatalistOutcome,
    pub steps: Vec<RunnerStep>,
}

pub fn run_pipeline(
    ctx: &RunContext,
    driver: &dyn TrainingDriver,
    skip_train: bool,
) -> Result<PipelineOutcome, CommandError> {
    check_train_fold(&ctx.config)?;
    let nnunet = &ctx.config.nnunet;

    let datalist = build_datalist(ctx)?;
    write_data_src(ctx)?;

    let mut steps = Vec::new();
    driver.convert_dataset()?;
    steps.push(RunnerStep::Convert);

    let params = nnunet.plan_params();
    driver.plan_and_process(&params)?;
    steps.push(RunnerStep::Plan(params));

    if skip_train {
        tracing::info!("training skipped");
    } else {
        driver.train_single_model(&nnunet.train_config, nnunet.fold)?;
        steps.push(RunnerStep::Train {
            config: nnunet.train_config.clone(),
            fold: nnunet.fold,
        });
    }

    Ok(PipelineOutcome { datalist, steps })
}

pub fn run(ctx: RunContext, dry_run: bool, skip_train: bool, json_output: bool) {
    let runner = ctx.runner(dry_run);
    let outcome = or_exit(run_pipeline(&ctx, &runner, skip_train));
    let names: Vec<&str> = outcome.steps.iter().map(RunnerStep::name).collect();
    let commands: Vec<String> = if runner.is_dry_run() {
        outcome
            .steps
            .iter()
            .map(|step| runner.render_command(step).join(" "))
            .collect()
    } else {
        Vec::new()
    };

    if json_output {
        print_json(&json!({
            "datalist": payload(&outcome.datalist),
            "data_src": display_path(&ctx.paths.data_src),
            "work_dir": display_path(&ctx.paths.nnunet_dir),
            "steps": names,
            "dry_run": dry_run,
            "commands": commands,
        }));
    } else {
        print_summary(&outcome.datalist);
        println!("  data-src: {}", ctx.paths.data_src.display());
        println!("  steps: {}", names.join(" -> "));
        for command in &commands {
            println!("    $ {command}");
        }
    }
}
