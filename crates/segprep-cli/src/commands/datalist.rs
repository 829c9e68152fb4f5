use crate::config::RunContext;
use crate::support::{CommandError, display_path, or_exit, print_json};
use segprep_dataset::write_manifest;
use segprep_kernel::{FoldReport, assign_folds};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DatalistOutcome {
    pub manifest_path: PathBuf,
    pub testing: usize,
    pub report: FoldReport,
    pub fold_counts: Vec<usize>,
    pub digest: String,
}

/// Discover cases, shuffle and fold them, and write the manifest.
pub fn build_datalist(ctx: &RunContext) -> Result<DatalistOutcome, CommandError> {
    let mut datalist = ctx.layout().discover()?;
    let plan = ctx.config.folds.plan();
    let report = assign_folds(&mut datalist.training, plan)?;
    if report.remainder > 0 {
        tracing::info!(
            remainder = report.remainder,
            policy = %report.remainder_policy,
            "trailing cases past the last full fold"
        );
    }

    write_manifest(&ctx.paths.manifest, &datalist)?;
    let fold_counts = datalist.partition(plan.num_folds)?.counts();

    Ok(DatalistOutcome {
        manifest_path: ctx.paths.manifest.clone(),
        testing: datalist.testing.len(),
        report,
        fold_counts,
        digest: datalist.digest(),
    })
}

pub fn payload(outcome: &DatalistOutcome) -> serde_json::Value {
    json!({
        "manifest": display_path(&outcome.manifest_path),
        "testing_count": outcome.testing,
        "training_count": outcome.report.total,
        "fold_report": outcome.report,
        "fold_counts": outcome.fold_counts,
        "digest": outcome.digest,
    })
}

pub fn run(ctx: RunContext, json_output: bool) {
    let outcome = or_exit(build_datalist(&ctx));

    if json_output {
        print_json(&payload(&outcome));
    } else {
        print_summary(&outcome);
    }
}

pub fn print_summary(outcome: &DatalistOutcome) {
    let report = &outcome.report;
    println!("segprep datalist");
    println!();
    println!("  manifest: {}", outcome.manifest_path.display());
    println!("  testing cases: {}", outcome.testing);
    println!("  training cases: {}", report.total);
    println!(
        "  folds: {} (seed {}, {} shuffle)",
        report.num_folds, report.seed, report.strategy
    );
    println!("  fold size: {}", report.fold_size);
    println!(
        "  remainder: {} ({})",
        report.remainder, report.remainder_policy
    );
    for (fold, count) in outcome.fold_counts.iter().enumerate() {
        println!("    fold {fold}: {count}");
    }
    println!("  digest: {}", outcome.digest);
}
