use crate::config::RunContext;
use crate::support::{CommandError, display_path, or_exit, print_json};
use segprep_dataset::read_manifest;
use serde_json::json;
use std::path::PathBuf;

pub struct Args {
    pub manifest: Option<String>,
    pub num_folds: Option<u32>,
    pub fold: Option<u32>,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct FoldSummary {
    pub manifest_path: PathBuf,
    pub num_folds: u32,
    pub testing: usize,
    pub training: usize,
    pub counts: Vec<usize>,
    pub stray: usize,
    pub digest: String,
    pub split: Option<SplitSummary>,
}

#[derive(Debug, Clone)]
pub struct SplitSummary {
    pub fold: u32,
    pub validation: Vec<String>,
    pub train: usize,
}

pub fn summarize(ctx: &RunContext, args: &Args) -> Result<FoldSummary, CommandError> {
    let manifest_path = args
        .manifest
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| ctx.paths.manifest.clone());
    let num_folds = args.num_folds.unwrap_or(ctx.config.folds.num_folds);

    let datalist = read_manifest(&manifest_path)?;
    let partition = datalist.partition(num_folds)?;

    let split = match args.fold {
        Some(fold) => {
            let split = partition.split(fold)?;
            Some(SplitSummary {
                fold,
                validation: split.validation.iter().map(|c| c.image.clone()).collect(),
                train: split.train.len(),
            })
        }
        None => None,
    };

    Ok(FoldSummary {
        manifest_path,
        num_folds,
        testing: datalist.testing.len(),
        training: datalist.training.len(),
        counts: partition.counts(),
        stray: partition.stray().len(),
        digest: datalist.digest(),
        split,
    })
}

pub fn run(ctx: RunContext, args: Args) {
    let summary = or_exit(summarize(&ctx, &args));

    if args.json {
        let split = summary.split.as_ref().map(|s| {
            json!({
                "fold": s.fold,
                "validation": s.validation,
                "train_count": s.train,
            })
        });
        print_json(&json!({
            "manifest": display_path(&summary.manifest_path),
            "num_folds": summary.num_folds,
            "testing_count": summary.testing,
            "training_count": summary.training,
            "fold_counts": summary.counts,
            "stray_count": summary.stray,
            "digest": summary.digest,
            "split": split,
        }));
        return;
    }

    println!("segprep folds {}", summary.manifest_path.display());
    println!();
    println!("  testing cases: {}", summary.testing);
    println!("  training cases: {}", summary.training);
    for (fold, count) in summary.counts.iter().enumerate() {
        println!("    fold {fold}: {count}");
    }
    if summary.stray > 0 {
        println!(
            "  outside 0..{}: {} case(s)",
            summary.num_folds, summary.stray
        );
    }
    println!("  digest: {}", summary.digest);
    if let Some(split) = &summary.split {
        println!("  fold {} validation ({}):", split.fold, split.validation.len());
        for image in &split.validation {
            println!("    - {image}");
        }
        println!("  fold {} training: {} case(s)", split.fold, split.train);
    }
}
