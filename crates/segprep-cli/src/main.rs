//! segprep CLI: the `segprep` command.

mod cli;
mod commands;
mod config;
mod logging;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use support::load_context_or_exit;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: {e}");
    }
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Env { dataset, json } => {
            let ctx = load_context_or_exit(config_path, |c| dataset.apply(c));
            commands::env::run(ctx, json)
        }

        Commands::Datalist {
            dataset,
            folds,
            json,
        } => {
            let ctx = load_context_or_exit(config_path, |c| {
                dataset.apply(c);
                folds.apply(c);
            });
            commands::datalist::run(ctx, json)
        }

        Commands::Folds {
            dataset,
            manifest,
            num_folds,
            fold,
            json,
        } => {
            let ctx = load_context_or_exit(config_path, |c| dataset.apply(c));
            commands::folds::run(
                ctx,
                commands::folds::Args {
                    manifest,
                    num_folds,
                    fold,
                    json,
                },
            )
        }

        Commands::DataSrc {
            dataset,
            modality,
            json,
        } => {
            let ctx = load_context_or_exit(config_path, |c| {
                dataset.apply(c);
                if let Some(modality) = modality {
                    c.dataset.modality = modality;
                }
            });
            commands::data_src::run(ctx, json)
        }

        Commands::Convert { dataset, runner } => {
            let ctx = load_context_or_exit(config_path, |c| {
                dataset.apply(c);
                runner.apply(c);
            });
            commands::convert::run(ctx, runner.dry_run)
        }

        Commands::Plan {
            dataset,
            runner,
            plan,
        } => {
            let ctx = load_context_or_exit(config_path, |c| {
                dataset.apply(c);
                runner.apply(c);
                plan.apply(c);
            });
            commands::plan::run(ctx, runner.dry_run)
        }

        Commands::Train {
            dataset,
            runner,
            train,
        } => {
            let ctx = load_context_or_exit(config_path, |c| {
                dataset.apply(c);
                runner.apply(c);
                train.apply(c);
            });
            commands::train::run(ctx, runner.dry_run)
        }

        Commands::Run {
            dataset,
            folds,
            runner,
            plan,
            train,
            skip_train,
            json,
        } => {
            let ctx = load_context_or_exit(config_path, |c| {
                dataset.apply(c);
                folds.apply(c);
                runner.apply(c);
                plan.apply(c);
                train.apply(c);
            });
            commands::run::run(ctx, runner.dry_run, skip_train, json)
        }
    }
}
