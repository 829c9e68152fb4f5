use crate::config::RunContext;
use crate::support::or_exit;
use segprep_nnunet::{RunnerStep, TrainingDriver};

pub fn run(ctx: RunContext, dry_run: bool) {
    let runner = ctx.runner(dry_run);
    or_exit(runner.convert_dataset());
    if dry_run {
        println!("{}", runner.render_command(&RunnerStep::Convert).join(" "));
    } else {
        println!("segprep convert: done ({})", runner.work_dir().display());
    }
}
