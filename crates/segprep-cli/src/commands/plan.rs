use crate::config::RunContext;
use crate::support::or_exit;
use segprep_nnunet::{RunnerStep, TrainingDriver};

pub fn run(ctx: RunContext, dry_run: bool) {
    let runner = ctx.runner(dry_run);
    let params = ctx.config.nnunet.plan_params();
    or_exit(runner.plan_and_process(&params));
    if dry_run {
        let step = RunnerStep::Plan(params);
        println!("{}", runner.render_command(&step).join(" "));
    } else {
        println!(
            "segprep plan: done (npfp {}, n_proc {:?})",
            params.npfp, params.n_proc
        );
    }
}
