use crate::config::RunContext;
use crate::support::{CommandError, display_path, or_exit, print_json};
use segprep_dataset::DataSourceConfig;
use serde_json::json;

/// Write the descriptor pointing nnU-Net at the manifest this run writes.
pub fn write_data_src(ctx: &RunContext) -> Result<DataSourceConfig, CommandError> {
    let dataset = &ctx.config.dataset;
    let descriptor = DataSourceConfig::new(
        dataset.dataset_id.clone(),
        &ctx.paths.manifest,
        &ctx.paths.dataroot,
    )
    .with_modality(dataset.modality.clone());
    descriptor.write_yaml(&ctx.paths.data_src)?;
    Ok(descriptor)
}

pub fn run(ctx: RunContext, json_output: bool) {
    let descriptor = or_exit(write_data_src(&ctx));

    if json_output {
        print_json(&json!({
            "path": display_path(&ctx.paths.data_src),
            "descriptor": descriptor,
        }));
    } else {
        println!("segprep data-src");
        println!();
        println!("  path: {}", ctx.paths.data_src.display());
        println!("  modality: {}", descriptor.modality);
        println!("  dataset: {}", descriptor.dataset_name_or_id);
        println!("  datalist: {}", descriptor.datalist.display());
        println!("  dataroot: {}", descriptor.dataroot.display());
    }
}
