use std::path::PathBuf;

use simstats_engine::runner;
use simstats_engine::sweep::SweepParameter;
use simstats_shared::config::ExperimentParams;
use simstats_shared::run::RunStore;

use super::load_run_store;
use crate::{output, AnalysisArgs};

pub fn run(files: &[PathBuf], param: &str, analysis: &AnalysisArgs) -> anyhow::Result<()> {
    let parameter: SweepParameter = param.parse()?;
    let config = analysis.config();

    let inputs = files
        .iter()
        .map(|path| -> anyhow::Result<(ExperimentParams, RunStore)> {
            let params = ExperimentParams::from_file_name(path)?;
            Ok((params, load_run_store(path)?))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    println!("Sweeping {} experiments along {}...", inputs.len(), parameter.label());
    let points = runner::run_sweep(inputs, parameter, &config, analysis.n_workers())?;

    output::print_sweep(parameter, &points);
    Ok(())
}
