use std::path::PathBuf;

use simstats_engine::align::downsample;
use simstats_engine::runner;
use simstats_shared::config::ExperimentParams;
use simstats_shared::run::RunStore;

use super::load_run_store;
use crate::{output, AnalysisArgs};

pub fn run(
    files: &[PathBuf],
    points: Option<usize>,
    analysis: &AnalysisArgs,
) -> anyhow::Result<()> {
    let config = analysis.config();

    let inputs = files
        .iter()
        .map(|path| -> anyhow::Result<(ExperimentParams, RunStore)> {
            let params = ExperimentParams::from_file_name(path)?;
            Ok((params, load_run_store(path)?))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut experiments = runner::run_comparison(inputs, &config, analysis.n_workers())?;
    if let Some(n) = points {
        for e in &mut experiments {
            e.response_time = downsample(&e.response_time, n);
            e.queue_length = downsample(&e.queue_length, n);
        }
    }

    output::print_experiments_csv(&experiments);
    Ok(())
}
