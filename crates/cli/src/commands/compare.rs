use std::collections::BTreeMap;
use std::path::Path;

use simstats_engine::theory::{measured_response_series, practical_mean, PolicyOption, QueueModel};
use simstats_shared::result::AlignedSeries;

use super::load_run_store;
use crate::{output, AnalysisArgs};

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: &Path,
    option: &str,
    instructions: f64,
    instruction_rate: f64,
    arrival_rate: f64,
    delay: f64,
    points: Option<usize>,
    analysis: &AnalysisArgs,
) -> anyhow::Result<()> {
    let model = QueueModel {
        option: option.parse::<PolicyOption>()?,
        instructions_per_second: instructions,
        instruction_rate,
        arrival_rate,
        forwarding_delay: delay,
    };
    // Unstable configurations are rejected before any data is read.
    let theoretical = model.expected_response_time()?;

    let store = load_run_store(file)?;
    let config = analysis.config();
    let series = measured_response_series(&store, &config, points)?;
    let practical = practical_mean(&series);

    // The window only limits what is listed, not the practical mean.
    let shown: BTreeMap<String, AlignedSeries> = match config.x_limit {
        Some((lo, hi)) => series
            .iter()
            .map(|(module, s)| (module.clone(), s.window(lo, hi)))
            .collect(),
        None => series,
    };

    output::print_comparison(&model, theoretical, practical, &shown);
    Ok(())
}
