use std::path::Path;

use simstats_engine::runner::{self, VectorMetric};
use simstats_shared::config::{
    DROPPED_COUNT, FORWARDED_COUNT, QUEUE_LENGTH_TIMEAVG, QUEUE_LENGTH_VECTOR, RESPONSE_TIME_MEAN,
    RESPONSE_TIME_VECTOR,
};

use super::load_run_store;
use crate::{output, AnalysisArgs};

pub fn run(file: &Path, analysis: &AnalysisArgs) -> anyhow::Result<()> {
    let store = load_run_store(file)?;
    let config = analysis.config();

    let vector_metrics = [
        VectorMetric {
            key: RESPONSE_TIME_VECTOR,
            convert_to_ms: true,
        },
        VectorMetric {
            key: QUEUE_LENGTH_VECTOR,
            convert_to_ms: false,
        },
    ];
    let scalar_keys = [
        DROPPED_COUNT,
        FORWARDED_COUNT,
        QUEUE_LENGTH_TIMEAVG,
        RESPONSE_TIME_MEAN,
    ];

    let start = std::time::Instant::now();
    let report = runner::analyze(
        &store,
        &vector_metrics,
        &scalar_keys,
        &config,
        analysis.n_workers(),
    )?;
    let elapsed = start.elapsed();

    output::print_summary(&report, store.len(), elapsed);
    Ok(())
}
