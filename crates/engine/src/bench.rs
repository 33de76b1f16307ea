use std::time::{Duration, Instant};

use simstats_shared::config::{SubsampleSpec, QUEUE_LENGTH_VECTOR, RESPONSE_TIME_VECTOR};
use tracing::info;

use crate::align::{aggregate_across_modules, mean_time_series};
use crate::extract::extract;
use crate::synthetic::{generate_store, SyntheticConfig};

#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub runs: usize,
    pub raw_points: usize,
    pub generate: Duration,
    pub extract: Duration,
    pub align: Duration,
    pub aggregate: Duration,
}

/// Times each pipeline stage on a synthetic store.
pub fn run_profile(config: &SyntheticConfig, subsample: SubsampleSpec) -> ProfileReport {
    let start = Instant::now();
    let store = generate_store(config);
    let generate = start.elapsed();

    let raw_points = store
        .runs
        .values()
        .flat_map(|run| run.vectors.iter())
        .map(|trace| trace.time.len())
        .sum();

    let start = Instant::now();
    let extraction = extract(&store, subsample);
    let extract_time = start.elapsed();

    let start = Instant::now();
    let rt = mean_time_series(&extraction.vectors, RESPONSE_TIME_VECTOR, true);
    let ql = mean_time_series(&extraction.vectors, QUEUE_LENGTH_VECTOR, false);
    let align = start.elapsed();

    let start = Instant::now();
    let fleet_rt = aggregate_across_modules(&extraction.vectors, RESPONSE_TIME_VECTOR, true);
    let fleet_ql = aggregate_across_modules(&extraction.vectors, QUEUE_LENGTH_VECTOR, false);
    let aggregate = start.elapsed();

    info!(
        modules = rt.len().max(ql.len()),
        fleet_points = fleet_rt.len() + fleet_ql.len(),
        "profile complete"
    );

    ProfileReport {
        runs: store.len(),
        raw_points,
        generate,
        extract: extract_time,
        align,
        aggregate,
    }
}
