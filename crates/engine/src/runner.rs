use std::collections::BTreeMap;

use rayon::prelude::*;
use simstats_shared::config::{AnalysisConfig, ExperimentParams};
use simstats_shared::result::{AlignedSeries, ScalarSummary};
use simstats_shared::run::RunStore;
use tracing::info;

use crate::align::mean_time_series;
use crate::extract::{extract_with, flatten_vector_values};
use crate::scalar::{summarize, summarize_metric, total};
use crate::sweep::{experiment_series, sweep_point, ExperimentSeries, SweepParameter, SweepPoint};

/// A vector metric to align, and whether its values are seconds to report in ms.
#[derive(Debug, Clone, Copy)]
pub struct VectorMetric<'a> {
    pub key: &'a str,
    pub convert_to_ms: bool,
}

/// Per-metric results for one run store. Outer keys are metric names, inner keys modules.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub series: BTreeMap<String, BTreeMap<String, AlignedSeries>>,
    /// Summary over every sample of each vector metric.
    pub samples: BTreeMap<String, BTreeMap<String, ScalarSummary>>,
    pub scalars: BTreeMap<String, BTreeMap<String, ScalarSummary>>,
    pub totals: BTreeMap<String, f64>,
}

fn build_pool(n_workers: Option<usize>) -> anyhow::Result<rayon::ThreadPool> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(n_workers.unwrap_or_else(|| rayon::current_num_threads().min(8)))
        .build()?)
}

/// Extracts once, then aligns and summarizes each requested metric in parallel.
pub fn analyze(
    store: &RunStore,
    vector_metrics: &[VectorMetric<'_>],
    scalar_keys: &[&str],
    config: &AnalysisConfig,
    n_workers: Option<usize>,
) -> anyhow::Result<AnalysisReport> {
    let extraction = extract_with(store, config)?;
    let pool = build_pool(n_workers)?;

    let (vector_parts, scalar_parts) = pool.install(|| {
        let vector_parts: Vec<_> = vector_metrics
            .par_iter()
            .map(|m| {
                let series = mean_time_series(&extraction.vectors, m.key, m.convert_to_ms);
                let samples = flatten_vector_values(&extraction.vectors, m.key, m.convert_to_ms)
                    .into_iter()
                    .map(|(module, values)| (module, summarize(&values, config.confidence)))
                    .collect();
                (m.key.to_string(), series, samples)
            })
            .collect();
        let scalar_parts: Vec<_> = scalar_keys
            .par_iter()
            .map(|&key| {
                (
                    key.to_string(),
                    summarize_metric(&extraction.scalars, key, config.confidence),
                    total(&extraction.scalars, key),
                )
            })
            .collect();
        (vector_parts, scalar_parts)
    });

    let mut report = AnalysisReport::default();
    for (key, series, samples) in vector_parts {
        report.series.insert(key.clone(), series);
        report.samples.insert(key, samples);
    }
    for (key, summaries, sum) in scalar_parts {
        report.scalars.insert(key.clone(), summaries);
        report.totals.insert(key, sum);
    }
    Ok(report)
}

/// One sweep point per experiment, computed in parallel and sorted by parameter value.
pub fn run_sweep(
    inputs: Vec<(ExperimentParams, RunStore)>,
    parameter: SweepParameter,
    config: &AnalysisConfig,
    n_workers: Option<usize>,
) -> anyhow::Result<Vec<SweepPoint>> {
    let pool = build_pool(n_workers)?;
    info!(experiments = inputs.len(), parameter = parameter.label(), "running sweep");

    let points: Result<Vec<SweepPoint>, _> = pool.install(|| {
        inputs
            .into_par_iter()
            .map(|(params, store)| sweep_point(params, parameter, &store, config))
            .collect()
    });

    let mut points = points?;
    points.sort_by(|a, b| a.parameter_value.total_cmp(&b.parameter_value));
    Ok(points)
}

/// Labelled fleet-wide series per experiment, in input order.
pub fn run_comparison(
    inputs: Vec<(ExperimentParams, RunStore)>,
    config: &AnalysisConfig,
    n_workers: Option<usize>,
) -> anyhow::Result<Vec<ExperimentSeries>> {
    let pool = build_pool(n_workers)?;
    info!(experiments = inputs.len(), "comparing experiments");

    let series: Result<Vec<ExperimentSeries>, _> = pool.install(|| {
        inputs
            .into_par_iter()
            .map(|(params, store)| experiment_series(params, &store, config))
            .collect()
    });
    Ok(series?)
}
