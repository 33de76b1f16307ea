use std::collections::BTreeMap;

use simstats_shared::config::{AnalysisConfig, SubsampleSpec, MS_PER_SECOND};
use simstats_shared::result::{MetricGroups, TimeSeries};
use simstats_shared::run::{RunStore, VectorTrace};
use simstats_shared::AnalysisError;
use tracing::{debug, warn};

use crate::numeric::evenly_spaced_indices;

/// Scalars and vector traces of every run, grouped by module and metric name.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub scalars: MetricGroups<f64>,
    pub vectors: MetricGroups<TimeSeries>,
}

/// Groups the store's observations, subsampling each vector trace per `thinning`.
///
/// Never fails: missing values read as `0.0` and traces whose `time` and
/// `value` lengths differ are cut to the shorter of the two.
pub fn extract(store: &RunStore, thinning: SubsampleSpec) -> Extraction {
    let mut out = Extraction::default();
    let mut n_points = 0usize;

    for (run_name, run) in &store.runs {
        for scalar in &run.scalars {
            out.scalars.push(&scalar.module, &scalar.name, scalar.value());
        }
        for trace in &run.vectors {
            let series = subsample(to_series(run_name, trace), thinning);
            n_points += series.len();
            out.vectors.push(&trace.module, &trace.name, series);
        }
    }

    debug!(
        runs = store.len(),
        points = n_points,
        ?thinning,
        "extracted run statistics"
    );
    out
}

/// [`extract`] behind the strict-ingestion check when `config.strict` is set.
pub fn extract_with(
    store: &RunStore,
    config: &AnalysisConfig,
) -> Result<Extraction, AnalysisError> {
    if config.strict {
        store.validate()?;
    }
    Ok(extract(store, config.subsample))
}

fn to_series(run_name: &str, trace: &VectorTrace) -> TimeSeries {
    let n = trace.time.len().min(trace.value.len());
    if n != trace.time.len() || n != trace.value.len() {
        warn!(
            run = run_name,
            module = %trace.module,
            name = %trace.name,
            time_len = trace.time.len(),
            value_len = trace.value.len(),
            "trace length mismatch, truncating"
        );
    }
    TimeSeries::new(trace.time[..n].to_vec(), trace.value[..n].to_vec())
}

/// Deterministic even-index thinning of one trace.
pub fn subsample(series: TimeSeries, thinning: SubsampleSpec) -> TimeSeries {
    let n_total = series.len();
    match thinning {
        SubsampleSpec::None => series,
        SubsampleSpec::Count(count) => {
            let n_keep = count.min(n_total);
            if n_keep > 1 {
                select(&series, &evenly_spaced_indices(n_total, n_keep))
            } else {
                series
            }
        }
        SubsampleSpec::Rate(pct) => {
            if pct <= 0.0 || n_total == 0 {
                return series;
            }
            let keep_fraction = 1.0 - (pct / 100.0).min(1.0);
            let n_keep = ((n_total as f64 * keep_fraction).floor() as usize).max(1);
            select(&series, &evenly_spaced_indices(n_total, n_keep))
        }
    }
}

fn select(series: &TimeSeries, indices: &[usize]) -> TimeSeries {
    TimeSeries::new(
        indices.iter().map(|&i| series.time[i]).collect(),
        indices.iter().map(|&i| series.value[i]).collect(),
    )
}

/// All sample values of `key` per module, concatenated across runs.
pub fn flatten_vector_values(
    vectors: &MetricGroups<TimeSeries>,
    key: &str,
    convert_to_ms: bool,
) -> BTreeMap<String, Vec<f64>> {
    let scale = if convert_to_ms { MS_PER_SECOND } else { 1.0 };
    vectors
        .with_metric(key)
        .map(|(module, traces)| {
            let values = traces
                .iter()
                .flat_map(|t| t.value.iter().map(|v| v * scale))
                .collect();
            (module.to_string(), values)
        })
        .collect()
}
