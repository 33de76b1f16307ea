//! Time alignment of per-run vector traces onto a shared axis.

use std::collections::BTreeMap;

use simstats_shared::config::MS_PER_SECOND;
use simstats_shared::result::{AlignedSeries, MetricGroups, ScalarSummary, TimeSeries};
use tracing::debug;

use crate::numeric::{evenly_spaced_indices, interp_onto, nearest_index, sorted_unique};
use crate::scalar::summarize;

#[inline]
fn unit_scale(convert_to_ms: bool) -> f64 {
    if convert_to_ms {
        MS_PER_SECOND
    } else {
        1.0
    }
}

/// Mean of one module's traces on the union of their timestamps.
///
/// Every non-empty trace is interpolated (clamped) at every shared timestamp,
/// so each point averages over all contributing traces. Returns `None` when
/// no trace has any points.
pub fn align_and_average(traces: &[TimeSeries], convert_to_ms: bool) -> Option<AlignedSeries> {
    let contributing: Vec<&TimeSeries> = traces.iter().filter(|t| !t.is_empty()).collect();
    if contributing.is_empty() {
        return None;
    }

    let times = sorted_unique(contributing.iter().map(|t| t.time.as_slice()));
    let mut sums = vec![0.0_f64; times.len()];
    for trace in &contributing {
        for (sum, v) in sums.iter_mut().zip(interp_onto(&times, &trace.time, &trace.value)) {
            *sum += v;
        }
    }

    let n = contributing.len() as f64;
    let scale = unit_scale(convert_to_ms);
    let values = sums.into_iter().map(|s| s / n * scale).collect();
    Some(AlignedSeries { times, values })
}

/// [`align_and_average`] plus a confidence interval per shared timestamp.
///
/// The interval summarizes the traces' interpolated values at that timestamp,
/// in the same unit as the mean. Summaries line up index for index with the
/// returned series.
pub fn align_with_ci(
    traces: &[TimeSeries],
    convert_to_ms: bool,
    confidence: f64,
) -> Option<(AlignedSeries, Vec<ScalarSummary>)> {
    let contributing: Vec<&TimeSeries> = traces.iter().filter(|t| !t.is_empty()).collect();
    if contributing.is_empty() {
        return None;
    }

    let times = sorted_unique(contributing.iter().map(|t| t.time.as_slice()));
    let scale = unit_scale(convert_to_ms);
    // columns[k] holds every trace's value at times[k]
    let mut columns = vec![Vec::with_capacity(contributing.len()); times.len()];
    for trace in &contributing {
        let interpolated = interp_onto(&times, &trace.time, &trace.value);
        for (column, v) in columns.iter_mut().zip(interpolated) {
            column.push(v * scale);
        }
    }

    let intervals: Vec<ScalarSummary> = columns
        .iter()
        .map(|column| summarize(column, confidence))
        .collect();
    let values = intervals.iter().map(|s| s.mean).collect();
    Some((AlignedSeries { times, values }, intervals))
}

/// [`align_and_average`] for every module that recorded `key`.
pub fn mean_time_series(
    vectors: &MetricGroups<TimeSeries>,
    key: &str,
    convert_to_ms: bool,
) -> BTreeMap<String, AlignedSeries> {
    let series: BTreeMap<String, AlignedSeries> = vectors
        .with_metric(key)
        .filter_map(|(module, traces)| {
            align_and_average(traces, convert_to_ms).map(|s| (module.to_string(), s))
        })
        .collect();
    debug!(key, modules = series.len(), "aligned mean time series");
    series
}

/// Fleet-wide mean of `key` over every trace of every module.
///
/// Traces are interpolated onto the union axis; single-point traces hold
/// their value and empty traces contribute zeros. Each timestamp's sum is
/// divided by the number of traces whose interpolated value is non-zero
/// there, and timestamps with no non-zero contributor read as `0.0`.
pub fn aggregate_across_modules(
    vectors: &MetricGroups<TimeSeries>,
    key: &str,
    convert_to_ms: bool,
) -> AlignedSeries {
    let traces: Vec<&TimeSeries> = vectors
        .with_metric(key)
        .flat_map(|(_, traces)| traces.iter())
        .collect();
    let times = sorted_unique(traces.iter().map(|t| t.time.as_slice()));
    if times.is_empty() {
        return AlignedSeries::default();
    }

    let mut sums = vec![0.0_f64; times.len()];
    let mut counts = vec![0usize; times.len()];
    for trace in &traces {
        let interpolated = interp_onto(&times, &trace.time, &trace.value);
        for ((sum, count), v) in sums.iter_mut().zip(counts.iter_mut()).zip(interpolated) {
            *sum += v;
            if v != 0.0 {
                *count += 1;
            }
        }
    }

    let scale = unit_scale(convert_to_ms);
    let values = sums
        .into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count == 0 {
                0.0
            } else {
                sum / count as f64 * scale
            }
        })
        .collect();
    debug!(
        key,
        traces = traces.len(),
        points = times.len(),
        "aggregated across modules"
    );
    AlignedSeries { times, values }
}

/// Fleet-wide mean of `key` dividing by every trace, zero-valued or empty.
///
/// Same axis and interpolation as [`aggregate_across_modules`], but each
/// timestamp's sum is divided by the total number of traces.
pub fn mean_across_modules(
    vectors: &MetricGroups<TimeSeries>,
    key: &str,
    convert_to_ms: bool,
) -> AlignedSeries {
    let traces: Vec<&TimeSeries> = vectors
        .with_metric(key)
        .flat_map(|(_, traces)| traces.iter())
        .collect();
    let times = sorted_unique(traces.iter().map(|t| t.time.as_slice()));
    if times.is_empty() {
        return AlignedSeries::default();
    }

    let mut sums = vec![0.0_f64; times.len()];
    for trace in &traces {
        for (sum, v) in sums.iter_mut().zip(interp_onto(&times, &trace.time, &trace.value)) {
            *sum += v;
        }
    }

    let n = traces.len() as f64;
    let scale = unit_scale(convert_to_ms);
    let values = sums.into_iter().map(|s| s / n * scale).collect();
    debug!(key, traces = traces.len(), points = times.len(), "mean across modules");
    AlignedSeries { times, values }
}

/// Plain mean over modules of their mean series, on the union axis.
///
/// Every module counts in the denominator; a module with an empty series
/// contributes zeros.
pub fn global_mean_series(series: &BTreeMap<String, AlignedSeries>) -> AlignedSeries {
    if series.is_empty() {
        return AlignedSeries::default();
    }
    let times = sorted_unique(series.values().map(|s| s.times.as_slice()));
    let mut sums = vec![0.0_f64; times.len()];
    for s in series.values() {
        for (sum, v) in sums.iter_mut().zip(interp_onto(&times, &s.times, &s.values)) {
            *sum += v;
        }
    }
    let n = series.len() as f64;
    let values = sums.into_iter().map(|s| s / n).collect();
    AlignedSeries { times, values }
}

/// Mean of one module's traces using each trace's nearest sample.
///
/// A trace only contributes at shared timestamps inside its own time range.
/// Timestamps no trace covers are dropped.
pub fn align_nearest(traces: &[TimeSeries], convert_to_ms: bool) -> Option<AlignedSeries> {
    let times = sorted_unique(traces.iter().map(|t| t.time.as_slice()));
    let scale = unit_scale(convert_to_ms);
    let mut out = AlignedSeries::default();

    for &t in &times {
        let (sum, count) = traces
            .iter()
            .filter_map(|trace| nearest_index(t, &trace.time).and_then(|i| trace.value.get(i)))
            .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count > 0 {
            out.times.push(t);
            out.values.push(sum / count as f64 * scale);
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Keeps `n` evenly spaced points of a series longer than `n`.
pub fn downsample(series: &AlignedSeries, n: usize) -> AlignedSeries {
    if n == 0 || series.len() <= n {
        return series.clone();
    }
    let indices = evenly_spaced_indices(series.len(), n);
    AlignedSeries {
        times: indices.iter().map(|&i| series.times[i]).collect(),
        values: indices.iter().map(|&i| series.values[i]).collect(),
    }
}
