use std::collections::BTreeMap;
use std::path::Path;

use simstats_engine::align::{
    aggregate_across_modules, align_with_ci, downsample, global_mean_series, mean_time_series,
};
use simstats_engine::extract::{extract_with, Extraction};
use simstats_engine::numeric::evenly_spaced_indices;
use simstats_shared::config::AnalysisConfig;
use simstats_shared::result::{AlignedSeries, ScalarSummary};

use super::load_run_store;
use crate::output::{self, BandedSeries};
use crate::{AnalysisArgs, SeriesMode};

pub fn run(
    file: &Path,
    metric: &str,
    ms: bool,
    mode: SeriesMode,
    ci: bool,
    points: Option<usize>,
    analysis: &AnalysisArgs,
) -> anyhow::Result<()> {
    let store = load_run_store(file)?;
    let config = analysis.config();
    let extraction = extract_with(&store, &config)?;

    if ci {
        if !matches!(mode, SeriesMode::Module) {
            anyhow::bail!("--ci is only available with --mode module");
        }
        let banded = banded_series(&extraction, metric, ms, points, &config);
        if banded.is_empty() {
            anyhow::bail!("No data available for vector '{}'", metric);
        }
        output::print_banded_csv(&banded);
        return Ok(());
    }

    let series: BTreeMap<String, AlignedSeries> = match mode {
        SeriesMode::Module => mean_time_series(&extraction.vectors, metric, ms),
        SeriesMode::Aggregate => {
            let fleet = aggregate_across_modules(&extraction.vectors, metric, ms);
            BTreeMap::from([("aggregate".to_string(), fleet)])
        }
        SeriesMode::Global => {
            let per_module = mean_time_series(&extraction.vectors, metric, ms);
            BTreeMap::from([("global".to_string(), global_mean_series(&per_module))])
        }
    };

    let series: BTreeMap<String, AlignedSeries> = series
        .into_iter()
        .map(|(label, s)| {
            let s = match config.x_limit {
                Some((lo, hi)) => s.window(lo, hi),
                None => s,
            };
            let s = match points {
                Some(n) => downsample(&s, n),
                None => s,
            };
            (label, s)
        })
        .filter(|(_, s)| !s.is_empty())
        .collect();

    if series.is_empty() {
        anyhow::bail!("No data available for vector '{}'", metric);
    }
    output::print_series_csv(&series);
    Ok(())
}

/// Per-module mean series with CI bounds, windowed and reduced like the plain series.
fn banded_series(
    extraction: &Extraction,
    metric: &str,
    ms: bool,
    points: Option<usize>,
    config: &AnalysisConfig,
) -> BTreeMap<String, BandedSeries> {
    extraction
        .vectors
        .with_metric(metric)
        .filter_map(|(module, traces)| {
            let (s, intervals) = align_with_ci(traces, ms, config.confidence)?;
            let mut rows: Vec<(f64, f64, ScalarSummary)> = s
                .points()
                .zip(intervals)
                .map(|((t, v), ci)| (t, v, ci))
                .filter(|(t, _, _)| match config.x_limit {
                    Some((lo, hi)) => lo <= *t && *t <= hi,
                    None => true,
                })
                .collect();
            if let Some(n) = points.filter(|&n| n > 0 && rows.len() > n) {
                rows = evenly_spaced_indices(rows.len(), n)
                    .into_iter()
                    .map(|i| rows[i])
                    .collect();
            }
            if rows.is_empty() {
                return None;
            }
            let series = AlignedSeries {
                times: rows.iter().map(|r| r.0).collect(),
                values: rows.iter().map(|r| r.1).collect(),
            };
            let intervals = rows.into_iter().map(|r| r.2).collect();
            Some((module.to_string(), (series, intervals)))
        })
        .collect()
}
