use std::collections::BTreeMap;
use std::time::Duration;

use simstats_engine::bench::ProfileReport;
use simstats_engine::runner::AnalysisReport;
use simstats_engine::sweep::{ExperimentSeries, SweepParameter, SweepPoint};
use simstats_engine::theory::QueueModel;
use simstats_shared::config::{
    DROPPED_COUNT, FORWARDED_COUNT, QUEUE_LENGTH_TIMEAVG, QUEUE_LENGTH_VECTOR, RESPONSE_TIME_MEAN,
    RESPONSE_TIME_VECTOR,
};
use simstats_shared::result::{AlignedSeries, ScalarSummary};

/// Aligned mean series with per-timestamp interval bounds.
pub type BandedSeries = (AlignedSeries, Vec<ScalarSummary>);

fn print_summaries(label: &str, key: &str, summaries: Option<&BTreeMap<String, ScalarSummary>>) {
    println!("\n=== {} Statistics ===", label);
    match summaries {
        Some(map) if !map.is_empty() => {
            for (module, s) in map {
                println!(
                    "{}: mean = {:.2}, 95% CI = [{:.2}, {:.2}]",
                    module, s.mean, s.ci_low, s.ci_high
                );
            }
        }
        _ => println!("  No data available for '{}'.", key),
    }
}

pub fn print_summary(report: &AnalysisReport, n_runs: usize, elapsed: Duration) {
    println!("\n========================================");
    println!("  Runs:        {}", n_runs);
    println!("  Time:        {:.2}s", elapsed.as_secs_f64());
    println!("========================================");

    let sections = [
        ("Response Time (ms)", RESPONSE_TIME_VECTOR, &report.samples),
        ("Queue Length", QUEUE_LENGTH_VECTOR, &report.samples),
        ("Dropped Packets", DROPPED_COUNT, &report.scalars),
        ("Forwarded Packets", FORWARDED_COUNT, &report.scalars),
        ("Time-Averaged Queue Length", QUEUE_LENGTH_TIMEAVG, &report.scalars),
        ("Mean Response Time (s)", RESPONSE_TIME_MEAN, &report.scalars),
    ];
    for (label, key, summaries) in sections {
        print_summaries(label, key, summaries.get(key));
    }

    println!();
    let totals = [
        ("Dropped Packets", DROPPED_COUNT),
        ("Forwarded Packets", FORWARDED_COUNT),
    ];
    for (label, key) in totals {
        println!("Total {}: {}", label, report.totals.get(key).copied().unwrap_or(0.0));
    }

    for (key, series) in &report.series {
        let points: usize = series.values().map(AlignedSeries::len).sum();
        println!("  {}: {} modules, {} aligned points", key, series.len(), points);
    }
}

pub fn print_series_csv(series: &BTreeMap<String, AlignedSeries>) {
    println!("module,time,value");
    for (module, s) in series {
        for (t, v) in s.points() {
            println!("{},{},{}", module, t, v);
        }
    }
}

pub fn print_banded_csv(series: &BTreeMap<String, BandedSeries>) {
    println!("module,time,value,ci_low,ci_high");
    for (module, (s, intervals)) in series {
        for ((t, v), ci) in s.points().zip(intervals) {
            println!("{},{},{},{},{}", module, t, v, ci.ci_low, ci.ci_high);
        }
    }
}

pub fn print_experiments_csv(experiments: &[ExperimentSeries]) {
    println!("experiment,metric,time,value");
    for e in experiments {
        let metrics = [
            (RESPONSE_TIME_VECTOR, &e.response_time),
            (QUEUE_LENGTH_VECTOR, &e.queue_length),
        ];
        for (key, s) in metrics {
            for (t, v) in s.points() {
                println!("\"{}\",{},{},{}", e.label, key, t, v);
            }
        }
    }
}

pub fn print_comparison(
    model: &QueueModel,
    theoretical: f64,
    practical: f64,
    series: &BTreeMap<String, AlignedSeries>,
) {
    println!("\n========================================");
    println!("  Option:        {:?}", model.option);
    println!("  Service rate:  {:.4}", model.service_rate());
    println!("  Arrival rate:  {:.4}", model.arrival_rate);
    println!("  Theoretical:   {:.4}s", theoretical);
    println!("  Practical:     {:.4}s", practical);
    println!("  Difference:    {:+.4}s", practical - theoretical);
    println!("========================================");
    for (module, s) in series {
        println!("  {}: mean = {:.4}s over {} points", module, s.mean(), s.len());
    }
}

pub fn print_sweep(parameter: SweepParameter, points: &[SweepPoint]) {
    println!(
        "\n{:>10}  {:>12} {:>10}  {:>12} {:>10}",
        parameter.label(),
        "RT mean(ms)",
        "RT +/-",
        "QL mean",
        "QL +/-"
    );
    for p in points {
        println!(
            "{:>10}  {:>12.3} {:>10.3}  {:>12.3} {:>10.3}",
            p.parameter_value,
            p.response_time.mean,
            p.response_time.margin,
            p.queue_length.mean,
            p.queue_length.margin
        );
    }
}

pub fn print_profile(report: &ProfileReport) {
    println!("\n=== Pipeline Profile ===");
    println!("Runs:        {}", report.runs);
    println!("Raw points:  {}", report.raw_points);
    println!("Generate:    {:.3}s", report.generate.as_secs_f64());
    println!("Extract:     {:.3}s", report.extract.as_secs_f64());
    println!("Align:       {:.3}s", report.align.as_secs_f64());
    println!("Aggregate:   {:.3}s", report.aggregate.as_secs_f64());
}
