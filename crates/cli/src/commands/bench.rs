use simstats_engine::bench::run_profile;
use simstats_engine::synthetic::SyntheticConfig;
use simstats_shared::config::SubsampleSpec;

use crate::output;

pub fn run(
    runs: u32,
    stations: u32,
    horizon: f64,
    seed: u64,
    subsample_count: usize,
) -> anyhow::Result<()> {
    let config = SyntheticConfig {
        n_runs: runs,
        n_stations: stations,
        horizon,
        seed,
        ..SyntheticConfig::default()
    };

    println!(
        "Profiling {} runs x {} stations ({}s each)...",
        runs, stations, horizon
    );
    let report = run_profile(&config, SubsampleSpec::Count(subsample_count));

    output::print_profile(&report);
    Ok(())
}
