mod commands;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use simstats_shared::config::{
    AnalysisConfig, SubsampleSpec, DEFAULT_CONFIDENCE, DEFAULT_SUBSAMPLE_COUNT,
};

#[derive(Parser)]
#[command(name = "simstats", about = "Queueing simulation run statistics")]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
pub struct AnalysisArgs {
    /// Keep at most this many evenly spaced points per trace (default 100, 0 = keep all)
    #[arg(long)]
    subsample_count: Option<usize>,
    /// Discard this percentage of each trace's points (ignored when a count is given)
    #[arg(long)]
    subsample_rate: Option<f64>,
    /// Reject traces with mismatched lengths or decreasing timestamps
    #[arg(long)]
    strict: bool,
    /// Start of the time window (defaults to 0 when --x-max is set)
    #[arg(long)]
    x_min: Option<f64>,
    /// End of the time window
    #[arg(long)]
    x_max: Option<f64>,
    /// Number of parallel workers (0 = auto)
    #[arg(long, default_value = "0")]
    workers: usize,
}

impl AnalysisArgs {
    pub fn config(&self) -> AnalysisConfig {
        let subsample = match (self.subsample_count, self.subsample_rate) {
            (None, None) => SubsampleSpec::Count(DEFAULT_SUBSAMPLE_COUNT),
            (count, rate) => SubsampleSpec::from_options(rate, count),
        };
        let x_limit = match (self.x_min, self.x_max) {
            (None, None) => None,
            (lo, hi) => Some((lo.unwrap_or(0.0), hi.unwrap_or(f64::INFINITY))),
        };
        AnalysisConfig {
            subsample,
            confidence: DEFAULT_CONFIDENCE,
            x_limit,
            strict: self.strict,
        }
    }

    pub fn n_workers(&self) -> Option<usize> {
        if self.workers == 0 {
            None
        } else {
            Some(self.workers)
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum SeriesMode {
    /// One mean series per module
    Module,
    /// Fleet-wide mean over all traces, averaging non-zero contributors
    Aggregate,
    /// Mean over modules of the per-module series
    Global,
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-module statistics and totals for a run file
    Summary {
        /// Path to the JSON run file
        file: PathBuf,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Print an aligned mean time series as CSV
    Series {
        /// Path to the JSON run file
        file: PathBuf,
        /// Vector metric key
        #[arg(long, default_value = "queueLength:vector")]
        metric: String,
        /// Report values in milliseconds
        #[arg(long)]
        ms: bool,
        #[arg(long, value_enum, default_value = "module")]
        mode: SeriesMode,
        /// Add per-timestamp 95% CI bounds (module mode only)
        #[arg(long)]
        ci: bool,
        /// Keep at most this many evenly spaced output points
        #[arg(long)]
        points: Option<usize>,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Print each experiment's fleet-wide mean series as CSV, one label per file
    Aggregate {
        /// JSON run files named <dist>_<option>_N<users>_I<interarrival>_S<size>.json
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Keep at most this many evenly spaced output points per series
        #[arg(long)]
        points: Option<usize>,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Compare measured response time with the M/M/1 expectation
    Compare {
        /// Path to the JSON run file
        file: PathBuf,
        /// Policy option (A or B)
        #[arg(long)]
        option: String,
        /// Instructions executed per second (S)
        #[arg(long)]
        instructions: f64,
        /// Instruction rate of a packet
        #[arg(long)]
        instruction_rate: f64,
        /// Packet arrival rate
        #[arg(long)]
        arrival_rate: f64,
        /// Forwarding delay under option B (D)
        #[arg(long, default_value = "0.1")]
        delay: f64,
        /// Keep at most this many evenly spaced points of each module's series
        #[arg(long)]
        points: Option<usize>,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Summarize experiments along one parameter encoded in their file names
    Sweep {
        /// JSON run files named <dist>_<option>_N<users>_I<interarrival>_S<size>.json
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Parameter to sweep: N, I or S
        #[arg(long, default_value = "N")]
        param: String,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Profile the pipeline on synthetic runs
    Bench {
        /// Number of runs
        #[arg(long, default_value = "10")]
        runs: u32,
        /// Base stations per run
        #[arg(long, default_value = "4")]
        stations: u32,
        /// Simulated seconds per run
        #[arg(long, default_value = "1000")]
        horizon: f64,
        /// Seed for the synthetic runs
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Keep at most this many points per trace (0 = keep all)
        #[arg(long, default_value = "100")]
        subsample_count: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Summary { file, analysis } => commands::summary::run(&file, &analysis),
        Commands::Series {
            file,
            metric,
            ms,
            mode,
            ci,
            points,
            analysis,
        } => commands::series::run(&file, &metric, ms, mode, ci, points, &analysis),
        Commands::Aggregate {
            files,
            points,
            analysis,
        } => commands::aggregate::run(&files, points, &analysis),
        Commands::Compare {
            file,
            option,
            instructions,
            instruction_rate,
            arrival_rate,
            delay,
            points,
            analysis,
        } => commands::compare::run(
            &file,
            &option,
            instructions,
            instruction_rate,
            arrival_rate,
            delay,
            points,
            &analysis,
        ),
        Commands::Sweep {
            files,
            param,
            analysis,
        } => commands::sweep::run(&files, &param, &analysis),
        Commands::Bench {
            runs,
            stations,
            horizon,
            seed,
            subsample_count,
        } => commands::bench::run(runs, stations, horizon, seed, subsample_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_of(args: &[&str]) -> AnalysisArgs {
        let mut argv = vec!["simstats", "summary", "run.json"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Summary { analysis, .. } => analysis,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = analysis_of(&[]).config();
        assert_eq!(config.subsample, SubsampleSpec::Count(DEFAULT_SUBSAMPLE_COUNT));
        assert_eq!(config.x_limit, None);
        assert!(!config.strict);
    }

    #[test]
    fn test_count_wins_over_rate() {
        let config = analysis_of(&["--subsample-rate", "90", "--subsample-count", "20"]).config();
        assert_eq!(config.subsample, SubsampleSpec::Count(20));
        let config = analysis_of(&["--subsample-rate", "90"]).config();
        assert_eq!(config.subsample, SubsampleSpec::Rate(90.0));
    }

    #[test]
    fn test_aggregate_and_ci_flags() {
        let argv = ["simstats", "aggregate", "a.json", "b.json", "--points", "50"];
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Aggregate { files, points, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(points, Some(50));
            }
            _ => unreachable!(),
        }
        assert!(Cli::try_parse_from(["simstats", "aggregate"]).is_err());

        let cli = Cli::try_parse_from(["simstats", "series", "run.json", "--ci"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Series {
                ci: true,
                mode: SeriesMode::Module,
                ..
            }
        ));
    }

    #[test]
    fn test_window_defaults_to_zero_start() {
        let args = analysis_of(&["--x-max", "900", "--strict", "--workers", "3"]);
        let config = args.config();
        assert_eq!(config.x_limit, Some((0.0, 900.0)));
        assert!(config.strict);
        assert_eq!(args.n_workers(), Some(3));
    }
}
