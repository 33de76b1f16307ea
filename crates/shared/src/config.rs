use std::path::Path;

use crate::error::AnalysisError;

// Metric keys recorded by the base-station simulation
pub const RESPONSE_TIME_VECTOR: &str = "responseTime:vector";
pub const QUEUE_LENGTH_VECTOR: &str = "queueLength:vector";
pub const DROPPED_COUNT: &str = "dropped:count";
pub const FORWARDED_COUNT: &str = "forwarded:count";
pub const QUEUE_LENGTH_TIMEAVG: &str = "queueLength:timeavg";
pub const RESPONSE_TIME_MEAN: &str = "responseTime:mean";

/// Module-path fragment shared by every base-station module.
pub const BASE_STATION_MARKER: &str = "baseStations";

// Statistics
pub const Z_95: f64 = 1.96;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;
pub const MS_PER_SECOND: f64 = 1000.0;
/// Points per trace the CLI keeps when no subsampling flag is given.
pub const DEFAULT_SUBSAMPLE_COUNT: usize = 100;

/// True for modules such as `Network.baseStations[3]`.
pub fn is_base_station(module: &str) -> bool {
    module.contains(BASE_STATION_MARKER)
}

/// How vector traces are thinned during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SubsampleSpec {
    #[default]
    None,
    /// Keep at most this many evenly spaced points.
    Count(usize),
    /// Discard this percentage of points, capped at 100.
    Rate(f64),
}

impl SubsampleSpec {
    /// A count takes precedence over a rate; a non-positive rate disables subsampling.
    pub fn from_options(rate: Option<f64>, count: Option<usize>) -> Self {
        match (count, rate) {
            (Some(n), _) => SubsampleSpec::Count(n),
            (None, Some(pct)) if pct > 0.0 => SubsampleSpec::Rate(pct.min(100.0)),
            _ => SubsampleSpec::None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub subsample: SubsampleSpec,
    /// Accepted for reporting; intervals always use `Z_95`.
    pub confidence: f64,
    /// Inclusive time window applied to aligned series before summarizing.
    pub x_limit: Option<(f64, f64)>,
    /// Reject malformed traces instead of truncating them.
    pub strict: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            subsample: SubsampleSpec::None,
            confidence: DEFAULT_CONFIDENCE,
            x_limit: None,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PacketSize {
    Bytes(f64),
    Label(String),
}

impl PacketSize {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PacketSize::Bytes(v) => Some(*v),
            PacketSize::Label(_) => None,
        }
    }
}

/// Experiment parameters encoded in a run file name,
/// e.g. `Lognormal_A_N250_I05_S1e3.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentParams {
    pub distribution: String,
    pub option: String,
    pub n_users: u32,
    pub interarrival: f64,
    pub packet_size: PacketSize,
}

impl ExperimentParams {
    pub fn from_file_name(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let invalid = || AnalysisError::InvalidExperimentName(path.display().to_string());

        let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(invalid)?;
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() < 5 {
            return Err(invalid());
        }

        let n_users = parts[2]
            .strip_prefix('N')
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(invalid)?;

        // Two-digit interarrival tokens are tenths: I05 -> 0.5
        let i_str = parts[3].strip_prefix('I').ok_or_else(invalid)?;
        let raw: f64 = i_str.parse().map_err(|_| invalid())?;
        let interarrival = if i_str.len() == 2 { raw / 10.0 } else { raw };

        let size_str = parts[4].strip_prefix('S').ok_or_else(invalid)?;
        let packet_size = match size_str.parse::<f64>() {
            Ok(v) => PacketSize::Bytes(v),
            Err(_) => PacketSize::Label(size_str.to_string()),
        };

        Ok(Self {
            distribution: parts[0].to_string(),
            option: parts[1].to_string(),
            n_users,
            interarrival,
            packet_size,
        })
    }

    /// Legend label, e.g. `Lognormal, Option A, λ=0.5`.
    pub fn label(&self) -> String {
        format!(
            "{}, Option {}, λ={:?}",
            self.distribution, self.option, self.interarrival
        )
    }
}
