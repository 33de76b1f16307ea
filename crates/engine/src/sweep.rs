use std::str::FromStr;

use simstats_shared::config::{
    AnalysisConfig, ExperimentParams, QUEUE_LENGTH_VECTOR, RESPONSE_TIME_VECTOR,
};
use simstats_shared::result::{AlignedSeries, ScalarSummary};
use simstats_shared::run::RunStore;
use simstats_shared::AnalysisError;

use crate::align::{aggregate_across_modules, mean_across_modules};
use crate::extract::extract_with;
use crate::scalar::summarize;

/// Experiment parameter a sweep varies along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepParameter {
    Users,
    Interarrival,
    PacketSize,
}

impl SweepParameter {
    pub fn value_of(&self, params: &ExperimentParams) -> Option<f64> {
        match self {
            SweepParameter::Users => Some(params.n_users as f64),
            SweepParameter::Interarrival => Some(params.interarrival),
            SweepParameter::PacketSize => params.packet_size.as_f64(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SweepParameter::Users => "N",
            SweepParameter::Interarrival => "I",
            SweepParameter::PacketSize => "S",
        }
    }
}

impl FromStr for SweepParameter {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" | "n" => Ok(SweepParameter::Users),
            "I" | "i" => Ok(SweepParameter::Interarrival),
            "S" | "s" => Ok(SweepParameter::PacketSize),
            _ => Err(AnalysisError::UnknownSweepParameter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub params: ExperimentParams,
    pub parameter_value: f64,
    /// Milliseconds.
    pub response_time: ScalarSummary,
    pub queue_length: ScalarSummary,
}

/// Summarizes one experiment's fleet-wide response time and queue length.
///
/// Each metric is aggregated across modules (non-zero contributors only),
/// clipped to `config.x_limit`, and the remaining series values are summarized.
pub fn sweep_point(
    params: ExperimentParams,
    parameter: SweepParameter,
    store: &RunStore,
    config: &AnalysisConfig,
) -> Result<SweepPoint, AnalysisError> {
    let parameter_value = parameter
        .value_of(&params)
        .ok_or_else(|| AnalysisError::NonNumericParameter {
            parameter: parameter.label(),
            value: format!("{:?}", params.packet_size),
        })?;
    let extraction = extract_with(store, config)?;

    let clip = |series: AlignedSeries| match config.x_limit {
        Some((lo, hi)) => series.window(lo, hi),
        None => series,
    };
    let rt = clip(aggregate_across_modules(&extraction.vectors, RESPONSE_TIME_VECTOR, true));
    let ql = clip(aggregate_across_modules(&extraction.vectors, QUEUE_LENGTH_VECTOR, false));

    Ok(SweepPoint {
        params,
        parameter_value,
        response_time: summarize(&rt.values, config.confidence),
        queue_length: summarize(&ql.values, config.confidence),
    })
}

/// One experiment's fleet-wide series, labelled for side-by-side comparison.
#[derive(Debug, Clone)]
pub struct ExperimentSeries {
    pub params: ExperimentParams,
    pub label: String,
    /// Milliseconds.
    pub response_time: AlignedSeries,
    pub queue_length: AlignedSeries,
}

/// Plain fleet-wide means of response time and queue length for one file.
///
/// Every trace counts in the denominator, zero-valued or not. Both series are
/// clipped to `config.x_limit`.
pub fn experiment_series(
    params: ExperimentParams,
    store: &RunStore,
    config: &AnalysisConfig,
) -> Result<ExperimentSeries, AnalysisError> {
    let extraction = extract_with(store, config)?;
    let clip = |series: AlignedSeries| match config.x_limit {
        Some((lo, hi)) => series.window(lo, hi),
        None => series,
    };
    Ok(ExperimentSeries {
        label: params.label(),
        params,
        response_time: clip(mean_across_modules(&extraction.vectors, RESPONSE_TIME_VECTOR, true)),
        queue_length: clip(mean_across_modules(&extraction.vectors, QUEUE_LENGTH_VECTOR, false)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use simstats_shared::config::{PacketSize, SubsampleSpec};
    use simstats_shared::run::{Run, VectorTrace};

    fn params(n_users: u32) -> ExperimentParams {
        ExperimentParams {
            distribution: "Normal".to_string(),
            option: "A".to_string(),
            n_users,
            interarrival: 0.5,
            packet_size: PacketSize::Label("big".to_string()),
        }
    }

    fn store() -> RunStore {
        let mut store = RunStore::default();
        store.runs.insert(
            "r0".to_string(),
            Run {
                scalars: Vec::new(),
                vectors: vec![
                    VectorTrace {
                        module: "bs0".to_string(),
                        name: RESPONSE_TIME_VECTOR.to_string(),
                        time: vec![0.0, 1.0, 2.0],
                        value: vec![0.001, 0.002, 0.003],
                    },
                    VectorTrace {
                        module: "bs0".to_string(),
                        name: QUEUE_LENGTH_VECTOR.to_string(),
                        time: vec![0.0, 2.0],
                        value: vec![2.0, 2.0],
                    },
                ],
            },
        );
        store
    }

    #[test]
    fn test_sweep_point() {
        let config = AnalysisConfig {
            subsample: SubsampleSpec::None,
            x_limit: Some((0.0, 1.0)),
            ..AnalysisConfig::default()
        };
        let point = sweep_point(params(50), SweepParameter::Users, &store(), &config).unwrap();
        assert_eq!(point.parameter_value, 50.0);
        assert!((point.response_time.mean - 1.5).abs() < 1e-9);
        assert_eq!(point.queue_length.mean, 2.0);
        assert_eq!(point.queue_length.margin, 0.0);
    }

    #[test]
    fn test_non_numeric_parameter_rejected() {
        let config = AnalysisConfig::default();
        assert!(matches!(
            sweep_point(params(1), SweepParameter::PacketSize, &store(), &config),
            Err(AnalysisError::NonNumericParameter { parameter: "S", .. })
        ));
    }

    fn store_with_idle_station() -> RunStore {
        let mut store = store();
        store.runs.get_mut("r0").unwrap().vectors.push(VectorTrace {
            module: "bs1".to_string(),
            name: QUEUE_LENGTH_VECTOR.to_string(),
            time: vec![0.0, 2.0],
            value: vec![0.0, 0.0],
        });
        store
    }

    #[test]
    fn test_experiment_series() {
        let config = AnalysisConfig {
            x_limit: Some((1.0, 2.0)),
            ..AnalysisConfig::default()
        };
        let params = ExperimentParams::from_file_name("Uniform_B_N250_I01_S1e3.json").unwrap();
        let out = experiment_series(params, &store_with_idle_station(), &config).unwrap();
        assert_eq!(out.label, "Uniform, Option B, λ=0.1");
        assert_eq!(out.response_time.times, vec![1.0, 2.0]);
        assert!((out.response_time.values[0] - 2.0).abs() < 1e-9);
        // The idle station's zeros halve the plain mean.
        assert_eq!(out.queue_length.times, vec![2.0]);
        assert_eq!(out.queue_length.values, vec![1.0]);
    }

    #[test]
    fn test_sweep_point_skips_zero_contributors() {
        let config = AnalysisConfig::default();
        let point =
            sweep_point(params(50), SweepParameter::Users, &store_with_idle_station(), &config)
                .unwrap();
        assert_eq!(point.queue_length.mean, 2.0);
    }

    #[test]
    fn test_parse_parameter() {
        assert_eq!("N".parse::<SweepParameter>().unwrap(), SweepParameter::Users);
        assert_eq!("i".parse::<SweepParameter>().unwrap(), SweepParameter::Interarrival);
        assert_eq!(SweepParameter::PacketSize.label(), "S");
        assert!("X".parse::<SweepParameter>().is_err());
    }
}
