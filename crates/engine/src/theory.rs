//! M/M/1 reference values for comparing simulated response times.

use std::collections::BTreeMap;
use std::str::FromStr;

use simstats_shared::config::{is_base_station, AnalysisConfig, SubsampleSpec, RESPONSE_TIME_VECTOR};
use simstats_shared::result::AlignedSeries;
use simstats_shared::run::RunStore;
use simstats_shared::AnalysisError;
use tracing::debug;

use crate::align::{align_nearest, downsample};
use crate::extract::extract_with;

/// Forwarding policy of the simulated base stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOption {
    /// Packets are served locally.
    A,
    /// Packets pay an extra fixed forwarding delay.
    B,
}

impl FromStr for PolicyOption {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(PolicyOption::A),
            "B" => Ok(PolicyOption::B),
            _ => Err(AnalysisError::UnknownPolicyOption(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueueModel {
    pub option: PolicyOption,
    /// Instructions a base station executes per time unit (S).
    pub instructions_per_second: f64,
    /// Per-instruction rate of a packet's workload.
    pub instruction_rate: f64,
    /// Packet arrival rate (lambda).
    pub arrival_rate: f64,
    /// Fixed forwarding delay added under option B (D).
    pub forwarding_delay: f64,
}

impl QueueModel {
    pub fn service_rate(&self) -> f64 {
        self.instructions_per_second * self.instruction_rate
    }

    /// Mean response time `1 / (mu - lambda)`, plus `D` under option B.
    pub fn expected_response_time(&self) -> Result<f64, AnalysisError> {
        let mu = self.service_rate();
        let lambda = self.arrival_rate;
        if mu <= lambda {
            return Err(AnalysisError::UnstableSystem {
                service_rate: mu,
                arrival_rate: lambda,
            });
        }
        let queueing = 1.0 / (mu - lambda);
        Ok(match self.option {
            PolicyOption::A => queueing,
            PolicyOption::B => self.forwarding_delay + queueing,
        })
    }
}

/// Measured response time per base station, in seconds.
///
/// Raw traces are never thinned here: each base station's traces are aligned
/// on their nearest samples first, and only the resulting series is reduced
/// to `points` evenly spaced points. Modules other than base stations are
/// ignored.
pub fn measured_response_series(
    store: &RunStore,
    config: &AnalysisConfig,
    points: Option<usize>,
) -> Result<BTreeMap<String, AlignedSeries>, AnalysisError> {
    let raw = AnalysisConfig {
        subsample: SubsampleSpec::None,
        ..config.clone()
    };
    let extraction = extract_with(store, &raw)?;

    let series: BTreeMap<String, AlignedSeries> = extraction
        .vectors
        .with_metric(RESPONSE_TIME_VECTOR)
        .filter(|(module, _)| is_base_station(module))
        .filter_map(|(module, traces)| {
            let s = align_nearest(traces, false)?;
            let s = match points {
                Some(n) => downsample(&s, n),
                None => s,
            };
            Some((module.to_string(), s))
        })
        .collect();
    debug!(base_stations = series.len(), "measured response series");
    Ok(series)
}

/// Mean over every point of every series; 0.0 when there are none.
pub fn practical_mean(series: &BTreeMap<String, AlignedSeries>) -> f64 {
    let (sum, count) = series
        .values()
        .flat_map(|s| s.values.iter())
        .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simstats_shared::run::{Run, VectorTrace};

    fn response_trace(module: &str, time: Vec<f64>, value: Vec<f64>) -> VectorTrace {
        VectorTrace {
            module: module.to_string(),
            name: RESPONSE_TIME_VECTOR.to_string(),
            time,
            value,
        }
    }

    fn comparison_store() -> RunStore {
        let n = 1000;
        let time: Vec<f64> = (0..n).map(|i| i as f64).collect();
        // Saw-tooth so any thinning of the raw trace shifts the mean.
        let value: Vec<f64> = (0..n).map(|i| (i % 7) as f64 * 0.5 + 0.75).collect();
        let mut store = RunStore::default();
        store.runs.insert(
            "r0".to_string(),
            Run {
                scalars: Vec::new(),
                vectors: vec![
                    response_trace("Net.baseStations[0]", time.clone(), value),
                    response_trace("Net.cloud", time, vec![500.0; n]),
                ],
            },
        );
        store
    }

    fn model(option: PolicyOption, arrival_rate: f64) -> QueueModel {
        QueueModel {
            option,
            instructions_per_second: 10.0,
            instruction_rate: 0.1,
            arrival_rate,
            forwarding_delay: 0.1,
        }
    }

    #[test]
    fn test_expected_response_time() {
        let a = model(PolicyOption::A, 0.5).expected_response_time().unwrap();
        assert!((a - 2.0).abs() < 1e-12);
        let b = model(PolicyOption::B, 0.5).expected_response_time().unwrap();
        assert!((b - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_unstable_system_rejected() {
        for rate in [1.0, 2.0] {
            let err = model(PolicyOption::A, rate).expected_response_time().unwrap_err();
            assert!(matches!(err, AnalysisError::UnstableSystem { .. }));
        }
    }

    #[test]
    fn test_measured_series_keeps_base_stations_only() {
        let series =
            measured_response_series(&comparison_store(), &AnalysisConfig::default(), None)
                .unwrap();
        assert_eq!(series.keys().collect::<Vec<_>>(), vec!["Net.baseStations[0]"]);
        assert!(practical_mean(&series) < 10.0);
    }

    #[test]
    fn test_measured_series_ignores_trace_subsampling() {
        let store = comparison_store();
        let thinned = AnalysisConfig {
            subsample: SubsampleSpec::Count(100),
            ..AnalysisConfig::default()
        };
        let from_thinned = measured_response_series(&store, &thinned, None).unwrap();
        let from_raw = measured_response_series(&store, &AnalysisConfig::default(), None).unwrap();
        assert_eq!(from_thinned, from_raw);
        assert_eq!(from_raw["Net.baseStations[0]"].len(), 1000);

        // Sum of one saw-tooth period (0.75 + 1.25 + ... + 3.75) over 7 points.
        let expected = (142.0 * 15.75 + 0.75 + 1.25 + 1.75 + 2.25 + 2.75 + 3.25) / 1000.0;
        assert!((practical_mean(&from_raw) - expected).abs() < 1e-9);

        let reduced = measured_response_series(&store, &thinned, Some(100)).unwrap();
        assert_eq!(reduced["Net.baseStations[0]"].len(), 100);
    }

    #[test]
    fn test_practical_mean_empty() {
        assert_eq!(practical_mean(&BTreeMap::new()), 0.0);
    }

    #[test]
    fn test_parse_option() {
        assert_eq!("a".parse::<PolicyOption>().unwrap(), PolicyOption::A);
        assert_eq!(" B ".parse::<PolicyOption>().unwrap(), PolicyOption::B);
        assert!(matches!(
            "C".parse::<PolicyOption>(),
            Err(AnalysisError::UnknownPolicyOption(_))
        ));
    }
}
