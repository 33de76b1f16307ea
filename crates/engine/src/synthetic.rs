//! Seeded synthetic run stores shaped like base-station simulation output.

use std::collections::{BTreeMap, VecDeque};

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use rand_pcg::Pcg64;
use simstats_shared::config::{
    DROPPED_COUNT, FORWARDED_COUNT, QUEUE_LENGTH_TIMEAVG, QUEUE_LENGTH_VECTOR, RESPONSE_TIME_MEAN,
    RESPONSE_TIME_VECTOR,
};
use simstats_shared::run::{Run, RunStore, ScalarObservation, VectorTrace};

pub const SYNTH_RUNS: u32 = 10;
pub const SYNTH_STATIONS: u32 = 4;
pub const SYNTH_HORIZON: f64 = 1_000.0;
pub const SYNTH_ARRIVAL_RATE: f64 = 0.8;
pub const SYNTH_SERVICE_RATE: f64 = 1.0;
pub const SYNTH_FORWARD_THRESHOLD: usize = 10;
pub const SYNTH_FORWARD_LOSS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub n_runs: u32,
    pub n_stations: u32,
    pub horizon: f64,
    pub arrival_rate: f64,
    pub service_rate: f64,
    /// Arrivals finding more packets than this are forwarded elsewhere.
    pub forward_threshold: usize,
    /// Probability a forwarded packet is lost.
    pub forward_loss: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_runs: SYNTH_RUNS,
            n_stations: SYNTH_STATIONS,
            horizon: SYNTH_HORIZON,
            arrival_rate: SYNTH_ARRIVAL_RATE,
            service_rate: SYNTH_SERVICE_RATE,
            forward_threshold: SYNTH_FORWARD_THRESHOLD,
            forward_loss: SYNTH_FORWARD_LOSS,
            seed: 0,
        }
    }
}

pub fn station_module(index: u32) -> String {
    format!("Network.baseStations[{}]", index)
}

struct StationRecord {
    queue_length: VectorTrace,
    response_time: VectorTrace,
    forwarded: u64,
    dropped: u64,
    queue_area: f64,
}

fn simulate_station(config: &SyntheticConfig, module: &str, seed: u64) -> StationRecord {
    let mut rng = Pcg64::seed_from_u64(seed);
    let arrivals = Exp::new(config.arrival_rate.max(1e-9)).unwrap();
    let services = Exp::new(config.service_rate.max(1e-9)).unwrap();

    let mut record = StationRecord {
        queue_length: VectorTrace {
            module: module.to_string(),
            name: QUEUE_LENGTH_VECTOR.to_string(),
            time: vec![0.0],
            value: vec![0.0],
        },
        response_time: VectorTrace {
            module: module.to_string(),
            name: RESPONSE_TIME_VECTOR.to_string(),
            ..VectorTrace::default()
        },
        forwarded: 0,
        dropped: 0,
        queue_area: 0.0,
    };

    // Arrival times of packets waiting or in service.
    let mut queue: VecDeque<f64> = VecDeque::new();
    let mut now = 0.0_f64;
    let mut next_arrival = arrivals.sample(&mut rng);
    let mut next_departure = f64::INFINITY;

    loop {
        let t = next_arrival.min(next_departure);
        if t > config.horizon {
            record.queue_area += queue.len() as f64 * (config.horizon - now);
            break;
        }
        record.queue_area += queue.len() as f64 * (t - now);
        now = t;

        if next_arrival <= next_departure {
            next_arrival = now + arrivals.sample(&mut rng);
            if queue.len() > config.forward_threshold {
                record.forwarded += 1;
                if rng.gen::<f64>() < config.forward_loss {
                    record.dropped += 1;
                }
                continue;
            }
            queue.push_back(now);
            if queue.len() == 1 {
                next_departure = now + services.sample(&mut rng);
            }
        } else {
            if let Some(arrived) = queue.pop_front() {
                record.response_time.time.push(now);
                record.response_time.value.push(now - arrived);
            }
            next_departure = if queue.is_empty() {
                f64::INFINITY
            } else {
                now + services.sample(&mut rng)
            };
        }
        record.queue_length.time.push(now);
        record.queue_length.value.push(queue.len() as f64);
    }
    record
}

fn scalar(module: &str, name: &str, value: f64) -> ScalarObservation {
    ScalarObservation {
        module: module.to_string(),
        name: name.to_string(),
        value: Some(value),
    }
}

/// Independent runs of every station; identical for identical configs.
pub fn generate_store(config: &SyntheticConfig) -> RunStore {
    let mut runs = BTreeMap::new();
    for run in 0..config.n_runs {
        let mut content = Run::default();
        for station in 0..config.n_stations {
            let module = station_module(station);
            let seed = config
                .seed
                .wrapping_add(run as u64 * config.n_stations as u64 + station as u64);
            let record = simulate_station(config, &module, seed);

            let rt = &record.response_time.value;
            let rt_mean = if rt.is_empty() {
                0.0
            } else {
                rt.iter().sum::<f64>() / rt.len() as f64
            };
            let timeavg = record.queue_area / config.horizon;
            content.scalars.push(scalar(&module, FORWARDED_COUNT, record.forwarded as f64));
            content.scalars.push(scalar(&module, DROPPED_COUNT, record.dropped as f64));
            content.scalars.push(scalar(&module, QUEUE_LENGTH_TIMEAVG, timeavg));
            content.scalars.push(scalar(&module, RESPONSE_TIME_MEAN, rt_mean));
            content.vectors.push(record.queue_length);
            content.vectors.push(record.response_time);
        }
        runs.insert(format!("General-{}", run), content);
    }
    RunStore::new(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SyntheticConfig {
        SyntheticConfig {
            n_runs: 3,
            n_stations: 2,
            horizon: 200.0,
            seed: 42,
            ..SyntheticConfig::default()
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(generate_store(&small()), generate_store(&small()));
        let other = SyntheticConfig { seed: 43, ..small() };
        assert_ne!(generate_store(&small()), generate_store(&other));
    }

    #[test]
    fn test_shape() {
        let store = generate_store(&small());
        assert_eq!(store.len(), 3);
        assert!(store.validate().is_ok());
        for run in store.runs.values() {
            assert_eq!(run.vectors.len(), 4);
            assert_eq!(run.scalars.len(), 8);
            for trace in &run.vectors {
                assert!(trace.time.iter().all(|&t| t <= 200.0));
                assert!(trace.value.iter().all(|&v| v >= 0.0));
            }
        }
    }

    #[test]
    fn test_overload_forwards() {
        let config = SyntheticConfig {
            arrival_rate: 5.0,
            service_rate: 1.0,
            forward_threshold: 3,
            forward_loss: 1.0,
            ..small()
        };
        let store = generate_store(&config);
        let run = store.runs.values().next().unwrap();
        let forwarded = run.scalars.iter().find(|s| s.name == FORWARDED_COUNT).unwrap().value();
        let dropped = run.scalars.iter().find(|s| s.name == DROPPED_COUNT).unwrap().value();
        assert!(forwarded > 0.0);
        assert_eq!(forwarded, dropped);
        let ql = run.vectors.iter().find(|v| v.name == QUEUE_LENGTH_VECTOR).unwrap();
        assert!(ql.value.iter().all(|&v| v <= 4.0));
    }
}
