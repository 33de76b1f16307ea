use std::collections::BTreeMap;

use simstats_shared::config::Z_95;
use simstats_shared::result::{MetricGroups, ScalarSummary};

/// Mean and normal-approximation confidence interval of `values`.
///
/// The interval always uses z = 1.96; `_confidence` is accepted so callers can
/// state their intent but does not change the z-value.
pub fn summarize(values: &[f64], _confidence: f64) -> ScalarSummary {
    match values {
        [] => ScalarSummary::ZERO,
        [v] => ScalarSummary {
            mean: *v,
            margin: 0.0,
            ci_low: *v,
            ci_high: *v,
        },
        _ => {
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
            let margin = Z_95 * (var.sqrt() / n.sqrt());
            ScalarSummary {
                mean,
                margin,
                ci_low: mean - margin,
                ci_high: mean + margin,
            }
        }
    }
}

/// [`summarize`] for every module that recorded `key`.
pub fn summarize_metric(
    scalars: &MetricGroups<f64>,
    key: &str,
    confidence: f64,
) -> BTreeMap<String, ScalarSummary> {
    scalars
        .with_metric(key)
        .map(|(module, values)| (module.to_string(), summarize(values, confidence)))
        .collect()
}

/// Per-module mean of `key`.
pub fn averages(scalars: &MetricGroups<f64>, key: &str) -> BTreeMap<String, f64> {
    scalars
        .with_metric(key)
        .map(|(module, values)| {
            let avg = if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            };
            (module.to_string(), avg)
        })
        .collect()
}

/// Sum of `key` over every module and run.
pub fn total(scalars: &MetricGroups<f64>, key: &str) -> f64 {
    scalars
        .with_metric(key)
        .flat_map(|(_, values)| values.iter())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;
    use simstats_shared::config::DEFAULT_CONFIDENCE;

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(summarize(&[], DEFAULT_CONFIDENCE), ScalarSummary::ZERO);
        for v in [-3.5, 0.0, 42.0, 1e12] {
            let s = summarize(&[v], DEFAULT_CONFIDENCE);
            assert_eq!(s, ScalarSummary { mean: v, margin: 0.0, ci_low: v, ci_high: v });
        }
    }

    #[test]
    fn test_known_interval() {
        let s = summarize(&[10.0, 20.0, 30.0], DEFAULT_CONFIDENCE);
        assert_eq!(s.mean, 20.0);
        let expected_margin = 1.96 * 10.0 / 3.0_f64.sqrt();
        assert!((s.margin - expected_margin).abs() < 1e-12);
        assert!((s.margin - 11.3163).abs() < 1e-3);
        assert!((s.ci_low - 8.6837).abs() < 1e-3);
        assert!((s.ci_high - 31.3163).abs() < 1e-3);
    }

    #[test]
    fn test_confidence_argument_ignored() {
        let values = [1.0, 4.0, 9.0, 16.0];
        assert_eq!(summarize(&values, 0.95), summarize(&values, 0.99));
    }

    #[test]
    fn test_interval_brackets_mean() {
        let mut rng = Pcg64::seed_from_u64(3);
        for _ in 0..200 {
            let n = rng.gen_range(1..20);
            let values: Vec<f64> = (0..n).map(|_| rng.gen_range(-1e3..1e3)).collect();
            let s = summarize(&values, DEFAULT_CONFIDENCE);
            assert!(s.margin >= 0.0);
            assert!(s.ci_low <= s.mean && s.mean <= s.ci_high);
        }
    }

    #[test]
    fn test_metric_helpers() {
        let mut scalars = MetricGroups::new();
        for v in [10.0, 20.0, 30.0] {
            scalars.push("bs1", "dropped:count", v);
        }
        scalars.push("bs0", "dropped:count", 5.0);
        scalars.push("bs0", "forwarded:count", 7.0);

        let summaries = summarize_metric(&scalars, "dropped:count", DEFAULT_CONFIDENCE);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries["bs1"].mean, 20.0);
        assert_eq!(summaries["bs0"].margin, 0.0);

        let avg = averages(&scalars, "dropped:count");
        assert_eq!(avg["bs0"], 5.0);
        assert_eq!(avg["bs1"], 20.0);

        assert_eq!(total(&scalars, "dropped:count"), 65.0);
        assert_eq!(total(&scalars, "missing"), 0.0);
    }
}
