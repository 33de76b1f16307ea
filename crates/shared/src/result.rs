use std::collections::BTreeMap;

/// One run's observation of a vector metric, as grouped by the extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub time: Vec<f64>,
    pub value: Vec<f64>,
}

impl TimeSeries {
    pub fn new(time: Vec<f64>, value: Vec<f64>) -> Self {
        Self { time, value }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// A mean series on a shared, strictly increasing time axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Points with `lo <= t <= hi`.
    pub fn window(&self, lo: f64, hi: f64) -> Self {
        let (times, values) = self.points().filter(|(t, _)| lo <= *t && *t <= hi).unzip();
        Self { times, values }
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.values.iter().sum::<f64>() / self.values.len() as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSummary {
    pub mean: f64,
    pub margin: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

impl ScalarSummary {
    pub const ZERO: ScalarSummary = ScalarSummary {
        mean: 0.0,
        margin: 0.0,
        ci_low: 0.0,
        ci_high: 0.0,
    };
}

/// Two-level ordered grouping: module -> metric name -> items.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricGroups<T> {
    modules: BTreeMap<String, BTreeMap<String, Vec<T>>>,
}

impl<T> Default for MetricGroups<T> {
    fn default() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }
}

impl<T> MetricGroups<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, module: &str, name: &str, item: T) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(item);
    }

    pub fn get(&self, module: &str, name: &str) -> Option<&[T]> {
        self.modules.get(module)?.get(name).map(Vec::as_slice)
    }

    /// Every module that recorded `name`, with its items, in module order.
    pub fn with_metric<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [T])> + 'a {
        self.modules.iter().filter_map(move |(module, metrics)| {
            metrics
                .get(name)
                .map(|items| (module.as_str(), items.as_slice()))
        })
    }

    pub fn metric_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .modules
            .values()
            .flat_map(|metrics| metrics.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_insert_or_append() {
        let mut groups = MetricGroups::new();
        groups.push("bs1", "dropped:count", 1.0);
        groups.push("bs0", "dropped:count", 2.0);
        groups.push("bs1", "dropped:count", 3.0);
        groups.push("bs1", "forwarded:count", 4.0);

        assert_eq!(groups.get("bs1", "dropped:count"), Some(&[1.0, 3.0][..]));
        assert_eq!(groups.get("bs2", "dropped:count"), None);
        let modules: Vec<&str> = groups.with_metric("dropped:count").map(|(m, _)| m).collect();
        assert_eq!(modules, vec!["bs0", "bs1"]);
        assert_eq!(groups.with_metric("forwarded:count").count(), 1);
        assert_eq!(groups.metric_names(), vec!["dropped:count", "forwarded:count"]);
    }

    #[test]
    fn test_window_and_mean() {
        let series = AlignedSeries {
            times: vec![0.0, 1.0, 2.0, 3.0],
            values: vec![1.0, 2.0, 3.0, 4.0],
        };
        let w = series.window(1.0, 2.0);
        assert_eq!(w.times, vec![1.0, 2.0]);
        assert_eq!(w.values, vec![2.0, 3.0]);
        assert_eq!(series.mean(), 2.5);
        assert_eq!(AlignedSeries::default().mean(), 0.0);
    }
}
