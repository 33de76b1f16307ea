//! Raw run store input contract.
//!
//! A run file maps each run name to its recorded scalars and vectors:
//!
//! ```json
//! { "run-0": { "scalars": [{"module": "bs0", "name": "dropped:count", "value": 3}],
//!              "vectors": [{"module": "bs0", "name": "queueLength:vector",
//!                           "time": [0.0, 1.5], "value": [0, 1]}] } }
//! ```
//!
//! Every field is optional. Missing strings read as empty, missing sequences as
//! empty, and a missing or null scalar value reads as `0.0`.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::AnalysisError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScalarObservation {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl ScalarObservation {
    #[inline]
    pub fn value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VectorTrace {
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: Vec<f64>,
    #[serde(default)]
    pub value: Vec<f64>,
}

impl VectorTrace {
    /// Describes why this trace breaks the equal-length / non-decreasing time contract.
    pub fn defect(&self) -> Option<String> {
        if self.time.len() != self.value.len() {
            return Some(format!(
                "time has {} points but value has {}",
                self.time.len(),
                self.value.len()
            ));
        }
        self.time
            .windows(2)
            .position(|w| w[1] < w[0])
            .map(|i| {
                format!(
                    "time decreases at index {}: {} -> {}",
                    i + 1,
                    self.time[i],
                    self.time[i + 1]
                )
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Run {
    #[serde(default)]
    pub scalars: Vec<ScalarObservation>,
    #[serde(default)]
    pub vectors: Vec<VectorTrace>,
}

/// All runs of one experiment, keyed by run name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RunStore {
    pub runs: BTreeMap<String, Run>,
}

impl RunStore {
    pub fn new(runs: BTreeMap<String, Run>) -> Self {
        Self { runs }
    }

    pub fn from_json_str(text: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Rejects the first trace with mismatched lengths or decreasing timestamps.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (run, content) in &self.runs {
            for trace in &content.vectors {
                if let Some(reason) = trace.defect() {
                    return Err(AnalysisError::MalformedTrace {
                        run: run.clone(),
                        module: trace.module.clone(),
                        name: trace.name.clone(),
                        reason,
                    });
                }
            }
        }
        Ok(())
    }
}
