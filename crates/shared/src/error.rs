#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Malformed trace {module}/{name} in run {run}: {reason}")]
    MalformedTrace {
        run: String,
        module: String,
        name: String,
        reason: String,
    },
    #[error("Unstable system: service rate {service_rate} must exceed arrival rate {arrival_rate}")]
    UnstableSystem { service_rate: f64, arrival_rate: f64 },
    #[error("Invalid policy option: {0}. Choose 'A' or 'B'")]
    UnknownPolicyOption(String),
    #[error("Experiment name does not match <dist>_<option>_N<users>_I<interarrival>_S<size>: {0}")]
    InvalidExperimentName(String),
    #[error("Invalid sweep parameter: {0}. Use 'N', 'I' or 'S'")]
    UnknownSweepParameter(String),
    #[error("Sweep parameter {parameter} is not numeric in {value}")]
    NonNumericParameter { parameter: &'static str, value: String },
    #[error("Run store parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}
