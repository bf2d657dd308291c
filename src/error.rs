/// Errors raised while editing the factor set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("factor '{0}' already exists")]
    DuplicateFactorId(String),
    #[error("factor '{id}': weight {weight} is outside [0, 1]")]
    InvalidWeight { id: String, weight: f64 },
    #[error("unknown factor '{0}'")]
    UnknownFactor(String),
}

/// Expected, recoverable outcomes of a scoring call that yield no prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("no enabled factor has an observed value")]
    NoActiveFactors,
    #[error("insufficient data points: {observed} observed, {required} required")]
    InsufficientDataPoints { observed: u32, required: u32 },
}

/// A single configuration violation. Validation collects every one it finds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("factors[{index}]: weight {weight} for '{id}' is outside [0, 1]")]
    InvalidWeight { index: usize, id: String, weight: f64 },
    #[error("factors[{index}]: id and name must be non-empty")]
    EmptyFactorField { index: usize },
    #[error("factors[{index}]: duplicate factor id '{id}'")]
    DuplicateFactorId { index: usize, id: String },
    #[error("factors: at least one factor must be enabled")]
    NoActiveFactors,
    #[error("thresholds.{name}: {value} is outside (0, 1)")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("thresholds: {lower_name} ({lower}) must be strictly below {upper_name} ({upper})")]
    ThresholdOrderViolation {
        lower_name: &'static str,
        lower: f64,
        upper_name: &'static str,
        upper: f64,
    },
    #[error("{field}: must be at least 1")]
    InvalidWindowPolicy { field: &'static str },
}

fn render(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full, ordered list of violations that blocked activation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid scoring config:\n{}", render(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Failures of a versioned configuration update.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigUpdateError {
    #[error("stale config version: update read version {expected}, current is {current}")]
    StaleConfigVersion { expected: u64, current: u64 },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}
