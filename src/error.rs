use thiserror::Error;

/// Input validation failures. The simulation itself never fails once a
/// state has been built; every field saturates instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("unknown intervention kind '{0}'")]
    UnknownIntervention(String),
    #[error("initial population must be greater than zero")]
    InvalidPopulation,
    #[error("drought index {0} is outside [0, 1]")]
    InvalidDroughtIndex(f64),
    #[error("conflict probability {0} is outside [0, 1]")]
    InvalidConflictProbability(f64),
}

pub(crate) fn check_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
