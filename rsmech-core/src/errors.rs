use crate::ion::Ion;
use thiserror::Error;

/// Error type for invalid mechanism construction or evaluation.
#[derive(Error, Debug)]
pub enum MechanismError {
    #[error("{0}")]
    Error(String),
    #[error("Non-positive {ion} concentration in Nernst potential. internal={internal} mM, external={external} mM")]
    NonPositiveConcentration {
        ion: Ion,
        internal: f64,
        external: f64,
    },
    #[error("Invalid parameter `{parameter}` for `{mechanism}`: {reason}")]
    InvalidParameter {
        mechanism: String,
        parameter: String,
        reason: String,
    },
    #[error("Time constant of gate `{gate}` is {tau} ms at {voltage} mV. Time constants must be positive and finite")]
    NonPositiveTimeConstant { gate: String, voltage: f64, tau: f64 },
    #[error("Conductance factor of `{mechanism}` references unknown gate `{gate}`")]
    UnknownGate { mechanism: String, gate: String },
    #[error("`{mechanism}` was advanced before it was initialised")]
    NotInitialised { mechanism: String },
    #[error("Zero pivot encountered at row {row} of the sparse system")]
    SingularMatrix { row: usize },
    #[error("Wrong state length for `{mechanism}`. Expected {expected}, got {got}")]
    StateLength {
        mechanism: String,
        expected: usize,
        got: usize,
    },
    #[error("Non-finite concentration {value} mM in compartment {index} of `{mechanism}`")]
    NonFiniteConcentration {
        mechanism: String,
        index: usize,
        value: f64,
    },
    #[error("Adaptive integration failed: {0}")]
    Integration(String),
    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, MechanismError>`.
pub type MechanismResult<T> = Result<T, MechanismError>;

impl MechanismError {
    pub fn invalid(
        mechanism: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        MechanismError::InvalidParameter {
            mechanism: mechanism.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}
