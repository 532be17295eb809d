use crate::constants::FloatValue;
use crate::errors::{MechanismError, MechanismResult};
use serde::{Deserialize, Serialize};

/// Temperature correction applied to gate time constants
///
/// $$ \text{factor} = Q_{10}^{(T_{ref} - T)/T_{window}} $$
///
/// A factor below one speeds the gate up (temperatures above the reference).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Q10Scaler {
    /// Rate change per temperature window
    /// unit: dimensionless
    pub base: FloatValue,
    /// Temperature at which the factor is exactly one
    /// unit: degC
    pub reference: FloatValue,
    /// unit: degC
    /// default: 10
    #[serde(default = "default_window")]
    pub window: FloatValue,
}

fn default_window() -> FloatValue {
    10.0
}

impl Q10Scaler {
    pub fn new(base: FloatValue, reference: FloatValue, window: FloatValue) -> Self {
        Self {
            base,
            reference,
            window,
        }
    }

    /// Multiplier for a time constant evaluated at `celsius`
    pub fn factor(&self, celsius: FloatValue) -> FloatValue {
        self.base.powf((self.reference - celsius) / self.window)
    }

    pub fn validate(&self, mechanism: &str, parameter: &str) -> MechanismResult<()> {
        if !(self.base.is_finite() && self.base > 0.0) {
            return Err(MechanismError::invalid(
                mechanism,
                parameter,
                format!("Q10 base must be positive, got {}", self.base),
            ));
        }
        if !self.reference.is_finite() {
            return Err(MechanismError::invalid(
                mechanism,
                parameter,
                "Q10 reference temperature must be finite",
            ));
        }
        if !self.window.is_finite() || self.window == 0.0 {
            return Err(MechanismError::invalid(
                mechanism,
                parameter,
                "Q10 temperature window must be non-zero",
            ));
        }
        Ok(())
    }
}
