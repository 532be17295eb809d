//! Sodium-calcium exchanger
//!
//! Electrogenic exchange of three sodium ions for one calcium ion. The
//! exchanger has no gating state; its current is a function of voltage and
//! the four concentrations:
//!
//! $$ I_{NaCa} = K \frac{DF_{in} - DF_{out}}{S} $$
//!
//! with
//!
//! $$ S = 1 + D (Ca_i Na_o^3 + Ca_o Na_i^3) $$
//! $$ DF_{in} = Na_i^3 Ca_o e^{(r-2)\gamma v F / 1000RT} $$
//! $$ DF_{out} = Na_o^3 Ca_i e^{(r-2)(\gamma-1) v F / 1000RT} $$
//!
//! The sodium current is $3 I_{NaCa}$ and the calcium current is
//! $-2 I_{NaCa}$. Both are returned from one evaluation so the linearizer
//! perturbs them together.

use rsmech_core::constants::{FloatValue, Time, FARADAY_CHANNEL, GAS_CONSTANT, ZERO_CELSIUS};
use rsmech_core::errors::{MechanismError, MechanismResult};
use rsmech_core::ion::Ion;
use rsmech_core::mechanism::Mechanism;
use rsmech_core::node::{IonicCurrents, NodeState};
use rsmech_core::q10::Q10Scaler;
use serde::{Deserialize, Serialize};

/// Parameters for the sodium-calcium exchanger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaCaPumpParameters {
    /// Exchange rate at the reference temperature
    /// unit: mA/cm^2/mM^4
    /// default: 1.27324e-6
    pub rate: FloatValue,
    /// Saturation constant
    /// unit: 1/mM^4
    /// default: 0.0036
    pub saturation: FloatValue,
    /// Partition of the membrane potential
    /// default: 0.5
    pub gamma: FloatValue,
    /// Sodium ions exchanged per calcium ion
    /// default: 3
    pub stoichiometry: FloatValue,
    /// Temperature correction of `rate`
    pub q10: Q10Scaler,
}

impl Default for NaCaPumpParameters {
    fn default() -> Self {
        Self {
            rate: 1.27324e-6,
            saturation: 0.0036,
            gamma: 0.5,
            stoichiometry: 3.0,
            q10: Q10Scaler::new(2.2, 22.85, 10.0),
        }
    }
}

/// Sodium-calcium exchanger
///
/// Serialised as its parameters, which are validated again on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NaCaPumpParameters", into = "NaCaPumpParameters")]
pub struct NaCaPump {
    parameters: NaCaPumpParameters,
    /// Temperature-corrected rate, set by `initialise`
    rate: Option<FloatValue>,
}

impl TryFrom<NaCaPumpParameters> for NaCaPump {
    type Error = MechanismError;

    fn try_from(parameters: NaCaPumpParameters) -> MechanismResult<Self> {
        NaCaPump::from_parameters(parameters)
    }
}

impl From<NaCaPump> for NaCaPumpParameters {
    fn from(value: NaCaPump) -> Self {
        value.parameters
    }
}

impl NaCaPump {
    pub fn from_parameters(parameters: NaCaPumpParameters) -> MechanismResult<Self> {
        let finite = [
            parameters.rate,
            parameters.saturation,
            parameters.gamma,
            parameters.stoichiometry,
        ]
        .iter()
        .all(|x| x.is_finite());
        if !finite || parameters.rate < 0.0 || parameters.saturation < 0.0 {
            return Err(MechanismError::invalid(
                "nacapump",
                "rate",
                "rate and saturation must be finite and non-negative",
            ));
        }
        parameters.q10.validate("nacapump", "q10")?;
        Ok(Self {
            parameters,
            rate: None,
        })
    }

    pub fn parameters(&self) -> &NaCaPumpParameters {
        &self.parameters
    }

    /// Exchange rate after temperature correction, once initialised
    pub fn rate(&self) -> Option<FloatValue> {
        self.rate
    }

    /// Exchanger current density
    ///
    /// This is the core calculation, extracted for testability.
    ///
    /// unit: mA/cm^2
    pub fn calculate_exchange_current(
        &self,
        rate: FloatValue,
        voltage: FloatValue,
        celsius: FloatValue,
        nai: FloatValue,
        nao: FloatValue,
        cai: FloatValue,
        cao: FloatValue,
    ) -> FloatValue {
        let p = &self.parameters;
        let scale = voltage * FARADAY_CHANNEL / (1000.0 * GAS_CONSTANT * (celsius + ZERO_CELSIUS));
        let drive = p.stoichiometry - 2.0;

        let saturation = 1.0 + p.saturation * (cai * nao.powi(3) + cao * nai.powi(3));
        let inward = nai.powi(3) * cao * (drive * p.gamma * scale).exp();
        let outward = nao.powi(3) * cai * (drive * (p.gamma - 1.0) * scale).exp();
        rate * (inward - outward) / saturation
    }
}

#[typetag::serde]
impl Mechanism for NaCaPump {
    fn name(&self) -> &str {
        "nacapump"
    }

    fn initialise(&mut self, node: &NodeState) -> MechanismResult<()> {
        let rate = self.parameters.rate * self.parameters.q10.factor(node.celsius);
        log::debug!("Initialised nacapump at {} degC: rate={}", node.celsius, rate);
        self.rate = Some(rate);
        Ok(())
    }

    fn currents(&self, voltage: FloatValue, node: &NodeState) -> MechanismResult<IonicCurrents> {
        let rate = self.rate.ok_or_else(|| MechanismError::NotInitialised {
            mechanism: self.name().to_string(),
        })?;
        let sodium = node.ion(Ion::Na);
        let calcium = node.ion(Ion::Ca);
        let exchange = self.calculate_exchange_current(
            rate,
            voltage,
            node.celsius,
            sodium.internal,
            sodium.external,
            calcium.internal,
            calcium.external,
        );

        let mut currents = IonicCurrents::default();
        currents.add_ion(Ion::Na, 3.0 * exchange);
        currents.add_ion(Ion::Ca, -2.0 * exchange);
        Ok(currents)
    }

    fn advance(&mut self, _node: &NodeState, _dt: Time) -> MechanismResult<()> {
        if self.rate.is_none() {
            return Err(MechanismError::NotInitialised {
                mechanism: self.name().to_string(),
            });
        }
        Ok(())
    }
}
