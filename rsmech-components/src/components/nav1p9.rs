//! Nav1.9 sodium channel
//!
//! Persistent TTX-resistant sodium current with an ultra-slow inactivation
//! gate `s` that can be switched off. The current is linear in every gate:
//!
//! $$ I = \bar{g} m h s (v - E_{Na}) $$

use rsmech_core::channel::{Channel, ChannelSpec};
use rsmech_core::constants::FloatValue;
use rsmech_core::current::{CurrentSpec, GateFactor, ReversalSource};
use rsmech_core::errors::MechanismResult;
use rsmech_core::gating::{GateKinetics, GateSpec};
use rsmech_core::ion::Ion;
use rsmech_core::q10::Q10Scaler;
use rsmech_core::rates::RateExpression;
use serde::{Deserialize, Serialize};

/// Parameters for the Nav1.9 channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nav1p9Parameters {
    /// Maximal conductance
    /// unit: S/cm^2
    /// default: 0
    pub gbar: FloatValue,
    /// Shift of the slow inactivation rates
    /// unit: mV
    pub slow_shift: FloatValue,
    /// Shift of the activation and fast inactivation rates, e.g. after NGF exposure
    /// unit: mV
    pub ngf_shift: FloatValue,
    /// When false the slow gate sits at one with a 0.1 ms time constant
    /// default: true
    pub slow_inactivation: bool,
    /// Temperature the channel runs at, independent of the host.
    ///
    /// When unset the Q10 factors follow the host temperature. Set this to
    /// pin the channel to a fixed temperature, e.g. `Some(0.0)` for a
    /// parameterisation fitted at 0 degC whatever the host runs at.
    /// unit: degC
    /// default: unset
    pub temperature: Option<FloatValue>,
}

impl Default for Nav1p9Parameters {
    fn default() -> Self {
        Self {
            gbar: 0.0,
            slow_shift: 0.0,
            ngf_shift: 0.0,
            slow_inactivation: true,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nav1p9 {
    parameters: Nav1p9Parameters,
}

impl Nav1p9 {
    pub fn from_parameters(parameters: Nav1p9Parameters) -> Self {
        Self { parameters }
    }

    fn slow_kinetics(&self) -> GateKinetics {
        if self.parameters.slow_inactivation {
            GateKinetics::AlphaBeta {
                alpha: RateExpression::exponential(1.6e-7, 0.0, -12.0),
                beta: RateExpression::sigmoid(0.0005, 32.0, -23.0),
            }
        } else {
            GateKinetics::SteadyState {
                steady_state: RateExpression::constant(1.0),
                tau: RateExpression::constant(0.1),
            }
        }
    }

    pub fn spec(&self) -> ChannelSpec {
        let p = &self.parameters;
        let q10 = Q10Scaler::new(2.5, 21.0, 10.0);

        let spec = ChannelSpec::new("nav1p9")
            .with_gate(
                GateSpec::new(
                    "m",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::sigmoid(1.032, 6.99, -14.8712),
                        beta: RateExpression::sigmoid(5.79, 130.4, 22.9),
                    },
                )
                .with_shift(p.ngf_shift)
                .with_q10(q10),
            )
            .with_gate(
                GateSpec::new(
                    "h",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::sigmoid(0.06435, 73.2642, 3.71928),
                        beta: RateExpression::sigmoid(0.13496, 10.2785, -9.09334),
                    },
                )
                .with_shift(p.ngf_shift)
                .with_q10(q10),
            )
            .with_gate(
                GateSpec::new("s", self.slow_kinetics())
                    .with_shift(p.slow_shift)
                    .with_q10(q10),
            )
            .with_current(
                CurrentSpec::new("ina", p.gbar, Some(Ion::Na), ReversalSource::Ion)
                    .with_factor(GateFactor::power("m", 1))
                    .with_factor(GateFactor::power("h", 1))
                    .with_factor(GateFactor::power("s", 1)),
            );

        match p.temperature {
            Some(celsius) => spec.with_temperature(celsius),
            None => spec,
        }
    }

    pub fn build(&self) -> MechanismResult<Channel> {
        Channel::new(self.spec())
    }
}
