//! TTX-sensitive sodium channel
//!
//! Opening and closing rates for all three gates are offset sigmoids. A global
//! voltage shift moves every rate; `temperature_shift` moves only the slow
//! inactivation gate.

use rsmech_core::channel::{Channel, ChannelSpec};
use rsmech_core::constants::FloatValue;
use rsmech_core::current::{CurrentSpec, GateFactor, ReversalSource};
use rsmech_core::errors::MechanismResult;
use rsmech_core::gating::{GateKinetics, GateSpec};
use rsmech_core::ion::Ion;
use rsmech_core::q10::Q10Scaler;
use rsmech_core::rates::RateExpression;
use serde::{Deserialize, Serialize};

/// Parameters for the TTX-sensitive sodium channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaTtxsParameters {
    /// Maximal conductance
    /// unit: S/cm^2
    /// default: 0
    pub gbar: FloatValue,
    /// Voltage shift applied to every rate
    /// unit: mV
    pub shift: FloatValue,
    /// Additional shift of the slow inactivation rates
    /// unit: mV
    pub temperature_shift: FloatValue,
    /// Temperature the channel runs at, independent of the host.
    ///
    /// When unset the Q10 factors follow the host temperature. Set this to
    /// pin the channel to a fixed temperature, e.g. `Some(0.0)` for a
    /// parameterisation fitted at 0 degC whatever the host runs at.
    /// unit: degC
    /// default: unset
    pub temperature: Option<FloatValue>,
    /// default: 2.5
    pub q10: FloatValue,
    /// unit: degC
    /// default: 21
    pub q10_reference: FloatValue,
}

impl Default for NaTtxsParameters {
    fn default() -> Self {
        Self {
            gbar: 0.0,
            shift: 0.0,
            temperature_shift: 0.0,
            temperature: None,
            q10: 2.5,
            q10_reference: 21.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaTtxs {
    parameters: NaTtxsParameters,
}

impl NaTtxs {
    pub fn from_parameters(parameters: NaTtxsParameters) -> Self {
        Self { parameters }
    }

    /// Opening and closing rates of the slow inactivation gate
    fn slow_inactivation(&self) -> GateKinetics {
        let t_shift = self.parameters.temperature_shift;
        GateKinetics::AlphaBeta {
            alpha: RateExpression::sigmoid(0.00092, 93.9 + t_shift, 16.6).with_offset(0.00003),
            beta: RateExpression::sigmoid(-132.05, -384.9 + t_shift, 28.5).with_offset(132.05),
        }
    }

    pub fn spec(&self) -> ChannelSpec {
        let p = &self.parameters;
        let q10 = Q10Scaler::new(p.q10, p.q10_reference, 10.0);

        let spec = ChannelSpec::new("nattxs")
            .with_gate(
                GateSpec::new(
                    "m",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::sigmoid(15.5, -5.0, -12.08),
                        beta: RateExpression::sigmoid(35.2, 72.7, 16.7),
                    },
                )
                .with_shift(p.shift)
                .with_q10(q10),
            )
            .with_gate(
                GateSpec::new(
                    "h",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::sigmoid(0.38685, 122.35, 15.29),
                        beta: RateExpression::sigmoid(2.00283, 5.5266, -12.702).with_offset(-0.00283),
                    },
                )
                .with_shift(p.shift)
                .with_q10(q10),
            )
            .with_gate(
                GateSpec::new("s", self.slow_inactivation())
                    .with_shift(p.shift)
                    .with_q10(q10),
            )
            .with_current(
                CurrentSpec::new("ina", p.gbar, Some(Ion::Na), ReversalSource::Ion)
                    .with_factor(GateFactor::power("m", 3))
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use is_close::is_close;
    use rsmech_core::mechanism::Mechanism;
    use rsmech_core::node::NodeState;

    #[test]
    fn test_activation_rates() {
        let spec = NaTtxs::from_parameters(NaTtxsParameters::default()).spec();
        let v: FloatValue = -40.0;
        let alpha = 15.5 / (1.0 + ((v - 5.0) / -12.08).exp());
        let beta = 35.2 / (1.0 + ((v + 72.7) / 16.7).exp());

        let (m_inf, tau_m) = spec.gates[0].evaluate(v, 1.0);
        assert!(is_close!(tau_m, 1.0 / (alpha + beta)));
        assert!(is_close!(m_inf, alpha / (alpha + beta)));
    }

    #[test]
    fn test_slow_inactivation_offsets() {
        let spec = NaTtxs::from_parameters(NaTtxsParameters::default()).spec();
        let v: FloatValue = -70.0;
        let alpha = 0.00003 + 0.00092 / (1.0 + ((v + 93.9) / 16.6).exp());
        let beta = 132.05 - 132.05 / (1.0 + ((v - 384.9) / 28.5).exp());

        let (s_inf, tau_s) = spec.gates[2].evaluate(v, 1.0);
        assert_relative_eq!(tau_s, 1.0 / (alpha + beta), max_relative = 1e-12);
        assert_relative_eq!(s_inf, alpha / (alpha + beta), max_relative = 1e-12);
    }

    #[test]
    fn test_shift_moves_all_gates() {
        let shifted = NaTtxs::from_parameters(NaTtxsParameters {
            shift: 5.0,
            ..Default::default()
        })
        .spec();
        let plain = NaTtxs::from_parameters(NaTtxsParameters::default()).spec();
        for (a, b) in shifted.gates.iter().zip(plain.gates.iter()) {
            assert_eq!(a.evaluate(-50.0, 1.0), b.evaluate(-45.0, 1.0));
        }
    }

    #[test]
    fn test_instance_temperature() {
        let mut channel = NaTtxs::from_parameters(NaTtxsParameters {
            gbar: 0.1,
            temperature: Some(31.0),
            ..Default::default()
        })
        .build()
        .unwrap();
        // Host temperature is ignored
        let node = NodeState::new(-60.0, 6.3);
        channel.initialise(&node).unwrap();

        let (_, tau_m) = channel.spec().gates[0].evaluate(-60.0, 1.0);
        assert_relative_eq!(channel.gates()[0].tau(), tau_m / 2.5, max_relative = 1e-12);
    }
}
