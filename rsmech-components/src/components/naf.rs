//! Fast sodium channel
//!
//! Three gates with $I = \bar{g} m^3 h j (v - E_{Na})$. Activation and fast
//! inactivation have Gaussian time constants and Boltzmann steady states;
//! the slow inactivation gate $j$ has a sigmoidal time constant.

use rsmech_core::channel::{Channel, ChannelSpec};
use rsmech_core::constants::FloatValue;
use rsmech_core::current::{CurrentSpec, GateFactor, ReversalSource};
use rsmech_core::errors::MechanismResult;
use rsmech_core::gating::{GateKinetics, GateSpec};
use rsmech_core::ion::Ion;
use rsmech_core::q10::Q10Scaler;
use rsmech_core::rates::RateExpression;
use serde::{Deserialize, Serialize};

/// Parameters for the fast sodium channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NafParameters {
    /// Maximal conductance
    /// unit: S/cm^2
    /// default: 0.0689671
    pub gbar: FloatValue,
    /// Shift of the m and h steady-state curves
    /// unit: mV
    /// default: -17.5
    pub shift: FloatValue,
    /// unit: mV
    pub v_half_m: FloatValue,
    /// unit: mV
    pub slope_m: FloatValue,
    /// unit: mV
    pub v_half_h: FloatValue,
    /// unit: mV
    pub slope_h: FloatValue,
    /// unit: mV
    pub v_half_j: FloatValue,
    /// unit: mV
    pub slope_j: FloatValue,
    /// Peak height, width and position of the Gaussian $\tau_m$, plus its floor
    pub tau_m: [FloatValue; 4],
    /// Peak height, width and position of the Gaussian $\tau_h$, plus its floor
    pub tau_h: [FloatValue; 4],
    /// Amplitude, midpoint, slope and floor of the sigmoidal $\tau_j$
    pub tau_j: [FloatValue; 4],
    /// Q10 of the activation time constant
    /// default: 2.3
    pub q10_m: FloatValue,
    /// Q10 of the fast inactivation time constant
    /// default: 1.5
    pub q10_h: FloatValue,
    /// Temperature at which the time constants were measured
    /// unit: degC
    /// default: 22.85
    pub q10_reference: FloatValue,
}

impl Default for NafParameters {
    fn default() -> Self {
        Self {
            gbar: 0.0689671,
            shift: -17.5,
            v_half_m: 41.35,
            slope_m: -4.75,
            v_half_h: 62.0,
            slope_h: 4.5,
            v_half_j: 40.0,
            slope_j: 1.5,
            tau_m: [0.75, 0.0635, -40.35, 0.12],
            tau_h: [6.5, 0.0295, -75.0, 0.55],
            tau_j: [25.0, -20.0, 4.5, 0.01],
            q10_m: 2.3,
            q10_h: 1.5,
            q10_reference: 22.85,
        }
    }
}

/// Fast sodium channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Naf {
    parameters: NafParameters,
}

impl Naf {
    pub fn from_parameters(parameters: NafParameters) -> Self {
        Self { parameters }
    }

    pub fn spec(&self) -> ChannelSpec {
        let p = &self.parameters;
        let gaussian = |t: [FloatValue; 4]| RateExpression::gaussian(t[0], t[1], t[2], t[3]);

        ChannelSpec::new("naf")
            .with_gate(
                GateSpec::new(
                    "m",
                    GateKinetics::SteadyState {
                        steady_state: RateExpression::sigmoid(1.0, p.v_half_m + p.shift, p.slope_m),
                        tau: gaussian(p.tau_m),
                    },
                )
                .with_q10(Q10Scaler::new(p.q10_m, p.q10_reference, 10.0)),
            )
            .with_gate(
                GateSpec::new(
                    "h",
                    GateKinetics::SteadyState {
                        steady_state: RateExpression::sigmoid(1.0, p.v_half_h + p.shift, p.slope_h),
                        tau: gaussian(p.tau_h),
                    },
                )
                .with_q10(Q10Scaler::new(p.q10_h, p.q10_reference, 10.0)),
            )
            .with_gate(GateSpec::new(
                "j",
                GateKinetics::SteadyState {
                    steady_state: RateExpression::sigmoid(1.0, p.v_half_j, p.slope_j),
                    tau: RateExpression::sigmoid(p.tau_j[0], p.tau_j[1], p.tau_j[2])
                        .with_offset(p.tau_j[3]),
                },
            ))
            .with_current(
                CurrentSpec::new("ina", p.gbar, Some(Ion::Na), ReversalSource::Ion)
                    .with_factor(GateFactor::power("m", 3))
                    .with_factor(GateFactor::power("h", 1))
                    .with_factor(GateFactor::power("j", 1)),
            )
    }

    pub fn build(&self) -> MechanismResult<Channel> {
        Channel::new(self.spec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use rsmech_core::mechanism::Mechanism;
    use rsmech_core::node::NodeState;

    #[test]
    fn test_steady_states_at_rest() {
        let channel = Naf::from_parameters(NafParameters::default()).build().unwrap();
        let gates = &channel.spec().gates;

        let v: FloatValue = -70.0;
        let (m_inf, _) = gates[0].evaluate(v, 1.0);
        let (h_inf, _) = gates[1].evaluate(v, 1.0);
        let (j_inf, tau_j) = gates[2].evaluate(v, 1.0);
        assert!(is_close!(m_inf, 1.0 / (1.0 + ((v + 41.35 - 17.5) / -4.75).exp())));
        assert!(is_close!(h_inf, 1.0 / (1.0 + ((v + 62.0 - 17.5) / 4.5).exp())));
        assert!(is_close!(j_inf, 1.0 / (1.0 + ((v + 40.0) / 1.5).exp())));
        assert!(is_close!(tau_j, 25.0 / (1.0 + ((v - 20.0) / 4.5).exp()) + 0.01));
    }

    #[test]
    fn test_q10_only_on_m_and_h() {
        let mut channel = Naf::from_parameters(NafParameters::default()).build().unwrap();
        let node = NodeState::new(-60.0, 32.85);
        channel.initialise(&node).unwrap();

        let (_, tau_m) = channel.spec().gates[0].evaluate(-60.0, 1.0);
        let (_, tau_j) = channel.spec().gates[2].evaluate(-60.0, 1.0);
        assert!(is_close!(channel.gates()[0].tau(), tau_m / 2.3));
        assert!(is_close!(channel.gates()[2].tau(), tau_j));
    }

    #[test]
    fn test_current_uses_host_reversal() {
        let mut channel = Naf::from_parameters(NafParameters::default()).build().unwrap();
        let node = NodeState::new(-60.0, 22.85);
        channel.initialise(&node).unwrap();
        let x = channel.states();
        let g = 0.0689671 * x[0].powi(3) * x[1] * x[2];
        let currents = channel.currents(-60.0, &node).unwrap();
        assert!(is_close!(currents.by_ion[Ion::Na], g * (-60.0 - 50.0)));
    }
}
