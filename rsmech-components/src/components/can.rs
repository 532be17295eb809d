//! N-type calcium channel
//!
//! One activation gate `d` and two inactivation gates mixed in fixed
//! proportion:
//!
//! $$ I_{Ca} = \bar{g} d (0.55 f_1 + 0.45 f_2) (v - E_{CaN}) $$
//!
//! The reversal potential is the calcium Nernst potential lowered by a
//! constant offset, recomputed from the node's concentrations on every
//! evaluation.

use rsmech_core::channel::{Channel, ChannelSpec};
use rsmech_core::constants::FloatValue;
use rsmech_core::current::{CurrentSpec, GateFactor, ReversalSource};
use rsmech_core::errors::MechanismResult;
use rsmech_core::gating::{GateKinetics, GateSpec};
use rsmech_core::ion::Ion;
use rsmech_core::q10::Q10Scaler;
use rsmech_core::rates::RateExpression;
use serde::{Deserialize, Serialize};

/// Parameters for the N-type calcium channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaNParameters {
    /// Maximal conductance
    /// unit: S/cm^2
    /// default: 0.000106103
    pub gbar: FloatValue,
    /// Shift of every steady-state curve
    /// unit: mV
    /// default: -7
    pub shift: FloatValue,
    /// Subtracted from the calcium Nernst potential
    /// unit: mV
    /// default: 78.7
    pub reversal_offset: FloatValue,
    /// Weight of the fast inactivation gate `f1`; `f2` gets the remainder
    /// default: 0.55
    pub fast_fraction: FloatValue,
    /// default: 4.3
    pub q10: FloatValue,
    /// unit: degC
    /// default: 22.85
    pub q10_reference: FloatValue,
}

impl Default for CaNParameters {
    fn default() -> Self {
        Self {
            gbar: 0.000106103,
            shift: -7.0,
            reversal_offset: 78.7,
            fast_fraction: 0.55,
            q10: 4.3,
            q10_reference: 22.85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaN {
    parameters: CaNParameters,
}

impl CaN {
    pub fn from_parameters(parameters: CaNParameters) -> Self {
        Self { parameters }
    }

    /// Steady state of the slow inactivation gate: a residual sigmoid on top
    /// of the main inactivation curve
    fn f2_steady_state(&self) -> RateExpression {
        let shift = self.parameters.shift;
        RateExpression::sum(vec![
            RateExpression::sigmoid(0.2, 5.0 + shift, -10.0),
            RateExpression::sigmoid(1.0, 40.0 + shift, 10.0),
        ])
    }

    pub fn spec(&self) -> ChannelSpec {
        let p = &self.parameters;
        let q10 = Q10Scaler::new(p.q10, p.q10_reference, 10.0);

        ChannelSpec::new("can")
            .with_gate(
                GateSpec::new(
                    "d",
                    GateKinetics::SteadyState {
                        steady_state: RateExpression::sigmoid(1.0, 20.0 + p.shift, -4.5),
                        tau: RateExpression::gaussian(3.25, 0.042, -31.0, 0.395),
                    },
                )
                .with_q10(q10),
            )
            .with_gate(
                GateSpec::new(
                    "f1",
                    GateKinetics::SteadyState {
                        steady_state: RateExpression::sigmoid(1.0, 20.0 + p.shift, 25.0),
                        tau: RateExpression::gaussian(33.5, 0.0395, -30.0, 5.0),
                    },
                )
                .with_q10(q10),
            )
            .with_gate(
                GateSpec::new(
                    "f2",
                    GateKinetics::SteadyState {
                        steady_state: self.f2_steady_state(),
                        tau: RateExpression::gaussian(225.0, 0.0275, -40.0, 75.0),
                    },
                )
                .with_q10(q10),
            )
            .with_current(
                CurrentSpec::new(
                    "ica",
                    p.gbar,
                    Some(Ion::Ca),
                    ReversalSource::Nernst {
                        offset: -p.reversal_offset,
                    },
                )
                .with_factor(GateFactor::power("d", 1))
                .with_factor(GateFactor::mixture(&[
                    ("f1", p.fast_fraction),
                    ("f2", 1.0 - p.fast_fraction),
                ])),
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
    use rsmech_core::errors::MechanismError;
    use rsmech_core::ion::{nernst_potential, IonState};
    use rsmech_core::mechanism::Mechanism;
    use rsmech_core::node::NodeState;

    #[test]
    fn test_f2_residual() {
        let spec = CaN::from_parameters(CaNParameters::default()).spec();
        let v: FloatValue = -20.0;
        let rn = 0.2 / (1.0 + ((v + 5.0 - 7.0) / -10.0).exp());
        let expected = rn + 1.0 / (1.0 + ((v + 40.0 - 7.0) / 10.0).exp());
        let (f2_inf, tau_f2) = spec.gates[2].evaluate(v, 1.0);
        assert!(is_close!(f2_inf, expected));
        assert!(is_close!(
            tau_f2,
            225.0 * (-(0.0275_f64.powi(2)) * (v + 40.0).powi(2)).exp() + 75.0
        ));
    }

    #[test]
    fn test_current_uses_offset_nernst() {
        let mut channel = CaN::from_parameters(CaNParameters::default()).build().unwrap();
        let node = NodeState::new(-20.0, 22.85)
            .with_ion(Ion::Ca, IonState::new(1e-4, 2.0, 0.0));
        channel.initialise(&node).unwrap();

        let x = channel.states();
        let open = x[0] * (0.55 * x[1] + 0.45 * x[2]);
        let reversal = nernst_potential(Ion::Ca, 1e-4, 2.0, 22.85).unwrap() - 78.7;
        let currents = channel.currents(-20.0, &node).unwrap();
        assert!(is_close!(
            currents.by_ion[Ion::Ca],
            0.000106103 * open * (-20.0 - reversal)
        ));
    }

    #[test]
    fn test_depleted_calcium_is_an_error() {
        let mut channel = CaN::from_parameters(CaNParameters::default()).build().unwrap();
        let node = NodeState::new(-20.0, 22.85)
            .with_ion(Ion::Ca, IonState::new(0.0, 2.0, 0.0));
        channel.initialise(&node).unwrap();
        assert!(matches!(
            channel.currents(-20.0, &node),
            Err(MechanismError::NonPositiveConcentration { ion: Ion::Ca, .. })
        ));
    }
}
