//! Conductance linearization
//!
//! Hosts solve the membrane equation implicitly and need each mechanism's
//! current as a linear function of voltage. The slope is taken numerically:
//!
//! $$ g = \frac{I(v + \epsilon) - I(v)}{\epsilon} $$
//!
//! Every ion current of a mechanism is differenced under the same
//! perturbation so currents derived from shared states stay consistent.

use crate::constants::{FloatValue, LINEARISATION_STEP};
use crate::errors::MechanismResult;
use crate::ion::Ion;
use crate::mechanism::Mechanism;
use crate::node::{IonicCurrents, LinearizationResult, NodeState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConductanceLinearizer {
    /// Voltage perturbation
    /// unit: mV
    pub epsilon: FloatValue,
}

impl Default for ConductanceLinearizer {
    fn default() -> Self {
        Self {
            epsilon: LINEARISATION_STEP,
        }
    }
}

impl ConductanceLinearizer {
    pub fn new(epsilon: FloatValue) -> Self {
        Self { epsilon }
    }

    /// Linearize a mechanism around the node's voltage
    pub fn linearize<M: Mechanism + ?Sized>(
        &self,
        mechanism: &M,
        node: &NodeState,
    ) -> MechanismResult<LinearizationResult> {
        self.linearize_with(node.voltage, |v| mechanism.currents(v, node))
    }

    /// Linearize an arbitrary current function around `voltage`
    pub fn linearize_with<F>(&self, voltage: FloatValue, currents: F) -> MechanismResult<LinearizationResult>
    where
        F: Fn(FloatValue) -> MechanismResult<IonicCurrents>,
    {
        let perturbed = currents(voltage + self.epsilon)?;
        let operating = currents(voltage)?;

        let mut result = LinearizationResult {
            current: operating.total(),
            conductance: (perturbed.total() - operating.total()) / self.epsilon,
            ..Default::default()
        };
        for ion in Ion::ALL {
            result.ion_currents[ion] = operating.by_ion[ion];
            result.ion_conductances[ion] =
                (perturbed.by_ion[ion] - operating.by_ion[ion]) / self.epsilon;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ohmic(g0: FloatValue, reversal: FloatValue) -> impl Fn(FloatValue) -> MechanismResult<IonicCurrents> {
        move |v| {
            let mut currents = IonicCurrents::default();
            currents.add_ion(Ion::K, g0 * (v - reversal));
            Ok(currents)
        }
    }

    #[test]
    fn test_recovers_ohmic_conductance() {
        for epsilon in [1e-6, 1e-3, 0.1, 10.0] {
            let result = ConductanceLinearizer::new(epsilon)
                .linearize_with(-65.0, ohmic(0.036, -77.0))
                .unwrap();
            assert_relative_eq!(result.conductance, 0.036, max_relative = 1e-6);
            assert_relative_eq!(result.ion_conductances[Ion::K], 0.036, max_relative = 1e-6);
            assert_relative_eq!(result.current, 0.036 * 12.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_coupled_ion_currents_share_perturbation() {
        // Exchanger-like: one driving term split 3:-2 between two ions
        let exchanger = |v: FloatValue| {
            let flux = 1e-3 * (0.04 * v).exp();
            let mut currents = IonicCurrents::default();
            currents.add_ion(Ion::Na, 3.0 * flux);
            currents.add_ion(Ion::Ca, -2.0 * flux);
            Ok(currents)
        };
        let result = ConductanceLinearizer::default()
            .linearize_with(-60.0, exchanger)
            .unwrap();

        assert_relative_eq!(
            result.ion_conductances[Ion::Na] / result.ion_conductances[Ion::Ca],
            -1.5,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            result.conductance,
            result.ion_conductances[Ion::Na] + result.ion_conductances[Ion::Ca],
            max_relative = 1e-9
        );
        assert_eq!(result.ion_conductances[Ion::K], 0.0);
    }

    #[test]
    fn test_nonspecific_current_only_in_total() {
        let leak = |v: FloatValue| {
            let mut currents = IonicCurrents::default();
            currents.add_nonspecific(0.007 * (v + 90.0));
            Ok(currents)
        };
        let result = ConductanceLinearizer::default().linearize_with(-80.0, leak).unwrap();
        assert_relative_eq!(result.conductance, 0.007, max_relative = 1e-6);
        assert_eq!(result.ion_currents.total(), 0.0);
    }
}
