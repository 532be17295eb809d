use crate::constants::{FloatValue, Time};
use crate::errors::MechanismResult;
use crate::linearize::ConductanceLinearizer;
use crate::node::{IonicCurrents, LinearizationResult, NodeState};
use std::fmt::Debug;

/// A membrane mechanism instance attached to one compartment
///
/// The host drives every instance through the same cycle each step:
/// [`Mechanism::linearize`] at the current voltage, solve for the new
/// voltage, then [`Mechanism::advance`] the mechanism's own states.
/// Adaptive hosts use [`Mechanism::states`], [`Mechanism::derivatives`] and
/// [`Mechanism::matsol`] instead of `advance`.
#[typetag::serde(tag = "mechanism")]
pub trait Mechanism: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Set every state to equilibrium at the node's initial conditions
    fn initialise(&mut self, node: &NodeState) -> MechanismResult<()>;

    /// Currents the mechanism would pass at `voltage` given its present
    /// states and the node's ion store
    fn currents(&self, voltage: FloatValue, node: &NodeState) -> MechanismResult<IonicCurrents>;

    /// Advance internal states by `dt` using the node's new voltage
    fn advance(&mut self, node: &NodeState, dt: Time) -> MechanismResult<()>;

    /// Current and conductance contribution at the node's voltage
    fn linearize(&self, node: &NodeState) -> MechanismResult<LinearizationResult> {
        ConductanceLinearizer::default().linearize(self, node)
    }

    /// Integrated states, in a fixed order
    fn states(&self) -> Vec<FloatValue> {
        vec![]
    }

    fn set_states(&mut self, _states: &[FloatValue]) -> MechanismResult<()> {
        Ok(())
    }

    /// Time derivative of every state at the node's voltage
    fn derivatives(&mut self, _node: &NodeState) -> MechanismResult<Vec<FloatValue>> {
        Ok(vec![])
    }

    /// Apply the diagonal implicit correction $d_i \leftarrow d_i / (1 + dt/\tau_i)$
    fn matsol(&mut self, _node: &NodeState, _dt: Time, _d: &mut [FloatValue]) -> MechanismResult<()> {
        Ok(())
    }
}
