//! Current assembly
//!
//! An ionic current is a conductance density scaled by a product of gating
//! factors and multiplied by the driving force:
//!
//! $$ I = \bar{g} \prod_k \Big(\sum_i w_{ki} x_i\Big)^{p_k} (v - E) $$
//!
//! Plain products such as $m^3 h$ use one gate per factor with unit weight.

use crate::constants::FloatValue;
use crate::errors::{MechanismError, MechanismResult};
use crate::gating::GatingVariable;
use crate::ion::{nernst_potential, Ion};
use crate::node::NodeState;
use serde::{Deserialize, Serialize};

/// Where the reversal potential of a current comes from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ReversalSource {
    /// Constant reversal potential owned by the mechanism
    Fixed {
        /// unit: mV
        potential: FloatValue,
    },
    /// The host's reversal potential for the carrier ion
    Ion,
    /// Nernst potential of the carrier ion plus a constant offset
    Nernst {
        /// unit: mV
        #[serde(default)]
        offset: FloatValue,
    },
}

/// A gate contributing to a factor, with its mixing weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedGate {
    pub gate: String,
    #[serde(default = "unit_weight")]
    pub weight: FloatValue,
}

fn unit_weight() -> FloatValue {
    1.0
}

fn unit_power() -> i32 {
    1
}

/// $(\sum_i w_i x_i)^p$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateFactor {
    pub gates: Vec<WeightedGate>,
    #[serde(default = "unit_power")]
    pub power: i32,
}

impl GateFactor {
    /// A single gate raised to `power`
    pub fn power(gate: impl Into<String>, power: i32) -> Self {
        Self {
            gates: vec![WeightedGate {
                gate: gate.into(),
                weight: 1.0,
            }],
            power,
        }
    }

    /// A weighted mixture of gates raised to the first power
    pub fn mixture(gates: &[(&str, FloatValue)]) -> Self {
        Self {
            gates: gates
                .iter()
                .map(|(gate, weight)| WeightedGate {
                    gate: gate.to_string(),
                    weight: *weight,
                })
                .collect(),
            power: 1,
        }
    }
}

/// Definition of one ionic current of a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSpec {
    pub name: String,
    /// Maximal conductance density
    /// unit: S/cm^2
    pub conductance: FloatValue,
    /// Ion carrying the current. Nonspecific currents have no carrier.
    #[serde(default)]
    pub carrier: Option<Ion>,
    pub reversal: ReversalSource,
    #[serde(default)]
    pub factors: Vec<GateFactor>,
}

impl CurrentSpec {
    pub fn new(
        name: impl Into<String>,
        conductance: FloatValue,
        carrier: Option<Ion>,
        reversal: ReversalSource,
    ) -> Self {
        Self {
            name: name.into(),
            conductance,
            carrier,
            reversal,
            factors: vec![],
        }
    }

    pub fn with_factor(mut self, factor: GateFactor) -> Self {
        self.factors.push(factor);
        self
    }

    /// Resolve gate names to indices into `gate_names`
    pub fn assemble(&self, mechanism: &str, gate_names: &[&str]) -> MechanismResult<CurrentAssembler> {
        if !(self.conductance.is_finite() && self.conductance >= 0.0) {
            return Err(MechanismError::invalid(
                mechanism,
                format!("{}.conductance", self.name),
                format!("conductance must be non-negative, got {}", self.conductance),
            ));
        }
        match (self.reversal, self.carrier) {
            (ReversalSource::Ion, None) | (ReversalSource::Nernst { .. }, None) => {
                return Err(MechanismError::invalid(
                    mechanism,
                    format!("{}.reversal", self.name),
                    "ion-derived reversal potentials need a carrier ion",
                ))
            }
            (ReversalSource::Fixed { potential }, _) if !potential.is_finite() => {
                return Err(MechanismError::invalid(
                    mechanism,
                    format!("{}.reversal", self.name),
                    "reversal potential must be finite",
                ))
            }
            _ => {}
        }

        let factors = self
            .factors
            .iter()
            .map(|factor| {
                if factor.gates.is_empty() {
                    return Err(MechanismError::invalid(
                        mechanism,
                        format!("{}.factors", self.name),
                        "a factor needs at least one gate",
                    ));
                }
                let terms = factor
                    .gates
                    .iter()
                    .map(|weighted| {
                        gate_names
                            .iter()
                            .position(|name| *name == weighted.gate)
                            .map(|index| (index, weighted.weight))
                            .ok_or_else(|| MechanismError::UnknownGate {
                                mechanism: mechanism.to_string(),
                                gate: weighted.gate.clone(),
                            })
                    })
                    .collect::<MechanismResult<Vec<_>>>()?;
                Ok(AssembledFactor {
                    terms,
                    power: factor.power,
                })
            })
            .collect::<MechanismResult<Vec<_>>>()?;

        Ok(CurrentAssembler {
            conductance: self.conductance,
            carrier: self.carrier,
            reversal: self.reversal,
            factors,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct AssembledFactor {
    terms: Vec<(usize, FloatValue)>,
    power: i32,
}

/// A [`CurrentSpec`] with gates resolved to positions in the channel's state
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentAssembler {
    conductance: FloatValue,
    carrier: Option<Ion>,
    reversal: ReversalSource,
    factors: Vec<AssembledFactor>,
}

impl CurrentAssembler {
    pub fn carrier(&self) -> Option<Ion> {
        self.carrier
    }

    /// Fraction of the maximal conductance that is open
    pub fn open_fraction(&self, gates: &[GatingVariable]) -> FloatValue {
        self.factors
            .iter()
            .map(|factor| {
                let sum: FloatValue = factor
                    .terms
                    .iter()
                    .map(|(index, weight)| weight * gates[*index].value())
                    .sum();
                sum.powi(factor.power)
            })
            .product()
    }

    /// Reversal potential at the node. unit: mV
    pub fn reversal_potential(&self, node: &NodeState, celsius: FloatValue) -> MechanismResult<FloatValue> {
        match (self.reversal, self.carrier) {
            (ReversalSource::Fixed { potential }, _) => Ok(potential),
            (ReversalSource::Ion, Some(ion)) => Ok(node.ion(ion).reversal),
            (ReversalSource::Nernst { offset }, Some(ion)) => {
                let state = node.ion(ion);
                Ok(nernst_potential(ion, state.internal, state.external, celsius)? + offset)
            }
            // Rejected by `CurrentSpec::assemble`
            (_, None) => Err(MechanismError::Error(
                "ion-derived reversal potential without a carrier".to_string(),
            )),
        }
    }

    /// Conductance density currently open. unit: S/cm^2
    pub fn conductance(&self, gates: &[GatingVariable]) -> FloatValue {
        self.conductance * self.open_fraction(gates)
    }

    /// Current density at `voltage`. unit: mA/cm^2
    pub fn current(
        &self,
        voltage: FloatValue,
        gates: &[GatingVariable],
        node: &NodeState,
        celsius: FloatValue,
    ) -> MechanismResult<FloatValue> {
        Ok(self.conductance(gates) * (voltage - self.reversal_potential(node, celsius)?))
    }
}
