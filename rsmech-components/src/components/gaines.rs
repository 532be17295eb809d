//! Myelinated axon membrane models
//!
//! Two channels for a double-cable motor axon model: the node of Ranvier and
//! the myelin attachment segment (MYSA) of the internode. Every current is
//! nonspecific with a fixed reversal potential, so neither model touches the
//! host's ion store.
//!
//! Most opening and closing rates are exp-linear with constants returned
//! beyond $\pm 150$ mV. Temperature corrections multiply both rates, which is
//! the same as dividing the time constant:
//!
//! $$ \tau(T) = \tau \cdot Q_{10}^{(T_{ref} - T)/10} $$

use rsmech_core::channel::{Channel, ChannelSpec};
use rsmech_core::constants::FloatValue;
use rsmech_core::current::{CurrentSpec, GateFactor, ReversalSource};
use rsmech_core::errors::MechanismResult;
use rsmech_core::gating::{GateKinetics, GateSpec};
use rsmech_core::q10::Q10Scaler;
use rsmech_core::rates::{Clamp, RateExpression};
use serde::{Deserialize, Serialize};

/// Kinetics of the fast potassium gate `n`, shared by both models
fn fast_potassium() -> GateKinetics {
    GateKinetics::AlphaBeta {
        alpha: RateExpression::exp_linear(0.0462, -83.2, 1.1),
        beta: RateExpression::exp_linear(-0.0824, -66.0, -10.5),
    }
}

fn fixed(potential: FloatValue) -> ReversalSource {
    ReversalSource::Fixed { potential }
}

/// Parameters for the node of Ranvier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainesNodeParameters {
    /// Persistent sodium conductance
    /// unit: S/cm^2
    /// default: 0.01
    pub gnapbar: FloatValue,
    /// Fast sodium conductance
    /// unit: S/cm^2
    /// default: 3
    pub gnabar: FloatValue,
    /// Slow potassium conductance
    /// unit: S/cm^2
    /// default: 0.08
    pub gkbar: FloatValue,
    /// Fast potassium conductance
    /// unit: S/cm^2
    /// default: 25.68
    pub gkfbar: FloatValue,
    /// Leak conductance
    /// unit: S/cm^2
    /// default: 0.007
    pub gl: FloatValue,
    /// unit: mV
    /// default: 50
    pub ena: FloatValue,
    /// unit: mV
    /// default: -90
    pub ek: FloatValue,
    /// unit: mV
    /// default: -90
    pub el: FloatValue,
    /// Offset of the slow potassium rates
    /// unit: mV
    /// default: -80
    pub vtraub: FloatValue,
}

impl Default for GainesNodeParameters {
    fn default() -> Self {
        Self {
            gnapbar: 0.01,
            gnabar: 3.0,
            gkbar: 0.08,
            gkfbar: 25.68,
            gl: 0.007,
            ena: 50.0,
            ek: -90.0,
            el: -90.0,
            vtraub: -80.0,
        }
    }
}

/// Node of Ranvier: persistent Na, fast Na, fast K, slow K and leak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GainesNode {
    parameters: GainesNodeParameters,
}

impl GainesNode {
    pub fn from_parameters(parameters: GainesNodeParameters) -> Self {
        Self { parameters }
    }

    pub fn spec(&self) -> ChannelSpec {
        let p = &self.parameters;
        let sodium_q10 = Q10Scaler::new(2.2, 20.0, 10.0);

        ChannelSpec::new("gaines_node")
            .with_gate(
                GateSpec::new(
                    "mp",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::exp_linear(0.01, -27.0, 10.2)
                            .with_clamp(Clamp::below(0.00086725)),
                        beta: RateExpression::exp_linear(-0.00025, -34.0, -10.0)
                            .with_clamp(Clamp::above(1.5855e-5)),
                    },
                )
                .with_q10(sodium_q10),
            )
            .with_gate(
                GateSpec::new(
                    "m",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::exp_linear(1.86, -20.4, 10.3)
                            .with_clamp(Clamp::below(0.15733)),
                        beta: RateExpression::exp_linear(-0.086, -25.7, -9.16)
                            .with_clamp(Clamp::above(0.0057268)),
                    },
                )
                .with_q10(sodium_q10),
            )
            .with_gate(
                GateSpec::new(
                    "h",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::exp_linear(-0.062, -114.0, -11.0)
                            .with_clamp(Clamp::above(0.0032594)),
                        beta: RateExpression::sigmoid(2.3, 31.8, -13.4)
                            .with_clamp(Clamp::below(0.0014054)),
                    },
                )
                .with_q10(Q10Scaler::new(2.9, 20.0, 10.0)),
            )
            .with_gate(
                GateSpec::new(
                    "s",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::sigmoid(0.3, -p.vtraub - 27.0, -5.0)
                            .with_clamp(Clamp::below(3.3484e-5)),
                        beta: RateExpression::sigmoid(0.03, -p.vtraub + 10.0, -1.0)
                            .with_clamp(Clamp::below(3.3484e-6)),
                    },
                )
                .with_q10(Q10Scaler::new(3.0, 36.0, 10.0)),
            )
            .with_gate(GateSpec::new("n", fast_potassium()).with_q10(Q10Scaler::new(3.0, 34.0, 10.0)))
            .with_current(
                CurrentSpec::new("inap", p.gnapbar, None, fixed(p.ena))
                    .with_factor(GateFactor::power("mp", 3)),
            )
            .with_current(
                CurrentSpec::new("ina", p.gnabar, None, fixed(p.ena))
                    .with_factor(GateFactor::power("m", 3))
                    .with_factor(GateFactor::power("h", 1)),
            )
            .with_current(
                CurrentSpec::new("ikf", p.gkfbar, None, fixed(p.ek))
                    .with_factor(GateFactor::power("n", 4)),
            )
            .with_current(
                CurrentSpec::new("ik", p.gkbar, None, fixed(p.ek))
                    .with_factor(GateFactor::power("s", 1)),
            )
            .with_current(CurrentSpec::new("il", p.gl, None, fixed(p.el)))
    }

    pub fn build(&self) -> MechanismResult<Channel> {
        Channel::new(self.spec())
    }
}

/// Parameters for the myelin attachment segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainesMysaParameters {
    /// Slow potassium conductance
    /// unit: S/cm^2
    /// default: 0.002581
    pub gkbar: FloatValue,
    /// Fast potassium conductance
    /// unit: S/cm^2
    /// default: 0.15074
    pub gkfbar: FloatValue,
    /// Leak conductance
    /// unit: S/cm^2
    /// default: 0.002
    pub gl: FloatValue,
    /// HCN conductance
    /// unit: S/cm^2
    /// default: 0.002232
    pub ghcnbar: FloatValue,
    /// unit: mV
    /// default: -90
    pub ek: FloatValue,
    /// unit: mV
    /// default: -80
    pub el: FloatValue,
    /// HCN reversal potential
    /// unit: mV
    /// default: -54.9
    pub eq: FloatValue,
}

impl Default for GainesMysaParameters {
    fn default() -> Self {
        Self {
            gkbar: 0.002581,
            gkfbar: 0.15074,
            gl: 0.002,
            ghcnbar: 0.002232,
            ek: -90.0,
            el: -80.0,
            eq: -54.9,
        }
    }
}

/// Myelin attachment segment: slow K, fast K, HCN and leak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GainesMysa {
    parameters: GainesMysaParameters,
}

impl GainesMysa {
    pub fn from_parameters(parameters: GainesMysaParameters) -> Self {
        Self { parameters }
    }

    pub fn spec(&self) -> ChannelSpec {
        let p = &self.parameters;
        let q10 = Q10Scaler::new(3.0, 34.0, 10.0);

        ChannelSpec::new("gaines_mysa")
            .with_gate(
                GateSpec::new(
                    "s",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::sigmoid(0.3, -27.0, -5.0),
                        beta: RateExpression::sigmoid(0.03, 10.0, -1.0),
                    },
                )
                .with_q10(q10),
            )
            .with_gate(GateSpec::new("n", fast_potassium()).with_q10(q10))
            .with_gate(
                GateSpec::new(
                    "q",
                    GateKinetics::AlphaBeta {
                        alpha: RateExpression::exponential(0.00522, 107.3, -12.2),
                        beta: RateExpression::exponential(0.00522, 107.3, 12.2),
                    },
                )
                .with_q10(q10),
            )
            .with_current(
                CurrentSpec::new("ik", p.gkbar, None, fixed(p.ek))
                    .with_factor(GateFactor::power("s", 1)),
            )
            .with_current(
                CurrentSpec::new("ikf", p.gkfbar, None, fixed(p.ek))
                    .with_factor(GateFactor::power("n", 4)),
            )
            .with_current(
                CurrentSpec::new("ihcn", p.ghcnbar, None, fixed(p.eq))
                    .with_factor(GateFactor::power("q", 1)),
            )
            .with_current(CurrentSpec::new("il", p.gl, None, fixed(p.el)))
    }

    pub fn build(&self) -> MechanismResult<Channel> {
        Channel::new(self.spec())
    }
}
