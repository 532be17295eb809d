//! Gating kinetics
//!
//! Each gate relaxes toward its steady state $x_\infty(v)$ with time constant
//! $\tau(v)$:
//!
//! $$ \frac{dx}{dt} = \frac{x_\infty - x}{\tau} $$
//!
//! Fixed-step hosts advance the gate with the exponential Euler update
//!
//! $$ x_{t+dt} = x_t + (1 - e^{-dt/\tau}) (x_\infty - x_t) $$
//!
//! which is exact for a constant $\tau$ over the step. Adaptive hosts use
//! [`GatingVariable::derivative`] and [`GatingVariable::matsol`] instead.

use crate::constants::{FloatValue, Time, RATE_CLAMP_BOUND};
use crate::errors::{MechanismError, MechanismResult};
use crate::q10::Q10Scaler;
use crate::rates::RateExpression;
use serde::{Deserialize, Serialize};

/// Time constants at or below this are treated as instantaneous.
/// unit: ms
const INSTANTANEOUS_TAU: FloatValue = 1e-12;

/// How a gate's steady state and time constant are obtained from voltage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateKinetics {
    /// $x_\infty(v)$ and $\tau(v)$ given directly
    SteadyState {
        steady_state: RateExpression,
        tau: RateExpression,
    },
    /// Opening and closing rates, $\tau = 1/(\alpha + \beta)$ and
    /// $x_\infty = \alpha \tau$
    AlphaBeta {
        alpha: RateExpression,
        beta: RateExpression,
    },
}

impl GateKinetics {
    /// Steady state and time constant (ms) at `v` without temperature correction
    pub fn evaluate(&self, v: FloatValue) -> (FloatValue, FloatValue) {
        match self {
            GateKinetics::SteadyState { steady_state, tau } => {
                (steady_state.evaluate(v), tau.evaluate(v))
            }
            GateKinetics::AlphaBeta { alpha, beta } => {
                let alpha = alpha.evaluate(v);
                let tau = 1.0 / (alpha + beta.evaluate(v));
                (alpha * tau, tau)
            }
        }
    }

    fn validate(&self, mechanism: &str, gate: &str) -> MechanismResult<()> {
        match self {
            GateKinetics::SteadyState { steady_state, tau } => {
                steady_state.validate(mechanism, &format!("{}.steady_state", gate))?;
                tau.validate(mechanism, &format!("{}.tau", gate))
            }
            GateKinetics::AlphaBeta { alpha, beta } => {
                alpha.validate(mechanism, &format!("{}.alpha", gate))?;
                beta.validate(mechanism, &format!("{}.beta", gate))
            }
        }
    }

    /// Same kinetics with every exp-linear clamp filled in
    pub fn with_precomputed_clamps(self) -> Self {
        match self {
            GateKinetics::SteadyState { steady_state, tau } => GateKinetics::SteadyState {
                steady_state: steady_state.with_precomputed_clamps(),
                tau: tau.with_precomputed_clamps(),
            },
            GateKinetics::AlphaBeta { alpha, beta } => GateKinetics::AlphaBeta {
                alpha: alpha.with_precomputed_clamps(),
                beta: beta.with_precomputed_clamps(),
            },
        }
    }
}

/// Definition of a single named gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSpec {
    pub name: String,
    pub kinetics: GateKinetics,
    /// Added to the membrane voltage before the rates are evaluated
    /// unit: mV
    #[serde(default)]
    pub shift: FloatValue,
    /// Temperature correction of the time constant
    #[serde(default)]
    pub q10: Option<Q10Scaler>,
}

impl GateSpec {
    pub fn new(name: impl Into<String>, kinetics: GateKinetics) -> Self {
        Self {
            name: name.into(),
            kinetics: kinetics.with_precomputed_clamps(),
            shift: 0.0,
            q10: None,
        }
    }

    pub fn with_shift(mut self, shift: FloatValue) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_q10(mut self, q10: Q10Scaler) -> Self {
        self.q10 = Some(q10);
        self
    }

    /// Temperature factor for this gate's time constant
    pub fn q10_factor(&self, celsius: FloatValue) -> FloatValue {
        self.q10.map_or(1.0, |q10| q10.factor(celsius))
    }

    /// Steady state and temperature-corrected time constant at membrane voltage `v`
    pub fn evaluate(&self, v: FloatValue, q10_factor: FloatValue) -> (FloatValue, FloatValue) {
        let (steady_state, tau) = self.kinetics.evaluate(v + self.shift);
        (steady_state, tau * q10_factor)
    }

    /// Check the rate coefficients and sweep the time constant over the
    /// clamp range in 1 mV steps.
    pub fn validate(&self, mechanism: &str) -> MechanismResult<()> {
        if self.name.is_empty() {
            return Err(MechanismError::invalid(
                mechanism,
                "gate.name",
                "gate names must be non-empty",
            ));
        }
        if !self.shift.is_finite() {
            return Err(MechanismError::invalid(
                mechanism,
                format!("{}.shift", self.name),
                "shift must be finite",
            ));
        }
        self.kinetics.validate(mechanism, &self.name)?;
        if let Some(q10) = &self.q10 {
            q10.validate(mechanism, &format!("{}.q10", self.name))?;
        }

        let bound = RATE_CLAMP_BOUND as i32;
        for step in -bound..=bound {
            let v = step as FloatValue;
            let (steady_state, tau) = self.kinetics.evaluate(v + self.shift);
            if !(tau.is_finite() && tau > 0.0) {
                return Err(MechanismError::NonPositiveTimeConstant {
                    gate: self.name.clone(),
                    voltage: v,
                    tau,
                });
            }
            if !steady_state.is_finite() {
                return Err(MechanismError::invalid(
                    mechanism,
                    format!("{}.steady_state", self.name),
                    format!("steady state is not finite at {} mV", v),
                ));
            }
        }
        Ok(())
    }
}

/// Lifecycle of a gating variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePhase {
    #[default]
    Uninitialised,
    /// Set to its steady state at the initial voltage
    SteadyState,
    /// Advanced at least once
    Integrated,
}

/// Weight $1 - e^{-dt/\tau}$ of the exponential Euler update
///
/// Returns exactly one for a vanishing time constant so the gate jumps to its
/// steady state instead of producing NaN.
pub fn exponential_euler_weight(dt: Time, tau: FloatValue) -> FloatValue {
    if tau <= INSTANTANEOUS_TAU {
        1.0
    } else {
        -(-dt / tau).exp_m1()
    }
}

/// Runtime state of a gate
#[derive(Debug, Clone, PartialEq)]
pub struct GatingVariable {
    name: String,
    value: FloatValue,
    steady_state: FloatValue,
    tau: FloatValue,
    phase: GatePhase,
}

impl GatingVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            steady_state: 0.0,
            tau: 1.0,
            phase: GatePhase::Uninitialised,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> FloatValue {
        self.value
    }

    pub fn steady_state(&self) -> FloatValue {
        self.steady_state
    }

    pub fn tau(&self) -> FloatValue {
        self.tau
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    /// Overwrite the value, e.g. from an adaptive integrator's state vector
    pub fn set_value(&mut self, value: FloatValue) {
        self.value = value;
        if self.phase == GatePhase::Uninitialised {
            self.phase = GatePhase::Integrated;
        }
    }

    /// Record the current targets without changing the value
    pub fn update_targets(&mut self, steady_state: FloatValue, tau: FloatValue) {
        self.steady_state = steady_state;
        self.tau = tau;
    }

    /// Start at equilibrium
    pub fn initialise(&mut self, steady_state: FloatValue, tau: FloatValue) {
        self.update_targets(steady_state, tau);
        self.value = steady_state;
        self.phase = GatePhase::SteadyState;
    }

    /// Exponential Euler step toward the recorded targets
    pub fn advance(&mut self, dt: Time) -> MechanismResult<()> {
        if self.phase == GatePhase::Uninitialised {
            return Err(MechanismError::NotInitialised {
                mechanism: self.name.clone(),
            });
        }
        let weight = exponential_euler_weight(dt, self.tau);
        self.value += weight * (self.steady_state - self.value);
        self.phase = GatePhase::Integrated;
        Ok(())
    }

    /// $dx/dt$ at the recorded targets
    pub fn derivative(&self) -> FloatValue {
        if self.tau <= INSTANTANEOUS_TAU {
            return 0.0;
        }
        (self.steady_state - self.value) / self.tau
    }

    /// Diagonal solve of $(1 + dt/\tau) \delta = d$ used by implicit adaptive integrators
    pub fn matsol(&self, d: FloatValue, dt: Time) -> FloatValue {
        if self.tau <= INSTANTANEOUS_TAU {
            return 0.0;
        }
        d / (1.0 + dt / self.tau)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use is_close::is_close;

    fn sodium_activation() -> GateSpec {
        GateSpec::new(
            "m",
            GateKinetics::AlphaBeta {
                alpha: RateExpression::exp_linear(0.1, -40.0, 10.0),
                beta: RateExpression::exponential(4.0, 65.0, -18.0),
            },
        )
    }

    #[test]
    fn test_alpha_beta_relationship() {
        let gate = sodium_activation();
        let v: FloatValue = -30.0;
        let alpha = 0.1 * (v + 40.0) / (1.0 - (-(v + 40.0) / 10.0).exp());
        let beta = 4.0 * ((v + 65.0) / -18.0).exp();
        let (m_inf, tau) = gate.evaluate(v, 1.0);
        assert_relative_eq!(tau, 1.0 / (alpha + beta), max_relative = 1e-12);
        assert_relative_eq!(m_inf, alpha / (alpha + beta), max_relative = 1e-12);
    }

    #[test]
    fn test_shift_and_q10() {
        let gate = sodium_activation()
            .with_shift(5.0)
            .with_q10(Q10Scaler::new(3.0, 6.3, 10.0));
        let (m_inf, tau) = gate.evaluate(-35.0, gate.q10_factor(16.3));
        let (expected_inf, expected_tau) = sodium_activation().evaluate(-30.0, 1.0);
        assert!(is_close!(m_inf, expected_inf));
        assert!(is_close!(tau, expected_tau / 3.0));
    }

    #[test]
    fn test_validate_accepts_hodgkin_huxley() {
        assert!(sodium_activation().validate("na").is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_tau() {
        let gate = GateSpec::new(
            "x",
            GateKinetics::SteadyState {
                steady_state: RateExpression::sigmoid(1.0, 0.0, 5.0),
                tau: RateExpression::gaussian(1.0, 0.05, 0.0, -0.5),
            },
        );
        match gate.validate("bad") {
            Err(MechanismError::NonPositiveTimeConstant { gate, .. }) => assert_eq!(gate, "x"),
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_exponential_euler_idempotent_at_steady_state() {
        let mut gate = GatingVariable::new("h");
        gate.initialise(0.6, 8.5);
        for dt in [1e-3, 0.025, 1.0, 1e3] {
            gate.advance(dt).unwrap();
            assert_eq!(gate.value(), 0.6);
        }
    }

    #[test]
    fn test_exponential_euler_matches_analytic_solution() {
        let mut gate = GatingVariable::new("m");
        gate.initialise(0.1, 2.0);
        gate.update_targets(0.9, 2.0);
        let dt = 0.025;
        for _ in 0..200 {
            gate.advance(dt).unwrap();
        }
        let expected = 0.9 + (0.1 - 0.9) * (-5.0_f64 / 2.0).exp();
        assert_relative_eq!(gate.value(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_large_step_reaches_steady_state() {
        assert!(exponential_euler_weight(1e6, 1.0) == 1.0);
        assert!(exponential_euler_weight(10.0, 1.0) > 0.9999);
        assert_eq!(exponential_euler_weight(0.025, 0.0), 1.0);

        let mut gate = GatingVariable::new("m");
        gate.initialise(0.0, 1e-15);
        gate.update_targets(1.0, 0.0);
        gate.advance(0.025).unwrap();
        assert_eq!(gate.value(), 1.0);
        assert_eq!(gate.derivative(), 0.0);
    }

    #[test]
    fn test_monotonic_approach() {
        let mut gate = GatingVariable::new("n");
        gate.initialise(0.05, 4.0);
        gate.update_targets(0.8, 4.0);
        let mut previous = gate.value();
        for _ in 0..100 {
            gate.advance(0.1).unwrap();
            assert!(gate.value() > previous);
            assert!(gate.value() <= 0.8);
            previous = gate.value();
        }
    }

    #[test]
    fn test_advance_before_initialise() {
        let mut gate = GatingVariable::new("s");
        assert!(matches!(
            gate.advance(0.025),
            Err(MechanismError::NotInitialised { .. })
        ));
    }

    #[test]
    fn test_derivative_and_matsol() {
        let mut gate = GatingVariable::new("j");
        gate.initialise(0.2, 5.0);
        gate.update_targets(0.7, 5.0);
        assert!(is_close!(gate.derivative(), 0.1));
        assert!(is_close!(gate.matsol(1.0, 5.0), 0.5));
    }
}
