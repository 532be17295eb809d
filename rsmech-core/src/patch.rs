//! Single-compartment membrane patch
//!
//! A minimal host for running mechanisms and pools outside a full cable
//! simulator. Each fixed step:
//!
//! 1. linearizes every mechanism at the present voltage and sums the
//!    contributions into a [`NodeAccumulator`]
//! 2. updates the voltage, either held by a clamp or by the implicit update
//!    $\Delta v = (I_{inj} - I) / (10^{-3} c_m / dt + g)$
//! 3. advances the mechanism states at the new voltage
//! 4. steps the pools with the accumulated ion currents and refreshes the
//!    reversal potentials of their ions
//!
//! [`Patch::integrate_adaptive`] runs the same system through an adaptive
//! Dormand-Prince integrator instead.

use crate::constants::{FloatValue, Time};
use crate::diffusion::DiffusionPool;
use crate::errors::{MechanismError, MechanismResult};
use crate::ion::{nernst_potential, Ion, IonMap};
use crate::mechanism::Mechanism;
use crate::node::{NodeAccumulator, NodeState};
use nalgebra::DVector;
use ode_solvers::{Dopri5, System};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::slice;

/// How the membrane voltage evolves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum VoltageMode {
    /// Voltage held at the node's value
    Clamped,
    /// Voltage driven by the membrane currents
    Free {
        /// Specific membrane capacitance
        /// unit: uF/cm^2
        capacitance: FloatValue,
        /// Injected current density, positive depolarising
        /// unit: mA/cm^2
        injected: FloatValue,
    },
}

pub struct PatchBuilder {
    node: NodeState,
    mechanisms: Vec<Box<dyn Mechanism>>,
    pools: Vec<DiffusionPool>,
    dt: Time,
    mode: VoltageMode,
}

impl Default for PatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatchBuilder {
    pub fn new() -> Self {
        Self {
            node: NodeState::default(),
            mechanisms: vec![],
            pools: vec![],
            dt: 0.025,
            mode: VoltageMode::Clamped,
        }
    }

    pub fn with_node(mut self, node: NodeState) -> Self {
        self.node = node;
        self
    }

    pub fn with_mechanism<M: Mechanism + 'static>(mut self, mechanism: M) -> Self {
        self.mechanisms.push(Box::new(mechanism));
        self
    }

    pub fn with_boxed_mechanism(mut self, mechanism: Box<dyn Mechanism>) -> Self {
        self.mechanisms.push(mechanism);
        self
    }

    pub fn with_pool(mut self, pool: DiffusionPool) -> Self {
        self.pools.push(pool);
        self
    }

    /// unit: ms
    pub fn with_dt(mut self, dt: Time) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_mode(mut self, mode: VoltageMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(self) -> MechanismResult<Patch> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(MechanismError::invalid("patch", "dt", "time step must be positive"));
        }
        if let VoltageMode::Free { capacitance, .. } = self.mode {
            if !(capacitance.is_finite() && capacitance > 0.0) {
                return Err(MechanismError::invalid(
                    "patch",
                    "capacitance",
                    "capacitance must be positive",
                ));
            }
        }
        for pool in self.pools.iter() {
            if pool.len() != 1 {
                return Err(MechanismError::invalid(
                    pool.name(),
                    "segments",
                    "a patch only holds single-compartment pools",
                ));
            }
        }
        Ok(Patch {
            node: self.node,
            mechanisms: self.mechanisms,
            pools: self.pools,
            dt: self.dt,
            mode: self.mode,
            time: 0.0,
            accumulator: NodeAccumulator::default(),
            initialised: false,
        })
    }
}

#[derive(Debug)]
pub struct Patch {
    node: NodeState,
    mechanisms: Vec<Box<dyn Mechanism>>,
    pools: Vec<DiffusionPool>,
    dt: Time,
    mode: VoltageMode,
    time: Time,
    accumulator: NodeAccumulator,
    initialised: bool,
}

impl Patch {
    pub fn node(&self) -> &NodeState {
        &self.node
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Contributions summed during the last step
    pub fn accumulator(&self) -> &NodeAccumulator {
        &self.accumulator
    }

    pub fn mechanisms(&self) -> &[Box<dyn Mechanism>] {
        &self.mechanisms
    }

    pub fn mechanism(&self, name: &str) -> Option<&dyn Mechanism> {
        self.mechanisms
            .iter()
            .find(|mechanism| mechanism.name() == name)
            .map(|mechanism| mechanism.as_ref())
    }

    pub fn pools(&self) -> &[DiffusionPool] {
        &self.pools
    }

    /// Move the clamp to a new holding potential
    pub fn set_voltage(&mut self, voltage: FloatValue) {
        self.node.voltage = voltage;
    }

    pub fn set_mode(&mut self, mode: VoltageMode) {
        self.mode = mode;
    }

    /// Gates to steady state at the present voltage, pools to their initial concentrations
    pub fn initialise(&mut self) -> MechanismResult<()> {
        for pool in self.pools.iter_mut() {
            let ion = pool.ion();
            pool.initialise(slice::from_mut(&mut self.node.ions[ion]))?;
            refresh_reversal(&mut self.node, ion)?;
        }
        for mechanism in self.mechanisms.iter_mut() {
            mechanism.initialise(&self.node)?;
        }
        self.time = 0.0;
        self.initialised = true;
        log::debug!(
            "Initialised patch with {} mechanisms and {} pools at {} mV",
            self.mechanisms.len(),
            self.pools.len(),
            self.node.voltage
        );
        Ok(())
    }

    fn ensure_initialised(&self) -> MechanismResult<()> {
        if self.initialised {
            Ok(())
        } else {
            Err(MechanismError::NotInitialised {
                mechanism: "patch".to_string(),
            })
        }
    }

    /// One fixed step of length `dt`
    ///
    /// Pool updates and reversal refreshes are staged before anything is
    /// committed, so a failure there leaves the voltage, gates, pools and
    /// concentrations as they were.
    pub fn step(&mut self) -> MechanismResult<()> {
        self.ensure_initialised()?;

        self.accumulator.reset();
        for mechanism in self.mechanisms.iter() {
            let contribution = mechanism.linearize(&self.node)?;
            self.accumulator.accumulate(&contribution);
        }

        let mut voltage = self.node.voltage;
        if let VoltageMode::Free {
            capacitance,
            injected,
        } = self.mode
        {
            voltage += (injected - self.accumulator.current)
                / (1e-3 * capacitance / self.dt + self.accumulator.conductance);
        }

        let mut staged = self.node.clone();
        let mut pools = self.pools.clone();
        for pool in pools.iter_mut() {
            let ion = pool.ion();
            let current = self.accumulator.ion_currents[ion];
            pool.step(&[current], self.dt, slice::from_mut(&mut staged.ions[ion]))?;
            refresh_reversal(&mut staged, ion)?;
        }

        // Gates advance at the new voltage with the concentrations of the step start
        self.node.voltage = voltage;
        for mechanism in self.mechanisms.iter_mut() {
            mechanism.advance(&self.node, self.dt)?;
        }

        staged.voltage = voltage;
        self.node = staged;
        self.pools = pools;
        self.time += self.dt;
        Ok(())
    }

    /// Step for `duration` ms, returning the voltage after every step
    pub fn run(&mut self, duration: Time) -> MechanismResult<Vec<(Time, FloatValue)>> {
        let n_steps = (duration / self.dt).round() as usize;
        let mut trace = Vec::with_capacity(n_steps);
        for _ in 0..n_steps {
            self.step()?;
            trace.push((self.time, self.node.voltage));
        }
        Ok(trace)
    }

    /// Membrane currents of all mechanisms at the present state
    fn membrane_currents(&self) -> MechanismResult<(FloatValue, IonMap<FloatValue>)> {
        let mut total = 0.0;
        let mut by_ion = IonMap::default();
        for mechanism in self.mechanisms.iter() {
            let currents = mechanism.currents(self.node.voltage, &self.node)?;
            total += currents.total();
            for ion in Ion::ALL {
                by_ion[ion] += currents.by_ion[ion];
            }
        }
        Ok((total, by_ion))
    }

    fn free_voltage(&self) -> bool {
        matches!(self.mode, VoltageMode::Free { .. })
    }

    fn gather_states(&self) -> DVector<FloatValue> {
        let mut states = vec![];
        if self.free_voltage() {
            states.push(self.node.voltage);
        }
        for mechanism in self.mechanisms.iter() {
            states.extend(mechanism.states());
        }
        for pool in self.pools.iter() {
            states.extend_from_slice(pool.concentrations());
        }
        DVector::from_vec(states)
    }

    fn scatter_states(&mut self, y: &DVector<FloatValue>) -> MechanismResult<()> {
        let mut offset = 0;
        if self.free_voltage() {
            self.node.voltage = y[0];
            offset = 1;
        }
        for mechanism in self.mechanisms.iter_mut() {
            let n = mechanism.states().len();
            mechanism.set_states(&y.as_slice()[offset..offset + n])?;
            offset += n;
        }
        for pool in self.pools.iter_mut() {
            let n = pool.len();
            let ion = pool.ion();
            pool.set_concentrations(
                &y.as_slice()[offset..offset + n],
                slice::from_mut(&mut self.node.ions[ion]),
            )?;
            refresh_reversal(&mut self.node, ion)?;
            offset += n;
        }
        Ok(())
    }

    fn state_derivatives(&mut self) -> MechanismResult<Vec<FloatValue>> {
        let (total, by_ion) = self.membrane_currents()?;
        let mut derivatives = vec![];
        if let VoltageMode::Free {
            capacitance,
            injected,
        } = self.mode
        {
            derivatives.push((injected - total) / (1e-3 * capacitance));
        }
        for mechanism in self.mechanisms.iter_mut() {
            derivatives.extend(mechanism.derivatives(&self.node)?);
        }
        for pool in self.pools.iter() {
            derivatives.extend(pool.derivatives(&[by_ion[pool.ion()]])?);
        }
        Ok(derivatives)
    }

    /// Advance by `duration` ms with the adaptive Dormand-Prince integrator
    pub fn integrate_adaptive(
        &mut self,
        duration: Time,
        rtol: FloatValue,
        atol: FloatValue,
    ) -> MechanismResult<()> {
        self.ensure_initialised()?;
        let y0 = self.gather_states();
        let t0 = self.time;
        let dt = self.dt;

        let error = RefCell::new(None);
        let (outcome, y_end) = {
            let system = PatchSystem {
                patch: RefCell::new(&mut *self),
                error: &error,
            };
            let mut stepper = Dopri5::new(system, t0, t0 + duration, dt, y0, rtol, atol);
            let outcome = stepper.integrate();
            (outcome, stepper.y_out().last().cloned())
        };

        if let Some(e) = error.into_inner() {
            return Err(e);
        }
        outcome.map_err(|e| MechanismError::Integration(format!("{:?}", e)))?;
        let y_end = y_end.ok_or_else(|| {
            MechanismError::Integration("integrator produced no output".to_string())
        })?;
        self.scatter_states(&y_end)?;
        self.time = t0 + duration;
        Ok(())
    }
}

/// Adapter exposing a patch to `ode_solvers`
struct PatchSystem<'a> {
    patch: RefCell<&'a mut Patch>,
    error: &'a RefCell<Option<MechanismError>>,
}

impl System<Time, DVector<FloatValue>> for PatchSystem<'_> {
    fn system(&self, _t: Time, y: &DVector<FloatValue>, dy: &mut DVector<FloatValue>) {
        let mut patch = self.patch.borrow_mut();
        let result = patch
            .scatter_states(y)
            .and_then(|_| patch.state_derivatives());
        match result {
            Ok(derivatives) => dy.copy_from_slice(&derivatives),
            Err(e) => {
                dy.fill(0.0);
                self.error.borrow_mut().get_or_insert(e);
            }
        }
    }
}

fn refresh_reversal(node: &mut NodeState, ion: Ion) -> MechanismResult<()> {
    let state = node.ions[ion];
    node.ions[ion].reversal = nernst_potential(ion, state.internal, state.external, node.celsius)?;
    Ok(())
}
