//! Per-node quantities exchanged with the host simulator
//!
//! The host owns voltage and ion storage. Mechanisms read a [`NodeState`] and
//! hand back additive contributions which the host sums into a
//! [`NodeAccumulator`].

use crate::constants::FloatValue;
use crate::ion::{Ion, IonMap, IonState};
use serde::{Deserialize, Serialize};

/// Host-supplied inputs for one compartment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    /// Membrane voltage
    /// unit: mV
    pub voltage: FloatValue,
    /// Ambient temperature
    /// unit: degC
    pub celsius: FloatValue,
    #[serde(default)]
    pub ions: IonMap<IonState>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            voltage: -65.0,
            celsius: 6.3,
            ions: IonMap::default(),
        }
    }
}

impl NodeState {
    pub fn new(voltage: FloatValue, celsius: FloatValue) -> Self {
        Self {
            voltage,
            celsius,
            ions: IonMap::default(),
        }
    }

    pub fn with_ion(mut self, ion: Ion, state: IonState) -> Self {
        self.ions[ion] = state;
        self
    }

    pub fn ion(&self, ion: Ion) -> &IonState {
        &self.ions[ion]
    }
}

/// Membrane currents produced by one mechanism at one voltage
///
/// unit: mA/cm^2, outward positive
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IonicCurrents {
    pub by_ion: IonMap<FloatValue>,
    /// Current not carried by a tracked ion (leak, HCN)
    pub nonspecific: FloatValue,
}

impl IonicCurrents {
    pub fn add_ion(&mut self, ion: Ion, current: FloatValue) {
        self.by_ion[ion] += current;
    }

    pub fn add_nonspecific(&mut self, current: FloatValue) {
        self.nonspecific += current;
    }

    pub fn total(&self) -> FloatValue {
        self.by_ion.total() + self.nonspecific
    }
}

/// Linear model of a mechanism's current around the operating voltage
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinearizationResult {
    /// Total current at the operating voltage
    /// unit: mA/cm^2
    pub current: FloatValue,
    /// dI/dV of the total current
    /// unit: S/cm^2
    pub conductance: FloatValue,
    /// Per-ion current at the operating voltage
    pub ion_currents: IonMap<FloatValue>,
    /// Per-ion dI/dV, used by hosts that couple concentration to voltage
    pub ion_conductances: IonMap<FloatValue>,
}

/// Running sums of every mechanism contribution at a node
///
/// Contributions are only ever added, so the order in which mechanisms
/// report does not matter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeAccumulator {
    pub current: FloatValue,
    pub conductance: FloatValue,
    pub ion_currents: IonMap<FloatValue>,
    pub ion_conductances: IonMap<FloatValue>,
}

impl NodeAccumulator {
    pub fn accumulate(&mut self, contribution: &LinearizationResult) {
        self.current += contribution.current;
        self.conductance += contribution.conductance;
        for ion in Ion::ALL {
            self.ion_currents[ion] += contribution.ion_currents[ion];
            self.ion_conductances[ion] += contribution.ion_conductances[ion];
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
