//! Ion species and the per-node concentration store shared with the host.

use crate::constants::{FloatValue, FARADAY_CHANNEL, GAS_CONSTANT, ZERO_CELSIUS};
use crate::errors::{MechanismError, MechanismResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Ion species a current can be carried by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ion {
    Na,
    K,
    Ca,
}

impl Ion {
    pub const ALL: [Ion; 3] = [Ion::Na, Ion::K, Ion::Ca];

    /// Charge number of the ion
    pub fn valence(self) -> i32 {
        match self {
            Ion::Na | Ion::K => 1,
            Ion::Ca => 2,
        }
    }

    fn index(self) -> usize {
        match self {
            Ion::Na => 0,
            Ion::K => 1,
            Ion::Ca => 2,
        }
    }
}

impl fmt::Display for Ion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Ion::Na => "na",
            Ion::K => "k",
            Ion::Ca => "ca",
        };
        write!(f, "{}", name)
    }
}

/// Fixed-size map with one entry per [`Ion`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IonMap<T> {
    values: [T; 3],
}

impl<T> IonMap<T> {
    pub fn new(na: T, k: T, ca: T) -> Self {
        Self {
            values: [na, k, ca],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ion, &T)> {
        Ion::ALL.into_iter().zip(self.values.iter())
    }
}

impl<T> Index<Ion> for IonMap<T> {
    type Output = T;

    fn index(&self, ion: Ion) -> &T {
        &self.values[ion.index()]
    }
}

impl<T> IndexMut<Ion> for IonMap<T> {
    fn index_mut(&mut self, ion: Ion) -> &mut T {
        &mut self.values[ion.index()]
    }
}

impl Default for IonMap<FloatValue> {
    fn default() -> Self {
        IonMap::new(0.0, 0.0, 0.0)
    }
}

impl IonMap<FloatValue> {
    /// Sum over all ions
    pub fn total(&self) -> FloatValue {
        self.values.iter().sum()
    }
}

/// Concentrations and reversal potential of one ion at one node.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IonState {
    /// unit: mM
    pub internal: FloatValue,
    /// unit: mM
    pub external: FloatValue,
    /// unit: mV
    pub reversal: FloatValue,
}

impl IonState {
    pub fn new(internal: FloatValue, external: FloatValue, reversal: FloatValue) -> Self {
        Self {
            internal,
            external,
            reversal,
        }
    }

    /// Default sodium concentrations of the host simulator
    pub fn sodium() -> Self {
        Self::new(10.0, 140.0, 50.0)
    }

    /// Default potassium concentrations of the host simulator
    pub fn potassium() -> Self {
        Self::new(54.4, 2.5, -77.0)
    }

    /// Default calcium concentrations of the host simulator
    pub fn calcium() -> Self {
        Self::new(5e-5, 2.0, 132.457934)
    }
}

impl Default for IonMap<IonState> {
    fn default() -> Self {
        IonMap::new(
            IonState::sodium(),
            IonState::potassium(),
            IonState::calcium(),
        )
    }
}

/// Thermal voltage $RT/zF$ of an ion
///
/// unit: mV
pub fn thermal_voltage(ion: Ion, celsius: FloatValue) -> FloatValue {
    1000.0 * GAS_CONSTANT * (celsius + ZERO_CELSIUS)
        / (ion.valence() as FloatValue * FARADAY_CHANNEL)
}

/// Nernst equilibrium potential
///
/// $$ E = \frac{RT}{zF} \ln\left(\frac{C_{out}}{C_{in}}\right) $$
///
/// Fails when either concentration is not strictly positive since the
/// logarithm is undefined there.
pub fn nernst_potential(
    ion: Ion,
    internal: FloatValue,
    external: FloatValue,
    celsius: FloatValue,
) -> MechanismResult<FloatValue> {
    if !(internal > 0.0 && external > 0.0) {
        return Err(MechanismError::NonPositiveConcentration {
            ion,
            internal,
            external,
        });
    }
    Ok(thermal_voltage(ion, celsius) * (external / internal).ln())
}

/// Slope of the Nernst potential with respect to the external concentration
///
/// unit: mV/mM
pub fn nernst_external_slope(
    ion: Ion,
    external: FloatValue,
    celsius: FloatValue,
) -> MechanismResult<FloatValue> {
    if external <= 0.0 {
        return Err(MechanismError::NonPositiveConcentration {
            ion,
            internal: FloatValue::NAN,
            external,
        });
    }
    Ok(thermal_voltage(ion, celsius) / external)
}

/// Slope of the Nernst potential with respect to the internal concentration
///
/// unit: mV/mM
pub fn nernst_internal_slope(
    ion: Ion,
    internal: FloatValue,
    celsius: FloatValue,
) -> MechanismResult<FloatValue> {
    if internal <= 0.0 {
        return Err(MechanismError::NonPositiveConcentration {
            ion,
            internal,
            external: FloatValue::NAN,
        });
    }
    Ok(-thermal_voltage(ion, celsius) / internal)
}
