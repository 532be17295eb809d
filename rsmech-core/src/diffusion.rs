//! Shell diffusion pool
//!
//! Concentration of one ion in a thin shell around a chain of compartments.
//! Each compartment receives a flux proportional to its membrane current,
//!
//! $$ J = \frac{10^4 (-I) \pi d}{F} $$
//!
//! exchanges with its neighbours by longitudinal diffusion and optionally
//! relaxes toward a bath concentration:
//!
//! $$ A \frac{dC_i}{dt} = J_i + \frac{D A}{\ell^2} \sum_{j \sim i} (C_j - C_i)
//!    + \frac{A}{\tau} (C_{bath} - C_i) $$
//!
//! where $A$ is the shell area and $\ell$ the compartment length.
//!
//! Fixed-step hosts call [`DiffusionPool::step`], which solves the backward
//! Euler system. Adaptive hosts read [`DiffusionPool::derivatives`] and write
//! their solution back with [`DiffusionPool::set_concentrations`]. Both end in
//! the same commit, which clamps and publishes the new concentrations.

use crate::constants::{FloatValue, Time, FARADAY, FLUX_SCALE, SHELL_PI};
use crate::errors::{MechanismError, MechanismResult};
use crate::ion::{nernst_external_slope, nernst_internal_slope, Ion, IonState};
use crate::sparse::TridiagonalSystem;
use serde::{Deserialize, Serialize};

/// Side of the membrane the pool's concentration belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolSide {
    Internal,
    External,
}

/// Morphology of the section carrying the pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Morphology {
    /// unit: um
    pub diameter: FloatValue,
    /// Total length of the section
    /// unit: um
    pub length: FloatValue,
    /// Number of compartments the section is divided into
    pub segments: usize,
}

impl Morphology {
    pub fn new(diameter: FloatValue, length: FloatValue, segments: usize) -> Self {
        Self {
            diameter,
            length,
            segments,
        }
    }

    /// unit: um
    pub fn segment_length(&self) -> FloatValue {
        self.length / self.segments as FloatValue
    }

    fn validate(&self, pool: &str) -> MechanismResult<()> {
        if !(self.diameter.is_finite() && self.diameter > 0.0) {
            return Err(MechanismError::invalid(pool, "diameter", "diameter must be positive"));
        }
        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(MechanismError::invalid(pool, "length", "length must be positive"));
        }
        if self.segments == 0 {
            return Err(MechanismError::invalid(
                pool,
                "segments",
                "a section needs at least one segment",
            ));
        }
        Ok(())
    }
}

/// Shell geometry of one compartment, derived once from the morphology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolGeometry {
    /// unit: cm
    pub segment_length: FloatValue,
    /// Membrane area of the compartment
    /// unit: cm^2
    pub surface_area: FloatValue,
    /// Volume enclosed by the membrane
    /// unit: cm^3
    pub volume: FloatValue,
    /// Volume of the shell outside the membrane
    /// unit: cm^3
    pub shell_volume: FloatValue,
    /// Cross-sectional area of the shell, used as the pool's volume per unit length
    /// unit: um^2
    pub shell_area: FloatValue,
}

impl PoolGeometry {
    pub fn from_morphology(morphology: &Morphology, shell_thickness: FloatValue) -> Self {
        let diameter = morphology.diameter;
        let segment_length = 1e-4 * morphology.length / morphology.segments as FloatValue;
        let surface_area = SHELL_PI * 1e-4 * diameter * segment_length;
        let volume = SHELL_PI * (1e-4 * diameter / 2.0).powi(2) * segment_length;
        let shell_volume =
            SHELL_PI * (1e-4 * (diameter + shell_thickness) / 2.0).powi(2) * segment_length - volume;
        let shell_area = 2.0 * diameter * shell_thickness * SHELL_PI
            - shell_thickness * shell_thickness * SHELL_PI;
        Self {
            segment_length,
            surface_area,
            volume,
            shell_volume,
            shell_area,
        }
    }
}

/// Parameters of a shell diffusion pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionPoolParameters {
    /// default: ca
    pub ion: Ion,
    /// default: external
    pub side: PoolSide,
    /// Longitudinal diffusion coefficient
    /// unit: um^2/ms
    /// default: 1.85
    pub diffusion_coefficient: FloatValue,
    /// Thickness of the shell
    /// unit: um
    /// default: 2
    pub shell_thickness: FloatValue,
    /// Concentration the pool relaxes toward
    /// unit: mM
    /// default: 2
    pub bath_concentration: FloatValue,
    /// Relaxation time constant to the bath. No exchange with the bath when unset.
    /// unit: ms
    pub transfer_time: Option<FloatValue>,
    /// Starting concentration. Read from the ion store when unset.
    /// unit: mM
    pub initial_concentration: Option<FloatValue>,
}

impl Default for DiffusionPoolParameters {
    fn default() -> Self {
        Self {
            ion: Ion::Ca,
            side: PoolSide::External,
            diffusion_coefficient: 1.85,
            shell_thickness: 2.0,
            bath_concentration: 2.0,
            transfer_time: None,
            initial_concentration: None,
        }
    }
}

/// Declarative description of a pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub name: String,
    pub morphology: Morphology,
    #[serde(default)]
    pub parameters: DiffusionPoolParameters,
}

/// Quantities an adaptive integrator needs for one pool compartment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionCoefficients {
    /// Longitudinal diffusion coefficient times shell area
    pub coefficient: FloatValue,
    /// Volume per unit length the concentration is stored in
    pub volume: FloatValue,
    /// Change of the flux with concentration through the reversal potential
    pub flux_derivative: FloatValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PoolSpec", into = "PoolSpec")]
pub struct DiffusionPool {
    spec: PoolSpec,
    geometry: PoolGeometry,
    concentrations: Vec<FloatValue>,
    system: TridiagonalSystem,
    initialised: bool,
}

impl TryFrom<PoolSpec> for DiffusionPool {
    type Error = MechanismError;

    fn try_from(spec: PoolSpec) -> MechanismResult<Self> {
        DiffusionPool::new(spec)
    }
}

impl From<DiffusionPool> for PoolSpec {
    fn from(value: DiffusionPool) -> Self {
        value.spec
    }
}

impl DiffusionPool {
    pub fn new(spec: PoolSpec) -> MechanismResult<Self> {
        let name = spec.name.as_str();
        let parameters = &spec.parameters;
        spec.morphology.validate(name)?;
        if !(parameters.diffusion_coefficient.is_finite() && parameters.diffusion_coefficient >= 0.0) {
            return Err(MechanismError::invalid(
                name,
                "diffusion_coefficient",
                "diffusion coefficient must be non-negative",
            ));
        }
        if !(parameters.shell_thickness > 0.0
            && parameters.shell_thickness < 2.0 * spec.morphology.diameter)
        {
            return Err(MechanismError::invalid(
                name,
                "shell_thickness",
                "shell thickness must be positive and below twice the diameter",
            ));
        }
        if !(parameters.bath_concentration.is_finite() && parameters.bath_concentration >= 0.0) {
            return Err(MechanismError::invalid(
                name,
                "bath_concentration",
                "bath concentration must be non-negative",
            ));
        }
        if let Some(tau) = parameters.transfer_time {
            if !(tau.is_finite() && tau > 0.0) {
                return Err(MechanismError::invalid(
                    name,
                    "transfer_time",
                    "transfer time must be positive",
                ));
            }
        }
        if let Some(initial) = parameters.initial_concentration {
            if !(initial.is_finite() && initial >= 0.0) {
                return Err(MechanismError::invalid(
                    name,
                    "initial_concentration",
                    "initial concentration must be non-negative",
                ));
            }
        }

        let geometry = PoolGeometry::from_morphology(&spec.morphology, parameters.shell_thickness);
        log::debug!("{} geometry: {:?}", name, geometry);
        let n = spec.morphology.segments;
        Ok(Self {
            spec,
            geometry,
            concentrations: vec![0.0; n],
            system: TridiagonalSystem::new(n),
            initialised: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn ion(&self) -> Ion {
        self.spec.parameters.ion
    }

    pub fn side(&self) -> PoolSide {
        self.spec.parameters.side
    }

    pub fn parameters(&self) -> &DiffusionPoolParameters {
        &self.spec.parameters
    }

    pub fn morphology(&self) -> &Morphology {
        &self.spec.morphology
    }

    pub fn geometry(&self) -> &PoolGeometry {
        &self.geometry
    }

    pub fn len(&self) -> usize {
        self.concentrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concentrations.is_empty()
    }

    /// unit: mM
    pub fn concentrations(&self) -> &[FloatValue] {
        &self.concentrations
    }

    /// Source term for a membrane current density (mA/cm^2)
    pub fn flux(&self, current: FloatValue) -> FloatValue {
        FLUX_SCALE * -current * SHELL_PI * self.spec.morphology.diameter / FARADAY
    }

    fn check_len(&self, got: usize) -> MechanismResult<()> {
        if got != self.len() {
            return Err(MechanismError::StateLength {
                mechanism: self.spec.name.clone(),
                expected: self.len(),
                got,
            });
        }
        Ok(())
    }

    fn check_dt(&self, dt: Time) -> MechanismResult<()> {
        if dt.is_finite() && dt > 0.0 {
            Ok(())
        } else {
            Err(MechanismError::invalid(
                self.spec.name.clone(),
                "dt",
                format!("time step must be positive and finite, got {}", dt),
            ))
        }
    }

    fn ensure_initialised(&self) -> MechanismResult<()> {
        if self.initialised {
            Ok(())
        } else {
            Err(MechanismError::NotInitialised {
                mechanism: self.spec.name.clone(),
            })
        }
    }

    fn stored(&self, ion: &IonState) -> FloatValue {
        match self.side() {
            PoolSide::Internal => ion.internal,
            PoolSide::External => ion.external,
        }
    }

    /// Set the starting concentration and publish it to the ion store
    pub fn initialise(&mut self, ions: &mut [IonState]) -> MechanismResult<()> {
        self.check_len(ions.len())?;
        let initial: Vec<FloatValue> = match self.spec.parameters.initial_concentration {
            Some(value) => vec![value; self.len()],
            None => ions.iter().map(|ion| self.stored(ion)).collect(),
        };
        self.initialised = true;
        self.commit(&initial, ions)?;
        log::debug!("Initialised {}: {:?}", self.spec.name, self.concentrations);
        Ok(())
    }

    /// Left-hand side of the backward Euler system scaled by compartment length
    fn assemble(&mut self, dt: Time) {
        let length = self.spec.morphology.segment_length();
        let area = self.geometry.shell_area;
        let storage = length * area / dt;
        let relaxation = self
            .spec
            .parameters
            .transfer_time
            .map_or(0.0, |tau| length * area / tau);
        let coupling = self.spec.parameters.diffusion_coefficient * area / length;

        self.system.clear();
        for row in 0..self.len() {
            self.system.add_diagonal(row, storage + relaxation);
        }
        for row in 0..self.len().saturating_sub(1) {
            self.system.add_coupling(row, coupling);
        }
    }

    /// Fixed-step path: advance by `dt` with the given membrane currents of the pool's ion
    pub fn step(&mut self, currents: &[FloatValue], dt: Time, ions: &mut [IonState]) -> MechanismResult<()> {
        self.ensure_initialised()?;
        self.check_dt(dt)?;
        self.check_len(currents.len())?;
        self.check_len(ions.len())?;

        let length = self.spec.morphology.segment_length();
        let area = self.geometry.shell_area;
        let bath = self
            .spec
            .parameters
            .transfer_time
            .map_or(0.0, |tau| length * area / tau * self.spec.parameters.bath_concentration);

        self.assemble(dt);
        for (row, current) in currents.iter().enumerate() {
            let rhs = length * area / dt * self.concentrations[row] + length * self.flux(*current) + bath;
            self.system.add_rhs(row, rhs);
        }
        let solution = self.system.solve()?;
        self.commit(&solution, ions)
    }

    /// Variable-step path: $dC_i/dt$ for the present concentrations
    pub fn derivatives(&self, currents: &[FloatValue]) -> MechanismResult<Vec<FloatValue>> {
        self.ensure_initialised()?;
        self.check_len(currents.len())?;
        let parameters = &self.spec.parameters;
        let length = self.spec.morphology.segment_length();
        let exchange = parameters.diffusion_coefficient / (length * length);
        let c = &self.concentrations;

        Ok(currents
            .iter()
            .enumerate()
            .map(|(i, current)| {
                let mut derivative = self.flux(*current) / self.geometry.shell_area;
                if i > 0 {
                    derivative += exchange * (c[i - 1] - c[i]);
                }
                if i + 1 < c.len() {
                    derivative += exchange * (c[i + 1] - c[i]);
                }
                if let Some(tau) = parameters.transfer_time {
                    derivative += (parameters.bath_concentration - c[i]) / tau;
                }
                derivative
            })
            .collect())
    }

    /// Implicit correction for adaptive integrators, solving
    /// $(1 - dt J) \delta = d$ in place with the same system as [`DiffusionPool::step`]
    pub fn matsol(&mut self, d: &mut [FloatValue], dt: Time) -> MechanismResult<()> {
        self.check_dt(dt)?;
        self.check_len(d.len())?;
        let storage = self.spec.morphology.segment_length() * self.geometry.shell_area / dt;
        self.assemble(dt);
        for (row, value) in d.iter().enumerate() {
            self.system.add_rhs(row, storage * value);
        }
        let solution = self.system.solve()?;
        d.copy_from_slice(&solution);
        Ok(())
    }

    /// Coefficients of compartment `index` for adaptive integrators
    ///
    /// `current_slope` is the derivative of the pool ion's current with respect to
    /// voltage at the compartment.
    pub fn coefficients(
        &self,
        index: usize,
        current_slope: FloatValue,
        celsius: FloatValue,
    ) -> MechanismResult<DiffusionCoefficients> {
        let concentration = *self.concentrations.get(index).ok_or_else(|| {
            MechanismError::StateLength {
                mechanism: self.spec.name.clone(),
                expected: self.len(),
                got: index + 1,
            }
        })?;
        let nernst_slope = match self.side() {
            PoolSide::External => nernst_external_slope(self.ion(), concentration, celsius)?,
            PoolSide::Internal => nernst_internal_slope(self.ion(), concentration, celsius)?,
        };
        Ok(DiffusionCoefficients {
            coefficient: self.spec.parameters.diffusion_coefficient * self.geometry.shell_area,
            volume: self.geometry.shell_area,
            flux_derivative: nernst_slope * self.flux(current_slope),
        })
    }

    /// Write back concentrations computed by an adaptive integrator
    pub fn set_concentrations(&mut self, values: &[FloatValue], ions: &mut [IonState]) -> MechanismResult<()> {
        self.ensure_initialised()?;
        self.commit(values, ions)
    }

    /// Clamp, store and publish new concentrations
    fn commit(&mut self, values: &[FloatValue], ions: &mut [IonState]) -> MechanismResult<()> {
        self.check_len(values.len())?;
        self.check_len(ions.len())?;
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(MechanismError::NonFiniteConcentration {
                mechanism: self.spec.name.clone(),
                index,
                value: *value,
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.concentrations[i] = if *value < 0.0 {
                log::warn!(
                    "{}: concentration {} mM in compartment {} clamped to zero",
                    self.spec.name,
                    value,
                    i
                );
                0.0
            } else {
                *value
            };
        }
        self.publish(ions);
        Ok(())
    }

    fn publish(&self, ions: &mut [IonState]) {
        let side = self.side();
        for (ion, value) in ions.iter_mut().zip(self.concentrations.iter()) {
            match side {
                PoolSide::Internal => ion.internal = *value,
                PoolSide::External => ion.external = *value,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use is_close::is_close;

    fn pool(segments: usize, parameters: DiffusionPoolParameters) -> DiffusionPool {
        DiffusionPool::new(PoolSpec {
            name: "caext".to_string(),
            morphology: Morphology::new(10.0, 100.0, segments),
            parameters,
        })
        .unwrap()
    }

    fn store(n: usize) -> Vec<IonState> {
        vec![IonState::calcium(); n]
    }

    #[test]
    fn test_geometry() {
        let geometry = PoolGeometry::from_morphology(&Morphology::new(10.0, 100.0, 2), 2.0);
        assert!(is_close!(geometry.segment_length, 5e-3));
        assert!(is_close!(geometry.surface_area, SHELL_PI * 1e-3 * 5e-3));
        assert!(is_close!(geometry.volume, SHELL_PI * 25e-8 * 5e-3));
        assert!(is_close!(geometry.shell_volume, SHELL_PI * 36e-8 * 5e-3 - geometry.volume));
        assert!(is_close!(geometry.shell_area, SHELL_PI * (40.0 - 4.0)));
    }

    #[test]
    fn test_invalid_parameters() {
        let spec = |parameters: DiffusionPoolParameters, segments: usize| PoolSpec {
            name: "bad".to_string(),
            morphology: Morphology::new(10.0, 100.0, segments),
            parameters,
        };
        assert!(DiffusionPool::new(spec(DiffusionPoolParameters::default(), 1)).is_ok());
        assert!(DiffusionPool::new(spec(DiffusionPoolParameters::default(), 0)).is_err());
        assert!(DiffusionPool::new(spec(
            DiffusionPoolParameters {
                transfer_time: Some(0.0),
                ..Default::default()
            },
            1
        ))
        .is_err());
        // Shell thicker than twice the diameter has negative area
        assert!(DiffusionPool::new(spec(
            DiffusionPoolParameters {
                shell_thickness: 25.0,
                ..Default::default()
            },
            1
        ))
        .is_err());
    }

    #[test]
    fn test_initialise_reads_store() {
        let mut reading = pool(1, DiffusionPoolParameters::default());
        let mut ions = store(1);
        reading.initialise(&mut ions).unwrap();
        assert_eq!(reading.concentrations(), &[2.0]);

        let mut fixed = pool(
            1,
            DiffusionPoolParameters {
                initial_concentration: Some(1.5),
                ..Default::default()
            },
        );
        fixed.initialise(&mut ions).unwrap();
        assert_eq!(ions[0].external, 1.5);
    }

    #[test]
    fn test_step_before_initialise() {
        let mut pool = pool(1, DiffusionPoolParameters::default());
        let mut ions = store(1);
        assert!(matches!(
            pool.step(&[0.0], 0.025, &mut ions),
            Err(MechanismError::NotInitialised { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_time_step() {
        let mut pool = pool(1, DiffusionPoolParameters::default());
        let mut ions = store(1);
        pool.initialise(&mut ions).unwrap();
        for dt in [0.0, -0.025, FloatValue::NAN, FloatValue::INFINITY] {
            assert!(matches!(
                pool.step(&[-1e-3], dt, &mut ions),
                Err(MechanismError::InvalidParameter { .. })
            ));
            assert!(pool.matsol(&mut [1.0], dt).is_err());
        }
        assert_eq!(pool.concentrations(), &[2.0]);
        assert_eq!(ions[0].external, 2.0);
    }

    #[test]
    fn test_non_finite_concentration_is_not_published() {
        let mut pool = pool(2, DiffusionPoolParameters::default());
        let mut ions = store(2);
        pool.initialise(&mut ions).unwrap();
        assert!(matches!(
            pool.set_concentrations(&[1.0, FloatValue::NAN], &mut ions),
            Err(MechanismError::NonFiniteConcentration { index: 1, .. })
        ));
        assert!(pool
            .set_concentrations(&[FloatValue::INFINITY, 1.0], &mut ions)
            .is_err());
        assert_eq!(pool.concentrations(), &[2.0, 2.0]);
        assert!(ions.iter().all(|ion| ion.external == 2.0));
    }

    #[test]
    fn test_fixed_step_matches_flux_over_volume() {
        let mut pool = pool(1, DiffusionPoolParameters::default());
        let mut ions = store(1);
        pool.initialise(&mut ions).unwrap();
        let current = -1e-3;
        let dt = 0.025;
        pool.step(&[current], dt, &mut ions).unwrap();

        let expected = 2.0 + dt * pool.flux(current) / pool.geometry().shell_area;
        assert_relative_eq!(pool.concentrations()[0], expected, max_relative = 1e-12);
        assert_eq!(ions[0].external, pool.concentrations()[0]);
    }

    #[test]
    fn test_fixed_and_adaptive_agree() {
        let mut fixed = pool(1, DiffusionPoolParameters::default());
        let mut ions = store(1);
        fixed.initialise(&mut ions).unwrap();
        let adaptive = fixed.clone();

        let current = 2.5e-3;
        let dt = 0.01;
        let derivative = adaptive.derivatives(&[current]).unwrap()[0];
        fixed.step(&[current], dt, &mut ions).unwrap();
        let rate = (fixed.concentrations()[0] - adaptive.concentrations()[0]) / dt;
        assert_relative_eq!(rate, derivative, max_relative = 1e-9);
    }

    #[test]
    fn test_chain_diffusion_conserves_mass() {
        let mut pool = pool(4, DiffusionPoolParameters::default());
        let mut ions = store(4);
        pool.initialise(&mut ions).unwrap();
        pool.set_concentrations(&[4.0, 2.0, 2.0, 2.0], &mut ions).unwrap();

        for _ in 0..200 {
            pool.step(&[0.0; 4], 0.5, &mut ions).unwrap();
        }
        let total: f64 = pool.concentrations().iter().sum();
        assert_relative_eq!(total, 10.0, max_relative = 1e-10);
        let c = pool.concentrations();
        assert!(c.windows(2).all(|w| w[0] >= w[1]));
        assert!(c[0] - c[3] < 2.0);
        assert_eq!(ions[3].external, c[3]);
    }

    #[test]
    fn test_bath_relaxation() {
        let mut pool = pool(
            1,
            DiffusionPoolParameters {
                transfer_time: Some(50.0),
                initial_concentration: Some(0.5),
                ..Default::default()
            },
        );
        let mut ions = store(1);
        pool.initialise(&mut ions).unwrap();
        let derivative = pool.derivatives(&[0.0]).unwrap()[0];
        assert!(is_close!(derivative, (2.0 - 0.5) / 50.0));

        for _ in 0..10000 {
            pool.step(&[0.0], 0.1, &mut ions).unwrap();
        }
        assert_relative_eq!(pool.concentrations()[0], 2.0, max_relative = 1e-6);
    }

    #[test]
    fn test_negative_concentration_clamped() {
        let mut pool = pool(1, DiffusionPoolParameters::default());
        let mut ions = store(1);
        pool.initialise(&mut ions).unwrap();
        // Huge outward current drains the shell within one step
        pool.step(&[1e6], 1.0, &mut ions).unwrap();
        assert_eq!(pool.concentrations()[0], 0.0);
        assert_eq!(ions[0].external, 0.0);
    }

    #[test]
    fn test_matsol_single_compartment() {
        let mut pool = pool(
            1,
            DiffusionPoolParameters {
                transfer_time: Some(10.0),
                ..Default::default()
            },
        );
        let mut d = vec![1.0];
        pool.matsol(&mut d, 1.0).unwrap();
        assert!(is_close!(d[0], 1.0 / (1.0 + 1.0 / 10.0)));
    }

    #[test]
    fn test_coefficients() {
        let mut pool = pool(1, DiffusionPoolParameters::default());
        let mut ions = store(1);
        pool.initialise(&mut ions).unwrap();
        let coefficients = pool.coefficients(0, 0.01, 22.0).unwrap();
        let area = pool.geometry().shell_area;
        assert!(is_close!(coefficients.coefficient, 1.85 * area));
        assert_eq!(coefficients.volume, area);
        let slope = nernst_external_slope(Ion::Ca, 2.0, 22.0).unwrap();
        assert!(is_close!(coefficients.flux_derivative, slope * pool.flux(0.01)));
        assert!(pool.coefficients(1, 0.01, 22.0).is_err());
    }

    #[test]
    fn test_serialises_as_spec() {
        let pool = pool(3, DiffusionPoolParameters::default());
        let serialised = serde_json::to_string(&pool).unwrap();
        let restored: DiffusionPool = serde_json::from_str(&serialised).unwrap();
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.geometry(), pool.geometry());
    }
}
