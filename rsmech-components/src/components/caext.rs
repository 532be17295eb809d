//! Extracellular calcium shell
//!
//! Calcium in a thin periaxonal space outside non-nodal membrane. The
//! concentration is driven by the section's calcium current, spreads along
//! the section by diffusion and can relax toward the bath.

use rsmech_core::constants::FloatValue;
use rsmech_core::diffusion::{DiffusionPool, DiffusionPoolParameters, Morphology, PoolSide, PoolSpec};
use rsmech_core::errors::MechanismResult;
use rsmech_core::ion::Ion;
use serde::{Deserialize, Serialize};

/// Parameters for the extracellular calcium shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaExtPoolParameters {
    /// Longitudinal diffusion coefficient
    /// unit: um^2/ms
    /// default: 1.85
    pub diffusion_coefficient: FloatValue,
    /// Shell thickness
    /// unit: um
    /// default: 2
    pub shell_thickness: FloatValue,
    /// Bath calcium concentration
    /// unit: mM
    /// default: 2
    pub bath_concentration: FloatValue,
    /// Exchange time constant with the bath. Isolated from the bath when unset.
    /// unit: ms
    pub transfer_time: Option<FloatValue>,
}

impl Default for CaExtPoolParameters {
    fn default() -> Self {
        Self {
            diffusion_coefficient: 1.85,
            shell_thickness: 2.0,
            bath_concentration: 2.0,
            transfer_time: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaExtPool {
    parameters: CaExtPoolParameters,
}

impl CaExtPool {
    pub fn from_parameters(parameters: CaExtPoolParameters) -> Self {
        Self { parameters }
    }

    pub fn spec(&self, name: impl Into<String>, morphology: Morphology) -> PoolSpec {
        let p = &self.parameters;
        PoolSpec {
            name: name.into(),
            morphology,
            parameters: DiffusionPoolParameters {
                ion: Ion::Ca,
                side: PoolSide::External,
                diffusion_coefficient: p.diffusion_coefficient,
                shell_thickness: p.shell_thickness,
                bath_concentration: p.bath_concentration,
                transfer_time: p.transfer_time,
                initial_concentration: None,
            },
        }
    }

    /// Pool over the compartments of a section
    pub fn build(&self, name: impl Into<String>, morphology: Morphology) -> MechanismResult<DiffusionPool> {
        DiffusionPool::new(self.spec(name, morphology))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rsmech_core::ion::IonState;

    #[test]
    fn test_writes_external_calcium() {
        let pool = CaExtPool::from_parameters(CaExtPoolParameters::default())
            .build("caext", Morphology::new(10.0, 100.0, 2))
            .unwrap();
        assert_eq!(pool.ion(), Ion::Ca);
        assert_eq!(pool.side(), PoolSide::External);
        assert_eq!(pool.parameters().diffusion_coefficient, 1.85);
        assert_eq!(pool.parameters().shell_thickness, 2.0);
    }

    #[test]
    fn test_flux_from_current() {
        let pool = CaExtPool::from_parameters(CaExtPoolParameters::default())
            .build("caext", Morphology::new(10.0, 100.0, 1))
            .unwrap();
        let ica: FloatValue = -1e-3;
        assert_relative_eq!(
            pool.flux(ica),
            10000.0 * 1e-3 * 3.14159 * 10.0 / 96485.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_initial_concentration_from_store() {
        let mut pool = CaExtPool::from_parameters(CaExtPoolParameters {
            transfer_time: Some(50.0),
            ..Default::default()
        })
        .build("caext", Morphology::new(10.0, 100.0, 1))
        .unwrap();
        let mut ions = vec![IonState::new(1e-4, 1.5, 0.0)];
        pool.initialise(&mut ions).unwrap();
        assert_eq!(pool.concentrations(), &[1.5]);

        // Without current the shell relaxes toward the bath
        for _ in 0..100 {
            pool.step(&[0.0], 1.0, &mut ions).unwrap();
        }
        let expected = 2.0 - 0.5 * (1.0_f64 + 1.0 / 50.0).powi(-100);
        assert_relative_eq!(pool.concentrations()[0], expected, max_relative = 1e-9);
        assert_eq!(ions[0].external, pool.concentrations()[0]);
    }
}
