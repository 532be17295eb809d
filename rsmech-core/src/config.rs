//! Mechanism libraries loaded from TOML
//!
//! ```toml
//! [[channel]]
//! name = "leak"
//!
//! [[channel.currents]]
//! name = "il"
//! conductance = 0.0003
//! reversal = { source = "fixed", potential = -54.3 }
//!
//! [[pool]]
//! name = "caext"
//! morphology = { diameter = 10.0, length = 100.0, segments = 1 }
//! ```

use crate::channel::{Channel, ChannelSpec};
use crate::diffusion::{DiffusionPool, PoolSpec};
use crate::errors::{MechanismError, MechanismResult};
use serde::{Deserialize, Serialize};

/// Named channel and pool definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MechanismLibrary {
    #[serde(default, rename = "channel")]
    pub channels: Vec<ChannelSpec>,
    #[serde(default, rename = "pool")]
    pub pools: Vec<PoolSpec>,
}

impl MechanismLibrary {
    /// Parse and validate a library
    pub fn from_toml_str(contents: &str) -> MechanismResult<Self> {
        let library: MechanismLibrary = toml::from_str(contents)?;
        library.validate()?;
        log::debug!(
            "Loaded {} channels and {} pools",
            library.channels.len(),
            library.pools.len()
        );
        Ok(library)
    }

    pub fn to_toml_string(&self) -> MechanismResult<String> {
        toml::to_string(self).map_err(|e| MechanismError::Error(e.to_string()))
    }

    /// Build every definition once, reporting the first invalid one
    pub fn validate(&self) -> MechanismResult<()> {
        for spec in self.channels.iter() {
            Channel::new(spec.clone())?;
        }
        for spec in self.pools.iter() {
            DiffusionPool::new(spec.clone())?;
        }
        Ok(())
    }

    pub fn channel(&self, name: &str) -> MechanismResult<Channel> {
        let spec = self
            .channels
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| MechanismError::Error(format!("No channel named `{}`", name)))?;
        Channel::new(spec.clone())
    }

    pub fn pool(&self, name: &str) -> MechanismResult<DiffusionPool> {
        let spec = self
            .pools
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| MechanismError::Error(format!("No pool named `{}`", name)))?;
        DiffusionPool::new(spec.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::PoolSide;
    use crate::gating::GateKinetics;
    use crate::ion::Ion;
    use crate::mechanism::Mechanism;
    use crate::node::NodeState;
    use crate::rates::RateExpression;

    const LIBRARY: &str = r#"
[[channel]]
name = "hh_na"

[[channel.gates]]
name = "m"
kinetics = { kind = "alpha_beta", alpha = { form = "exp_linear", a = 0.1, b = -40.0, c = 10.0 }, beta = { form = "exponential", a = 4.0, b = 65.0, c = -18.0 } }
q10 = { base = 3.0, reference = 6.3 }

[[channel.gates]]
name = "h"

[channel.gates.kinetics]
kind = "alpha_beta"
alpha = { form = "exponential", a = 0.07, b = 65.0, c = -20.0 }
beta = { form = "sigmoid", a = 1.0, b = 35.0, c = -10.0 }

[[channel.currents]]
name = "ina"
conductance = 0.12
carrier = "na"
reversal = { source = "ion" }
factors = [{ gates = [{ gate = "m" }], power = 3 }, { gates = [{ gate = "h" }] }]

[[pool]]
name = "caext"
morphology = { diameter = 10.0, length = 100.0, segments = 3 }
parameters = { side = "external", transfer_time = 50.0 }
"#;

    #[test]
    fn test_parse_library() {
        let library = MechanismLibrary::from_toml_str(LIBRARY).unwrap();
        assert_eq!(library.channels.len(), 1);
        let spec = &library.channels[0];
        assert_eq!(spec.gates.len(), 2);
        assert_eq!(spec.gates[0].q10.unwrap().window, 10.0);
        assert_eq!(spec.currents[0].factors[0].power, 3);
        assert_eq!(spec.currents[0].factors[1].gates[0].weight, 1.0);
        match &spec.gates[1].kinetics {
            GateKinetics::AlphaBeta { beta, .. } => {
                assert_eq!(*beta, RateExpression::sigmoid(1.0, 35.0, -10.0))
            }
            other => panic!("Unexpected kinetics {:?}", other),
        }

        let pool = library.pool("caext").unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.side(), PoolSide::External);
        assert_eq!(pool.ion(), Ion::Ca);
        assert_eq!(pool.parameters().transfer_time, Some(50.0));
        assert_eq!(pool.parameters().diffusion_coefficient, 1.85);
    }

    #[test]
    fn test_build_channel_from_library() {
        let library = MechanismLibrary::from_toml_str(LIBRARY).unwrap();
        let mut channel = library.channel("hh_na").unwrap();
        channel.initialise(&NodeState::default()).unwrap();
        let currents = channel.currents(-65.0, &NodeState::default()).unwrap();
        // Resting sodium current is small and inward
        assert!(currents.by_ion[Ion::Na] < 0.0);
        assert!(currents.by_ion[Ion::Na] > -0.01);
        assert!(library.channel("missing").is_err());
    }

    #[test]
    fn test_invalid_library_rejected() {
        let broken = LIBRARY.replace("c = -10.0", "c = 0.0");
        assert!(matches!(
            MechanismLibrary::from_toml_str(&broken),
            Err(MechanismError::InvalidParameter { .. })
        ));

        let unknown_gate = LIBRARY.replace(r#"{ gate = "h" }"#, r#"{ gate = "j" }"#);
        assert!(matches!(
            MechanismLibrary::from_toml_str(&unknown_gate),
            Err(MechanismError::UnknownGate { .. })
        ));

        assert!(matches!(
            MechanismLibrary::from_toml_str("[[channel]]\nname = 1"),
            Err(MechanismError::Config(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let library = MechanismLibrary::from_toml_str(LIBRARY).unwrap();
        let serialised = library.to_toml_string().unwrap();
        let restored = MechanismLibrary::from_toml_str(&serialised).unwrap();
        assert_eq!(restored, library);
    }
}
