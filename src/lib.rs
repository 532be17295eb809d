//! Membrane mechanisms for compartmental neural simulators
//!
//! The engine lives in [`rsmech_core`]: rate functions, gating kinetics,
//! current assembly, conductance linearization and shell diffusion pools,
//! plus a single-compartment [`patch::Patch`] for driving mechanisms outside
//! a full cable simulator. [`components`] holds concrete channels, the
//! sodium-calcium exchanger and the extracellular calcium pool built on top.
//!
//! # Example
//!
//! ```
//! use rsmech::components::{Naf, NafParameters};
//! use rsmech::mechanism::Mechanism;
//! use rsmech::patch::{PatchBuilder, VoltageMode};
//!
//! let naf = Naf::from_parameters(NafParameters::default()).build().unwrap();
//! let mut patch = PatchBuilder::new()
//!     .with_mechanism(naf)
//!     .with_mode(VoltageMode::Clamped)
//!     .build()
//!     .unwrap();
//! patch.initialise().unwrap();
//! patch.set_voltage(-20.0);
//! let trace = patch.run(1.0).unwrap();
//! assert_eq!(trace.len(), 40);
//! assert!(patch.accumulator().current < 0.0);
//! ```

pub use rsmech_components::components;
pub use rsmech_core::{
    channel, config, constants, current, diffusion, errors, gating, ion, linearize, mechanism, node,
    patch, q10, rates, sparse,
};
