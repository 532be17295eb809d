mod caext;
mod can;
pub mod gaines;
mod nacapump;
mod naf;
mod nattxs;
mod nav1p9;

pub use caext::{CaExtPool, CaExtPoolParameters};
pub use can::{CaN, CaNParameters};
pub use gaines::{GainesMysa, GainesMysaParameters, GainesNode, GainesNodeParameters};
pub use nacapump::{NaCaPump, NaCaPumpParameters};
pub use naf::{Naf, NafParameters};
pub use nattxs::{NaTtxs, NaTtxsParameters};
pub use nav1p9::{Nav1p9, Nav1p9Parameters};
