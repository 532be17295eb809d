pub mod channel;
pub mod config;
pub mod constants;
pub mod current;
pub mod diffusion;
pub mod gating;
pub mod ion;
pub mod linearize;
pub mod mechanism;
pub mod node;
pub mod patch;
pub mod q10;
pub mod rates;
pub mod sparse;

pub mod errors;
