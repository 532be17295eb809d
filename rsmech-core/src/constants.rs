//! Physical constants and numerical design constants shared by every mechanism.

/// Scalar type used for all state, parameter and rate values.
pub type FloatValue = f64;

/// Simulation time in ms.
pub type Time = f64;

/// Faraday constant used by the Ca shell pool
/// unit: C/mol
pub const FARADAY: FloatValue = 96485.0;

/// Faraday constant used by the channel and exchanger Nernst evaluations
/// unit: C/mol
pub const FARADAY_CHANNEL: FloatValue = 96500.0;

/// Molar gas constant
/// unit: J/(mol K)
pub const GAS_CONSTANT: FloatValue = 8.314;

/// Offset between the Celsius and Kelvin scales.
pub const ZERO_CELSIUS: FloatValue = 273.15;

/// Value of pi used by the shell geometry formulas.
pub const SHELL_PI: FloatValue = 3.14159;

/// Voltage perturbation used to finite-difference currents.
/// unit: mV
pub const LINEARISATION_STEP: FloatValue = 0.001;

/// Below this argument [`crate::rates::guarded_exp`] returns exactly zero.
pub const EXP_UNDERFLOW_LIMIT: FloatValue = -100.0;

/// Distance from the removable singularity inside which the analytic limit is used.
/// unit: mV
pub const SINGULARITY_TOLERANCE: FloatValue = 1e-6;

/// Voltage magnitude beyond which singular rates return their clamp constants.
/// unit: mV
pub const RATE_CLAMP_BOUND: FloatValue = 150.0;

/// Unit factor applied to a membrane current density before dividing by Faraday's constant.
pub const FLUX_SCALE: FloatValue = 10000.0;
