//! Rate function library
//!
//! Closed-form functions of membrane voltage returning a rate (1/ms), a
//! steady-state fraction or a time constant (ms). Three families cover almost
//! every channel in use:
//!
//! - **Sigmoid**: $\text{offset} + \frac{A}{1 + e^{(v + B)/C}}$
//! - **ExpLinear** (singular-removable):
//!   $\frac{A (v - B)}{1 - e^{(B - v)/C}}$, which is $0/0$ at $v = B$
//! - **Gaussian**: $A e^{-B^2 (v - V_{peak})^2} + C$
//!
//! plus plain exponentials, constants and sums of the above.
//!
//! The ExpLinear family is always evaluated through three guarded branches:
//! the analytic limit $A C$ within [`SINGULARITY_TOLERANCE`] of the
//! singularity, a clamp constant beyond $\pm$[`RATE_CLAMP_BOUND`] mV, and the
//! general formula everywhere else.

use crate::constants::{
    FloatValue, EXP_UNDERFLOW_LIMIT, RATE_CLAMP_BOUND, SINGULARITY_TOLERANCE,
};
use crate::errors::{MechanismError, MechanismResult};
use serde::{Deserialize, Serialize};

/// Exponential that flushes to zero for arguments below -100.
pub fn guarded_exp(x: FloatValue) -> FloatValue {
    if x < EXP_UNDERFLOW_LIMIT {
        0.0
    } else {
        x.exp()
    }
}

/// Constant values returned outside the [-150, 150] mV validity range.
///
/// A missing side falls back to the expression's value at the bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Clamp {
    #[serde(default)]
    pub below: Option<FloatValue>,
    #[serde(default)]
    pub above: Option<FloatValue>,
}

impl Clamp {
    /// Clamp applied for `v < -150` mV
    pub fn below(value: FloatValue) -> Self {
        Self {
            below: Some(value),
            above: None,
        }
    }

    /// Clamp applied for `v > 150` mV
    pub fn above(value: FloatValue) -> Self {
        Self {
            below: None,
            above: Some(value),
        }
    }

    fn lookup(&self, v: FloatValue) -> Option<FloatValue> {
        if v < -RATE_CLAMP_BOUND {
            self.below
        } else if v > RATE_CLAMP_BOUND {
            self.above
        } else {
            None
        }
    }
}

/// A closed-form function of voltage, tagged by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum RateExpression {
    Constant {
        value: FloatValue,
    },
    Sigmoid {
        a: FloatValue,
        b: FloatValue,
        c: FloatValue,
        #[serde(default)]
        offset: FloatValue,
        #[serde(default)]
        clamp: Clamp,
    },
    ExpLinear {
        a: FloatValue,
        b: FloatValue,
        c: FloatValue,
        #[serde(default)]
        clamp: Clamp,
    },
    Exponential {
        a: FloatValue,
        b: FloatValue,
        c: FloatValue,
    },
    Gaussian {
        a: FloatValue,
        b: FloatValue,
        v_peak: FloatValue,
        c: FloatValue,
    },
    Sum {
        terms: Vec<RateExpression>,
    },
}

impl RateExpression {
    pub fn constant(value: FloatValue) -> Self {
        RateExpression::Constant { value }
    }

    /// `a / (1 + exp((v + b) / c))`
    pub fn sigmoid(a: FloatValue, b: FloatValue, c: FloatValue) -> Self {
        RateExpression::Sigmoid {
            a,
            b,
            c,
            offset: 0.0,
            clamp: Clamp::default(),
        }
    }

    /// `a * (v - b) / (1 - exp((b - v) / c))`
    ///
    /// The mirrored form `a * (b - v) / (1 - exp((v - b) / c))` is
    /// `exp_linear(-a, b, -c)`.
    pub fn exp_linear(a: FloatValue, b: FloatValue, c: FloatValue) -> Self {
        RateExpression::ExpLinear {
            a,
            b,
            c,
            clamp: Clamp::default(),
        }
    }

    /// `a * exp((v + b) / c)`
    pub fn exponential(a: FloatValue, b: FloatValue, c: FloatValue) -> Self {
        RateExpression::Exponential { a, b, c }
    }

    /// `a * exp(-b^2 (v - v_peak)^2) + c`
    pub fn gaussian(a: FloatValue, b: FloatValue, v_peak: FloatValue, c: FloatValue) -> Self {
        RateExpression::Gaussian { a, b, v_peak, c }
    }

    pub fn sum(terms: Vec<RateExpression>) -> Self {
        RateExpression::Sum { terms }
    }

    /// Adds a constant offset to a sigmoid. Other families are returned unchanged.
    pub fn with_offset(mut self, new_offset: FloatValue) -> Self {
        if let RateExpression::Sigmoid { offset, .. } = &mut self {
            *offset = new_offset;
        }
        self
    }

    /// Attaches clamp constants to a sigmoid or exp-linear expression.
    pub fn with_clamp(mut self, new_clamp: Clamp) -> Self {
        match &mut self {
            RateExpression::Sigmoid { clamp, .. } | RateExpression::ExpLinear { clamp, .. } => {
                *clamp = new_clamp
            }
            _ => {}
        }
        self
    }

    /// Fills every missing exp-linear clamp with the formula's value at the bound.
    pub fn with_precomputed_clamps(self) -> Self {
        match self {
            RateExpression::ExpLinear { a, b, c, clamp } => {
                let below = clamp
                    .below
                    .unwrap_or_else(|| exp_linear(a, b, c, &Clamp::default(), -RATE_CLAMP_BOUND));
                let above = clamp
                    .above
                    .unwrap_or_else(|| exp_linear(a, b, c, &Clamp::default(), RATE_CLAMP_BOUND));
                RateExpression::ExpLinear {
                    a,
                    b,
                    c,
                    clamp: Clamp {
                        below: Some(below),
                        above: Some(above),
                    },
                }
            }
            RateExpression::Sum { terms } => RateExpression::Sum {
                terms: terms
                    .into_iter()
                    .map(RateExpression::with_precomputed_clamps)
                    .collect(),
            },
            other => other,
        }
    }

    /// Evaluate the expression at voltage `v` (mV)
    pub fn evaluate(&self, v: FloatValue) -> FloatValue {
        match self {
            RateExpression::Constant { value } => *value,
            RateExpression::Sigmoid {
                a,
                b,
                c,
                offset,
                clamp,
            } => clamp
                .lookup(v)
                .unwrap_or_else(|| offset + a / (1.0 + guarded_exp((v + b) / c))),
            RateExpression::ExpLinear { a, b, c, clamp } => exp_linear(*a, *b, *c, clamp, v),
            RateExpression::Exponential { a, b, c } => a * guarded_exp((v + b) / c),
            RateExpression::Gaussian { a, b, v_peak, c } => {
                a * guarded_exp(-(b * b) * (v - v_peak).powi(2)) + c
            }
            RateExpression::Sum { terms } => terms.iter().map(|term| term.evaluate(v)).sum(),
        }
    }

    /// Reject parameterisations that divide by zero or are not finite.
    pub fn validate(&self, mechanism: &str, parameter: &str) -> MechanismResult<()> {
        let finite = |values: &[FloatValue]| values.iter().all(|x| x.is_finite());
        let ok = match self {
            RateExpression::Constant { value } => value.is_finite(),
            RateExpression::Sigmoid { a, b, c, offset, .. } => {
                if *c == 0.0 {
                    return Err(MechanismError::invalid(
                        mechanism,
                        parameter,
                        "sigmoid slope `c` must be non-zero",
                    ));
                }
                finite(&[*a, *b, *c, *offset])
            }
            RateExpression::ExpLinear { a, b, c, .. } => {
                if *c == 0.0 {
                    return Err(MechanismError::invalid(
                        mechanism,
                        parameter,
                        "exp-linear slope `c` must be non-zero",
                    ));
                }
                finite(&[*a, *b, *c])
            }
            RateExpression::Exponential { a, b, c } => {
                if *c == 0.0 {
                    return Err(MechanismError::invalid(
                        mechanism,
                        parameter,
                        "exponential scale `c` must be non-zero",
                    ));
                }
                finite(&[*a, *b, *c])
            }
            RateExpression::Gaussian { a, b, v_peak, c } => finite(&[*a, *b, *v_peak, *c]),
            RateExpression::Sum { terms } => {
                for term in terms {
                    term.validate(mechanism, parameter)?;
                }
                true
            }
        };
        if ok {
            Ok(())
        } else {
            Err(MechanismError::invalid(
                mechanism,
                parameter,
                "coefficients must be finite",
            ))
        }
    }
}

fn exp_linear(a: FloatValue, b: FloatValue, c: FloatValue, clamp: &Clamp, v: FloatValue) -> FloatValue {
    if (v - b).abs() < SINGULARITY_TOLERANCE {
        return a * c;
    }
    if v < -RATE_CLAMP_BOUND {
        return clamp
            .below
            .unwrap_or_else(|| exp_linear(a, b, c, &Clamp::default(), -RATE_CLAMP_BOUND));
    }
    if v > RATE_CLAMP_BOUND {
        return clamp
            .above
            .unwrap_or_else(|| exp_linear(a, b, c, &Clamp::default(), RATE_CLAMP_BOUND));
    }
    a * (v - b) / (1.0 - guarded_exp((b - v) / c))
}
