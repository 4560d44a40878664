use std::f64::consts::E;
use std::str::FromStr;

use crate::error::{NnError, NnResult};
use crate::math::matrix::Matrix;

/// Slope applied to non-positive inputs by `Lrelu`.
pub const LEAK: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Logistic,
    Relu,
    Lrelu,
    /// Row-wise normalisation; only meaningful through `activate_matrix`.
    Softmax,
}

impl Activation {
    /// Element-wise transform of a raw value.
    ///
    /// For `Softmax` this returns `exp(x)`, the unnormalised numerator;
    /// `activate_matrix` divides by the row sum afterwards.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::Logistic => 1.0 / (1.0 + E.powf(-x)),
            Activation::Relu => if x > 0.0 { x } else { 0.0 },
            Activation::Lrelu => if x > 0.0 { x } else { LEAK * x },
            Activation::Softmax => x.exp(),
        }
    }

    /// Local derivative expressed in terms of the *activated* value `y`.
    ///
    /// The rectifiers only alter units with `y <= 0`; anything else, NaN
    /// included, passes through with slope 1.
    ///
    /// `Softmax` returns `1.0`: its Jacobian is folded into the paired loss
    /// gradient (predicted - expected), so the delta passes through untouched.
    pub fn derivative_from_output(&self, y: f64) -> f64 {
        match self {
            Activation::Logistic => y * (1.0 - y),
            Activation::Relu => if y <= 0.0 { 0.0 } else { 1.0 },
            Activation::Lrelu => if y <= 0.0 { LEAK } else { 1.0 },
            Activation::Softmax => 1.0,
        }
    }
}

impl FromStr for Activation {
    type Err = NnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logistic" => Ok(Activation::Logistic),
            "relu" => Ok(Activation::Relu),
            "lrelu" => Ok(Activation::Lrelu),
            "softmax" => Ok(Activation::Softmax),
            _ => Err(NnError::UnsupportedActivation(s.to_string())),
        }
    }
}

/// Applies `a` to every element of `m` in place. Rows are independent.
///
/// Softmax subtracts the row maximum before exponentiating so large inputs
/// do not overflow; the normalised row is unchanged by the shift.
pub fn activate_matrix(m: &mut Matrix, a: Activation) {
    for i in 0..m.rows() {
        let row = m.row_mut(i);

        match a {
            Activation::Softmax => {
                let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let shift = if max.is_finite() { max } else { 0.0 };

                let mut sum = 0.0;
                for x in row.iter_mut() {
                    *x = a.function(*x - shift);
                    sum += *x;
                }
                for x in row.iter_mut() {
                    *x /= sum;
                }
            }
            _ => {
                for x in row.iter_mut() {
                    *x = a.function(*x);
                }
            }
        }
    }
}

/// Multiplies the delta `d` in place by the derivative of `a`, evaluated at
/// the activated output `m`.
pub fn gradient_matrix(m: &Matrix, a: Activation, d: &mut Matrix) -> NnResult<()> {
    d.ensure_shape(m.rows(), m.cols())?;

    if a == Activation::Softmax {
        return Ok(());
    }

    for (delta, &y) in d.as_mut_slice().iter_mut().zip(m.as_slice()) {
        match a {
            // Assign rather than multiply so an infinite delta still becomes 0.
            Activation::Relu if y <= 0.0 => *delta = 0.0,
            _ => *delta *= a.derivative_from_output(y),
        }
    }

    Ok(())
}
