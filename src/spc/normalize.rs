//! Sequence normalization: sample mean, Bessel-corrected standard deviation,
//! and the parallel z-score sequence consumed by the run rules.
//!
//! # Algorithm
//!
//! ```text
//! mean = (1/n) Σ x_i
//! s    = sqrt( Σ (x_i - mean)² / (n - 1) )
//! z_i  = (x_i - mean) / s
//! ```
//!
//! The full z-score sequence is built eagerly so that rule evaluation can
//! treat it as a read-only array.

use statrs::statistics::Statistics;
use tracing::{debug, warn};

use crate::error::{Result, SpcError};

/// Mean, standard deviation and z-scores of a cleaned measurement sequence.
///
/// # Invariants
///
/// - `zscores.len()` equals the length of the normalized input
/// - `std` is finite and strictly positive
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Arithmetic mean of the input (the center line).
    pub mean: f64,
    /// Sample standard deviation (divisor n-1).
    pub std: f64,
    /// `(x_i - mean) / std` for every input value, in input order.
    pub zscores: Vec<f64>,
}

impl Normalized {
    /// Number of observations.
    pub fn len(&self) -> usize {
        self.zscores.len()
    }

    /// Always `false` for a successfully normalized sequence.
    pub fn is_empty(&self) -> bool {
        self.zscores.is_empty()
    }
}

/// Normalizes a cleaned sequence into z-scores.
///
/// # Errors
///
/// - [`SpcError::InsufficientData`] if fewer than 2 values are given.
/// - [`SpcError::DegenerateVariance`] if the sample standard deviation is
///   zero or not finite (all values identical, or non-finite input).
///
/// # Examples
///
/// ```
/// use spc_sensitize::spc::normalize;
///
/// let n = normalize(&[1.0, 2.0, 3.0]).unwrap();
/// assert!((n.mean - 2.0).abs() < 1e-12);
/// assert!((n.std - 1.0).abs() < 1e-12);
/// assert_eq!(n.zscores.len(), 3);
/// ```
pub fn normalize(values: &[f64]) -> Result<Normalized> {
    let n = values.len();
    if n < 2 {
        warn!(n, "insufficient data for sample standard deviation");
        return Err(SpcError::InsufficientData { found: n });
    }

    // Running sums can leave a residue on identical values; pin those to zero.
    let first = values[0];
    if values.iter().all(|&x| x == first) {
        warn!(n, "all values identical");
        return Err(SpcError::DegenerateVariance { std: 0.0 });
    }

    let mean = values.iter().mean();
    let std = values.iter().std_dev();

    if !std.is_finite() || std == 0.0 {
        warn!(n, std, "degenerate variance");
        return Err(SpcError::DegenerateVariance { std });
    }

    let zscores: Vec<f64> = values.iter().map(|&x| (x - mean) / std).collect();
    debug!(n, mean, std, "normalized sequence");

    Ok(Normalized { mean, std, zscores })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn zscore_moments(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=60)
        ) {
            if let Ok(n) = normalize(&data) {
                let len = n.len() as f64;
                let centered: f64 = data.iter().map(|x| x - n.mean).sum();
                prop_assert!(centered.abs() < 1e-6, "Σ(x-mean) = {centered}");

                let z_mean = n.zscores.iter().sum::<f64>() / len;
                prop_assert!(z_mean.abs() < 1e-9, "mean(z) = {z_mean}");

                let z_var = n.zscores.iter().map(|z| (z - z_mean).powi(2)).sum::<f64>()
                    / (len - 1.0);
                prop_assert!((z_var.sqrt() - 1.0).abs() < 1e-9, "std(z) = {}", z_var.sqrt());
            }
        }

        #[test]
        fn constant_always_degenerate(
            v in -1e6_f64..1e6,
            len in 2_usize..40
        ) {
            let data = vec![v; len];
            let is_degenerate = matches!(
                normalize(&data),
                Err(SpcError::DegenerateVariance { .. })
            );
            prop_assert!(is_degenerate);
        }
    }
}
