//! Non-dominated partitioning setup for hypervolume improvement
//!
//! Input construction prepares the partitioning of objective space (reference
//! point, Pareto-filtered objective values, exact vs alpha-approximate
//! algorithm); the box decomposition itself belongs to the acquisition
//! function implementation.
//!
//! # References
//!
//! \[1\] Daulton et al. (2020) - Differentiable Expected Hypervolume
//! Improvement for Parallel Multi-Objective Bayesian Optimization

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AcqError, Result};

/// Which box-decomposition algorithm the acquisition function should run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PartitioningScheme {
    /// Exact decomposition of the non-dominated space.
    Exact,
    /// Approximate decomposition that drops boxes contributing less than an
    /// `alpha` fraction of the dominated hypervolume.
    Approximate { alpha: f64 },
}

/// Prepared non-dominated partitioning of the objective space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partitioning {
    ref_point: Array1<f64>,
    pareto_y: Array2<f64>,
    scheme: PartitioningScheme,
}

impl Partitioning {
    /// Prepare a partitioning of the space dominated by `y` (maximization
    /// convention) above `ref_point`. `alpha == 0` selects the exact
    /// algorithm, `alpha > 0` the approximate one.
    pub fn new(ref_point: Array1<f64>, y: Array2<f64>, alpha: f64) -> Result<Self> {
        if ref_point.len() != y.ncols() {
            return Err(AcqError::UnsupportedShape(format!(
                "reference point has {} entries but objectives have {} columns",
                ref_point.len(),
                y.ncols()
            )));
        }
        if alpha < 0.0 {
            return Err(AcqError::UnsupportedConfiguration(format!(
                "partitioning alpha must be non-negative, got {alpha}"
            )));
        }
        let scheme = if alpha > 0.0 {
            PartitioningScheme::Approximate { alpha }
        } else {
            PartitioningScheme::Exact
        };
        let pareto_y = pareto_front(&ref_point, &y);
        Ok(Self {
            ref_point,
            pareto_y,
            scheme,
        })
    }

    pub fn ref_point(&self) -> &Array1<f64> {
        &self.ref_point
    }

    /// Non-dominated objective values that strictly dominate the reference
    /// point. Points below the reference point contribute no hypervolume.
    pub fn pareto_y(&self) -> &Array2<f64> {
        &self.pareto_y
    }

    pub fn scheme(&self) -> PartitioningScheme {
        self.scheme
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.scheme, PartitioningScheme::Exact)
    }
}

/// Default approximation threshold by objective count: exact partitioning is
/// tractable up to four objectives, beyond that the cost grows too fast.
pub fn default_partitioning_alpha(num_objectives: usize) -> f64 {
    if num_objectives <= 4 {
        0.0
    } else {
        10f64.powi(num_objectives as i32 - 8)
    }
}

/// Rows of `y` above the reference point that no other such row dominates.
fn pareto_front(ref_point: &Array1<f64>, y: &Array2<f64>) -> Array2<f64> {
    let candidates: Vec<usize> = (0..y.nrows())
        .filter(|&i| {
            y.row(i)
                .iter()
                .zip(ref_point.iter())
                .all(|(&v, &r)| v > r)
        })
        .collect();

    let kept: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&i| {
            !candidates
                .iter()
                .any(|&j| j != i && dominates(&y.row(j).to_owned(), &y.row(i).to_owned()))
        })
        .collect();

    y.select(Axis(0), &kept)
}

/// Whether `a` weakly dominates `b` with at least one strict improvement.
fn dominates(a: &Array1<f64>, b: &Array1<f64>) -> bool {
    let mut strict = false;
    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            return false;
        }
        if va > vb {
            strict = true;
        }
    }
    strict
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_alpha_selects_scheme() {
        let ref_point = arr1(&[0.0, 0.0]);
        let y = arr2(&[[1.0, 2.0], [2.0, 1.0]]);

        let exact = Partitioning::new(ref_point.clone(), y.clone(), 0.0).expect("valid");
        assert!(exact.is_exact());

        let approx = Partitioning::new(ref_point, y, 1e-3).expect("valid");
        assert_eq!(
            approx.scheme(),
            PartitioningScheme::Approximate { alpha: 1e-3 }
        );
    }

    #[test]
    fn test_negative_alpha_rejected() {
        let result = Partitioning::new(arr1(&[0.0]), arr2(&[[1.0]]), -0.1);
        assert!(matches!(
            result,
            Err(AcqError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let result = Partitioning::new(arr1(&[0.0, 0.0]), arr2(&[[1.0]]), 0.0);
        assert!(matches!(result, Err(AcqError::UnsupportedShape(_))));
    }

    #[test]
    fn test_pareto_filter_drops_dominated_and_below_ref() {
        let ref_point = arr1(&[0.0, 0.0]);
        // (1,1) is dominated by (2,2); (-1,5) is below the reference point.
        let y = arr2(&[[1.0, 1.0], [2.0, 2.0], [-1.0, 5.0], [3.0, 1.0]]);
        let part = Partitioning::new(ref_point, y, 0.0).expect("valid");
        assert_eq!(part.pareto_y(), &arr2(&[[2.0, 2.0], [3.0, 1.0]]));
    }

    #[test]
    fn test_default_alpha_thresholds() {
        assert_eq!(default_partitioning_alpha(2), 0.0);
        assert_eq!(default_partitioning_alpha(4), 0.0);
        assert!(default_partitioning_alpha(5) > 0.0);
        assert!(default_partitioning_alpha(6) > default_partitioning_alpha(5));
    }
}
