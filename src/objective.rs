//! Acquisition objectives as a closed set of tagged variants
//!
//! The behavior genuinely branches by variant (scalarizing objectives take
//! the analytic path, identity-like objectives the Monte Carlo path), so the
//! variants are explicit rather than an open trait.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AcqError, Result};

/// Transform from raw outcomes to the quantity being optimized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    /// Single-output pass-through (the default when no objective is given).
    Identity,
    /// Affine reduction of multi-output data to a scalar objective.
    Scalarized { weights: Array1<f64>, offset: f64 },
    /// Multi-output identity, optionally restricted to a subset of outcome
    /// columns. Used by hypervolume-based acquisition functions.
    VectorIdentity { outcomes: Option<Vec<usize>> },
}

impl Objective {
    /// Scalarized objective with zero offset.
    pub fn scalarized(weights: Array1<f64>) -> Self {
        Objective::Scalarized {
            weights,
            offset: 0.0,
        }
    }

    /// Whether this objective reduces outcomes to a scalar analytically.
    pub fn is_scalarizing(&self) -> bool {
        matches!(self, Objective::Scalarized { .. })
    }

    /// Whether this objective takes the Monte Carlo (sample-level) path.
    pub fn is_monte_carlo(&self) -> bool {
        !self.is_scalarizing()
    }

    /// Apply the objective to an `n x m` outcome matrix, yielding `n x k`
    /// objective values (`k = 1` for scalar objectives).
    pub fn evaluate(&self, y: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            Objective::Identity => {
                if y.ncols() != 1 {
                    return Err(AcqError::UnsupportedShape(format!(
                        "identity objective requires single-output data, got {} outputs",
                        y.ncols()
                    )));
                }
                Ok(y.clone())
            }
            Objective::Scalarized { weights, offset } => {
                if weights.len() != y.ncols() {
                    return Err(AcqError::UnsupportedShape(format!(
                        "scalarization weights have {} entries but data has {} outputs",
                        weights.len(),
                        y.ncols()
                    )));
                }
                let reduced = y.dot(weights) + *offset;
                Ok(reduced.insert_axis(Axis(1)))
            }
            Objective::VectorIdentity { outcomes } => match outcomes {
                None => Ok(y.clone()),
                Some(indices) => {
                    if let Some(&bad) = indices.iter().find(|&&i| i >= y.ncols()) {
                        return Err(AcqError::UnsupportedShape(format!(
                            "outcome index {bad} out of range for {} outputs",
                            y.ncols()
                        )));
                    }
                    Ok(y.select(Axis(1), indices))
                }
            },
        }
    }

    /// Apply the objective to a vector of per-outcome thresholds. Used to
    /// derive the reference point for hypervolume-improvement variants.
    pub fn apply_to_thresholds(&self, thresholds: &Array1<f64>) -> Result<Array1<f64>> {
        let row = thresholds.clone().insert_axis(Axis(0));
        let mapped = self.evaluate(&row)?;
        Ok(mapped.row(0).to_owned())
    }
}
