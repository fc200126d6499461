//! Outcome-constraint transforms
//!
//! Outcome constraints are given as `A . y <= b` over the outcome vector.
//! Hypervolume-based acquisition functions consume them as slack transforms
//! (negative slack means feasible), and input construction uses them to
//! restrict posterior-mean estimates to feasible points.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{AcqError, Result};

/// Linear outcome constraints `A . y <= b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeConstraints {
    /// Coefficient matrix, `k x m`
    a: Array2<f64>,
    /// Right-hand side, `k`
    b: Array1<f64>,
}

impl OutcomeConstraints {
    pub fn new(a: Array2<f64>, b: Array1<f64>) -> Result<Self> {
        if a.nrows() != b.len() {
            return Err(AcqError::UnsupportedShape(format!(
                "constraint matrix has {} rows but rhs has {} entries",
                a.nrows(),
                b.len()
            )));
        }
        Ok(Self { a, b })
    }

    pub fn num_constraints(&self) -> usize {
        self.a.nrows()
    }

    /// Per-constraint slack `A . y_i - b` at each outcome row; a point is
    /// feasible when every slack is non-positive.
    pub fn slack(&self, y: &Array2<f64>) -> Result<Array2<f64>> {
        if y.ncols() != self.a.ncols() {
            return Err(AcqError::UnsupportedShape(format!(
                "constraints defined over {} outputs but data has {}",
                self.a.ncols(),
                y.ncols()
            )));
        }
        let mut slack = y.dot(&self.a.t());
        for mut row in slack.rows_mut() {
            row -= &self.b;
        }
        Ok(slack)
    }

    /// Feasibility mask over outcome rows.
    pub fn feasible_rows(&self, y: &Array2<f64>) -> Result<Vec<bool>> {
        let slack = self.slack(y)?;
        Ok(slack
            .rows()
            .into_iter()
            .map(|row| row.iter().all(|&s| s <= 0.0))
            .collect())
    }

    /// Rows of `y` that satisfy every constraint.
    pub fn filter_feasible(&self, y: &Array2<f64>) -> Result<Array2<f64>> {
        let mask = self.feasible_rows(y)?;
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        Ok(y.select(ndarray::Axis(0), &indices))
    }
}
