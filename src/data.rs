//! Training data container with block-design gating
//!
//! Outcomes are stored per output dimension, each with the inputs it was
//! observed at. A design is "block" when every outcome shares the same
//! inputs; derivations that extract a best observed value only make sense
//! under that invariant and fail hard without it.

use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AcqError, Result};

/// Per-outcome training data for a surrogate model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingData {
    /// Input design per outcome, each `n_i x d`
    xs: Vec<Array2<f64>>,
    /// Observed values per outcome, each `n_i x 1`
    ys: Vec<Array2<f64>>,
}

impl TrainingData {
    /// Create training data from per-outcome designs.
    pub fn new(xs: Vec<Array2<f64>>, ys: Vec<Array2<f64>>) -> Result<Self> {
        if xs.is_empty() {
            return Err(AcqError::InvalidData(
                "at least one outcome is required".to_string(),
            ));
        }
        if xs.len() != ys.len() {
            return Err(AcqError::InvalidData(format!(
                "got {} input designs but {} outcome columns",
                xs.len(),
                ys.len()
            )));
        }
        for (i, (x, y)) in xs.iter().zip(ys.iter()).enumerate() {
            if x.nrows() == 0 {
                return Err(AcqError::InvalidData(format!(
                    "outcome {i} has no observations"
                )));
            }
            if x.nrows() != y.nrows() {
                return Err(AcqError::InvalidData(format!(
                    "outcome {i}: {} inputs but {} observations",
                    x.nrows(),
                    y.nrows()
                )));
            }
            if y.ncols() != 1 {
                return Err(AcqError::InvalidData(format!(
                    "outcome {i} must be a single column, got {} columns",
                    y.ncols()
                )));
            }
        }
        Ok(Self { xs, ys })
    }

    /// Create block-design training data from a shared input design `x`
    /// (`n x d`) and stacked outcomes `y` (`n x m`).
    pub fn from_block_design(x: Array2<f64>, y: Array2<f64>) -> Result<Self> {
        if y.ncols() == 0 {
            return Err(AcqError::InvalidData(
                "at least one outcome is required".to_string(),
            ));
        }
        let ys: Vec<Array2<f64>> = (0..y.ncols())
            .map(|j| y.column(j).to_owned().insert_axis(Axis(1)))
            .collect();
        let xs = vec![x; ys.len()];
        Self::new(xs, ys)
    }

    /// True when every outcome was observed at the same inputs.
    pub fn is_block_design(&self) -> bool {
        self.xs.iter().all(|x| *x == self.xs[0])
    }

    /// Shared input design (first outcome's inputs).
    pub fn x(&self) -> &Array2<f64> {
        &self.xs[0]
    }

    /// Stacked `n x m` outcome matrix. Requires a block design.
    pub fn y(&self) -> Result<Array2<f64>> {
        if !self.is_block_design() {
            return Err(AcqError::NotBlockDesign);
        }
        let views: Vec<_> = self.ys.iter().map(|y| y.view()).collect();
        concatenate(Axis(1), &views)
            .map_err(|e| AcqError::InvalidData(format!("cannot stack outcomes: {e}")))
    }

    /// Number of outcome dimensions.
    pub fn num_outputs(&self) -> usize {
        self.ys.len()
    }

    /// Input dimensionality.
    pub fn dim(&self) -> usize {
        self.xs[0].ncols()
    }

    /// Number of observations for the first outcome.
    pub fn num_points(&self) -> usize {
        self.xs[0].nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn block_data() -> TrainingData {
        let x = arr2(&[[0.0, 0.0], [0.5, 0.5], [1.0, 1.0]]);
        let y = arr2(&[[1.0], [3.0], [2.0]]);
        TrainingData::from_block_design(x, y).expect("valid data")
    }

    #[test]
    fn test_block_design_detected() {
        let data = block_data();
        assert!(data.is_block_design());
        assert_eq!(data.num_outputs(), 1);
        assert_eq!(data.num_points(), 3);
        assert_eq!(data.dim(), 2);
    }

    #[test]
    fn test_stacked_outcomes() {
        let x = arr2(&[[0.0], [1.0]]);
        let y = arr2(&[[1.0, 4.0], [2.0, 3.0]]);
        let data = TrainingData::from_block_design(x, y.clone()).expect("valid data");
        assert_eq!(data.num_outputs(), 2);
        assert_eq!(data.y().expect("block design"), y);
    }

    #[test]
    fn test_non_block_design_y_fails() {
        let xs = vec![arr2(&[[0.0], [1.0]]), arr2(&[[0.5]])];
        let ys = vec![arr2(&[[1.0], [2.0]]), arr2(&[[3.0]])];
        let data = TrainingData::new(xs, ys).expect("valid data");
        assert!(!data.is_block_design());
        assert!(matches!(data.y(), Err(AcqError::NotBlockDesign)));
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        let xs = vec![arr2(&[[0.0], [1.0]])];
        let ys = vec![arr2(&[[1.0]])];
        assert!(matches!(
            TrainingData::new(xs, ys),
            Err(AcqError::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            TrainingData::new(vec![], vec![]),
            Err(AcqError::InvalidData(_))
        ));
    }

    #[test]
    fn test_wide_outcome_column_rejected() {
        let xs = vec![arr2(&[[0.0], [1.0]])];
        let ys = vec![arr2(&[[1.0, 2.0], [3.0, 4.0]])];
        assert!(matches!(
            TrainingData::new(xs, ys),
            Err(AcqError::InvalidData(_))
        ));
    }
}
