//! Multi-fidelity cost models and fidelity transforms
//!
//! Cost-aware acquisition divides expected improvement by the evaluation
//! cost, modeled here as affine in the fidelity parameters. The two
//! transforms (trace-observation expansion and target-fidelity projection)
//! are handed to the acquisition function as opaque callables.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{AcqError, Result};

/// Evaluation cost affine in the fidelity parameters:
/// `cost(x) = fixed_cost + sum_d w_d * x[d]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffineFidelityCostModel {
    fidelity_weights: BTreeMap<usize, f64>,
    fixed_cost: f64,
}

impl AffineFidelityCostModel {
    pub fn new(fidelity_weights: BTreeMap<usize, f64>, fixed_cost: f64) -> Self {
        Self {
            fidelity_weights,
            fixed_cost,
        }
    }

    pub fn fixed_cost(&self) -> f64 {
        self.fixed_cost
    }

    pub fn fidelity_weights(&self) -> &BTreeMap<usize, f64> {
        &self.fidelity_weights
    }

    /// Per-point evaluation cost over an `n x d` candidate batch.
    pub fn cost(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if let Some(&bad) = self.fidelity_weights.keys().find(|&&d| d >= x.ncols()) {
            return Err(AcqError::UnsupportedShape(format!(
                "fidelity dimension {bad} out of range for {}-dimensional candidates",
                x.ncols()
            )));
        }
        let costs = x
            .rows()
            .into_iter()
            .map(|row| {
                self.fixed_cost
                    + self
                        .fidelity_weights
                        .iter()
                        .map(|(&d, &w)| w * row[d])
                        .sum::<f64>()
            })
            .collect();
        Ok(Array1::from_vec(costs))
    }
}

/// Cost-aware utility weighting improvements by inverse evaluation cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverseCostWeightedUtility {
    cost_model: AffineFidelityCostModel,
}

impl InverseCostWeightedUtility {
    pub fn new(cost_model: AffineFidelityCostModel) -> Self {
        Self { cost_model }
    }

    pub fn cost_model(&self) -> &AffineFidelityCostModel {
        &self.cost_model
    }

    /// Inverse-cost weights per candidate. Nonpositive costs have no
    /// meaningful inverse weighting and are rejected.
    pub fn weights(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let cost = self.cost_model.cost(x)?;
        if cost.iter().any(|&c| c <= 0.0) {
            return Err(AcqError::UnsupportedConfiguration(
                "inverse cost weighting requires strictly positive costs".to_string(),
            ));
        }
        Ok(cost.mapv(|c| 1.0 / c))
    }

    /// Improvement values scaled by inverse cost.
    pub fn weighted(&self, deltas: &Array1<f64>, x: &Array2<f64>) -> Result<Array1<f64>> {
        let weights = self.weights(x)?;
        if deltas.len() != weights.len() {
            return Err(AcqError::UnsupportedShape(format!(
                "{} improvement values for {} candidates",
                deltas.len(),
                weights.len()
            )));
        }
        Ok(deltas * &weights)
    }
}

/// Opaque candidate-batch transform handed to multi-fidelity acquisition
/// functions (trace expansion or target-fidelity projection).
#[derive(Clone)]
pub struct FidelityTransform {
    inner: Arc<dyn Fn(&Array2<f64>) -> Array2<f64> + Send + Sync>,
}

impl FidelityTransform {
    pub fn new(f: impl Fn(&Array2<f64>) -> Array2<f64> + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    pub fn apply(&self, x: &Array2<f64>) -> Array2<f64> {
        (self.inner)(x)
    }
}

impl fmt::Debug for FidelityTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FidelityTransform")
    }
}

/// Expand a candidate batch with trace observations at lower fidelities.
///
/// For each trace level `t` in `0..=num_trace_obs` the batch is repeated
/// with its fidelity dimensions scaled by `(num_trace_obs + 1 - t) /
/// (num_trace_obs + 1)`; level zero keeps the candidates unchanged.
pub fn expand_trace_observations(
    x: &Array2<f64>,
    fidelity_dims: &[usize],
    num_trace_obs: usize,
) -> Array2<f64> {
    if num_trace_obs == 0 {
        return x.clone();
    }
    let levels = num_trace_obs + 1;
    let mut expanded = Array2::zeros((x.nrows() * levels, x.ncols()));
    for level in 0..levels {
        let scale = (levels - level) as f64 / levels as f64;
        for (i, row) in x.rows().into_iter().enumerate() {
            let mut out = expanded.row_mut(level * x.nrows() + i);
            out.assign(&row);
            for &d in fidelity_dims {
                if let Some(v) = out.get_mut(d) {
                    *v *= scale;
                }
            }
        }
    }
    expanded
}

/// Project a candidate batch to the target fidelities by overwriting the
/// fidelity dimensions with their target values.
pub fn project_to_target_fidelity(
    x: &Array2<f64>,
    target_fidelities: &BTreeMap<usize, f64>,
) -> Array2<f64> {
    let mut projected = x.clone();
    for mut row in projected.rows_mut() {
        for (&d, &value) in target_fidelities {
            if let Some(v) = row.get_mut(d) {
                *v = value;
            }
        }
    }
    projected
}
