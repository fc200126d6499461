//! Input constructor for qKnowledgeGradient
//!
//! The knowledge gradient scores a candidate by the value of the best point
//! under the fantasized model, so construction runs a nested single-point
//! optimization to seed the `current_value` baseline.

use ndarray::Array2;

use crate::bundle::InputBundle;
use crate::error::{AcqError, Result};
use crate::optimize::optimize_objective;

use super::{construct_inputs_mc_base, ConstructionArgs};

/// Inputs for qKnowledgeGradient: MC base inputs plus the fantasy count
/// (default 64) and the optimized current value.
pub fn construct_inputs_qkg(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_mc_base(args)?;
    let current_value = optimize_current_value(args)?;
    bundle.insert(
        "num_fantasies",
        args.options.num_fantasies.unwrap_or(64) as i64,
    );
    bundle.insert("current_value", current_value);
    Ok(bundle)
}

/// Run the nested optimization for the best value currently achievable.
pub(crate) fn optimize_current_value(args: &ConstructionArgs<'_>) -> Result<f64> {
    let objective = args
        .options
        .objective
        .as_ref()
        .ok_or(AcqError::MissingInput("objective"))?;
    let bounds = args
        .options
        .bounds
        .as_ref()
        .ok_or(AcqError::MissingInput("bounds"))?;
    let optimizer = args.optimizer.ok_or_else(|| {
        AcqError::UnsupportedConfiguration(
            "knowledge-gradient input construction requires a candidate optimizer".to_string(),
        )
    })?;

    let bounds_t = bounds_matrix(bounds);
    let config = args.options.objective_optimization_config();
    let (_, current_value) =
        optimize_objective(args.model, optimizer, objective, &bounds_t, 1, &config)?;
    Ok(current_value)
}

/// Stack per-dimension `(low, high)` pairs into a `2 x d` bounds matrix.
fn bounds_matrix(bounds: &[(f64, f64)]) -> Array2<f64> {
    let mut matrix = Array2::zeros((2, bounds.len()));
    for (j, &(low, high)) in bounds.iter().enumerate() {
        matrix[[0, j]] = low;
        matrix[[1, j]] = high;
    }
    matrix
}
