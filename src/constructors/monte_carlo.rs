//! Input constructors for Monte Carlo acquisition functions

use ndarray::Array2;
use rand::Rng;

use crate::bundle::{ArgValue, InputBundle};
use crate::error::{AcqError, Result};

use super::{get_best_f_mc, ConstructionArgs};

/// Inputs for basic MC acquisition functions (simple regret): objective,
/// pending points, and sampler are passed through unchanged.
pub fn construct_inputs_mc_base(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    Ok(InputBundle::new()
        .set("objective", ArgValue::from(args.options.objective.clone()))
        .set("x_pending", ArgValue::from(args.options.x_pending.clone()))
        .set("sampler", ArgValue::from(args.options.sampler)))
}

/// Inputs for qExpectedImprovement.
pub fn construct_inputs_qei(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_mc_base(args)?;
    let best_f = match args.options.best_f {
        Some(best_f) => best_f,
        None => get_best_f_mc(args.training_data, args.options.objective.as_ref())?,
    };
    bundle.insert("best_f", best_f);
    Ok(bundle)
}

/// Inputs for qNoisyExpectedImprovement. The baseline falls back to the
/// training inputs, which requires a block design.
pub fn construct_inputs_qnei(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_mc_base(args)?;
    let x_baseline = match &args.options.x_baseline {
        Some(x_baseline) => x_baseline.clone(),
        None => {
            if !args.training_data.is_block_design() {
                return Err(AcqError::NotBlockDesign);
            }
            args.training_data.x().clone()
        }
    };
    bundle.insert("x_baseline", x_baseline);
    bundle.insert(
        "prune_baseline",
        args.options.prune_baseline.unwrap_or(false),
    );
    Ok(bundle)
}

/// Inputs for qProbabilityOfImprovement, with the sigmoid temperature
/// defaulting to 1e-3.
pub fn construct_inputs_qpi(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_mc_base(args)?;
    let best_f = match args.options.best_f {
        Some(best_f) => best_f,
        None => get_best_f_mc(args.training_data, args.options.objective.as_ref())?,
    };
    bundle.insert("tau", args.options.tau.unwrap_or(1e-3));
    bundle.insert("best_f", best_f);
    Ok(bundle)
}

/// Inputs for qUpperConfidenceBound, with the trade-off coefficient
/// defaulting to 0.2.
pub fn construct_inputs_qucb(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_mc_base(args)?;
    bundle.insert("beta", args.options.beta.unwrap_or(0.2));
    Ok(bundle)
}

/// Inputs for qMaxValueEntropy: a uniform candidate set is drawn inside the
/// search bounds (1000 points unless overridden).
pub fn construct_inputs_qmes(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_mc_base(args)?;
    let bounds = args
        .options
        .bounds
        .as_ref()
        .ok_or(AcqError::MissingInput("bounds"))?;
    let candidate_size = args.options.candidate_size.unwrap_or(1000);

    let mut rng = rand::rng();
    let mut candidate_set = Array2::zeros((candidate_size, bounds.len()));
    for mut row in candidate_set.rows_mut() {
        for (j, &(low, high)) in bounds.iter().enumerate() {
            row[j] = low + rng.random::<f64>() * (high - low);
        }
    }

    bundle.insert("candidate_set", candidate_set);
    bundle.insert("maximize", args.options.maximize);
    Ok(bundle)
}
