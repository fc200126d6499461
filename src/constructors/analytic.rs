//! Input constructors for analytic acquisition functions

use crate::bundle::{ArgValue, InputBundle};
use crate::error::{AcqError, Result};

use super::{get_best_f_analytic, ConstructionArgs};

/// Inputs for basic analytic acquisition functions (posterior mean): the
/// objective is passed through unchanged.
pub fn construct_inputs_analytic_base(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    Ok(InputBundle::new().set("objective", ArgValue::from(args.options.objective.clone())))
}

/// Inputs for acquisition functions requiring `best_f` (expected improvement,
/// probability of improvement).
pub fn construct_inputs_best_f(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_analytic_base(args)?;
    let best_f = match args.options.best_f {
        Some(best_f) => best_f,
        None => get_best_f_analytic(args.training_data, args.options.objective.as_ref())?,
    };
    bundle.insert("best_f", best_f);
    bundle.insert("maximize", args.options.maximize);
    Ok(bundle)
}

/// Inputs for the upper confidence bound, with the mean/covariance trade-off
/// coefficient defaulting to 0.2.
pub fn construct_inputs_ucb(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_analytic_base(args)?;
    bundle.insert("beta", args.options.beta.unwrap_or(0.2));
    bundle.insert("maximize", args.options.maximize);
    Ok(bundle)
}

/// Constrained expected improvement has no input constructor yet; the best
/// feasible point still needs to be derived from the training data.
pub fn construct_inputs_constrained_ei(_args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    Err(AcqError::NotImplemented("ConstrainedExpectedImprovement"))
}

/// Inputs for noisy expected improvement: the observed design doubles as the
/// fantasy baseline, so only block designs are supported.
pub fn construct_inputs_noisy_ei(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    if !args.training_data.is_block_design() {
        return Err(AcqError::NotBlockDesign);
    }
    Ok(InputBundle::new()
        .set("x_observed", args.training_data.x().clone())
        .set(
            "num_fantasies",
            args.options.num_fantasies.unwrap_or(20) as i64,
        )
        .set("maximize", args.options.maximize))
}
