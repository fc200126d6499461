//! Input constructors for hypervolume-improvement acquisition functions

use crate::bundle::{ArgValue, InputBundle};
use crate::error::{AcqError, Result};
use crate::objective::Objective;
use crate::partitioning::{default_partitioning_alpha, Partitioning};
use crate::sampling::Sampler;

use super::ConstructionArgs;

/// Inputs for ExpectedHypervolumeImprovement.
///
/// The reference point is the objective applied to the caller-supplied
/// thresholds; the partitioning is built over the posterior mean at the
/// observed inputs, exact when `alpha == 0` and approximate otherwise.
pub fn construct_inputs_ehvi(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let thresholds = args
        .options
        .objective_thresholds
        .as_ref()
        .ok_or(AcqError::MissingInput("objective_thresholds"))?;
    if args.options.outcome_constraints.is_some() {
        return Err(AcqError::UnsupportedConfiguration(
            "EHVI does not yet support outcome constraints".to_string(),
        ));
    }
    let num_objectives = thresholds.len();

    let objective = args
        .options
        .objective
        .clone()
        .unwrap_or(Objective::VectorIdentity { outcomes: None });
    let ref_point = objective.apply_to_thresholds(thresholds)?;

    let y_pmean = match &args.options.y_pmean {
        Some(y_pmean) => y_pmean.clone(),
        None => args.model.posterior(args.training_data.x()).mean,
    };

    let alpha = args
        .options
        .alpha
        .unwrap_or_else(|| default_partitioning_alpha(num_objectives));
    let partitioning = Partitioning::new(ref_point.clone(), objective.evaluate(&y_pmean)?, alpha)?;

    Ok(InputBundle::new()
        .set("ref_point", ref_point)
        .set("partitioning", ArgValue::Partitioning(partitioning))
        .set("objective", ArgValue::Objective(objective)))
}

/// Inputs for qExpectedHypervolumeImprovement.
///
/// Outcome constraints are passed through as slack transforms, and the
/// posterior-mean estimate handed to the partitioning is restricted to
/// feasible points first.
pub fn construct_inputs_qehvi(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let y_pmean_all = args.model.posterior(args.training_data.x()).mean;

    let cons_tfs = args.options.outcome_constraints.clone();
    let y_pmean = match &cons_tfs {
        Some(cons) => cons.filter_feasible(&y_pmean_all)?,
        None => y_pmean_all,
    };

    let objective = args
        .options
        .objective
        .clone()
        .unwrap_or(Objective::VectorIdentity { outcomes: None });

    // Delegate the reference point and partitioning to the EHVI constructor,
    // with the feasibility-adjusted posterior mean and constraints stripped.
    let mut ehvi_options = args.options.clone();
    ehvi_options.objective = Some(objective);
    ehvi_options.y_pmean = Some(y_pmean);
    ehvi_options.outcome_constraints = None;
    let ehvi_args = args.reborrow_with(ehvi_options);
    let mut bundle = construct_inputs_ehvi(&ehvi_args)?;

    let sampler = args.options.sampler.unwrap_or_else(|| {
        Sampler::default_sampler(args.options.mc_samples.unwrap_or(128), args.options.qmc)
    });

    bundle.insert("sampler", ArgValue::Sampler(sampler));
    bundle.insert("x_pending", ArgValue::from(args.options.x_pending.clone()));
    bundle.insert(
        "constraints",
        cons_tfs.map_or(ArgValue::None, ArgValue::Constraints),
    );
    bundle.insert("eta", args.options.eta.unwrap_or(1e-3));
    Ok(bundle)
}

/// Inputs for qNoisyExpectedHypervolumeImprovement.
pub fn construct_inputs_qnehvi(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let thresholds = args
        .options
        .objective_thresholds
        .as_ref()
        .ok_or(AcqError::MissingInput("objective_thresholds"))?;

    let objective = args
        .options
        .objective
        .clone()
        .unwrap_or(Objective::VectorIdentity { outcomes: None });
    let ref_point = objective.apply_to_thresholds(thresholds)?;

    let sampler = args.options.sampler.unwrap_or_else(|| {
        Sampler::default_sampler(args.options.mc_samples.unwrap_or(128), args.options.qmc)
    });

    let x_baseline = args
        .options
        .x_baseline
        .clone()
        .unwrap_or_else(|| args.training_data.x().clone());

    Ok(InputBundle::new()
        .set("ref_point", ref_point)
        .set("x_baseline", x_baseline)
        .set("sampler", ArgValue::Sampler(sampler))
        .set("objective", ArgValue::Objective(objective))
        .set(
            "constraints",
            args.options
                .outcome_constraints
                .clone()
                .map_or(ArgValue::None, ArgValue::Constraints),
        )
        .set("x_pending", ArgValue::from(args.options.x_pending.clone()))
        .set("eta", args.options.eta.unwrap_or(1e-3))
        .set("prune_baseline", args.options.prune_baseline.unwrap_or(true))
        .set("alpha", args.options.alpha.unwrap_or(0.0))
        .set("cache_pending", args.options.cache_pending.unwrap_or(true))
        .set("max_iep", args.options.max_iep.unwrap_or(0) as i64)
        .set(
            "incremental_nehvi",
            args.options.incremental_nehvi.unwrap_or(true),
        ))
}
