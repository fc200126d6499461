//! Input constructors for multi-fidelity acquisition functions

use std::collections::BTreeMap;

use crate::bundle::{ArgValue, InputBundle};
use crate::cost::{
    expand_trace_observations, project_to_target_fidelity, AffineFidelityCostModel,
    FidelityTransform, InverseCostWeightedUtility,
};
use crate::error::{AcqError, Result};

use super::knowledge_gradient::optimize_current_value;
use super::{construct_inputs_qkg, construct_inputs_qmes, ConstructionArgs};

/// Base inputs shared by multi-fidelity acquisition functions: target
/// fidelities, a cost-aware utility over an affine cost model, and the
/// trace-expansion / target-projection transforms.
///
/// Fidelity-weight keys must match the target-fidelity keys exactly; weights
/// default to 1.0 per target when omitted.
pub fn construct_inputs_mf_base(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let target_fidelities = args
        .options
        .target_fidelities
        .clone()
        .ok_or(AcqError::MissingInput("target_fidelities"))?;

    let fidelity_weights: BTreeMap<usize, f64> = match &args.options.fidelity_weights {
        Some(weights) => weights.clone(),
        None => target_fidelities.keys().map(|&f| (f, 1.0)).collect(),
    };

    let target_keys: Vec<usize> = target_fidelities.keys().copied().collect();
    let weight_keys: Vec<usize> = fidelity_weights.keys().copied().collect();
    if target_keys != weight_keys {
        return Err(AcqError::MismatchedFidelityKeys {
            target: target_keys,
            weights: weight_keys,
        });
    }

    let cost_aware_utility = InverseCostWeightedUtility::new(AffineFidelityCostModel::new(
        fidelity_weights,
        args.options.cost_intercept,
    ));

    let fidelity_dims: Vec<usize> = target_keys;
    let num_trace_obs = args.options.num_trace_observations;
    let expand = FidelityTransform::new(move |x| {
        expand_trace_observations(x, &fidelity_dims, num_trace_obs)
    });

    let project_targets = target_fidelities.clone();
    let project =
        FidelityTransform::new(move |x| project_to_target_fidelity(x, &project_targets));

    Ok(InputBundle::new()
        .set("target_fidelities", ArgValue::Fidelities(target_fidelities))
        .set("cost_aware_utility", ArgValue::CostUtility(cost_aware_utility))
        .set("expand", ArgValue::Transform(expand))
        .set("project", ArgValue::Transform(project)))
}

/// Inputs for qMultiFidelityKnowledgeGradient: the multi-fidelity base
/// merged over the knowledge-gradient inputs.
pub fn construct_inputs_qmfkg(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_mf_base(args)?;
    bundle.merge(construct_inputs_qkg(args)?);
    Ok(bundle)
}

/// Inputs for qMultiFidelityMaxValueEntropy: the multi-fidelity base, the
/// max-value-entropy candidate set, and the optimized current value.
pub fn construct_inputs_qmfmes(args: &ConstructionArgs<'_>) -> Result<InputBundle> {
    let mut bundle = construct_inputs_mf_base(args)?;
    bundle.merge(construct_inputs_qmes(args)?);
    bundle.insert("current_value", optimize_current_value(args)?);
    Ok(bundle)
}
