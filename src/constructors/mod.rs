//! Per-acquisition-function input derivation
//!
//! Each constructor is a pure function from a uniform "training data +
//! model" description to the named-argument bundle its acquisition function
//! expects. Shared best-observed-value helpers live here; the variants are
//! grouped by family the way the acquisition functions themselves are.

mod analytic;
mod knowledge_gradient;
mod monte_carlo;
mod multi_fidelity;
mod multi_objective;

pub use analytic::{
    construct_inputs_analytic_base, construct_inputs_best_f, construct_inputs_constrained_ei,
    construct_inputs_noisy_ei, construct_inputs_ucb,
};
pub use knowledge_gradient::construct_inputs_qkg;
pub use monte_carlo::{
    construct_inputs_mc_base, construct_inputs_qei, construct_inputs_qmes, construct_inputs_qnei,
    construct_inputs_qpi, construct_inputs_qucb,
};
pub use multi_fidelity::{
    construct_inputs_mf_base, construct_inputs_qmfkg, construct_inputs_qmfmes,
};
pub use multi_objective::{
    construct_inputs_ehvi, construct_inputs_qehvi, construct_inputs_qnehvi,
};

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};

use crate::constraints::OutcomeConstraints;
use crate::data::TrainingData;
use crate::error::{AcqError, Result};
use crate::model::Model;
use crate::objective::Objective;
use crate::optimize::{CandidateOptimizer, ObjectiveOptimizationConfig, OptimizerOptions};
use crate::sampling::Sampler;

/// Uniform description every constructor derives its arguments from.
pub struct ConstructionArgs<'a> {
    pub model: &'a dyn Model,
    pub training_data: &'a TrainingData,
    /// External optimizer, required only by knowledge-gradient variants.
    pub optimizer: Option<&'a dyn CandidateOptimizer>,
    pub options: AcqfOptions,
}

impl<'a> ConstructionArgs<'a> {
    pub fn new(model: &'a dyn Model, training_data: &'a TrainingData) -> Self {
        Self {
            model,
            training_data,
            optimizer: None,
            options: AcqfOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AcqfOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_optimizer(mut self, optimizer: &'a dyn CandidateOptimizer) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Shallow copy with different options, for constructors that delegate
    /// to a base constructor under adjusted inputs.
    pub(crate) fn reborrow_with(&self, options: AcqfOptions) -> ConstructionArgs<'a> {
        ConstructionArgs {
            model: self.model,
            training_data: self.training_data,
            optimizer: self.optimizer,
            options,
        }
    }
}

/// Optional knobs a caller may supply to any constructor. Unset fields fall
/// back to the documented per-variant defaults.
#[derive(Debug, Clone)]
pub struct AcqfOptions {
    pub objective: Option<Objective>,
    pub maximize: bool,
    /// Caller override for the best observed value.
    pub best_f: Option<f64>,
    /// Mean/covariance trade-off for confidence-bound variants.
    pub beta: Option<f64>,
    /// Temperature of the sigmoid step approximation in qPI.
    pub tau: Option<f64>,
    pub num_fantasies: Option<usize>,
    /// Points submitted for evaluation but not yet observed.
    pub x_pending: Option<Array2<f64>>,
    pub sampler: Option<Sampler>,
    pub x_baseline: Option<Array2<f64>>,
    pub prune_baseline: Option<bool>,
    /// Per-objective thresholds for hypervolume variants.
    pub objective_thresholds: Option<Array1<f64>>,
    pub outcome_constraints: Option<OutcomeConstraints>,
    /// Partitioning approximation level; zero forces the exact algorithm.
    pub alpha: Option<f64>,
    /// Numerical-stability epsilon for constraint sigmoids.
    pub eta: Option<f64>,
    pub mc_samples: Option<usize>,
    pub qmc: bool,
    /// Caller-supplied posterior-mean estimate over observed inputs.
    pub y_pmean: Option<Array2<f64>>,
    /// Per-dimension search bounds.
    pub bounds: Option<Vec<(f64, f64)>>,
    pub candidate_size: Option<usize>,
    pub target_fidelities: Option<BTreeMap<usize, f64>>,
    pub fidelity_weights: Option<BTreeMap<usize, f64>>,
    pub cost_intercept: f64,
    pub num_trace_observations: usize,
    pub fixed_features: Option<BTreeMap<usize, f64>>,
    /// Linear constraints `A x <= b` for the nested optimization.
    pub linear_constraints: Option<(Array2<f64>, Array1<f64>)>,
    pub optimizer_options: OptimizerOptions,
    pub seed_inner: Option<u64>,
    pub cache_pending: Option<bool>,
    pub max_iep: Option<usize>,
    pub incremental_nehvi: Option<bool>,
}

impl Default for AcqfOptions {
    fn default() -> Self {
        Self {
            objective: None,
            maximize: true,
            best_f: None,
            beta: None,
            tau: None,
            num_fantasies: None,
            x_pending: None,
            sampler: None,
            x_baseline: None,
            prune_baseline: None,
            objective_thresholds: None,
            outcome_constraints: None,
            alpha: None,
            eta: None,
            mc_samples: None,
            qmc: true,
            y_pmean: None,
            bounds: None,
            candidate_size: None,
            target_fidelities: None,
            fidelity_weights: None,
            cost_intercept: 1.0,
            num_trace_observations: 0,
            fixed_features: None,
            linear_constraints: None,
            optimizer_options: OptimizerOptions::default(),
            seed_inner: None,
            cache_pending: None,
            max_iep: None,
            incremental_nehvi: None,
        }
    }
}

impl AcqfOptions {
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn with_maximize(mut self, maximize: bool) -> Self {
        self.maximize = maximize;
        self
    }

    pub fn with_best_f(mut self, best_f: f64) -> Self {
        self.best_f = Some(best_f);
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn with_x_pending(mut self, x_pending: Array2<f64>) -> Self {
        self.x_pending = Some(x_pending);
        self
    }

    pub fn with_x_baseline(mut self, x_baseline: Array2<f64>) -> Self {
        self.x_baseline = Some(x_baseline);
        self
    }

    pub fn with_objective_thresholds(mut self, thresholds: Array1<f64>) -> Self {
        self.objective_thresholds = Some(thresholds);
        self
    }

    pub fn with_outcome_constraints(mut self, constraints: OutcomeConstraints) -> Self {
        self.outcome_constraints = Some(constraints);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_bounds(mut self, bounds: Vec<(f64, f64)>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_target_fidelities(mut self, target: BTreeMap<usize, f64>) -> Self {
        self.target_fidelities = Some(target);
        self
    }

    pub fn with_fidelity_weights(mut self, weights: BTreeMap<usize, f64>) -> Self {
        self.fidelity_weights = Some(weights);
        self
    }

    pub fn with_num_fantasies(mut self, num_fantasies: usize) -> Self {
        self.num_fantasies = Some(num_fantasies);
        self
    }

    /// Nested-optimization knobs derived from these options.
    pub(crate) fn objective_optimization_config(&self) -> ObjectiveOptimizationConfig {
        ObjectiveOptimizationConfig {
            linear_constraints: self.linear_constraints.clone(),
            fixed_features: self.fixed_features.clone(),
            qmc: self.qmc,
            mc_samples: self.mc_samples.unwrap_or(512),
            seed_inner: self.seed_inner,
            options: self.optimizer_options.clone(),
        }
    }
}

/// Best observed value for analytic acquisition functions.
///
/// Requires a block design. A scalarizing objective reduces the outcomes
/// first; otherwise the data must be single-output.
pub fn get_best_f_analytic(
    training_data: &TrainingData,
    objective: Option<&Objective>,
) -> Result<f64> {
    let y = training_data.y()?;
    if let Some(obj @ Objective::Scalarized { .. }) = objective {
        let reduced = obj.evaluate(&y)?;
        return Ok(column_max(&reduced));
    }
    if y.ncols() > 1 {
        return Err(AcqError::UnsupportedShape(
            "analytic acquisition functions only work with multi-output data \
             when given a scalarizing objective"
                .to_string(),
        ));
    }
    Ok(column_max(&y))
}

/// Best observed value for Monte Carlo acquisition functions.
///
/// Requires a block design. Without an objective the data must be
/// single-output and the identity objective is assumed.
pub fn get_best_f_mc(
    training_data: &TrainingData,
    objective: Option<&Objective>,
) -> Result<f64> {
    let y = training_data.y()?;
    let objective = match objective {
        Some(obj) => obj.clone(),
        None => {
            if y.ncols() > 1 {
                return Err(AcqError::UnsupportedShape(
                    "acquisition functions require an objective when used with \
                     multi-output models (except multi-objective acquisition functions)"
                        .to_string(),
                ));
            }
            Objective::Identity
        }
    };
    let values = objective.evaluate(&y)?;
    Ok(column_max(&values))
}

fn column_max(values: &Array2<f64>) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use ndarray::Array2;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_best_f_is_observed_maximum(
            values in proptest::collection::vec(-100.0f64..100.0, 1..50)
        ) {
            let n = values.len();
            let x = Array2::zeros((n, 1));
            let y = Array2::from_shape_vec((n, 1), values.clone()).expect("shape matches");
            let data = TrainingData::from_block_design(x, y).expect("valid data");
            let expected = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            prop_assert_eq!(get_best_f_analytic(&data, None).expect("block design"), expected);
            prop_assert_eq!(get_best_f_mc(&data, None).expect("block design"), expected);
        }
    }
}
