//! Nested single-point optimization for knowledge-gradient baselines
//!
//! Knowledge-gradient acquisition needs the current best achievable value
//! under the model. This module builds a surrogate acquisition (posterior
//! mean for scalarized objectives, simple regret with a sampler for Monte
//! Carlo objectives), optionally pins a subset of input dimensions, rewrites
//! linear constraints into the sparse per-row form the external optimizer
//! consumes, and invokes that optimizer for a single best point.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AcqError, Result};
use crate::model::Model;
use crate::objective::Objective;
use crate::sampling::Sampler;

/// Line-search method requested from the external optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineSearchMethod {
    #[default]
    LbfgsB,
    Slsqp,
}

impl std::fmt::Display for LineSearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineSearchMethod::LbfgsB => f.write_str("L-BFGS-B"),
            LineSearchMethod::Slsqp => f.write_str("SLSQP"),
        }
    }
}

/// Numeric options forwarded to the external optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerOptions {
    pub num_restarts: usize,
    pub raw_samples: usize,
    pub batch_limit: usize,
    pub maxiter: usize,
    pub nonnegative: bool,
    pub method: LineSearchMethod,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            num_restarts: 60,
            raw_samples: 1024,
            batch_limit: 8,
            maxiter: 200,
            nonnegative: false,
            method: LineSearchMethod::LbfgsB,
        }
    }
}

/// Acquisition surrogate optimized in the nested problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurrogateAcqf {
    /// Analytic path for scalarizing objectives.
    PosteriorMean { objective: Objective },
    /// Monte Carlo path: simple regret under a sampler.
    SimpleRegret {
        objective: Objective,
        sampler: Sampler,
    },
}

/// Input dimensions held fixed during the nested optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedFeatures {
    pub columns: Vec<usize>,
    pub values: Vec<f64>,
}

/// One linear inequality in sparse form: `sum_j coefficients[j] *
/// x[indices[j]] >= rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseInequality {
    pub indices: Vec<usize>,
    pub coefficients: Vec<f64>,
    pub rhs: f64,
}

/// Full request handed to the external single-best-point optimizer.
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub acqf: SurrogateAcqf,
    /// Bounds over the free dimensions, `2 x d_free` (row 0 lower, row 1 upper).
    pub bounds: Array2<f64>,
    /// Dimensions excluded from `bounds` and held fixed inside the surrogate.
    pub fixed_features: Option<FixedFeatures>,
    pub q: usize,
    pub num_restarts: usize,
    pub raw_samples: usize,
    pub batch_limit: usize,
    pub maxiter: usize,
    pub nonnegative: bool,
    pub method: LineSearchMethod,
    pub inequality_constraints: Option<Vec<SparseInequality>>,
}

/// External numerical optimizer entry point.
pub trait CandidateOptimizer {
    /// Optimize the surrogate acquisition, returning candidate points
    /// (`q x d_free`) and their acquisition values (`q`).
    fn optimize_acqf(
        &self,
        model: &dyn Model,
        request: &OptimizeRequest,
    ) -> Result<(Array2<f64>, Array1<f64>)>;
}

/// Knobs for [`optimize_objective`] beyond model/objective/bounds.
#[derive(Debug, Clone)]
pub struct ObjectiveOptimizationConfig {
    /// Linear constraints `A x <= b` over the input space.
    pub linear_constraints: Option<(Array2<f64>, Array1<f64>)>,
    /// Feature assignments held fixed during generation.
    pub fixed_features: Option<BTreeMap<usize, f64>>,
    pub qmc: bool,
    pub mc_samples: usize,
    pub seed_inner: Option<u64>,
    pub options: OptimizerOptions,
}

impl Default for ObjectiveOptimizationConfig {
    fn default() -> Self {
        Self {
            linear_constraints: None,
            fixed_features: None,
            qmc: true,
            mc_samples: 512,
            seed_inner: None,
            options: OptimizerOptions::default(),
        }
    }
}

/// Optimize an objective under the given model for a single best point.
///
/// `bounds` is `2 x d` with lower bounds in row 0 and upper bounds in
/// row 1. Returns the best input location and its objective value.
pub fn optimize_objective(
    model: &dyn Model,
    optimizer: &dyn CandidateOptimizer,
    objective: &Objective,
    bounds: &Array2<f64>,
    q: usize,
    config: &ObjectiveOptimizationConfig,
) -> Result<(Array1<f64>, f64)> {
    if bounds.nrows() != 2 {
        return Err(AcqError::UnsupportedShape(format!(
            "bounds must be 2 x d, got {} rows",
            bounds.nrows()
        )));
    }

    let acqf = if objective.is_scalarizing() {
        SurrogateAcqf::PosteriorMean {
            objective: objective.clone(),
        }
    } else {
        SurrogateAcqf::SimpleRegret {
            objective: objective.clone(),
            sampler: Sampler::inner_sampler(config.mc_samples, config.qmc, config.seed_inner),
        }
    };

    let (free_bounds, fixed) = match &config.fixed_features {
        Some(assignments) if !assignments.is_empty() => {
            if let Some(&bad) = assignments.keys().find(|&&d| d >= bounds.ncols()) {
                return Err(AcqError::UnsupportedConfiguration(format!(
                    "fixed feature {bad} out of range for {}-dimensional bounds",
                    bounds.ncols()
                )));
            }
            let free_dims: Vec<usize> = (0..bounds.ncols())
                .filter(|d| !assignments.contains_key(d))
                .collect();
            let fixed = FixedFeatures {
                columns: assignments.keys().copied().collect(),
                values: assignments.values().copied().collect(),
            };
            (bounds.select(Axis(1), &free_dims), Some(fixed))
        }
        _ => (bounds.clone(), None),
    };

    let inequality_constraints = config
        .linear_constraints
        .as_ref()
        .map(|(a, b)| sparsify_linear_constraints(a, b))
        .transpose()?;

    let request = OptimizeRequest {
        acqf,
        bounds: free_bounds,
        fixed_features: fixed,
        q,
        num_restarts: config.options.num_restarts,
        raw_samples: config.options.raw_samples,
        batch_limit: config.options.batch_limit,
        maxiter: config.options.maxiter,
        nonnegative: config.options.nonnegative,
        method: config.options.method,
        inequality_constraints,
    };

    let (points, values) = optimizer.optimize_acqf(model, &request)?;
    if points.nrows() == 0 || values.is_empty() {
        return Err(AcqError::UnsupportedConfiguration(
            "optimizer returned no candidates".to_string(),
        ));
    }

    let best = values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    Ok((points.row(best).to_owned(), values[best]))
}

/// Rewrite dense `A x <= b` into sparse per-row `(indices, coefficients,
/// rhs)` form with the optimizer's `>=` sign convention.
pub fn sparsify_linear_constraints(
    a: &Array2<f64>,
    b: &Array1<f64>,
) -> Result<Vec<SparseInequality>> {
    if a.nrows() != b.len() {
        return Err(AcqError::UnsupportedShape(format!(
            "constraint matrix has {} rows but rhs has {} entries",
            a.nrows(),
            b.len()
        )));
    }
    Ok(a.rows()
        .into_iter()
        .zip(b.iter())
        .map(|(row, &rhs)| {
            let indices: Vec<usize> = row
                .iter()
                .enumerate()
                .filter_map(|(j, &c)| (c != 0.0).then_some(j))
                .collect();
            let coefficients = indices.iter().map(|&j| -row[j]).collect();
            SparseInequality {
                indices,
                coefficients,
                rhs: -rhs,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::FixedMeanModel;
    use ndarray::{arr1, arr2};
    use std::cell::RefCell;

    /// Optimizer stub that records the request and returns fixed candidates.
    struct RecordingOptimizer {
        request: RefCell<Option<OptimizeRequest>>,
        points: Array2<f64>,
        values: Array1<f64>,
    }

    impl RecordingOptimizer {
        fn returning(points: Array2<f64>, values: Array1<f64>) -> Self {
            Self {
                request: RefCell::new(None),
                points,
                values,
            }
        }
    }

    impl CandidateOptimizer for RecordingOptimizer {
        fn optimize_acqf(
            &self,
            _model: &dyn Model,
            request: &OptimizeRequest,
        ) -> Result<(Array2<f64>, Array1<f64>)> {
            *self.request.borrow_mut() = Some(request.clone());
            Ok((self.points.clone(), self.values.clone()))
        }
    }

    fn model() -> FixedMeanModel {
        FixedMeanModel {
            mean: arr2(&[[0.0]]),
        }
    }

    #[test]
    fn test_surrogate_selection_by_objective_kind() {
        let optimizer =
            RecordingOptimizer::returning(arr2(&[[0.5, 0.5]]), arr1(&[1.0]));
        let bounds = arr2(&[[0.0, 0.0], [1.0, 1.0]]);

        let scalarized = Objective::scalarized(arr1(&[1.0, -1.0]));
        optimize_objective(
            &model(),
            &optimizer,
            &scalarized,
            &bounds,
            1,
            &ObjectiveOptimizationConfig::default(),
        )
        .expect("optimizer returns a candidate");
        let request = optimizer.request.borrow().clone().expect("recorded");
        assert!(matches!(request.acqf, SurrogateAcqf::PosteriorMean { .. }));

        optimize_objective(
            &model(),
            &optimizer,
            &Objective::Identity,
            &bounds,
            1,
            &ObjectiveOptimizationConfig::default(),
        )
        .expect("optimizer returns a candidate");
        let request = optimizer.request.borrow().clone().expect("recorded");
        match request.acqf {
            SurrogateAcqf::SimpleRegret { sampler, .. } => {
                assert!(sampler.is_qmc());
                assert_eq!(sampler.num_samples(), 512);
            }
            other => panic!("expected simple regret surrogate, got {other:?}"),
        }
    }

    #[test]
    fn test_default_numeric_options_forwarded() {
        let optimizer = RecordingOptimizer::returning(arr2(&[[0.5]]), arr1(&[1.0]));
        let bounds = arr2(&[[0.0], [1.0]]);
        optimize_objective(
            &model(),
            &optimizer,
            &Objective::Identity,
            &bounds,
            1,
            &ObjectiveOptimizationConfig::default(),
        )
        .expect("optimizer returns a candidate");
        let request = optimizer.request.borrow().clone().expect("recorded");
        assert_eq!(request.num_restarts, 60);
        assert_eq!(request.raw_samples, 1024);
        assert_eq!(request.batch_limit, 8);
        assert_eq!(request.maxiter, 200);
        assert!(!request.nonnegative);
        assert_eq!(request.method, LineSearchMethod::LbfgsB);
        assert_eq!(request.method.to_string(), "L-BFGS-B");
    }

    #[test]
    fn test_fixed_features_restrict_bounds() {
        let optimizer = RecordingOptimizer::returning(arr2(&[[0.5]]), arr1(&[1.0]));
        let bounds = arr2(&[[0.0, -1.0, 0.0], [1.0, 2.0, 1.0]]);
        let config = ObjectiveOptimizationConfig {
            fixed_features: Some([(1, 0.25)].into_iter().collect()),
            ..Default::default()
        };
        optimize_objective(&model(), &optimizer, &Objective::Identity, &bounds, 1, &config)
            .expect("optimizer returns a candidate");
        let request = optimizer.request.borrow().clone().expect("recorded");
        assert_eq!(request.bounds, arr2(&[[0.0, 0.0], [1.0, 1.0]]));
        let fixed = request.fixed_features.expect("fixed features forwarded");
        assert_eq!(fixed.columns, vec![1]);
        assert_eq!(fixed.values, vec![0.25]);
    }

    #[test]
    fn test_fixed_feature_out_of_range() {
        let optimizer = RecordingOptimizer::returning(arr2(&[[0.5]]), arr1(&[1.0]));
        let bounds = arr2(&[[0.0], [1.0]]);
        let config = ObjectiveOptimizationConfig {
            fixed_features: Some([(3, 0.5)].into_iter().collect()),
            ..Default::default()
        };
        let result =
            optimize_objective(&model(), &optimizer, &Objective::Identity, &bounds, 1, &config);
        assert!(matches!(
            result,
            Err(AcqError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_linear_constraints_sparsified() {
        // x_0 + 2 x_2 <= 3 over a 3-dimensional space.
        let a = arr2(&[[1.0, 0.0, 2.0]]);
        let b = arr1(&[3.0]);
        let rows = sparsify_linear_constraints(&a, &b).expect("shapes match");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].indices, vec![0, 2]);
        assert_eq!(rows[0].coefficients, vec![-1.0, -2.0]);
        assert_eq!(rows[0].rhs, -3.0);
    }

    #[test]
    fn test_best_candidate_returned() {
        let optimizer = RecordingOptimizer::returning(
            arr2(&[[0.1], [0.9], [0.5]]),
            arr1(&[1.0, 5.0, 3.0]),
        );
        let bounds = arr2(&[[0.0], [1.0]]);
        let (point, value) = optimize_objective(
            &model(),
            &optimizer,
            &Objective::Identity,
            &bounds,
            1,
            &ObjectiveOptimizationConfig::default(),
        )
        .expect("optimizer returns candidates");
        assert_eq!(point, arr1(&[0.9]));
        assert_eq!(value, 5.0);
    }

    #[test]
    fn test_malformed_bounds_rejected() {
        let optimizer = RecordingOptimizer::returning(arr2(&[[0.5]]), arr1(&[1.0]));
        let bounds = arr2(&[[0.0]]);
        let result = optimize_objective(
            &model(),
            &optimizer,
            &Objective::Identity,
            &bounds,
            1,
            &ObjectiveOptimizationConfig::default(),
        );
        assert!(matches!(result, Err(AcqError::UnsupportedShape(_))));
    }
}
