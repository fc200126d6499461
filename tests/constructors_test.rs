//! End-to-end tests for the constructor registry
//!
//! Drives the registry the way an optimization loop does: look up a
//! constructor by acquisition kind, hand it the uniform training-data +
//! model description, and expand the resulting bundle.

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use ndarray::{arr1, arr2, Array1, Array2};

use adquirir::bundle::ArgValue;
use adquirir::constructors::{AcqfOptions, ConstructionArgs};
use adquirir::error::AcqError;
use adquirir::model::{Model, Posterior};
use adquirir::objective::Objective;
use adquirir::optimize::{CandidateOptimizer, OptimizeRequest};
use adquirir::registry::{AcqfKind, ConstructorRegistry};
use adquirir::data::TrainingData;

/// Surrogate stub whose posterior mean is its training outcomes.
struct EchoModel {
    mean: Array2<f64>,
}

impl Model for EchoModel {
    fn posterior(&self, _x: &Array2<f64>) -> Posterior {
        Posterior {
            mean: self.mean.clone(),
        }
    }
}

/// Optimizer stub returning the center of the bounds with a fixed value.
struct CenterOptimizer {
    value: f64,
}

impl CandidateOptimizer for CenterOptimizer {
    fn optimize_acqf(
        &self,
        _model: &dyn Model,
        request: &OptimizeRequest,
    ) -> adquirir::Result<(Array2<f64>, Array1<f64>)> {
        let d = request.bounds.ncols();
        let center: Vec<f64> = (0..d)
            .map(|j| (request.bounds[[0, j]] + request.bounds[[1, j]]) / 2.0)
            .collect();
        Ok((
            Array2::from_shape_vec((1, d), center).expect("center shape"),
            arr1(&[self.value]),
        ))
    }
}

fn single_output_data() -> TrainingData {
    let x = arr2(&[[0.0, 1.0], [0.5, 1.0], [1.0, 1.0]]);
    let y = arr2(&[[1.0], [3.0], [2.0]]);
    TrainingData::from_block_design(x, y).expect("valid data")
}

fn two_output_data() -> TrainingData {
    let x = arr2(&[[0.0], [0.5], [1.0]]);
    let y = arr2(&[[1.0, 4.0], [3.0, 6.0], [2.0, 5.0]]);
    TrainingData::from_block_design(x, y).expect("valid data")
}

fn non_block_data() -> TrainingData {
    let xs = vec![arr2(&[[0.0], [1.0]]), arr2(&[[0.5]])];
    let ys = vec![arr2(&[[1.0], [2.0]]), arr2(&[[3.0]])];
    TrainingData::new(xs, ys).expect("valid data")
}

#[test]
fn registry_drives_expected_improvement_end_to_end() {
    let registry = ConstructorRegistry::with_defaults();
    let data = single_output_data();
    let model = EchoModel {
        mean: data.y().expect("block design"),
    };

    for kind in [AcqfKind::ExpectedImprovement, AcqfKind::ProbabilityOfImprovement] {
        let constructor = registry.lookup(kind).expect("default registered");
        let bundle = constructor(&ConstructionArgs::new(&model, &data)).expect("block design");
        assert_relative_eq!(
            bundle
                .get("best_f")
                .and_then(ArgValue::as_float)
                .expect("best_f present"),
            3.0
        );
        assert_eq!(
            bundle.get("maximize").and_then(ArgValue::as_bool),
            Some(true)
        );
    }
}

#[test]
fn monte_carlo_variants_share_mc_base() {
    let registry = ConstructorRegistry::with_defaults();
    let data = single_output_data();
    let model = EchoModel {
        mean: data.y().expect("block design"),
    };

    let constructor = registry
        .lookup(AcqfKind::QExpectedImprovement)
        .expect("default registered");
    let bundle = constructor(
        &ConstructionArgs::new(&model, &data)
            .with_options(AcqfOptions::default().with_x_pending(arr2(&[[0.3, 1.0]]))),
    )
    .expect("block design");
    assert_relative_eq!(
        bundle
            .get("best_f")
            .and_then(ArgValue::as_float)
            .expect("best_f present"),
        3.0
    );
    assert_eq!(
        bundle.get("x_pending").and_then(ArgValue::as_tensor2),
        Some(&arr2(&[[0.3, 1.0]]))
    );

    let constructor = registry
        .lookup(AcqfKind::QSimpleRegret)
        .expect("default registered");
    let bundle = constructor(&ConstructionArgs::new(&model, &data)).expect("pass-through");
    assert!(bundle.contains("objective"));
    assert!(bundle.contains("sampler"));
}

#[test]
fn multi_output_without_objective_fails_everywhere_it_should() {
    let registry = ConstructorRegistry::with_defaults();
    let data = two_output_data();
    let model = EchoModel {
        mean: data.y().expect("block design"),
    };

    for kind in [
        AcqfKind::ExpectedImprovement,
        AcqfKind::QExpectedImprovement,
        AcqfKind::QProbabilityOfImprovement,
    ] {
        let constructor = registry.lookup(kind).expect("default registered");
        assert!(
            matches!(
                constructor(&ConstructionArgs::new(&model, &data)),
                Err(AcqError::UnsupportedShape(_))
            ),
            "{kind} should reject ambiguous multi-output data"
        );
    }

    // A column-restricted identity objective resolves the ambiguity.
    let constructor = registry
        .lookup(AcqfKind::QExpectedImprovement)
        .expect("default registered");
    let bundle = constructor(&ConstructionArgs::new(&model, &data).with_options(
        AcqfOptions::default().with_objective(Objective::VectorIdentity {
            outcomes: Some(vec![1]),
        }),
    ))
    .expect("column objective");
    assert_relative_eq!(
        bundle
            .get("best_f")
            .and_then(ArgValue::as_float)
            .expect("best_f present"),
        6.0
    );
}

#[test]
fn non_block_design_fails_best_f_and_noisy_ei() {
    let registry = ConstructorRegistry::with_defaults();
    let data = non_block_data();
    let model = EchoModel {
        mean: arr2(&[[0.0]]),
    };

    for kind in [
        AcqfKind::ExpectedImprovement,
        AcqfKind::ProbabilityOfImprovement,
        AcqfKind::NoisyExpectedImprovement,
        AcqfKind::QExpectedImprovement,
        AcqfKind::QNoisyExpectedImprovement,
        AcqfKind::QProbabilityOfImprovement,
    ] {
        let constructor = registry.lookup(kind).expect("default registered");
        assert!(
            matches!(
                constructor(&ConstructionArgs::new(&model, &data)),
                Err(AcqError::NotBlockDesign)
            ),
            "{kind} should reject non-block designs"
        );
    }
}

#[test]
fn constrained_ei_stays_unimplemented() {
    let registry = ConstructorRegistry::with_defaults();
    let data = single_output_data();
    let model = EchoModel {
        mean: data.y().expect("block design"),
    };
    let constructor = registry
        .lookup(AcqfKind::ConstrainedExpectedImprovement)
        .expect("default registered");
    assert!(matches!(
        constructor(&ConstructionArgs::new(&model, &data)),
        Err(AcqError::NotImplemented("ConstrainedExpectedImprovement"))
    ));
}

#[test]
fn hypervolume_constructors_build_partitionings() {
    let registry = ConstructorRegistry::with_defaults();
    let data = two_output_data();
    let model = EchoModel {
        mean: data.y().expect("block design"),
    };

    for (alpha, expect_exact) in [(0.0, true), (1e-3, false)] {
        let constructor = registry
            .lookup(AcqfKind::ExpectedHypervolumeImprovement)
            .expect("default registered");
        let bundle = constructor(
            &ConstructionArgs::new(&model, &data).with_options(
                AcqfOptions::default()
                    .with_objective_thresholds(arr1(&[0.5, 1.5]))
                    .with_alpha(alpha),
            ),
        )
        .expect("thresholds given");
        let part = bundle
            .get("partitioning")
            .and_then(ArgValue::as_partitioning)
            .expect("partitioning present");
        assert_eq!(part.is_exact(), expect_exact);
        assert_eq!(
            bundle.get("ref_point").and_then(ArgValue::as_tensor1),
            Some(&arr1(&[0.5, 1.5]))
        );
    }

    let constructor = registry
        .lookup(AcqfKind::QNoisyExpectedHypervolumeImprovement)
        .expect("default registered");
    let bundle = constructor(
        &ConstructionArgs::new(&model, &data)
            .with_options(AcqfOptions::default().with_objective_thresholds(arr1(&[0.5, 1.5]))),
    )
    .expect("thresholds given");
    assert_eq!(
        bundle.get("prune_baseline").and_then(ArgValue::as_bool),
        Some(true)
    );
}

#[test]
fn multi_fidelity_key_validation_and_transforms() {
    let registry = ConstructorRegistry::with_defaults();
    let data = single_output_data();
    let model = EchoModel {
        mean: data.y().expect("block design"),
    };
    let optimizer = CenterOptimizer { value: 3.5 };

    let target: BTreeMap<usize, f64> = [(0, 1.0), (1, 1.0)].into_iter().collect();
    let mismatched: BTreeMap<usize, f64> = [(0, 1.0)].into_iter().collect();

    let constructor = registry
        .lookup(AcqfKind::QMultiFidelityKnowledgeGradient)
        .expect("default registered");
    let args = ConstructionArgs::new(&model, &data)
        .with_options(
            AcqfOptions::default()
                .with_objective(Objective::Identity)
                .with_bounds(vec![(0.0, 1.0), (0.0, 1.0)])
                .with_target_fidelities(target.clone())
                .with_fidelity_weights(mismatched),
        )
        .with_optimizer(&optimizer);
    assert!(matches!(
        constructor(&args),
        Err(AcqError::MismatchedFidelityKeys { .. })
    ));

    let args = ConstructionArgs::new(&model, &data)
        .with_options(
            AcqfOptions::default()
                .with_objective(Objective::Identity)
                .with_bounds(vec![(0.0, 1.0), (0.0, 1.0)])
                .with_target_fidelities(target.clone()),
        )
        .with_optimizer(&optimizer);
    let bundle = constructor(&args).expect("matching keys");

    let project = bundle
        .get("project")
        .and_then(ArgValue::as_transform)
        .expect("project present");
    assert_eq!(project.apply(&arr2(&[[0.2, 0.4]])), arr2(&[[1.0, 1.0]]));
    let expand = bundle
        .get("expand")
        .and_then(ArgValue::as_transform)
        .expect("expand present");
    // No trace observations requested: expansion is the identity.
    assert_eq!(expand.apply(&arr2(&[[0.2, 0.4]])), arr2(&[[0.2, 0.4]]));
    assert_relative_eq!(
        bundle
            .get("current_value")
            .and_then(ArgValue::as_float)
            .expect("seeded by the nested optimization"),
        3.5
    );
}

#[test]
fn knowledge_gradient_without_optimizer_is_rejected() {
    let registry = ConstructorRegistry::with_defaults();
    let data = single_output_data();
    let model = EchoModel {
        mean: data.y().expect("block design"),
    };
    let constructor = registry
        .lookup(AcqfKind::QKnowledgeGradient)
        .expect("default registered");
    let args = ConstructionArgs::new(&model, &data).with_options(
        AcqfOptions::default()
            .with_objective(Objective::Identity)
            .with_bounds(vec![(0.0, 1.0), (0.0, 1.0)]),
    );
    assert!(matches!(
        constructor(&args),
        Err(AcqError::UnsupportedConfiguration(_))
    ));
}
