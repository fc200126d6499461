//! # adquirir
//!
//! Acquisition-function input construction for Bayesian optimization: a
//! registry mapping acquisition-function identities to pure functions that
//! derive their runtime argument bundles from a uniform "training data +
//! model" description.
//!
//! The acquisition functions themselves, the probabilistic model, the
//! numerical optimizer, and the samplers are external collaborators reached
//! only through narrow interfaces; this crate owns the configuration
//! derivation between them.
//!
//! # Example
//!
//! ```ignore
//! use adquirir::constructors::ConstructionArgs;
//! use adquirir::registry::{AcqfKind, ConstructorRegistry};
//!
//! let registry = ConstructorRegistry::with_defaults();
//! let constructor = registry.lookup(AcqfKind::QExpectedImprovement)?;
//! let inputs = constructor(&ConstructionArgs::new(&model, &training_data))?;
//! ```
//!
//! # References
//!
//! \[1\] Frazier et al. (2009) - The Knowledge-Gradient Policy for
//! Correlated Normal Beliefs
//!
//! \[2\] Daulton et al. (2020) - Differentiable Expected Hypervolume
//! Improvement for Parallel Multi-Objective Bayesian Optimization
//!
//! \[3\] Eriksson & Jankowiak (2021) - High-Dimensional Bayesian
//! Optimization with Sparse Axis-Aligned Subspaces

pub mod bundle;
pub mod constraints;
pub mod constructors;
pub mod cost;
pub mod data;
pub mod error;
pub mod model;
pub mod objective;
pub mod optimize;
pub mod partitioning;
pub mod registry;
pub mod sampling;

pub use bundle::{ArgValue, InputBundle};
pub use constraints::OutcomeConstraints;
pub use constructors::{
    get_best_f_analytic, get_best_f_mc, AcqfOptions, ConstructionArgs,
};
pub use cost::{
    expand_trace_observations, project_to_target_fidelity, AffineFidelityCostModel,
    FidelityTransform, InverseCostWeightedUtility,
};
pub use data::TrainingData;
pub use error::{AcqError, Result};
pub use model::{Model, Posterior};
pub use objective::Objective;
pub use optimize::{
    optimize_objective, CandidateOptimizer, FixedFeatures, LineSearchMethod,
    ObjectiveOptimizationConfig, OptimizeRequest, OptimizerOptions, SparseInequality,
    SurrogateAcqf,
};
pub use partitioning::{default_partitioning_alpha, Partitioning, PartitioningScheme};
pub use registry::{AcqfKind, Constructor, ConstructorRegistry};
pub use sampling::Sampler;
