//! Constructor registry keyed by acquisition-function identity
//!
//! The registry is built once at startup (typically via [`ConstructorRegistry::with_defaults`])
//! and read-only afterwards. Registration is additive and permanent for the
//! process: there is no removal or override.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bundle::InputBundle;
use crate::constructors::{
    construct_inputs_analytic_base, construct_inputs_best_f, construct_inputs_constrained_ei,
    construct_inputs_ehvi, construct_inputs_mc_base, construct_inputs_noisy_ei,
    construct_inputs_qehvi, construct_inputs_qei, construct_inputs_qkg, construct_inputs_qmes,
    construct_inputs_qmfkg, construct_inputs_qmfmes, construct_inputs_qnehvi,
    construct_inputs_qnei, construct_inputs_qpi, construct_inputs_qucb, construct_inputs_ucb,
    ConstructionArgs,
};
use crate::error::{AcqError, Result};

/// The closed set of acquisition-function identities the registry serves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AcqfKind {
    PosteriorMean,
    ExpectedImprovement,
    ProbabilityOfImprovement,
    UpperConfidenceBound,
    ConstrainedExpectedImprovement,
    NoisyExpectedImprovement,
    QSimpleRegret,
    QExpectedImprovement,
    QNoisyExpectedImprovement,
    QProbabilityOfImprovement,
    QUpperConfidenceBound,
    QMaxValueEntropy,
    ExpectedHypervolumeImprovement,
    QExpectedHypervolumeImprovement,
    QNoisyExpectedHypervolumeImprovement,
    QKnowledgeGradient,
    QMultiFidelityKnowledgeGradient,
    QMultiFidelityMaxValueEntropy,
}

impl AcqfKind {
    /// All kinds, in registration order.
    pub const ALL: [AcqfKind; 18] = [
        AcqfKind::PosteriorMean,
        AcqfKind::ExpectedImprovement,
        AcqfKind::ProbabilityOfImprovement,
        AcqfKind::UpperConfidenceBound,
        AcqfKind::ConstrainedExpectedImprovement,
        AcqfKind::NoisyExpectedImprovement,
        AcqfKind::QSimpleRegret,
        AcqfKind::QExpectedImprovement,
        AcqfKind::QNoisyExpectedImprovement,
        AcqfKind::QProbabilityOfImprovement,
        AcqfKind::QUpperConfidenceBound,
        AcqfKind::QMaxValueEntropy,
        AcqfKind::ExpectedHypervolumeImprovement,
        AcqfKind::QExpectedHypervolumeImprovement,
        AcqfKind::QNoisyExpectedHypervolumeImprovement,
        AcqfKind::QKnowledgeGradient,
        AcqfKind::QMultiFidelityKnowledgeGradient,
        AcqfKind::QMultiFidelityMaxValueEntropy,
    ];
}

impl fmt::Display for AcqfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcqfKind::PosteriorMean => "PosteriorMean",
            AcqfKind::ExpectedImprovement => "ExpectedImprovement",
            AcqfKind::ProbabilityOfImprovement => "ProbabilityOfImprovement",
            AcqfKind::UpperConfidenceBound => "UpperConfidenceBound",
            AcqfKind::ConstrainedExpectedImprovement => "ConstrainedExpectedImprovement",
            AcqfKind::NoisyExpectedImprovement => "NoisyExpectedImprovement",
            AcqfKind::QSimpleRegret => "qSimpleRegret",
            AcqfKind::QExpectedImprovement => "qExpectedImprovement",
            AcqfKind::QNoisyExpectedImprovement => "qNoisyExpectedImprovement",
            AcqfKind::QProbabilityOfImprovement => "qProbabilityOfImprovement",
            AcqfKind::QUpperConfidenceBound => "qUpperConfidenceBound",
            AcqfKind::QMaxValueEntropy => "qMaxValueEntropy",
            AcqfKind::ExpectedHypervolumeImprovement => "ExpectedHypervolumeImprovement",
            AcqfKind::QExpectedHypervolumeImprovement => "qExpectedHypervolumeImprovement",
            AcqfKind::QNoisyExpectedHypervolumeImprovement => {
                "qNoisyExpectedHypervolumeImprovement"
            }
            AcqfKind::QKnowledgeGradient => "qKnowledgeGradient",
            AcqfKind::QMultiFidelityKnowledgeGradient => "qMultiFidelityKnowledgeGradient",
            AcqfKind::QMultiFidelityMaxValueEntropy => "qMultiFidelityMaxValueEntropy",
        };
        f.write_str(name)
    }
}

/// An input constructor: a pure function from the uniform description to
/// the acquisition function's named-argument bundle.
pub type Constructor = fn(&ConstructionArgs<'_>) -> Result<InputBundle>;

/// Registry mapping acquisition kinds to their input constructors.
#[derive(Debug, Clone, Default)]
pub struct ConstructorRegistry {
    constructors: BTreeMap<AcqfKind, Constructor>,
}

impl ConstructorRegistry {
    /// Empty registry, for callers composing their own constructor set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the constructor for every [`AcqfKind`].
    pub fn with_defaults() -> Self {
        let defaults: [(AcqfKind, Constructor); 18] = [
            (AcqfKind::PosteriorMean, construct_inputs_analytic_base),
            (AcqfKind::ExpectedImprovement, construct_inputs_best_f),
            (AcqfKind::ProbabilityOfImprovement, construct_inputs_best_f),
            (AcqfKind::UpperConfidenceBound, construct_inputs_ucb),
            (
                AcqfKind::ConstrainedExpectedImprovement,
                construct_inputs_constrained_ei,
            ),
            (AcqfKind::NoisyExpectedImprovement, construct_inputs_noisy_ei),
            (AcqfKind::QSimpleRegret, construct_inputs_mc_base),
            (AcqfKind::QExpectedImprovement, construct_inputs_qei),
            (AcqfKind::QNoisyExpectedImprovement, construct_inputs_qnei),
            (AcqfKind::QProbabilityOfImprovement, construct_inputs_qpi),
            (AcqfKind::QUpperConfidenceBound, construct_inputs_qucb),
            (AcqfKind::QMaxValueEntropy, construct_inputs_qmes),
            (
                AcqfKind::ExpectedHypervolumeImprovement,
                construct_inputs_ehvi,
            ),
            (
                AcqfKind::QExpectedHypervolumeImprovement,
                construct_inputs_qehvi,
            ),
            (
                AcqfKind::QNoisyExpectedHypervolumeImprovement,
                construct_inputs_qnehvi,
            ),
            (AcqfKind::QKnowledgeGradient, construct_inputs_qkg),
            (
                AcqfKind::QMultiFidelityKnowledgeGradient,
                construct_inputs_qmfkg,
            ),
            (
                AcqfKind::QMultiFidelityMaxValueEntropy,
                construct_inputs_qmfmes,
            ),
        ];
        // A fresh map and distinct kinds cannot collide, so insert directly.
        let mut registry = Self::new();
        for (kind, constructor) in defaults {
            registry.constructors.insert(kind, constructor);
        }
        registry
    }

    /// Register an input constructor for `kind`. Fails if one is already
    /// registered; registration is permanent for the process.
    pub fn register(&mut self, kind: AcqfKind, constructor: Constructor) -> Result<()> {
        if self.constructors.contains_key(&kind) {
            return Err(AcqError::DuplicateConstructor(kind.to_string()));
        }
        self.constructors.insert(kind, constructor);
        Ok(())
    }

    /// Look up the input constructor for `kind`.
    pub fn lookup(&self, kind: AcqfKind) -> Result<Constructor> {
        self.constructors
            .get(&kind)
            .copied()
            .ok_or_else(|| AcqError::ConstructorNotRegistered(kind.to_string()))
    }

    /// Registered kinds, in order.
    pub fn kinds(&self) -> impl Iterator<Item = AcqfKind> + '_ {
        self.constructors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
