//! Narrow model interface
//!
//! The surrogate model is an external collaborator. Input construction only
//! ever asks it one question: the posterior at a set of points.

use ndarray::Array2;

/// Posterior summary at a batch of query points.
#[derive(Debug, Clone)]
pub struct Posterior {
    /// Posterior mean, `n x m`
    pub mean: Array2<f64>,
}

/// A fitted probabilistic model exposing posterior queries.
pub trait Model {
    /// Posterior at the `n x d` query points.
    fn posterior(&self, x: &Array2<f64>) -> Posterior;
}
