//! Sampler descriptors for Monte Carlo acquisition functions
//!
//! Sampler implementations live with the acquisition functions; this crate
//! only decides which sampler to request and with what parameters.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Base-sample source for Monte Carlo acquisition functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sampler {
    /// Independent draws from a standard normal.
    IidNormal { num_samples: usize, seed: Option<u64> },
    /// Quasi Monte Carlo draws through a scrambled Sobol sequence.
    SobolQmcNormal { num_samples: usize, seed: Option<u64> },
}

impl Sampler {
    /// Default sampler for hypervolume-based acquisition functions: Sobol
    /// QMC when `qmc` is set, IID normal otherwise, with a fresh random seed.
    pub fn default_sampler(mc_samples: usize, qmc: bool) -> Self {
        let seed = rand::rng().random_range(1..10_000);
        if qmc {
            Sampler::SobolQmcNormal {
                num_samples: mc_samples,
                seed: Some(seed),
            }
        } else {
            Sampler::IidNormal {
                num_samples: mc_samples,
                seed: Some(seed),
            }
        }
    }

    /// Sampler for the nested knowledge-gradient optimization, seeded
    /// deterministically when an inner seed is given.
    pub fn inner_sampler(mc_samples: usize, qmc: bool, seed: Option<u64>) -> Self {
        if qmc {
            Sampler::SobolQmcNormal {
                num_samples: mc_samples,
                seed,
            }
        } else {
            Sampler::IidNormal {
                num_samples: mc_samples,
                seed,
            }
        }
    }

    /// Number of base samples drawn per evaluation.
    pub fn num_samples(&self) -> usize {
        match self {
            Sampler::IidNormal { num_samples, .. } => *num_samples,
            Sampler::SobolQmcNormal { num_samples, .. } => *num_samples,
        }
    }

    /// Whether this sampler uses quasi Monte Carlo draws.
    pub fn is_qmc(&self) -> bool {
        matches!(self, Sampler::SobolQmcNormal { .. })
    }
}
