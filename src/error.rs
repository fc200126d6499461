//! Error types for acquisition input construction

use thiserror::Error;

/// Errors raised while deriving acquisition-function inputs.
///
/// All preconditions fail synchronously with a specific variant. There is no
/// local recovery: the calling optimization loop decides whether to adjust
/// its inputs and retry at a higher level.
#[derive(Debug, Error)]
pub enum AcqError {
    #[error("Input constructor for acquisition kind `{0}` not registered")]
    ConstructorNotRegistered(String),

    #[error("Cannot register duplicate input constructor for acquisition kind `{0}`")]
    DuplicateConstructor(String),

    #[error("Only block designs are supported: every outcome must be observed at every input")]
    NotBlockDesign,

    #[error("Unsupported data shape: {0}")]
    UnsupportedShape(String),

    #[error("Input constructor for `{0}` is not implemented")]
    NotImplemented(&'static str),

    #[error("Must provide the same indices for target fidelities ({target:?}) and fidelity weights ({weights:?})")]
    MismatchedFidelityKeys {
        target: Vec<usize>,
        weights: Vec<usize>,
    },

    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid training data: {0}")]
    InvalidData(String),
}

/// Result type for input-construction operations
pub type Result<T> = std::result::Result<T, AcqError>;
