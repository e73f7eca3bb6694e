//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum BorderError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// An environment failed to perform a step or a reset.
    #[error("Environment failure: {0}")]
    EnvFailure(String),

    /// The shape of an observation does not match the expected shape.
    #[error("Observation shape mismatch: expected {expected:?}, got {actual:?}")]
    ObsShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        actual: Vec<usize>,
    },

    /// The policy returned a number of actions different from the number of observations.
    #[error("Policy returned {actual} actions for {expected} observations")]
    ActionCountMismatch {
        /// Number of observations given to the policy.
        expected: usize,
        /// Number of actions returned.
        actual: usize,
    },

    /// A loss became NaN or infinite.
    #[error("Non-finite loss: {0}")]
    NonFiniteLoss(f32),

    /// The global norm of the gradients became NaN or infinite.
    #[error("Non-finite gradient norm: {0}")]
    NonFiniteGradient(f32),
}
