//! Errors in asynchronous training.
use thiserror::Error;

/// Errors in asynchronous training.
#[derive(Error, Debug)]
pub enum BorderAsyncTrainerError {
    /// An actor thread returned an error, e.g., an environment failed.
    #[error("Actor {id} failed: {message}")]
    ActorFailed {
        /// Index of the actor.
        id: usize,
        /// Description of the error.
        message: String,
    },

    /// An actor thread panicked.
    #[error("Actor {0} panicked")]
    ActorPanicked(usize),

    /// Every actor dropped its sender without sending the end marker.
    #[error("All actors disconnected from the transition queue without finishing")]
    ActorsDisconnected,

    /// A loss became NaN or infinite, parameters were not updated.
    #[error("Non-finite loss {loss} after {opt_steps} optimization steps")]
    NonFiniteLoss {
        /// Number of optimization steps completed before the failure.
        opt_steps: usize,
        /// Value of the loss.
        loss: f32,
    },

    /// The gradient norm became NaN or infinite, parameters were not updated.
    #[error("Non-finite gradient norm {norm} after {opt_steps} optimization steps")]
    NonFiniteGradient {
        /// Number of optimization steps completed before the failure.
        opt_steps: usize,
        /// Global norm of the gradients.
        norm: f32,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
