//! Interface of neural networks used in the actor-critic agent.
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::VarBuilder;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Policy/value network not owning its [`VarMap`] internally.
///
/// The network maps a batch of observations to the logits of the action distribution and
/// the state value. Parameters are created through the given [`VarBuilder`], so that every
/// network built on the same [`VarMap`] shares them.
///
/// Implementations must be [`Send`] and [`Sync`], since actor threads run forward passes
/// while the learner updates the parameters.
///
/// [`VarMap`]: candle_nn::VarMap
pub trait A2cNet: Send + Sync + 'static {
    /// Configuration from which [`A2cNet`] is constructed.
    type Config: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + 'static;

    /// Builds [`A2cNet`] with [`VarBuilder`] and [`A2cNet::Config`].
    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Returns the logits of shape `[batch_size, n_actions]` and the state values of
    /// shape `[batch_size]`.
    fn forward(&self, xs: &Tensor) -> Result<(Tensor, Tensor)>;
}
