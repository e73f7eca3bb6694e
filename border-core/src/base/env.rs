//! Environment.
use super::{Obs, Step};
use anyhow::Result;

/// Represents an environment with a discrete action space, typically an MDP.
///
/// An environment is driven by [`Env::reset`] and [`Env::step`]. After a step
/// returning [`Step::is_done`], the caller is responsible for resetting the
/// environment before stepping it again.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation of a new episode.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performs an environment step with the action of the given index.
    fn step(&mut self, act: usize) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Returns the number of discrete actions.
    fn n_actions(&self) -> usize;
}
