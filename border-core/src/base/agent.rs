//! Agent.
use super::{Env, Policy};
use crate::{record::Record, Transition};
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
pub trait Agent<E: Env>: Policy<E> {
    /// Performs an optimization step on the given batch of transitions.
    ///
    /// Returns the values to be recorded, e.g., losses and gradient statistics.
    fn opt_with_record(&mut self, batch: &[Transition<E::Obs>]) -> Result<Record>;

    /// Returns the number of optimization steps performed so far.
    fn n_opts(&self) -> usize;

    /// Returns statistics of the parameters for diagnostics.
    ///
    /// The default implementation returns an empty record.
    fn param_stats(&self) -> Result<Record> {
        Ok(Record::empty())
    }

    /// Save the parameters of the agent in the given directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
