use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`MlpA2cNet`](super::MlpA2cNet).
pub struct MlpA2cNetConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) n_actions: usize,
    pub(super) input_scale: f64,
}

impl MlpA2cNetConfig {
    /// Creates configuration of MLP.
    ///
    /// * `in_dim` - Number of values of an observation, which is flattened.
    /// * `units` - Numbers of units of the hidden layers shared by both heads.
    pub fn new(in_dim: usize, units: Vec<usize>, n_actions: usize) -> Self {
        Self {
            in_dim,
            units,
            n_actions,
            input_scale: 1.0 / 256.0,
        }
    }

    /// Sets the factor multiplied to observations.
    pub fn input_scale(mut self, v: f64) -> Self {
        self.input_scale = v;
        self
    }
}
