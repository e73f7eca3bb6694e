use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`AtariA2cNet`](super::AtariA2cNet).
pub struct AtariA2cNetConfig {
    /// Shape of an observation, `[channels, height, width]`.
    pub in_shape: Vec<usize>,

    /// Number of discrete actions.
    pub n_actions: usize,

    /// Number of units of the hidden layer of each head.
    pub n_hidden: usize,

    /// Observations are multiplied by this value before the first convolution.
    pub input_scale: f64,
}

impl Default for AtariA2cNetConfig {
    fn default() -> Self {
        Self {
            in_shape: vec![4, 84, 84],
            n_actions: 6,
            n_hidden: 512,
            input_scale: 1.0 / 256.0,
        }
    }
}

impl AtariA2cNetConfig {
    /// Creates a configuration with the default hidden layer and input scale.
    pub fn new(in_shape: Vec<usize>, n_actions: usize) -> Self {
        Self {
            in_shape,
            n_actions,
            ..Default::default()
        }
    }

    /// Sets the number of hidden units.
    pub fn n_hidden(mut self, v: usize) -> Self {
        self.n_hidden = v;
        self
    }

    /// Sets the input scale.
    pub fn input_scale(mut self, v: f64) -> Self {
        self.input_scale = v;
        self
    }
}
