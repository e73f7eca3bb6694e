//! Configuration of the actor-critic agent.
use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`A2c`](super::A2c).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct A2cConfig<C> {
    /// Configuration of the policy/value network.
    pub net_config: Option<C>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,

    /// Coefficient of the entropy loss.
    pub entropy_beta: f64,

    /// Discount factor.
    pub gamma: f64,

    /// Look-ahead horizon of the transitions.
    pub n_steps: usize,

    /// Maximum of the global norm of gradients.
    pub clip_grad_norm: f64,

    /// Device on which the parameters are placed.
    pub device: Option<Device>,

    /// Random seed of action sampling of the agent itself.
    pub seed: u64,
}

impl<C> Default for A2cConfig<C> {
    fn default() -> Self {
        Self {
            net_config: None,
            opt_config: OptimizerConfig::default(),
            entropy_beta: 0.01,
            gamma: 0.99,
            n_steps: 4,
            clip_grad_norm: 0.1,
            device: None,
            seed: 42,
        }
    }
}

impl<C> A2cConfig<C>
where
    C: DeserializeOwned + Serialize,
{
    /// Sets the configuration of the policy/value network.
    pub fn net_config(mut self, v: C) -> Self {
        self.net_config = Some(v);
        self
    }

    /// Sets the configuration of the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the coefficient of the entropy loss.
    pub fn entropy_beta(mut self, v: f64) -> Self {
        self.entropy_beta = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the look-ahead horizon.
    pub fn n_steps(mut self, v: usize) -> Self {
        self.n_steps = v;
        self
    }

    /// Sets the maximum of the global norm of gradients.
    pub fn clip_grad_norm(mut self, v: f64) -> Self {
        self.clip_grad_norm = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`A2cConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`A2cConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
