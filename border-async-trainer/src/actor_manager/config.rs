use anyhow::Result;
use border_core::NStepProcessorConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ActorManager`](super::ActorManager).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActorManagerConfig {
    /// Number of actor threads.
    ///
    /// This value is also the capacity of the transition queue.
    /// The default value is 4.
    pub n_actors: usize,

    /// Number of environments owned by each actor. The default value is 12.
    pub n_envs: usize,

    /// Look-ahead horizon and discount factor of the n-step transitions.
    pub n_step: NStepProcessorConfig,

    /// If set, each actor finishes after this number of environment steps.
    pub max_env_steps: Option<usize>,

    /// Base seed of environments. Environment `j` of actor `i` is built with
    /// `seed + i * n_envs + j`.
    pub seed: i64,
}

impl Default for ActorManagerConfig {
    fn default() -> Self {
        Self {
            n_actors: 4,
            n_envs: 12,
            n_step: NStepProcessorConfig::default(),
            max_env_steps: None,
            seed: 42,
        }
    }
}

impl ActorManagerConfig {
    /// Sets the number of actors.
    pub fn n_actors(mut self, v: usize) -> Self {
        self.n_actors = v;
        self
    }

    /// Sets the number of environments per actor.
    pub fn n_envs(mut self, v: usize) -> Self {
        self.n_envs = v;
        self
    }

    /// Sets the configuration of n-step transitions.
    pub fn n_step(mut self, v: NStepProcessorConfig) -> Self {
        self.n_step = v;
        self
    }

    /// Sets the step budget of each actor.
    pub fn max_env_steps(mut self, v: usize) -> Self {
        self.max_env_steps = Some(v);
        self
    }

    /// Sets the base seed of environments.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`ActorManagerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ActorManagerConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_actor_manager_config() -> Result<()> {
        let config = ActorManagerConfig::default()
            .n_actors(2)
            .n_envs(3)
            .max_env_steps(100);

        let dir = TempDir::new("actor_manager_config")?;
        let path = dir.path().join("actor_manager_config.yaml");
        config.save(&path)?;
        let config_ = ActorManagerConfig::load(&path)?;
        assert_eq!(config, config_);

        Ok(())
    }
}
