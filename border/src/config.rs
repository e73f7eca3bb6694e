//! Configuration of an A3C run.
use anyhow::Result;
use border_async_trainer::{
    ActorManagerConfig, AsyncTrainerConfig, BorderAsyncTrainerError, RewardTrackerConfig,
};
use border_candle_agent::{a2c::A2cConfig, opt::OptimizerConfig, Device};
use border_core::NStepProcessorConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Hyperparameters of an A3C run.
///
/// The values are converted into the configurations of the components with
/// [`A3cConfig::a2c_config`], [`A3cConfig::actor_manager_config`],
/// [`A3cConfig::async_trainer_config`] and [`A3cConfig::reward_tracker_config`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct A3cConfig {
    /// Learning rate of the optimizer.
    pub learning_rate: f64,

    /// Coefficient of the entropy loss.
    pub entropy_coefficient: f64,

    /// Number of transitions in a batch.
    pub batch_size: usize,

    /// Look-ahead horizon of n-step transitions.
    pub horizon_steps: usize,

    /// Discount factor.
    pub discount: f64,

    /// Maximum of the global norm of gradients.
    pub gradient_clip_norm: f64,

    /// Number of actors.
    pub process_count: usize,

    /// Number of environments owned by each actor.
    pub envs_per_process: usize,

    /// Training stops when the mean reward of recent episodes reaches this value.
    pub reward_stop_threshold: f32,

    /// Uses a CUDA device if available.
    pub use_accelerator: bool,

    /// Number of recent episodes over which the mean reward is taken.
    pub reward_window: usize,

    /// Interval of writing the averaged metrics of optimization steps.
    pub record_interval: usize,

    /// Term added to the denominator of Adam.
    pub adam_eps: f64,

    /// Training stops after this number of optimization steps, if set.
    pub max_opt_steps: Option<usize>,
}

impl Default for A3cConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            entropy_coefficient: 0.01,
            batch_size: 128,
            horizon_steps: 4,
            discount: 0.99,
            gradient_clip_norm: 0.1,
            process_count: 4,
            envs_per_process: 12,
            reward_stop_threshold: 18.0,
            use_accelerator: false,
            reward_window: 100,
            record_interval: 10,
            adam_eps: 1e-3,
            max_opt_steps: None,
        }
    }
}

impl A3cConfig {
    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of actors.
    pub fn process_count(mut self, v: usize) -> Self {
        self.process_count = v;
        self
    }

    /// Sets the number of environments per actor.
    pub fn envs_per_process(mut self, v: usize) -> Self {
        self.envs_per_process = v;
        self
    }

    /// Sets the threshold of the mean reward.
    pub fn reward_stop_threshold(mut self, v: f32) -> Self {
        self.reward_stop_threshold = v;
        self
    }

    /// Sets whether a CUDA device is used.
    pub fn use_accelerator(mut self, v: bool) -> Self {
        self.use_accelerator = v;
        self
    }

    /// Sets the window of the mean reward.
    pub fn reward_window(mut self, v: usize) -> Self {
        self.reward_window = v;
        self
    }

    /// Sets the maximum number of optimization steps.
    pub fn max_opt_steps(mut self, v: usize) -> Self {
        self.max_opt_steps = Some(v);
        self
    }

    /// Checks the values.
    pub fn validate(&self) -> Result<()> {
        let error = |msg: &str| -> Result<()> {
            Err(BorderAsyncTrainerError::InvalidConfig(msg.to_string()).into())
        };

        if self.batch_size == 0 {
            return error("batch_size must be positive");
        }
        if self.horizon_steps == 0 {
            return error("horizon_steps must be positive");
        }
        if self.process_count == 0 || self.envs_per_process == 0 {
            return error("process_count and envs_per_process must be positive");
        }
        if !(self.discount > 0.0 && self.discount <= 1.0) {
            return error("discount must be in (0, 1]");
        }
        if !(self.gradient_clip_norm > 0.0) {
            return error("gradient_clip_norm must be positive");
        }
        if !(self.learning_rate > 0.0) {
            return error("learning_rate must be positive");
        }
        Ok(())
    }

    /// Returns the configuration of the agent.
    pub fn a2c_config<C>(&self, net_config: C, device: Device) -> A2cConfig<C>
    where
        C: Serialize + serde::de::DeserializeOwned,
    {
        let opt_config = OptimizerConfig::Adam {
            lr: self.learning_rate,
            eps: self.adam_eps,
        };
        A2cConfig::default()
            .net_config(net_config)
            .opt_config(opt_config)
            .entropy_beta(self.entropy_coefficient)
            .gamma(self.discount)
            .n_steps(self.horizon_steps)
            .clip_grad_norm(self.gradient_clip_norm)
            .device(device)
    }

    /// Returns the configuration of the actors.
    pub fn actor_manager_config(&self) -> ActorManagerConfig {
        let n_step = NStepProcessorConfig::default()
            .n_steps(self.horizon_steps)
            .gamma(self.discount as f32);
        ActorManagerConfig::default()
            .n_actors(self.process_count)
            .n_envs(self.envs_per_process)
            .n_step(n_step)
    }

    /// Returns the configuration of the learner loop.
    pub fn async_trainer_config(&self, model_dir: Option<&Path>) -> AsyncTrainerConfig {
        let mut config = AsyncTrainerConfig::default()
            .batch_size(self.batch_size)
            .record_interval(self.record_interval);
        config.max_opts = self.max_opt_steps;
        config.model_dir = model_dir.map(|p| p.to_string_lossy().into_owned());
        config
    }

    /// Returns the configuration of the reward tracker.
    pub fn reward_tracker_config(&self) -> RewardTrackerConfig {
        RewardTrackerConfig::default()
            .window(self.reward_window)
            .stop_reward(self.reward_stop_threshold)
    }

    /// Loads [`A3cConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`A3cConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use border_candle_agent::mlp::MlpA2cNetConfig;
    use tempdir::TempDir;

    #[test]
    fn test_default_is_valid() {
        assert!(A3cConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let invalid = vec![
            A3cConfig::default().batch_size(0),
            A3cConfig::default().process_count(0),
            A3cConfig::default().envs_per_process(0),
            A3cConfig::default().learning_rate(0.0),
            A3cConfig {
                discount: 1.5,
                ..Default::default()
            },
            A3cConfig {
                discount: 0.0,
                ..Default::default()
            },
            A3cConfig {
                horizon_steps: 0,
                ..Default::default()
            },
            A3cConfig {
                gradient_clip_norm: -1.0,
                ..Default::default()
            },
        ];
        for config in invalid.iter() {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn test_component_configs() {
        let config = A3cConfig::default().process_count(2).max_opt_steps(7);

        let a2c_config = config.a2c_config(MlpA2cNetConfig::new(4, vec![8], 3), Device::Cpu);
        assert_eq!(a2c_config.n_steps, 4);
        assert_eq!(a2c_config.entropy_beta, 0.01);
        assert_eq!(a2c_config.opt_config.get_learning_rate(), 0.001);

        let actor_config = config.actor_manager_config();
        assert_eq!(actor_config.n_actors, 2);
        assert_eq!(actor_config.n_envs, 12);
        assert_eq!(actor_config.n_step.n_steps, 4);

        let trainer_config = config.async_trainer_config(Some(Path::new("model")));
        assert_eq!(trainer_config.max_opts, Some(7));
        assert_eq!(trainer_config.batch_size, 128);
        assert_eq!(trainer_config.model_dir.as_deref(), Some("model"));

        let tracker_config = config.reward_tracker_config();
        assert_eq!(tracker_config.window, 100);
        assert_eq!(tracker_config.stop_reward, 18.0);
    }

    #[test]
    fn test_load_partial_yaml() -> Result<()> {
        let dir = TempDir::new("a3c_config")?;
        let path = dir.path().join("a3c.yaml");
        std::fs::write(&path, "batch_size: 32\nreward_stop_threshold: 3.0\n")?;
        let config = A3cConfig::load(&path)?;
        assert_eq!(
            config,
            A3cConfig::default().batch_size(32).reward_stop_threshold(3.0)
        );

        config.save(&path)?;
        assert_eq!(A3cConfig::load(&path)?, config);
        Ok(())
    }
}
