//! This module is used for tests.
use crate::{error::BorderError, ArrayObs, Env, Policy, Step};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration of [`ScriptedEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ScriptedEnvConfig {
    /// Rewards of the steps of an episode. Every episode follows this script and
    /// terminates after its last reward.
    pub episode_rewards: Vec<f32>,

    /// Number of discrete actions.
    pub n_actions: usize,

    /// If set, the step with this index, counted over all episodes, fails.
    pub fail_at_step: Option<usize>,
}

impl Default for ScriptedEnvConfig {
    fn default() -> Self {
        Self {
            episode_rewards: vec![0.0, 0.0, 1.0],
            n_actions: 2,
            fail_at_step: None,
        }
    }
}

impl ScriptedEnvConfig {
    /// Sets the reward script of an episode.
    pub fn episode_rewards(mut self, v: Vec<f32>) -> Self {
        self.episode_rewards = v;
        self
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the step index at which the environment fails.
    pub fn fail_at_step(mut self, v: usize) -> Self {
        self.fail_at_step = Some(v);
        self
    }
}

/// An environment replaying a fixed reward script, ignoring actions.
///
/// The observation is `[t, seed]`, where `t` is the number of steps taken in the
/// current episode.
pub struct ScriptedEnv {
    config: ScriptedEnvConfig,
    seed: i64,
    t: usize,
    total_steps: usize,
}

impl ScriptedEnv {
    fn obs(&self) -> ArrayObs {
        ArrayObs::from_vec(vec![self.t as f32, self.seed as f32])
    }
}

impl Env for ScriptedEnv {
    type Config = ScriptedEnvConfig;
    type Obs = ArrayObs;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        if config.episode_rewards.is_empty() {
            anyhow::bail!("episode_rewards must not be empty");
        }
        Ok(Self {
            config: config.clone(),
            seed,
            t: 0,
            total_steps: 0,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = 0;
        Ok(self.obs())
    }

    fn step(&mut self, act: usize) -> Result<Step<Self>> {
        if self.config.fail_at_step == Some(self.total_steps) {
            return Err(BorderError::EnvFailure(format!(
                "scripted failure at step {}",
                self.total_steps
            ))
            .into());
        }
        let reward = self.config.episode_rewards[self.t];
        self.t += 1;
        self.total_steps += 1;
        let is_terminated = self.t == self.config.episode_rewards.len();

        Ok(Step::new(self.obs(), act, reward, is_terminated, false))
    }

    fn n_actions(&self) -> usize {
        self.config.n_actions
    }
}

/// A policy always taking the same action.
pub struct ConstantPolicy(pub usize);

impl<E: Env> Policy<E> for ConstantPolicy {
    fn sample(&mut self, obs: &[E::Obs]) -> Result<Vec<usize>> {
        Ok(vec![self.0; obs.len()])
    }
}
