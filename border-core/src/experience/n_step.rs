//! Conversion of environment steps into n-step transitions.
use super::Transition;
use crate::{Env, Step};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Configuration of [`NStepProcessor`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct NStepProcessorConfig {
    /// Look-ahead horizon of transitions.
    pub n_steps: usize,

    /// Discount factor.
    pub gamma: f32,
}

impl Default for NStepProcessorConfig {
    fn default() -> Self {
        Self {
            n_steps: 4,
            gamma: 0.99,
        }
    }
}

impl NStepProcessorConfig {
    /// Sets the look-ahead horizon.
    pub fn n_steps(mut self, v: usize) -> Self {
        self.n_steps = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }
}

/// Produces n-step [`Transition`]s from the [`Step`]s of a single environment.
///
/// The processor keeps the last `n_steps` pairs of observation and action together with
/// their rewards. Once the window is full, the oldest entry is emitted with the discounted
/// sum of the rewards in the window and the latest observation as `last_state`. When an
/// episode ends, every entry left in the window is emitted with `last_state = None` and a
/// reward summed over the steps actually taken.
pub struct NStepProcessor<E: Env> {
    n_steps: usize,
    gamma: f32,

    /// Observation the next action will be taken at.
    prev_obs: Option<E::Obs>,

    /// Pending `(obs, act, reward)` entries, oldest first.
    window: VecDeque<(E::Obs, usize, f32)>,

    /// Undiscounted sum of rewards in the current episode.
    episode_reward: f32,
}

impl<E: Env> NStepProcessor<E> {
    /// Builds a processor.
    ///
    /// Fails if `n_steps` is zero.
    pub fn build(config: &NStepProcessorConfig) -> Result<Self> {
        if config.n_steps == 0 {
            anyhow::bail!("n_steps must be positive");
        }
        Ok(Self {
            n_steps: config.n_steps,
            gamma: config.gamma,
            prev_obs: None,
            window: VecDeque::with_capacity(config.n_steps),
            episode_reward: 0.0,
        })
    }

    /// Starts a new episode from the given initial observation.
    pub fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs);
        self.window.clear();
        self.episode_reward = 0.0;
    }

    /// Returns the discounted sum of the rewards in the window.
    fn discounted_reward(&self) -> f32 {
        self.window
            .iter()
            .rev()
            .fold(0f32, |acc, (_, _, r)| acc * self.gamma + r)
    }

    fn emit_front(&mut self, last_state: Option<E::Obs>) -> Option<Transition<E::Obs>> {
        let reward = self.discounted_reward();
        self.window
            .pop_front()
            .map(|(state, action, _)| Transition {
                state,
                action,
                reward,
                last_state,
            })
    }

    /// Processes a [`Step`].
    ///
    /// Returns the transitions completed by this step and, if the episode ended,
    /// its total reward. After the end of an episode, [`NStepProcessor::reset`] must be
    /// called with the initial observation of the next episode.
    pub fn process(&mut self, step: Step<E>) -> Result<(Vec<Transition<E::Obs>>, Option<f32>)> {
        let obs = self
            .prev_obs
            .take()
            .context("prev_obs is not set. Forgot to call reset()?")?;
        let is_done = step.is_done();
        self.episode_reward += step.reward;
        self.window.push_back((obs, step.act, step.reward));

        let mut transitions = vec![];

        if is_done {
            while !self.window.is_empty() {
                transitions.extend(self.emit_front(None));
            }
            let episode_reward = self.episode_reward;
            self.episode_reward = 0.0;
            Ok((transitions, Some(episode_reward)))
        } else {
            if self.window.len() == self.n_steps {
                transitions.extend(self.emit_front(Some(step.obs.clone())));
            }
            self.prev_obs = Some(step.obs);
            Ok((transitions, None))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dummy::{ScriptedEnv, ScriptedEnvConfig},
        Obs,
    };

    fn run_episode(
        rewards: Vec<f32>,
        config: &NStepProcessorConfig,
    ) -> Result<(Vec<Transition<<ScriptedEnv as Env>::Obs>>, Option<f32>)> {
        let env_config = ScriptedEnvConfig::default().episode_rewards(rewards.clone());
        let mut env = ScriptedEnv::build(&env_config, 0)?;
        let mut processor = NStepProcessor::<ScriptedEnv>::build(config)?;
        processor.reset(env.reset()?);

        let mut transitions = vec![];
        let mut total = None;
        for _ in 0..rewards.len() {
            let step = env.step(0)?;
            let (mut ts, r) = processor.process(step)?;
            transitions.append(&mut ts);
            total = r;
        }
        Ok((transitions, total))
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
    }

    #[test]
    fn test_full_horizon() -> Result<()> {
        let config = NStepProcessorConfig::default().n_steps(4).gamma(0.5);
        let (ts, total) = run_episode(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &config)?;

        assert_eq!(ts.len(), 6);
        assert_eq!(total, Some(21.0));

        // One transition per step, in the order of the steps
        for (t, tr) in ts.iter().enumerate() {
            assert_eq!(tr.state.as_slice()[0], t as f32);
        }

        // Windows not crossing the end of the episode
        assert_close(ts[0].reward, 1.0 + 0.5 * 2.0 + 0.25 * 3.0 + 0.125 * 4.0);
        assert_eq!(ts[0].last_state.as_ref().unwrap().as_slice()[0], 4.0);
        assert_close(ts[1].reward, 2.0 + 0.5 * 3.0 + 0.25 * 4.0 + 0.125 * 5.0);
        assert_eq!(ts[1].last_state.as_ref().unwrap().as_slice()[0], 5.0);

        // Windows crossing the end of the episode
        assert_close(ts[2].reward, 3.0 + 0.5 * 4.0 + 0.25 * 5.0 + 0.125 * 6.0);
        assert_close(ts[3].reward, 4.0 + 0.5 * 5.0 + 0.25 * 6.0);
        assert_close(ts[4].reward, 5.0 + 0.5 * 6.0);
        assert_close(ts[5].reward, 6.0);
        assert!(ts[2..].iter().all(|tr| tr.is_terminal()));

        Ok(())
    }

    #[test]
    fn test_episode_shorter_than_horizon() -> Result<()> {
        let config = NStepProcessorConfig::default();
        let (ts, total) = run_episode(vec![1.0, -1.0], &config)?;

        assert_eq!(ts.len(), 2);
        assert_eq!(total, Some(0.0));
        assert_close(ts[0].reward, 1.0 - 0.99);
        assert_close(ts[1].reward, -1.0);
        assert!(ts.iter().all(|tr| tr.last_state.is_none()));

        Ok(())
    }

    #[test]
    fn test_single_step_horizon() -> Result<()> {
        let config = NStepProcessorConfig::default().n_steps(1);
        let (ts, _) = run_episode(vec![0.5, 0.25, 1.0], &config)?;

        assert_eq!(ts.len(), 3);
        assert_close(ts[0].reward, 0.5);
        assert_eq!(ts[0].last_state.as_ref().unwrap().as_slice()[0], 1.0);
        assert_eq!(ts[1].last_state.as_ref().unwrap().as_slice()[0], 2.0);
        assert!(ts[2].is_terminal());

        Ok(())
    }

    #[test]
    fn test_process_without_reset() -> Result<()> {
        let env_config = ScriptedEnvConfig::default();
        let mut env = ScriptedEnv::build(&env_config, 0)?;
        let mut processor = NStepProcessor::<ScriptedEnv>::build(&NStepProcessorConfig::default())?;
        env.reset()?;
        let step = env.step(0)?;
        assert!(processor.process(step).is_err());

        Ok(())
    }

    #[test]
    fn test_zero_horizon_is_rejected() {
        let config = NStepProcessorConfig::default().n_steps(0);
        assert!(NStepProcessor::<ScriptedEnv>::build(&config).is_err());
    }
}
