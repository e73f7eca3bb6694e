//! A stream of n-step transitions generated from a pool of environments.
use super::{NStepProcessor, NStepProcessorConfig, Transition};
use crate::{error::BorderError, Env, Policy};
use anyhow::{Context, Result};
use log::trace;
use std::collections::VecDeque;

/// Generates n-step [`Transition`]s by running a [`Policy`] on a pool of environments.
///
/// At every interaction, the policy samples actions for the current observations of all
/// environments at once, and each environment advances by one step. Each environment is
/// reset independently when its episode ends. Transitions are produced lazily through the
/// [`Iterator`] implementation, which yields an error if an environment fails.
///
/// Total rewards of finished episodes are kept until [`ExperienceSource::pop_total_rewards`]
/// is called.
pub struct ExperienceSource<E: Env, P: Policy<E>> {
    envs: Vec<E>,
    processors: Vec<NStepProcessor<E>>,

    /// Current observation of each environment.
    obs: Vec<E::Obs>,

    policy: P,

    /// Transitions completed but not yet yielded.
    ready: VecDeque<Transition<E::Obs>>,

    /// Total rewards of episodes finished since the last call of `pop_total_rewards()`.
    total_rewards: Vec<f32>,

    env_steps: usize,
}

impl<E: Env, P: Policy<E>> ExperienceSource<E, P> {
    /// Creates an experience source and resets all the environments.
    pub fn new(mut envs: Vec<E>, policy: P, config: &NStepProcessorConfig) -> Result<Self> {
        if envs.is_empty() {
            anyhow::bail!("ExperienceSource requires at least one environment");
        }

        let mut processors = Vec::with_capacity(envs.len());
        let mut obs = Vec::with_capacity(envs.len());
        for env in envs.iter_mut() {
            let init_obs = env.reset()?;
            let mut processor = NStepProcessor::build(config)?;
            processor.reset(init_obs.clone());
            processors.push(processor);
            obs.push(init_obs);
        }

        Ok(Self {
            envs,
            processors,
            obs,
            policy,
            ready: VecDeque::new(),
            total_rewards: vec![],
            env_steps: 0,
        })
    }

    /// Returns the total rewards of the episodes finished since the last call.
    ///
    /// The returned vector is empty if no episode has finished in the meantime.
    pub fn pop_total_rewards(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.total_rewards)
    }

    /// Returns the number of environment steps taken so far, summed over the environments.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }

    /// Advances all environments by one step.
    fn step_envs(&mut self) -> Result<()> {
        let acts = self.policy.sample(&self.obs)?;
        if acts.len() != self.envs.len() {
            return Err(BorderError::ActionCountMismatch {
                expected: self.envs.len(),
                actual: acts.len(),
            }
            .into());
        }

        for (ix, act) in acts.into_iter().enumerate() {
            let env = &mut self.envs[ix];
            let step = env
                .step(act)
                .with_context(|| format!("Failed to step environment {}", ix))?;
            let is_done = step.is_done();
            let next_obs = match is_done {
                true => env
                    .reset()
                    .with_context(|| format!("Failed to reset environment {}", ix))?,
                false => step.obs.clone(),
            };

            let processor = &mut self.processors[ix];
            let (transitions, episode_reward) = processor.process(step)?;
            self.ready.extend(transitions);

            if let Some(r) = episode_reward {
                trace!("Episode finished in environment {}, total reward = {}", ix, r);
                self.total_rewards.push(r);
                processor.reset(next_obs.clone());
            }
            self.obs[ix] = next_obs;
        }
        self.env_steps += self.envs.len();

        Ok(())
    }
}

impl<E: Env, P: Policy<E>> Iterator for ExperienceSource<E, P> {
    type Item = Result<Transition<E::Obs>>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.ready.is_empty() {
            if let Err(e) = self.step_envs() {
                return Some(Err(e));
            }
        }
        self.ready.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dummy::{ConstantPolicy, ScriptedEnv, ScriptedEnvConfig},
        Obs,
    };

    fn source(
        rewards: Vec<f32>,
        n_envs: usize,
        fail_at_step: Option<usize>,
    ) -> Result<ExperienceSource<ScriptedEnv, ConstantPolicy>> {
        let mut env_config = ScriptedEnvConfig::default().episode_rewards(rewards);
        env_config.fail_at_step = fail_at_step;
        let envs = (0..n_envs)
            .map(|i| ScriptedEnv::build(&env_config, i as i64))
            .collect::<Result<Vec<_>>>()?;
        ExperienceSource::new(envs, ConstantPolicy(1), &NStepProcessorConfig::default())
    }

    #[test]
    fn test_pop_total_rewards_is_drained() -> Result<()> {
        let mut source = source(vec![1.0, 1.0], 3, None)?;

        // Two steps finish one episode in each of the three environments
        let transitions = source.by_ref().take(6).collect::<Result<Vec<_>>>()?;
        assert_eq!(transitions.len(), 6);
        assert_eq!(source.pop_total_rewards(), vec![2.0, 2.0, 2.0]);
        assert!(source.pop_total_rewards().is_empty());
        assert_eq!(source.env_steps(), 6);

        Ok(())
    }

    #[test]
    fn test_environments_restart_independently() -> Result<()> {
        let mut source = source(vec![0.0, 0.0, 1.0], 2, None)?;
        let transitions = source.by_ref().take(12).collect::<Result<Vec<_>>>()?;

        // Every observation of every episode appears exactly once as a state
        for seed in 0..2 {
            let mut states = transitions
                .iter()
                .filter(|tr| tr.state.as_slice()[1] == seed as f32)
                .map(|tr| tr.state.as_slice()[0] as usize)
                .collect::<Vec<_>>();
            states.sort();
            assert_eq!(states, vec![0, 0, 1, 1, 2, 2]);
        }
        assert!(transitions.iter().all(|tr| tr.action == 1));
        assert_eq!(source.pop_total_rewards().len(), 4);

        Ok(())
    }

    #[test]
    fn test_environment_failure() -> Result<()> {
        let mut source = source(vec![0.0; 10], 1, Some(2))?;
        assert!(source.next().unwrap().is_err());

        Ok(())
    }

    #[test]
    fn test_zero_horizon_is_an_error() -> Result<()> {
        let env_config = ScriptedEnvConfig::default();
        let envs = vec![ScriptedEnv::build(&env_config, 0)?];
        let config = NStepProcessorConfig::default().n_steps(0);
        assert!(ExperienceSource::new(envs, ConstantPolicy(0), &config).is_err());

        Ok(())
    }
}
