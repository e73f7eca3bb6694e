use crate::{ActorStat, QueueItem, QueueSender};
use anyhow::Result;
use border_core::{Env, ExperienceSource, NStepProcessorConfig, Policy};
use log::{info, trace};
use std::{
    marker::PhantomData,
    sync::{Arc, Mutex},
    time::SystemTime,
};

/// How the sampling loop finished.
enum Exit {
    /// The stop flag was raised or the step budget was reached.
    Stopped,

    /// The learner dropped the receiver.
    Disconnected,
}

/// Runs interaction between a policy and a pool of environments, taking samples.
///
/// Samples are n-step transitions generated by an [`ExperienceSource`]. Before pushing the
/// transition of an iteration, the actor pushes the mean of the total rewards of the
/// episodes finished since its previous report, if any.
///
/// The actor finishes when the stop flag is raised, when its number of environment steps
/// reaches `max_env_steps`, or when the learner drops the receiving side of the queue.
/// In the first two cases [`QueueItem::End`] is pushed as the last item. An error of an
/// environment ends the actor without [`QueueItem::End`].
pub struct Actor<E, P>
where
    E: Env,
    P: Policy<E>,
{
    id: usize,
    stop: Arc<Mutex<bool>>,
    env_config: E::Config,
    n_envs: usize,
    n_step_config: NStepProcessorConfig,
    max_env_steps: Option<usize>,
    env_seed: i64,
    stats: Arc<Mutex<Option<ActorStat>>>,
    phantom: PhantomData<fn() -> (E, P)>,
}

impl<E, P> Actor<E, P>
where
    E: Env,
    P: Policy<E>,
{
    /// Builds an actor. Environment `i` is built with seed `env_seed + i`.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        id: usize,
        env_config: E::Config,
        n_envs: usize,
        n_step_config: NStepProcessorConfig,
        max_env_steps: Option<usize>,
        stop: Arc<Mutex<bool>>,
        env_seed: i64,
        stats: Arc<Mutex<Option<ActorStat>>>,
    ) -> Self {
        Self {
            id,
            stop,
            env_config,
            n_envs,
            n_step_config,
            max_env_steps,
            env_seed,
            stats,
            phantom: PhantomData,
        }
    }

    fn is_stopped(&self, env_steps: usize) -> bool {
        *self.stop.lock().unwrap() || self.max_env_steps.map_or(false, |max| env_steps >= max)
    }

    fn sampling_loop(
        &self,
        source: &mut ExperienceSource<E, P>,
        sender: &QueueSender<E::Obs>,
    ) -> Result<Exit> {
        loop {
            if self.is_stopped(source.env_steps()) {
                return Ok(Exit::Stopped);
            }

            let transition = match source.next() {
                Some(transition) => transition?,
                None => return Ok(Exit::Stopped),
            };

            let rewards = source.pop_total_rewards();
            if !rewards.is_empty() {
                let mean = rewards.iter().sum::<f32>() / rewards.len() as f32;
                trace!("Actor {}: {} episodes finished", self.id, rewards.len());
                if sender.push(QueueItem::TotalReward(mean)).is_err() {
                    return Ok(Exit::Disconnected);
                }
            }

            if sender.push(QueueItem::Transition(transition)).is_err() {
                return Ok(Exit::Disconnected);
            }
        }
    }

    /// Runs the sampling loop.
    ///
    /// Environments are built in this method, so that they are created in the thread of the
    /// actor.
    pub fn run(self, policy: P, sender: QueueSender<E::Obs>) -> Result<()> {
        let envs = (0..self.n_envs)
            .map(|i| E::build(&self.env_config, self.env_seed + i as i64))
            .collect::<Result<Vec<_>>>()?;
        let mut source = ExperienceSource::new(envs, policy, &self.n_step_config)?;
        info!("Actor {} starts sampling with {} environments", self.id, self.n_envs);

        let time = SystemTime::now();
        let exit = self.sampling_loop(&mut source, &sender);
        *self.stats.lock().unwrap() = Some(ActorStat {
            env_steps: source.env_steps(),
            duration: time.elapsed()?,
        });

        match exit? {
            Exit::Stopped => {
                // The learner may have stopped reading already
                let _ = sender.push(QueueItem::End(self.id));
                info!("Actor {} finished", self.id);
            }
            Exit::Disconnected => {
                info!("Actor {} finished, the learner stopped receiving", self.id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TransitionQueue;
    use border_core::dummy::{ConstantPolicy, ScriptedEnv, ScriptedEnvConfig};
    use std::thread;
    use test_log::test;

    fn actor(
        env_config: ScriptedEnvConfig,
        max_env_steps: Option<usize>,
        stop: Arc<Mutex<bool>>,
    ) -> Actor<ScriptedEnv, ConstantPolicy> {
        Actor::build(
            3,
            env_config,
            1,
            NStepProcessorConfig::default(),
            max_env_steps,
            stop,
            0,
            Arc::new(Mutex::new(None)),
        )
    }

    fn kind<O>(item: &QueueItem<O>) -> &'static str {
        match item {
            QueueItem::Transition(_) => "T",
            QueueItem::TotalReward(_) => "R",
            QueueItem::End(_) => "E",
        }
    }

    #[test]
    fn test_report_before_transition() {
        let env_config = ScriptedEnvConfig::default().episode_rewards(vec![1.0]);
        let actor = actor(env_config, Some(3), Arc::new(Mutex::new(false)));
        let (s, r) = TransitionQueue::bounded(1);
        let handle = thread::spawn(move || actor.run(ConstantPolicy(0), s));

        let mut items = vec![];
        while let Ok(item) = r.pop() {
            items.push(item);
        }
        handle.join().unwrap().unwrap();

        let kinds = items.iter().map(kind).collect::<Vec<_>>();
        assert_eq!(kinds, vec!["R", "T", "R", "T", "R", "T", "E"]);
        assert!(matches!(items[6], QueueItem::End(3)));
        assert!(matches!(items[0], QueueItem::TotalReward(r) if r == 1.0));
    }

    #[test]
    fn test_stop_flag() {
        let stop = Arc::new(Mutex::new(false));
        let actor = actor(ScriptedEnvConfig::default(), None, stop.clone());
        let (s, r) = TransitionQueue::bounded(1);
        let handle = thread::spawn(move || actor.run(ConstantPolicy(0), s));

        for _ in 0..5 {
            r.pop().unwrap();
        }
        *stop.lock().unwrap() = true;

        // Drains until the end marker, after which the sender is dropped
        let mut last = None;
        while let Ok(item) = r.pop() {
            last = Some(kind(&item));
        }
        handle.join().unwrap().unwrap();
        assert_eq!(last, Some("E"));
    }

    #[test]
    fn test_env_failure_ends_without_marker() {
        let env_config = ScriptedEnvConfig::default().fail_at_step(4);
        let actor = actor(env_config, None, Arc::new(Mutex::new(false)));
        let (s, r) = TransitionQueue::bounded(10);
        let handle = thread::spawn(move || actor.run(ConstantPolicy(0), s));

        let mut kinds = vec![];
        while let Ok(item) = r.pop() {
            kinds.push(kind(&item));
        }
        assert!(handle.join().unwrap().is_err());
        assert!(!kinds.contains(&"E"));
    }

    #[test]
    fn test_zero_horizon_fails_without_panic() {
        let actor = Actor::<ScriptedEnv, ConstantPolicy>::build(
            0,
            ScriptedEnvConfig::default(),
            1,
            NStepProcessorConfig::default().n_steps(0),
            None,
            Arc::new(Mutex::new(false)),
            0,
            Arc::new(Mutex::new(None)),
        );
        let (s, r) = TransitionQueue::bounded(1);
        let handle = thread::spawn(move || actor.run(ConstantPolicy(0), s));

        assert!(r.pop().is_err());
        assert!(handle.join().unwrap().is_err());
    }
}
