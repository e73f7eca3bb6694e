use crate::{
    actor_stats_fmt, Actor, ActorManagerConfig, ActorStat, BorderAsyncTrainerError, QueueSender,
    SharedPolicy,
};
use anyhow::Result;
use border_core::{Env, Policy};
use log::{error, info};
use std::{
    marker::PhantomData,
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};

/// Manages [`Actor`]s running in their own threads.
///
/// Each actor gets a policy sharing the parameters of the learner, obtained through
/// [`SharedPolicy::shared_policy`], and a clone of the sending side of the transition queue.
pub struct ActorManager<E, P>
where
    E: Env,
    P: Policy<E> + Send + 'static,
{
    /// Configuration of [`ActorManager`].
    config: ActorManagerConfig,

    /// Configuration of [`Env`].
    env_config: E::Config,

    /// Thread handles.
    threads: Vec<JoinHandle<Result<()>>>,

    /// Flag to stop training
    stop: Arc<Mutex<bool>>,

    /// Stats of [`Actor`]s, shared with actor threads.
    actor_stats: Vec<Arc<Mutex<Option<ActorStat>>>>,

    phantom: PhantomData<fn() -> P>,
}

impl<E, P> ActorManager<E, P>
where
    E: Env + 'static,
    E::Config: Send + 'static,
    P: Policy<E> + Send + 'static,
{
    /// Builds a [`ActorManager`].
    pub fn build(config: &ActorManagerConfig, env_config: &E::Config, stop: Arc<Mutex<bool>>) -> Self {
        Self {
            config: config.clone(),
            env_config: env_config.clone(),
            threads: vec![],
            stop,
            actor_stats: vec![],
            phantom: PhantomData,
        }
    }

    /// Spawns the actor threads.
    ///
    /// `sender` is consumed, so that the transition queue gets disconnected once all actors
    /// have finished.
    pub fn run<A>(&mut self, agent: &A, sender: QueueSender<E::Obs>) -> Result<()>
    where
        A: SharedPolicy<E, Policy = P>,
    {
        if self.config.n_actors == 0 || self.config.n_envs == 0 {
            return Err(BorderAsyncTrainerError::InvalidConfig(
                "n_actors and n_envs must be positive".to_string(),
            )
            .into());
        }

        for id in 0..self.config.n_actors {
            let env_seed = self.config.seed + (id * self.config.n_envs) as i64;
            let policy = agent.shared_policy(self.config.seed as u64 + id as u64);
            let stats = Arc::new(Mutex::new(None));
            self.actor_stats.push(stats.clone());

            let actor = Actor::<E, P>::build(
                id,
                self.env_config.clone(),
                self.config.n_envs,
                self.config.n_step.clone(),
                self.config.max_env_steps,
                self.stop.clone(),
                env_seed,
                stats,
            );
            let sender = sender.clone();

            let handle = thread::Builder::new()
                .name(format!("actor-{}", id))
                .spawn(move || actor.run(policy, sender))?;
            self.threads.push(handle);
        }
        info!("Started {} actors", self.config.n_actors);

        Ok(())
    }

    /// Stops actor threads.
    ///
    /// Actors blocked on a full queue are released only when the receiver is dropped.
    pub fn stop(&self) {
        let mut stop = self.stop.lock().unwrap();
        *stop = true;
    }

    /// Waits until all actors finish.
    ///
    /// Returns the error of the first actor that failed, after all threads have been joined.
    pub fn join(self) -> Result<Vec<ActorStat>> {
        let mut first_error = None;

        for (id, h) in self.threads.into_iter().enumerate() {
            let err = match h.join() {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => BorderAsyncTrainerError::ActorFailed {
                    id,
                    message: format!("{:#}", e),
                },
                Err(_) => BorderAsyncTrainerError::ActorPanicked(id),
            };
            error!("{}", err);
            first_error.get_or_insert(err);
        }

        if let Some(e) = first_error {
            return Err(e.into());
        }

        let stats = self
            .actor_stats
            .iter()
            .filter_map(|e| e.lock().unwrap().clone())
            .collect::<Vec<_>>();
        info!("Stats of actors:\n{}", actor_stats_fmt(&stats));

        Ok(stats)
    }

    /// Stops and joins actors.
    pub fn stop_and_join(self) -> Result<Vec<ActorStat>> {
        self.stop();
        self.join()
    }
}
