//! Utility function.
use crate::{
    ActorManager, ActorManagerConfig, AsyncTrainStat, AsyncTrainer, AsyncTrainerConfig,
    RewardTracker, RewardTrackerConfig, SharedPolicy, TransitionQueue,
};
use anyhow::Result;
use border_core::{record::AggregateRecorder, Agent, Env};
use log::info;
use std::sync::{Arc, Mutex};

/// Runs asynchronous training.
///
/// This function runs [`Actor`](crate::Actor)s on threads managed by [`ActorManager`] and the
/// learner loop of [`AsyncTrainer`] on the calling thread. They communicate through a
/// [`TransitionQueue`] whose capacity is the number of actors.
///
/// When the learner loop returns, the receiver of the queue is dropped and the stop flag is
/// raised, so every actor finishes, and all actor threads are joined before this function
/// returns. An error of an actor takes precedence over the result of the learner loop.
///
/// * `agent` - The agent to be trained. Actors sample actions with policies sharing its
///   parameters.
/// * `env_config` - Configuration of the environments with which transitions are sampled.
/// * `actor_man_config` - Configuration of [`ActorManager`].
/// * `async_trainer_config` - Configuration of [`AsyncTrainer`].
/// * `reward_tracker_config` - Configuration of [`RewardTracker`].
/// * `recorder` - Destination of the records of optimization steps and finished episodes.
pub fn train_async<A, E>(
    agent: &mut A,
    env_config: &E::Config,
    actor_man_config: &ActorManagerConfig,
    async_trainer_config: &AsyncTrainerConfig,
    reward_tracker_config: &RewardTrackerConfig,
    recorder: &mut impl AggregateRecorder,
) -> Result<AsyncTrainStat>
where
    A: Agent<E> + SharedPolicy<E>,
    E: Env + 'static,
    E::Config: Send + 'static,
{
    // Shared flag to stop actor threads
    let stop = Arc::new(Mutex::new(false));

    let (sender, receiver) = TransitionQueue::bounded(actor_man_config.n_actors);
    let mut trainer = AsyncTrainer::<A, E>::build(async_trainer_config, actor_man_config.n_actors)?;
    let mut actors = ActorManager::<E, A::Policy>::build(actor_man_config, env_config, stop);

    // Starts sampling and training
    if let Err(e) = actors.run(&*agent, sender) {
        drop(receiver);
        let _ = actors.stop_and_join();
        return Err(e);
    }

    let result = {
        let mut tracker = RewardTracker::new(reward_tracker_config);
        trainer.train(agent, receiver, &mut tracker, recorder)
    };
    let actor_result = actors.stop_and_join();

    let stats = match (result, actor_result) {
        (_, Err(e)) => return Err(e),
        (Err(e), Ok(_)) => return Err(e),
        (Ok(stats), Ok(_)) => stats,
    };
    info!("Stats of async trainer\n{}", stats.fmt());

    Ok(stats)
}
