//! Asynchronous advantage actor-critic training on a single machine.
//!
//! Actors run on their own threads, each owning a set of environments. They sample actions
//! with policies reading the parameters of the learner without synchronization and push
//! n-step transitions into a bounded [`TransitionQueue`]. The learner, [`AsyncTrainer`], pops
//! the transitions, performs an optimization step every time a batch is filled, and stops
//! when the [`RewardTracker`] reports that the mean reward reached its threshold or when all
//! actors have finished.
//!
//! # Messages
//!
//! Actors push [`QueueItem`]s:
//! * [`QueueItem::TotalReward`], the mean total reward of the episodes finished since the
//!   previous report of the actor. It is pushed before the transition sampled in the same
//!   iteration.
//! * [`QueueItem::Transition`], an n-step transition.
//! * [`QueueItem::End`], the last item of an actor finishing gracefully.
//!
//! # Shutdown
//!
//! The learner drops the receiving side of the queue when it stops, which releases actors
//! blocked on the full queue. [`util::train_async`] then raises the stop flag and joins the
//! actor threads. An actor whose environment fails exits without the end marker, and its
//! error is returned when the actors are joined.
mod actor;
mod actor_manager;
mod async_trainer;
mod error;
mod messages;
mod queue;
mod reward_tracker;
mod shared_policy;
pub mod util;
pub use actor::{actor_stats_fmt, Actor, ActorStat};
pub use actor_manager::{ActorManager, ActorManagerConfig};
pub use async_trainer::{AsyncTrainStat, AsyncTrainer, AsyncTrainerConfig, StopReason};
pub use error::BorderAsyncTrainerError;
pub use messages::QueueItem;
pub use queue::{Disconnected, QueueReceiver, QueueSender, TransitionQueue};
pub use reward_tracker::{RewardTracker, RewardTrackerConfig};
pub use shared_policy::SharedPolicy;
