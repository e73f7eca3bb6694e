//! Takes samples from environments and pushes them to the transition queue.
mod base;
mod stat;
pub use base::Actor;
pub use stat::{actor_stats_fmt, ActorStat};
