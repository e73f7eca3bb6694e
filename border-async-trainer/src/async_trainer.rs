//! The learner loop of asynchronous training.
mod base;
mod config;
mod stat;
pub use base::AsyncTrainer;
pub use config::AsyncTrainerConfig;
pub use stat::{AsyncTrainStat, StopReason};
