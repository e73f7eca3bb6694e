#![warn(missing_docs)]
//! Core traits and building blocks for asynchronous actor-critic training.
//!
//! This crate defines the interfaces shared by the other crates of the workspace:
//!
//! * [`Env`], [`Obs`] and [`Step`] describe an environment emitting observations,
//!   rewards and termination flags for discrete actions.
//! * [`Policy`] maps a set of observations to actions, [`Agent`] additionally
//!   performs optimization steps on a batch of [`Transition`]s.
//! * [`NStepProcessor`] and [`ExperienceSource`] turn raw environment steps into
//!   n-step transitions and report the total rewards of finished episodes.
//! * The [`record`] module provides [`Record`](record::Record)s and
//!   [`Recorder`](record::Recorder)s used as the observability sink.
pub mod dummy;
pub mod error;
pub mod record;

mod base;
pub use base::{Agent, ArrayObs, Configurable, Env, Obs, Policy, Step};

mod experience;
pub use experience::{ExperienceSource, NStepProcessor, NStepProcessorConfig, Transition};
