//! Asynchronous advantage actor-critic (A3C) training in Rust.
//!
//! Border consists of the following crates:
//!
//! * Core and utility
//!   * [border-core](https://crates.io/crates/border-core) provides the traits of
//!     environments, policies and agents, n-step transitions and records of metrics.
//!   * [border-tensorboard](https://crates.io/crates/border-tensorboard) has
//!     `TensorboardRecorder` struct to write records which can be shown in Tensorboard.
//!     It is based on [tensorboard-rs](https://crates.io/crates/tensorboard-rs).
//!   * [border-async-trainer](https://crates.io/crates/border-async-trainer) runs actors
//!     on threads, sending transitions to the learner through a bounded queue.
//! * Environment
//!   * [border-catch-env](https://crates.io/crates/border-catch-env) is a pixel game in
//!     which a paddle catches falling balls.
//! * Agent
//!   * [border-candle-agent](https://crates.io/crates/border-candle-agent) includes the
//!     advantage actor-critic agent based on [candle](https://crates.io/crates/candle-core).
//!
//! This crate puts them together: [`A3cConfig`] collects the hyperparameters of a run and
//! [`run`] trains an agent until the mean reward reaches the threshold.
mod config;
mod run;
pub use config::A3cConfig;
pub use run::run;
