//! A pixel game in which a paddle catches falling balls.
//!
//! [`CatchEnv`] renders a grid of `rows` x `cols` cells into a single-channel image. A ball
//! falls from a random column of the top row by one cell per step, and the paddle at the
//! bottom row moves left, stays or moves right. The agent receives `+1` when the ball reaches
//! the bottom row at the column of the paddle and `-1` otherwise, and a new ball is dropped.
//! An episode ends after `balls_per_episode` balls, so that the total reward of an episode
//! lies in `[-balls_per_episode, balls_per_episode]`.
//!
//! ```
//! use border_catch_env::{CatchEnv, CatchEnvConfig};
//! use border_core::{Env, Obs};
//!
//! let config = CatchEnvConfig::default().cell_size(2);
//! let mut env = CatchEnv::build(&config, 42).unwrap();
//! let obs = env.reset().unwrap();
//! assert_eq!(obs.shape(), &[1, 20, 10]);
//! let step = env.step(1).unwrap();
//! assert_eq!(step.reward, 0.0);
//! ```
mod config;
mod env;
pub use config::CatchEnvConfig;
pub use env::{CatchAct, CatchEnv};
