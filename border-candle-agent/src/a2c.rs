//! Advantage actor-critic agent.
//!
//! [`A2c`] consumes batches of n-step [`Transition`](border_core::Transition)s. For each batch
//! it bootstraps the returns of non-terminal transitions with the value head
//! ([`A2c::unpack_batch`]) and performs a single optimization step ([`A2c::update`]).
//!
//! The update computes the gradient of the policy loss and the gradient of the sum of the
//! value loss and the entropy loss in two backward passes. The former is used only for the
//! gradient statistics in the returned record. Both are accumulated, clipped by their global
//! norm and applied with one optimizer step.
//!
//! Actors sample actions with [`A2cPolicy`] handles created by [`A2c::share`], which read the
//! parameters the learner updates in place.
mod base;
mod config;
mod policy;
pub use base::A2c;
pub use config::A2cConfig;
pub use policy::A2cPolicy;
