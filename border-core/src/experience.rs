//! N-step experience shaping.
//!
//! Actors interact with a pool of environments and produce [`Transition`]s with a fixed
//! look-ahead horizon. A transition starting at `s_t` carries the discounted sum of the
//! next `n` rewards and the observation `s_t+n`, or `None` if the episode ended within
//! the horizon. The learner bootstraps the return of the non-terminal transitions with
//! the value of `s_t+n`.
mod n_step;
mod source;
pub use n_step::{NStepProcessor, NStepProcessorConfig};
pub use source::ExperienceSource;

/// A transition aggregated over `n` environment steps.
///
/// Created once per environment step and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Transition<O> {
    /// Observation at time `t`.
    pub state: O,

    /// Index of the action taken at `state`.
    pub action: usize,

    /// Discounted sum of the next `n` rewards, or fewer if the episode ended earlier.
    pub reward: f32,

    /// Observation at time `t + n`, `None` if the episode ended within the horizon.
    pub last_state: Option<O>,
}

impl<O> Transition<O> {
    /// Returns `true` if the episode ended within the horizon of this transition.
    pub fn is_terminal(&self) -> bool {
        self.last_state.is_none()
    }
}
