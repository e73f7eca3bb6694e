use border_core::{Env, Policy};

/// A learner handing out policies which read its parameters.
///
/// Policies created by [`SharedPolicy::shared_policy`] are moved into actor threads. They
/// do not copy the parameters, so updates of the learner become visible to actors without
/// any synchronization message.
pub trait SharedPolicy<E: Env> {
    /// Policy used by an actor.
    type Policy: Policy<E> + Send + 'static;

    /// Creates a policy with the given random seed for action sampling.
    fn shared_policy(&self, seed: u64) -> Self::Policy;
}
