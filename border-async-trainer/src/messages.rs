use border_core::Transition;

/// Items pushed by actors into the [`TransitionQueue`](crate::TransitionQueue).
#[derive(Debug)]
pub enum QueueItem<O> {
    /// An n-step transition.
    Transition(Transition<O>),

    /// Mean of the total rewards of the episodes an actor finished since its previous report.
    TotalReward(f32),

    /// Final item of the actor with the given index, sent when it finishes gracefully.
    End(usize),
}
