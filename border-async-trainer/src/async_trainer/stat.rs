use std::time::Duration;

/// Why the learner loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The mean reward reached the threshold of the reward tracker.
    Solved,

    /// Every actor sent its end marker.
    ActorsFinished,

    /// The number of optimization steps reached its maximum.
    MaxOpts,
}

/// Stats of [`AsyncTrainer`](crate::AsyncTrainer)`::train()`.
#[derive(Clone, Debug)]
pub struct AsyncTrainStat {
    /// The number of transitions received by the learner.
    pub samples: usize,

    /// The number of optimization steps.
    pub opt_steps: usize,

    /// The number of transitions received per second.
    pub samples_per_sec: f32,

    /// The number of optimization steps per second.
    pub opt_per_sec: f32,

    /// Duration of training.
    pub duration: Duration,

    /// Why training stopped.
    pub stop_reason: StopReason,
}

impl AsyncTrainStat {
    /// Returns a formatted string.
    pub fn fmt(&self) -> String {
        let mut s = "samples, opt_steps, samples/sec, opt_steps/sec, duration, stop reason\n"
            .to_string();
        s += format!(
            "{}, {}, {}, {}, {}, {:?}\n",
            self.samples,
            self.opt_steps,
            self.samples_per_sec,
            self.opt_per_sec,
            self.duration.as_secs_f32(),
            self.stop_reason,
        )
        .as_str();
        s
    }
}
