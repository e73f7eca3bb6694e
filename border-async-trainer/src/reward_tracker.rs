//! Tracks the total rewards of finished episodes and decides when to stop training.
use anyhow::Result;
use border_core::record::{Record, RecordValue, Recorder, STEP_KEY};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Instant,
};

/// Configuration of [`RewardTracker`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RewardTrackerConfig {
    /// Number of recent episodes over which the mean reward is taken.
    ///
    /// The default value is 100.
    pub window: usize,

    /// Training stops when the mean reward reaches this value.
    ///
    /// The default value is 18.0.
    pub stop_reward: f32,
}

impl Default for RewardTrackerConfig {
    fn default() -> Self {
        Self {
            window: 100,
            stop_reward: 18.0,
        }
    }
}

impl RewardTrackerConfig {
    /// Sets the window size.
    pub fn window(mut self, v: usize) -> Self {
        self.window = v;
        self
    }

    /// Sets the threshold of the mean reward.
    pub fn stop_reward(mut self, v: f32) -> Self {
        self.stop_reward = v;
        self
    }

    /// Loads [`RewardTrackerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RewardTrackerConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Keeps a sliding window of the total rewards of recent episodes.
///
/// Each report writes `reward`, `reward_100` (the mean over the window) and `speed`
/// (environment steps per second since the previous report) to a [`Recorder`].
/// A summary is logged when the tracker is dropped, so it is emitted on every exit path of
/// the training loop.
pub struct RewardTracker {
    config: RewardTrackerConfig,
    rewards: VecDeque<f32>,
    n_games: usize,
    last_step: usize,
    last_time: Instant,
    best_mean: Option<f32>,
}

impl RewardTracker {
    /// Creates a tracker. Timing starts at this point.
    pub fn new(config: &RewardTrackerConfig) -> Self {
        Self {
            config: config.clone(),
            rewards: VecDeque::with_capacity(config.window),
            n_games: 0,
            last_step: 0,
            last_time: Instant::now(),
            best_mean: None,
        }
    }

    /// Returns the mean of the rewards in the window.
    pub fn mean_reward(&self) -> Option<f32> {
        match self.rewards.is_empty() {
            true => None,
            false => Some(self.rewards.iter().sum::<f32>() / self.rewards.len() as f32),
        }
    }

    /// Returns the number of reports so far.
    pub fn n_games(&self) -> usize {
        self.n_games
    }

    /// Adds a reward reported at the given step.
    ///
    /// Returns `true` if the mean reward over the window reached the threshold.
    pub fn report(&mut self, reward: f32, step: usize, recorder: &mut impl Recorder) -> bool {
        if self.rewards.len() == self.config.window.max(1) {
            self.rewards.pop_front();
        }
        self.rewards.push_back(reward);
        self.n_games += 1;

        let elapsed = self.last_time.elapsed().as_secs_f32();
        let speed = match elapsed > 0.0 {
            true => step.saturating_sub(self.last_step) as f32 / elapsed,
            false => 0.0,
        };
        self.last_step = step;
        self.last_time = Instant::now();

        let mean = self.mean_reward().unwrap_or(reward);
        self.best_mean = Some(self.best_mean.map_or(mean, |m| m.max(mean)));
        info!(
            "{}: done {} games, mean reward {:.3}, speed {:.2} f/s",
            step, self.n_games, mean, speed
        );

        let mut record = Record::from_slice(&[
            ("reward", RecordValue::Scalar(reward)),
            ("reward_100", RecordValue::Scalar(mean)),
            ("speed", RecordValue::Scalar(speed)),
        ]);
        record.insert(STEP_KEY, RecordValue::Step(step));
        recorder.write(record);

        if mean >= self.config.stop_reward {
            info!("Solved in {} frames!", step);
            return true;
        }
        false
    }
}

impl Drop for RewardTracker {
    fn drop(&mut self) {
        match self.best_mean {
            Some(best) => info!(
                "Reward tracker: {} games, best mean reward {:.3}",
                self.n_games, best
            ),
            None => info!("Reward tracker: no game finished"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use border_core::record::BufferedRecorder;
    use test_log::test;

    #[test]
    fn test_stop_at_threshold() {
        let config = RewardTrackerConfig::default().window(3).stop_reward(20.0);
        let mut tracker = RewardTracker::new(&config);
        let mut recorder = BufferedRecorder::new();

        assert!(!tracker.report(10.0, 100, &mut recorder));
        assert!(!tracker.report(20.0, 200, &mut recorder));
        assert!(tracker.report(30.0, 300, &mut recorder));
        assert_eq!(tracker.mean_reward(), Some(20.0));

        assert_eq!(recorder.scalars("reward"), vec![10.0, 20.0, 30.0]);
        assert_eq!(recorder.scalars("reward_100"), vec![10.0, 15.0, 20.0]);
        assert_eq!(recorder.steps(), vec![100, 200, 300]);
    }

    #[test]
    fn test_window_slides() {
        let config = RewardTrackerConfig::default().window(2).stop_reward(100.0);
        let mut tracker = RewardTracker::new(&config);
        let mut recorder = BufferedRecorder::new();

        for (i, r) in [1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            tracker.report(*r, i, &mut recorder);
        }
        assert_eq!(tracker.mean_reward(), Some(3.5));
        assert_eq!(tracker.n_games(), 4);
    }

    #[test]
    fn test_large_steps_stay_distinct() {
        let config = RewardTrackerConfig::default();
        let mut tracker = RewardTracker::new(&config);
        let mut recorder = BufferedRecorder::new();
        let step = 1 << 24;

        for i in 0..3 {
            tracker.report(0.0, step + i, &mut recorder);
        }
        assert_eq!(recorder.steps(), vec![step, step + 1, step + 2]);
    }
}
