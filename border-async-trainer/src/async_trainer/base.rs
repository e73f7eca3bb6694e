use crate::{
    AsyncTrainStat, AsyncTrainerConfig, BorderAsyncTrainerError, QueueItem, QueueReceiver,
    RewardTracker, StopReason,
};
use anyhow::Result;
use border_core::{
    error::BorderError,
    record::{AggregateRecorder, Record},
    Agent, Env, Transition,
};
use log::{debug, info};
use std::{marker::PhantomData, path::Path, time::SystemTime};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs the learner loop of asynchronous advantage actor-critic training.
///
/// # Learner loop
///
/// [`AsyncTrainer::train()`] pops [`QueueItem`]s pushed by actors until training stops:
///
/// 1. [`QueueItem::End`] decrements the number of live actors. The loop stops when no
///    actor is left.
/// 2. [`QueueItem::TotalReward`] is reported to the [`RewardTracker`]. The loop stops when
///    the tracker signals that the mean reward reached its threshold.
/// 3. [`QueueItem::Transition`] is appended to the batch. When the batch has `batch_size`
///    transitions, the agent performs an optimization step on it
///    ([`Agent::opt_with_record`]) and the batch is cleared.
///     * The record of the optimization step is stored in the recorder and flushed every
///       `record_interval` optimization steps.
///     * The loop stops when the number of optimization steps reaches `max_opts`.
///
/// The step index attached to records is the number of transitions received so far.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Accumulating
///     Accumulating --> Accumulating: Transition
///     Accumulating --> Updating: batch full
///     Updating --> Accumulating
///     Accumulating --> Reporting: TotalReward
///     Reporting --> Accumulating
///     Reporting --> Stopped: solved
///     Accumulating --> Stopped: last End
///     Updating --> Stopped: max_opts
/// ```
///
/// The receiver is dropped when [`AsyncTrainer::train()`] returns, which releases actors
/// blocked on the full queue.
///
/// # Errors
///
/// * [`BorderAsyncTrainerError::ActorsDisconnected`] if every actor dropped its sender before
///   all end markers were received, e.g., because actors crashed.
/// * [`BorderAsyncTrainerError::NonFiniteLoss`] or
///   [`BorderAsyncTrainerError::NonFiniteGradient`] if the agent rejected an optimization step
///   with [`BorderError::NonFiniteLoss`] or [`BorderError::NonFiniteGradient`].
pub struct AsyncTrainer<A, E>
where
    A: Agent<E>,
    E: Env,
{
    /// Where to save the trained model.
    model_dir: Option<String>,

    /// Number of transitions in a batch.
    batch_size: usize,

    /// Interval of flushing records in optimization steps.
    record_interval: usize,

    /// The maximal number of optimization steps.
    max_opts: Option<usize>,

    /// Number of actors pushing into the queue.
    n_actors: usize,

    phantom: PhantomData<fn() -> (A, E)>,
}

impl<A, E> AsyncTrainer<A, E>
where
    A: Agent<E>,
    E: Env,
{
    /// Creates [`AsyncTrainer`].
    pub fn build(config: &AsyncTrainerConfig, n_actors: usize) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(
                BorderAsyncTrainerError::InvalidConfig("batch_size must be positive".into()).into(),
            );
        }

        Ok(Self {
            model_dir: config.model_dir.clone(),
            batch_size: config.batch_size,
            record_interval: config.record_interval.max(1),
            max_opts: config.max_opts,
            n_actors,
            phantom: PhantomData,
        })
    }

    fn save_model(&self, agent: &A) -> Result<()> {
        if let Some(model_dir) = &self.model_dir {
            std::fs::create_dir_all(model_dir)?;
            agent.save_params(Path::new(model_dir))?;
            info!("Saved the model in {:?}", model_dir);
        }
        Ok(())
    }

    /// Performs an optimization step, mapping a non-finite loss or gradient to a trainer error.
    fn opt_with_record(
        agent: &mut A,
        batch: &[Transition<E::Obs>],
        opt_steps: usize,
    ) -> Result<Record> {
        agent.opt_with_record(batch).map_err(|e| {
            match e.downcast_ref::<BorderError>() {
                Some(BorderError::NonFiniteLoss(loss)) => BorderAsyncTrainerError::NonFiniteLoss {
                    opt_steps,
                    loss: *loss,
                }
                .into(),
                Some(BorderError::NonFiniteGradient(norm)) => {
                    BorderAsyncTrainerError::NonFiniteGradient {
                        opt_steps,
                        norm: *norm,
                    }
                    .into()
                }
                _ => e,
            }
        })
    }

    /// Runs the learner loop until training stops.
    pub fn train(
        &mut self,
        agent: &mut A,
        receiver: QueueReceiver<E::Obs>,
        tracker: &mut RewardTracker,
        recorder: &mut impl AggregateRecorder,
    ) -> Result<AsyncTrainStat> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut live_actors = self.n_actors;
        let mut samples = 0;
        let mut opt_steps = 0;
        let time = SystemTime::now();

        let stop_reason = loop {
            let item = receiver
                .pop()
                .map_err(|_| BorderAsyncTrainerError::ActorsDisconnected)?;

            match item {
                QueueItem::End(id) => {
                    live_actors = live_actors.saturating_sub(1);
                    debug!("Actor {} finished, {} actors left", id, live_actors);
                    if live_actors == 0 {
                        break StopReason::ActorsFinished;
                    }
                }
                QueueItem::TotalReward(reward) => {
                    if tracker.report(reward, samples, recorder) {
                        break StopReason::Solved;
                    }
                }
                QueueItem::Transition(transition) => {
                    samples += 1;
                    batch.push(transition);
                    if batch.len() < self.batch_size {
                        continue;
                    }

                    let record = Self::opt_with_record(agent, &batch, opt_steps)?;
                    batch.clear();
                    opt_steps += 1;

                    recorder.store(record);
                    if opt_steps % self.record_interval == 0 {
                        let params = agent.param_stats()?;
                        if !params.is_empty() {
                            recorder.store(params);
                        }
                        recorder.flush(samples);
                    }
                    if self.max_opts.map_or(false, |max| opt_steps >= max) {
                        break StopReason::MaxOpts;
                    }
                }
            }
        };
        drop(receiver);
        recorder.flush(samples);
        info!("Learner stopped: {:?}", stop_reason);

        self.save_model(agent)?;

        let duration = time.elapsed()?;
        let secs = duration.as_secs_f32();
        Ok(AsyncTrainStat {
            samples,
            opt_steps,
            samples_per_sec: samples as f32 / secs,
            opt_per_sec: opt_steps as f32 / secs,
            duration,
            stop_reason,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{RewardTrackerConfig, TransitionQueue};
    use border_core::{
        dummy::ScriptedEnv,
        record::BufferedRecorder,
        ArrayObs, Policy,
    };
    use tempdir::TempDir;
    use test_log::test;

    /// Records the sizes of the batches it is optimized on.
    #[derive(Default)]
    struct BatchCounter {
        batch_sizes: Vec<usize>,
        non_finite_at: Option<usize>,
        non_finite_grad_at: Option<usize>,
    }

    impl Policy<ScriptedEnv> for BatchCounter {
        fn sample(&mut self, obs: &[ArrayObs]) -> Result<Vec<usize>> {
            Ok(vec![0; obs.len()])
        }
    }

    impl Agent<ScriptedEnv> for BatchCounter {
        fn opt_with_record(&mut self, batch: &[Transition<ArrayObs>]) -> Result<Record> {
            if self.non_finite_at == Some(self.batch_sizes.len()) {
                return Err(BorderError::NonFiniteLoss(f32::NAN).into());
            }
            if self.non_finite_grad_at == Some(self.batch_sizes.len()) {
                return Err(BorderError::NonFiniteGradient(f32::INFINITY).into());
            }
            self.batch_sizes.push(batch.len());
            let loss = batch.iter().map(|t| t.reward).sum::<f32>();
            Ok(Record::from_scalar("loss_total", loss))
        }

        fn n_opts(&self) -> usize {
            self.batch_sizes.len()
        }

        fn param_stats(&self) -> Result<Record> {
            Ok(Record::from_scalar("n_batches", self.batch_sizes.len() as f32))
        }

        fn save_params(&self, path: &Path) -> Result<()> {
            std::fs::write(path.join("counter.txt"), format!("{:?}", self.batch_sizes))?;
            Ok(())
        }

        fn load_params(&mut self, _path: &Path) -> Result<()> {
            unimplemented!();
        }
    }

    fn transition(reward: f32) -> QueueItem<ArrayObs> {
        QueueItem::Transition(Transition {
            state: ArrayObs::from_vec(vec![0.0, 0.0]),
            action: 0,
            reward,
            last_state: None,
        })
    }

    /// Runs the learner on the given items, pushed before training starts.
    fn train(
        items: Vec<QueueItem<ArrayObs>>,
        config: &AsyncTrainerConfig,
        n_actors: usize,
        agent: &mut BatchCounter,
        recorder: &mut BufferedRecorder,
    ) -> Result<AsyncTrainStat> {
        let (s, r) = TransitionQueue::bounded(items.len());
        for item in items.into_iter() {
            s.push(item)?;
        }
        drop(s);

        let tracker_config = RewardTrackerConfig::default().window(1).stop_reward(1.0);
        let mut tracker = RewardTracker::new(&tracker_config);
        let mut trainer = AsyncTrainer::<BatchCounter, ScriptedEnv>::build(config, n_actors)?;
        trainer.train(agent, r, &mut tracker, recorder)
    }

    #[test]
    fn test_stops_after_all_end_markers() -> Result<()> {
        let mut items = (0..10).map(|_| transition(1.0)).collect::<Vec<_>>();
        items.insert(3, QueueItem::End(0));
        items.push(QueueItem::End(1));

        let config = AsyncTrainerConfig::default().batch_size(4).record_interval(1);
        let mut agent = BatchCounter::default();
        let mut recorder = BufferedRecorder::new();
        let stat = train(items, &config, 2, &mut agent, &mut recorder)?;

        assert_eq!(stat.stop_reason, StopReason::ActorsFinished);
        assert_eq!(stat.samples, 10);
        assert_eq!(stat.opt_steps, 2);
        assert_eq!(agent.batch_sizes, vec![4, 4]);
        assert_eq!(recorder.scalars("loss_total"), vec![4.0, 4.0]);
        assert_eq!(recorder.steps(), vec![4, 8]);
        Ok(())
    }

    #[test]
    fn test_records_are_averaged_over_interval() -> Result<()> {
        let mut items = (0..6).map(|i| transition(i as f32)).collect::<Vec<_>>();
        items.push(QueueItem::End(0));

        let config = AsyncTrainerConfig::default().batch_size(2).record_interval(2);
        let mut agent = BatchCounter::default();
        let mut recorder = BufferedRecorder::new();
        train(items, &config, 1, &mut agent, &mut recorder)?;

        // Losses are 1, 5 and 9, the last one flushed at the end of training
        assert_eq!(recorder.scalars("loss_total"), vec![3.0, 9.0]);
        assert_eq!(recorder.steps(), vec![4, 6]);
        Ok(())
    }

    #[test]
    fn test_stops_when_solved() -> Result<()> {
        let mut items = (0..5).map(|_| transition(0.0)).collect::<Vec<_>>();
        items.push(QueueItem::TotalReward(0.5));
        items.push(QueueItem::TotalReward(1.5));
        items.extend((0..5).map(|_| transition(0.0)));

        let config = AsyncTrainerConfig::default().batch_size(4);
        let mut agent = BatchCounter::default();
        let mut recorder = BufferedRecorder::new();
        let stat = train(items, &config, 1, &mut agent, &mut recorder)?;

        assert_eq!(stat.stop_reason, StopReason::Solved);
        assert_eq!(stat.samples, 5);
        assert_eq!(stat.opt_steps, 1);
        assert_eq!(recorder.scalars("reward"), vec![0.5, 1.5]);
        Ok(())
    }

    #[test]
    fn test_stops_at_max_opts() -> Result<()> {
        let dir = TempDir::new("async_trainer")?;
        let model_dir = dir.path().join("model");
        let items = (0..20).map(|_| transition(0.0)).collect::<Vec<_>>();

        let config = AsyncTrainerConfig::default()
            .batch_size(4)
            .max_opts(3)
            .model_dir(model_dir.to_string_lossy());
        let mut agent = BatchCounter::default();
        let mut recorder = BufferedRecorder::new();
        let stat = train(items, &config, 1, &mut agent, &mut recorder)?;

        assert_eq!(stat.stop_reason, StopReason::MaxOpts);
        assert_eq!(stat.opt_steps, 3);
        assert!(model_dir.join("counter.txt").exists());
        Ok(())
    }

    #[test]
    fn test_disconnected_actors() {
        let items = vec![transition(0.0), QueueItem::End(0), transition(0.0)];
        let config = AsyncTrainerConfig::default().batch_size(4);
        let mut agent = BatchCounter::default();
        let mut recorder = BufferedRecorder::new();
        let err = train(items, &config, 2, &mut agent, &mut recorder).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BorderAsyncTrainerError>(),
            Some(BorderAsyncTrainerError::ActorsDisconnected)
        ));
    }

    #[test]
    fn test_non_finite_loss() {
        let items = (0..8).map(|_| transition(0.0)).collect::<Vec<_>>();
        let config = AsyncTrainerConfig::default().batch_size(4);
        let mut agent = BatchCounter {
            non_finite_at: Some(1),
            ..Default::default()
        };
        let mut recorder = BufferedRecorder::new();
        let err = train(items, &config, 1, &mut agent, &mut recorder).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BorderAsyncTrainerError>(),
            Some(BorderAsyncTrainerError::NonFiniteLoss { opt_steps: 1, .. })
        ));
        assert_eq!(agent.n_opts(), 1);
    }

    #[test]
    fn test_non_finite_gradient() {
        let items = (0..8).map(|_| transition(0.0)).collect::<Vec<_>>();
        let config = AsyncTrainerConfig::default().batch_size(4);
        let mut agent = BatchCounter {
            non_finite_grad_at: Some(0),
            ..Default::default()
        };
        let mut recorder = BufferedRecorder::new();
        let err = train(items, &config, 1, &mut agent, &mut recorder).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BorderAsyncTrainerError>(),
            Some(BorderAsyncTrainerError::NonFiniteGradient { opt_steps: 0, .. })
        ));
        assert_eq!(agent.n_opts(), 0);
    }

    #[test]
    fn test_param_stats_are_recorded_at_interval() -> Result<()> {
        let mut items = (0..6).map(|_| transition(0.0)).collect::<Vec<_>>();
        items.push(QueueItem::End(0));

        let config = AsyncTrainerConfig::default().batch_size(2).record_interval(2);
        let mut agent = BatchCounter::default();
        let mut recorder = BufferedRecorder::new();
        train(items, &config, 1, &mut agent, &mut recorder)?;

        // Stored with the second optimization step only, the final flush has none
        assert_eq!(recorder.scalars("n_batches"), vec![2.0]);
        assert_eq!(recorder.steps(), vec![4, 6]);
        Ok(())
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = AsyncTrainerConfig::default().batch_size(0);
        assert!(AsyncTrainer::<BatchCounter, ScriptedEnv>::build(&config, 1).is_err());
    }
}
