//! Entry point of an A3C run.
use crate::A3cConfig;
use anyhow::Result;
use border_async_trainer::{util::train_async, AsyncTrainStat};
use border_candle_agent::{a2c::A2c, model::A2cNet, Device};
use border_core::{Configurable, Env};
use border_tensorboard::TensorboardRecorder;
use log::info;
use std::path::Path;

/// Trains an advantage actor-critic agent asynchronously and blocks until training stops.
///
/// Training stops when the mean total reward of recent episodes reaches
/// [`A3cConfig::reward_stop_threshold`], or after [`A3cConfig::max_opt_steps`] optimization
/// steps if set. Metrics are written to Tensorboard event files in `model_dir`, together with
/// the configuration (`a3c.yaml`) and the trained parameters.
///
/// * `config` - Hyperparameters of the run.
/// * `env_config` - Configuration of the environments owned by actors.
/// * `net_config` - Configuration of the policy/value network.
/// * `model_dir` - Output directory.
pub fn run<E, N>(
    config: &A3cConfig,
    env_config: &E::Config,
    net_config: N::Config,
    model_dir: impl AsRef<Path>,
) -> Result<AsyncTrainStat>
where
    E: Env + 'static,
    E::Config: Send + 'static,
    N: A2cNet,
{
    config.validate()?;
    let model_dir = model_dir.as_ref();
    std::fs::create_dir_all(model_dir)?;
    config.save(model_dir.join("a3c.yaml"))?;

    let device = Device::select(config.use_accelerator);
    info!("Device: {:?}", device);
    let mut agent = A2c::<E, N>::build(config.a2c_config(net_config, device))?;
    let mut recorder = TensorboardRecorder::new(model_dir);

    let stats = train_async::<_, E>(
        &mut agent,
        env_config,
        &config.actor_manager_config(),
        &config.async_trainer_config(Some(model_dir)),
        &config.reward_tracker_config(),
        &mut recorder,
    )?;
    info!(
        "Finished with {} transitions and {} optimization steps ({:?})",
        stats.samples, stats.opt_steps, stats.stop_reason
    );

    Ok(stats)
}
