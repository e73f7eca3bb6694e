//! Advantage actor-critic agent implemented with candle.
use super::{
    config::A2cConfig,
    policy::{sample_actions, A2cPolicy},
};
use crate::{
    model::A2cNet,
    opt::Optimizer,
    util::{accumulate_grads, clip_grad_norm, flatten_grads, obs_to_tensor, param_stats, GradStats},
    Device as ConfigDevice,
};
use anyhow::{Context, Result};
use border_core::{
    error::BorderError,
    record::{Record, RecordValue},
    Agent, Configurable, Env, Policy, Transition,
};
use candle_core::{backprop::GradStore, DType, Device, Tensor, Var, D};
use candle_nn::{
    loss::mse,
    ops::{log_softmax, softmax},
    VarBuilder, VarMap,
};
use log::{debug, info};
use rand::{rngs::SmallRng, SeedableRng};
use std::{fs, marker::PhantomData, path::Path, sync::Arc};

const PARAMS_FILE: &str = "a2c.safetensors";

/// Advantage actor-critic agent implemented with candle.
///
/// The agent owns the parameters of the policy/value network and the state of the
/// optimizer. Parameters are shared with the [`A2cPolicy`] handles created by
/// [`A2c::share`].
pub struct A2c<E, N>
where
    E: Env,
    N: A2cNet,
{
    net: Arc<N>,
    varmap: VarMap,
    vars: Vec<Var>,
    opt: Optimizer,
    device: Device,
    entropy_beta: f64,
    gamma_n: f32,
    clip_grad_norm: f64,
    n_opts: usize,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

/// Returns the variables ordered by their names.
fn sorted_vars(varmap: &VarMap) -> Vec<Var> {
    let data = varmap.data().lock().unwrap();
    let mut vars = data.iter().collect::<Vec<_>>();
    vars.sort_by(|a, b| a.0.cmp(b.0));
    vars.into_iter().map(|(_, v)| v.clone()).collect()
}

/// Losses of a batch, before summation.
struct Losses {
    value: Tensor,
    adv: Tensor,
    policy: Tensor,
    value_loss: Tensor,
    entropy: Tensor,
}

fn mean_scalar(t: &Tensor) -> Result<f32> {
    Ok(t.mean_all()?.to_scalar::<f32>()?)
}

impl<E, N> A2c<E, N>
where
    E: Env,
    N: A2cNet,
{
    /// Converts a batch of transitions into tensors of states, actions and returns.
    ///
    /// The return of a transition with `last_state` is its n-step reward plus
    /// `gamma^n_steps` times the state value of `last_state`, evaluated with the current
    /// parameters in one forward pass over all such transitions. The return of a transition
    /// without `last_state` is its reward.
    pub fn unpack_batch(&self, batch: &[Transition<E::Obs>]) -> Result<(Tensor, Tensor, Tensor)> {
        let states = obs_to_tensor(batch.iter().map(|t| &t.state), &self.device)?;
        let actions = batch.iter().map(|t| t.action as u32).collect::<Vec<_>>();
        let actions = Tensor::from_vec(actions, (batch.len(),), &self.device)?;
        let mut returns = batch.iter().map(|t| t.reward).collect::<Vec<_>>();

        let not_done_ixs = batch
            .iter()
            .enumerate()
            .filter_map(|(ix, t)| t.last_state.as_ref().map(|_| ix))
            .collect::<Vec<_>>();

        if !not_done_ixs.is_empty() {
            let last_states = obs_to_tensor(
                batch.iter().filter_map(|t| t.last_state.as_ref()),
                &self.device,
            )?;
            let (_, last_values) = self.net.forward(&last_states)?;
            let last_values = last_values.detach().to_vec1::<f32>()?;
            for (ix, v) in not_done_ixs.into_iter().zip(last_values.into_iter()) {
                returns[ix] += self.gamma_n * v;
            }
        }

        let returns = Tensor::from_vec(returns, (batch.len(),), &self.device)?;
        Ok((states, actions, returns))
    }

    /// Computes the losses of a batch with the current parameters.
    fn losses(&self, states: &Tensor, actions: &Tensor, returns: &Tensor) -> Result<Losses> {
        let (logits, value) = self.net.forward(states)?;

        let value_loss = mse(&value, returns)?;
        let adv = (returns - value.detach())?;
        let log_prob = log_softmax(&logits, D::Minus1)?;
        let log_prob_actions = log_prob.gather(&actions.unsqueeze(1)?, 1)?.squeeze(1)?;
        let policy = (&adv * &log_prob_actions)?.mean_all()?.neg()?;
        let prob = softmax(&logits, D::Minus1)?;
        let entropy = ((&prob * &log_prob)?.sum(1)?.mean_all()? * self.entropy_beta)?;

        Ok(Losses {
            value,
            adv,
            policy,
            value_loss,
            entropy,
        })
    }

    /// Returns the clipped gradient of the total loss, the statistics of the gradient of the
    /// policy loss and the global gradient norm before clipping.
    ///
    /// The policy loss is differentiated first, then the gradient of the value and entropy
    /// losses is added onto it.
    fn clipped_grads(&self, losses: &Losses) -> Result<(GradStore, GradStats, f32)> {
        let grads_policy = losses.policy.backward()?;
        let grad_stats = GradStats::from_flat(&flatten_grads(&grads_policy, &self.vars)?);

        let mut grads = (&losses.entropy + &losses.value_loss)?.backward()?;
        accumulate_grads(&mut grads, grads_policy, &self.vars)?;
        let norm = clip_grad_norm(&mut grads, &self.vars, self.clip_grad_norm)?;
        Ok((grads, grad_stats, norm))
    }

    /// Performs an optimization step.
    ///
    /// `actions` is a `u32` tensor of the indices of the actions taken at `states` and
    /// `returns` is the regression target of the state values. Returns the losses, the means
    /// of advantages, values and returns, and statistics of the gradient of the policy loss.
    ///
    /// If the loss or the gradient norm is not finite, the parameters are not updated and
    /// [`BorderError::NonFiniteLoss`] or [`BorderError::NonFiniteGradient`] is returned.
    pub fn update(&mut self, states: &Tensor, actions: &Tensor, returns: &Tensor) -> Result<Record> {
        let losses = self.losses(states, actions, returns)?;
        let loss_policy = losses.policy.to_scalar::<f32>()?;
        let loss_value = losses.value_loss.to_scalar::<f32>()?;
        let loss_entropy = losses.entropy.to_scalar::<f32>()?;

        let loss_total = loss_entropy + loss_value + loss_policy;
        if !loss_total.is_finite() {
            return Err(BorderError::NonFiniteLoss(loss_total).into());
        }

        let (grads, grad_stats, grad_norm) = self.clipped_grads(&losses)?;
        if !grad_norm.is_finite() {
            return Err(BorderError::NonFiniteGradient(grad_norm).into());
        }
        self.opt.step(&grads)?;
        self.n_opts += 1;
        debug!("opt step {}: loss = {}, grad_norm = {}", self.n_opts, loss_total, grad_norm);

        Ok(Record::from_slice(&[
            ("advantage", RecordValue::Scalar(mean_scalar(&losses.adv)?)),
            ("values", RecordValue::Scalar(mean_scalar(&losses.value)?)),
            ("batch_rewards", RecordValue::Scalar(mean_scalar(returns)?)),
            ("loss_entropy", RecordValue::Scalar(loss_entropy)),
            ("loss_policy", RecordValue::Scalar(loss_policy)),
            ("loss_value", RecordValue::Scalar(loss_value)),
            ("loss_total", RecordValue::Scalar(loss_total)),
            ("grad_l2", RecordValue::Scalar(grad_stats.l2)),
            ("grad_max", RecordValue::Scalar(grad_stats.max)),
            ("grad_var", RecordValue::Scalar(grad_stats.var)),
        ]))
    }

    /// Creates a policy sharing the parameters of this agent.
    pub fn share(&self, seed: u64) -> A2cPolicy<N> {
        A2cPolicy::new(self.net.clone(), self.device.clone(), seed)
    }

    /// Returns the parameters.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }
}

impl<E, N> Configurable for A2c<E, N>
where
    E: Env,
    N: A2cNet,
{
    type Config = A2cConfig<N::Config>;

    /// Constructs [`A2c`] agent.
    fn build(config: Self::Config) -> Result<Self> {
        let device = config.device.unwrap_or(ConfigDevice::Cpu).build()?;
        let net_config = config.net_config.context("net_config is not set.")?;
        let varmap = VarMap::new();
        let net = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            N::build(vb, net_config)?
        };
        let vars = sorted_vars(&varmap);
        let opt = config.opt_config.build(vars.clone())?;

        Ok(Self {
            net: Arc::new(net),
            varmap,
            vars,
            opt,
            device,
            entropy_beta: config.entropy_beta,
            gamma_n: config.gamma.powi(config.n_steps as i32) as f32,
            clip_grad_norm: config.clip_grad_norm,
            n_opts: 0,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }
}

impl<E, N> Policy<E> for A2c<E, N>
where
    E: Env,
    N: A2cNet,
{
    fn sample(&mut self, obs: &[E::Obs]) -> Result<Vec<usize>> {
        let xs = obs_to_tensor(obs.iter(), &self.device)?;
        let (logits, _) = self.net.forward(&xs)?;
        sample_actions(&logits.detach(), &mut self.rng)
    }
}

impl<E, N> Agent<E> for A2c<E, N>
where
    E: Env,
    N: A2cNet,
{
    fn opt_with_record(&mut self, batch: &[Transition<E::Obs>]) -> Result<Record> {
        if batch.is_empty() {
            anyhow::bail!("Cannot optimize with an empty batch");
        }
        let (states, actions, returns) = self.unpack_batch(batch)?;
        self.update(&states, &actions, &returns)
    }

    fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Returns the mean and standard deviation of each parameter tensor.
    fn param_stats(&self) -> Result<Record> {
        param_stats(&self.varmap)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        let path = path.join(PARAMS_FILE);
        self.varmap.save(&path)?;
        info!("Save a2c parameters to {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        let path = path.join(PARAMS_FILE);
        self.varmap.load(&path)?;
        info!("Load a2c parameters from {:?}", path);
        Ok(())
    }
}

#[cfg(feature = "border-async-trainer")]
impl<E, N> border_async_trainer::SharedPolicy<E> for A2c<E, N>
where
    E: Env,
    N: A2cNet,
{
    type Policy = A2cPolicy<N>;

    fn shared_policy(&self, seed: u64) -> Self::Policy {
        self.share(seed)
    }
}
