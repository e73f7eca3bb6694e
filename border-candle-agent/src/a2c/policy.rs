use crate::{model::A2cNet, util::obs_to_tensor};
use anyhow::Result;
use border_core::{Env, Policy};
use candle_core::{Device, Tensor, D};
use candle_nn::ops::softmax;
use rand::{distributions::WeightedIndex, rngs::SmallRng, Rng, SeedableRng};
use std::sync::Arc;

/// Samples an action for each row of `logits` from the softmax distribution.
pub(super) fn sample_actions(logits: &Tensor, rng: &mut impl Rng) -> Result<Vec<usize>> {
    let probs = softmax(logits, D::Minus1)?.to_vec2::<f32>()?;
    probs
        .into_iter()
        .map(|p| Ok(rng.sample(WeightedIndex::new(&p)?)))
        .collect()
}

/// Stochastic policy reading the parameters of an [`A2c`](super::A2c) agent.
///
/// The parameters are not copied. Updates by the learner become visible to the policy
/// while it is in use, possibly in the middle of a forward pass.
pub struct A2cPolicy<N: A2cNet> {
    pub(super) net: Arc<N>,
    device: Device,
    rng: SmallRng,
}

impl<N: A2cNet> A2cPolicy<N> {
    pub(super) fn new(net: Arc<N>, device: Device, seed: u64) -> Self {
        Self {
            net,
            device,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<E: Env, N: A2cNet> Policy<E> for A2cPolicy<N> {
    fn sample(&mut self, obs: &[E::Obs]) -> Result<Vec<usize>> {
        let xs = obs_to_tensor(obs.iter(), &self.device)?;
        let (logits, _) = self.net.forward(&xs)?;
        sample_actions(&logits.detach(), &mut self.rng)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sample_follows_logits() -> Result<()> {
        let mut rng = SmallRng::seed_from_u64(0);
        let logits = Tensor::new(&[[0f32, -1e4, -1e4], [-1e4, -1e4, 0.0]], &Device::Cpu)?;
        for _ in 0..10 {
            assert_eq!(sample_actions(&logits, &mut rng)?, vec![0, 2]);
        }

        // Uniform logits reach every action
        let logits = Tensor::zeros((200, 3), candle_core::DType::F32, &Device::Cpu)?;
        let mut acts = sample_actions(&logits, &mut rng)?;
        acts.sort();
        acts.dedup();
        assert_eq!(acts, vec![0, 1, 2]);
        Ok(())
    }
}
