use super::MlpA2cNetConfig;
use crate::model::A2cNet;
use anyhow::Result;
use candle_core::{Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Returns vector of linear modules of the shared layers.
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpA2cNetConfig) -> Result<Vec<Linear>> {
    let mut dims = vec![config.in_dim];
    dims.extend(config.units.iter());
    let vs = vs.pp(prefix);

    dims.windows(2)
        .enumerate()
        .map(|(i, w)| Ok(linear(w[0], w[1], vs.pp(format!("ln{}", i)))?))
        .collect()
}

/// Multilayer perceptron with ReLU activation function, outputting logits and a state value.
pub struct MlpA2cNet {
    layers: Vec<Linear>,
    policy: Linear,
    value: Linear,
    input_scale: f64,
}

impl A2cNet for MlpA2cNet {
    type Config = MlpA2cNetConfig;

    fn build(vs: VarBuilder, config: Self::Config) -> Result<Self> {
        let layers = create_linear_layers("mlp", vs.clone(), &config)?;
        let in_dim = *config.units.last().unwrap_or(&config.in_dim);

        Ok(Self {
            layers,
            policy: linear(in_dim, config.n_actions, vs.pp("policy"))?,
            value: linear(in_dim, 1, vs.pp("value"))?,
            input_scale: config.input_scale,
        })
    }

    fn forward(&self, xs: &Tensor) -> Result<(Tensor, Tensor)> {
        let mut xs = (xs.flatten_from(1)? * self.input_scale)?;
        for layer in self.layers.iter() {
            xs = layer.forward(&xs)?.relu()?;
        }
        let logits = self.policy.forward(&xs)?;
        let value = self.value.forward(&xs)?.squeeze(1)?;
        Ok((logits, value))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_forward_shapes() -> Result<()> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let net = MlpA2cNet::build(vb, MlpA2cNetConfig::new(6, vec![8, 8], 3))?;

        // Observations of shape [2, 3] are flattened
        let xs = Tensor::ones((4, 2, 3), DType::F32, &device)?;
        let (logits, value) = net.forward(&xs)?;
        assert_eq!(logits.dims(), &[4, 3]);
        assert_eq!(value.dims(), &[4]);

        // Two shared layers and two heads, each with weight and bias
        assert_eq!(varmap.all_vars().len(), 8);
        Ok(())
    }
}
