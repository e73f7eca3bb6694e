use super::AtariA2cNetConfig;
use crate::model::A2cNet;
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{conv::Conv2dConfig, conv2d, linear, Conv2d, Linear, Module, VarBuilder};

/// Kernel sizes and strides of the convolution layers.
const CONV_LAYERS: [(usize, usize, usize); 3] = [(32, 8, 4), (64, 4, 2), (64, 3, 1)];

fn stride(s: usize) -> Conv2dConfig {
    Conv2dConfig {
        stride: s,
        ..Default::default()
    }
}

/// Returns the number of features after the convolution layers.
fn conv_out_dim(in_shape: &[usize]) -> Result<usize> {
    if in_shape.len() != 3 {
        anyhow::bail!("in_shape must be [channels, height, width], got {:?}", in_shape);
    }
    let (mut h, mut w) = (in_shape[1], in_shape[2]);
    let mut c = in_shape[0];
    for (out_channels, kernel, s) in CONV_LAYERS.iter() {
        if h < *kernel || w < *kernel {
            anyhow::bail!("Observation {:?} is too small for the convolution layers", in_shape);
        }
        h = (h - kernel) / s + 1;
        w = (w - kernel) / s + 1;
        c = *out_channels;
    }
    Ok(c * h * w)
}

#[allow(clippy::upper_case_acronyms)]
/// Convolutional network with the architecture of the DQN paper, having a policy head and a
/// value head on the shared convolution layers.
pub struct AtariA2cNet {
    convs: Vec<Conv2d>,
    policy1: Linear,
    policy2: Linear,
    value1: Linear,
    value2: Linear,
    input_scale: f64,
}

impl A2cNet for AtariA2cNet {
    type Config = AtariA2cNetConfig;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let conv_out = conv_out_dim(&config.in_shape)?;
        let mut in_channels = config.in_shape[0];
        let mut convs = vec![];
        for (i, (out_channels, kernel, s)) in CONV_LAYERS.iter().enumerate() {
            let conv = conv2d(
                in_channels,
                *out_channels,
                *kernel,
                stride(*s),
                vb.pp(format!("c{}", i + 1)),
            )?;
            convs.push(conv);
            in_channels = *out_channels;
        }
        let n_hidden = config.n_hidden;

        Ok(Self {
            convs,
            policy1: linear(conv_out, n_hidden, vb.pp("p1"))?,
            policy2: linear(n_hidden, config.n_actions, vb.pp("p2"))?,
            value1: linear(conv_out, n_hidden, vb.pp("v1"))?,
            value2: linear(n_hidden, 1, vb.pp("v2"))?,
            input_scale: config.input_scale,
        })
    }

    fn forward(&self, xs: &Tensor) -> Result<(Tensor, Tensor)> {
        let mut xs = (xs * self.input_scale)?;
        for conv in self.convs.iter() {
            xs = conv.forward(&xs)?.relu()?;
        }
        let xs = xs.flatten_from(1)?;
        let logits = self.policy2.forward(&self.policy1.forward(&xs)?.relu()?)?;
        let value = self
            .value2
            .forward(&self.value1.forward(&xs)?.relu()?)?
            .squeeze(1)?;
        Ok((logits, value))
    }
}
