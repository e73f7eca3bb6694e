//! Advantage actor-critic agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! [`a2c::A2c`] is the learner side of asynchronous advantage actor-critic training. It owns
//! the parameters of a policy/value network ([`model::A2cNet`]) and performs the update step,
//! while [`a2c::A2cPolicy`] handles share the same parameters with actor threads.
pub mod a2c;
pub mod cnn;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod util;
use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Device {
    /// Returns `Cuda(0)` if `use_accelerator` is `true` and CUDA is available, `Cpu` otherwise.
    pub fn select(use_accelerator: bool) -> Self {
        match use_accelerator {
            false => Self::Cpu,
            true if candle_core::utils::cuda_is_available() => Self::Cuda(0),
            true => {
                warn!("CUDA is not available, falling back to CPU");
                Self::Cpu
            }
        }
    }

    /// Creates the corresponding [`candle_core::Device`].
    pub fn build(self) -> Result<candle_core::Device> {
        match self {
            Self::Cpu => Ok(candle_core::Device::Cpu),
            Self::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}

impl From<&candle_core::Device> for Device {
    fn from(device: &candle_core::Device) -> Self {
        match device.location() {
            candle_core::DeviceLocation::Cuda { gpu_id } => Self::Cuda(gpu_id),
            _ => Self::Cpu,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_device_without_accelerator() -> Result<()> {
        assert_eq!(Device::select(false), Device::Cpu);
        let device = Device::Cpu.build()?;
        assert_eq!(Device::from(&device), Device::Cpu);
        Ok(())
    }
}
