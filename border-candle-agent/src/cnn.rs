//! Convolutional policy/value network.
mod base;
mod config;
pub use base::AtariA2cNet;
pub use config::AtariA2cNetConfig;
