//! Multilayer perceptron with a policy head and a value head.
mod base;
mod config;
pub use base::MlpA2cNet;
pub use config::MlpA2cNetConfig;
