//! Core functionalities.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Configurable, Policy};
use std::fmt::Debug;
pub use step::Step;

/// An observation of an environment.
///
/// An observation is a dense array of `f32` values in row-major order.
/// Observations emitted by an environment share the same shape, which allows
/// stacking them into a batch without copying element by element.
pub trait Obs: Clone + Debug + Send + 'static {
    /// Returns the shape of the observation.
    fn shape(&self) -> &[usize];

    /// Returns the values of the observation in row-major order.
    fn as_slice(&self) -> &[f32];

    /// Returns the number of values in the observation.
    fn numel(&self) -> usize {
        self.shape().iter().product()
    }
}

/// An [`Obs`] backed by a vector.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayObs {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl ArrayObs {
    /// Creates an observation.
    ///
    /// Returns an error if the length of `data` does not match `shape`.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> anyhow::Result<Self> {
        let n: usize = shape.iter().product();
        if n != data.len() {
            return Err(crate::error::BorderError::ObsShapeMismatch {
                expected: shape,
                actual: vec![data.len()],
            }
            .into());
        }
        Ok(Self { shape, data })
    }

    /// Creates a one-dimensional observation.
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Consumes the observation and returns its values.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

impl Obs for ArrayObs {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_array_obs_shape_check() {
        assert!(ArrayObs::new(vec![2, 3], vec![0.0; 6]).is_ok());
        assert!(ArrayObs::new(vec![2, 3], vec![0.0; 5]).is_err());

        let obs = ArrayObs::from_vec(vec![1.0, 2.0]);
        assert_eq!(obs.shape(), &[2]);
        assert_eq!(obs.numel(), 2);
    }
}
