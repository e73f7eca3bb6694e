//! Base implementation of records for logging.
use crate::error::BorderError;
use std::{
    collections::{
        hash_map::{Iter, Keys},
        HashMap,
    },
    convert::Into,
    iter::IntoIterator,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, typically used for metrics like loss or reward.
    Scalar(f32),

    /// A text value.
    String(String),

    /// A step index, kept exact at any magnitude.
    Step(usize),
}

/// A container for storing key-value pairs of various data types.
///
/// # Examples
///
/// ```rust
/// use border_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("loss_value", 0.5);
/// record.insert("grad_max", RecordValue::Scalar(0.1));
///
/// assert_eq!(record.get_scalar("loss_value").unwrap(), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Gets a scalar value from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not a scalar.
    pub fn get_scalar(&self, k: &str) -> Result<f32, BorderError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(BorderError::RecordValueTypeError("Scalar".to_string())),
            None => Err(BorderError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a step index from the record.
    pub fn get_step(&self, k: &str) -> Result<usize, BorderError> {
        match self.0.get(k) {
            Some(RecordValue::Step(v)) => Ok(*v),
            Some(_) => Err(BorderError::RecordValueTypeError("Step".to_string())),
            None => Err(BorderError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, BorderError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(BorderError::RecordValueTypeError("String".to_string())),
            None => Err(BorderError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_step_is_exact() {
        let mut record = Record::from_scalar("loss", 0.5);
        record.insert("step", RecordValue::Step((1 << 24) + 1));

        assert_eq!(record.get_step("step").unwrap(), 16_777_217);
        assert!(record.get_step("loss").is_err());
        assert!(record.get_scalar("step").is_err());
    }
}
