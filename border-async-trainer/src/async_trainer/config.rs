use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`AsyncTrainer`](crate::AsyncTrainer).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AsyncTrainerConfig {
    /// Number of transitions in a batch of an optimization step.
    ///
    /// The default value is 128.
    pub batch_size: usize,

    /// Interval of flushing records in optimization steps.
    ///
    /// Records of optimization steps are averaged over the interval. The default value is 10.
    pub record_interval: usize,

    /// The maximum number of optimization steps, unbounded if `None`.
    pub max_opts: Option<usize>,

    /// Where to save the trained model.
    pub model_dir: Option<String>,
}

impl Default for AsyncTrainerConfig {
    fn default() -> Self {
        Self {
            batch_size: 128,
            record_interval: 10,
            max_opts: None,
            model_dir: None,
        }
    }
}

impl AsyncTrainerConfig {
    /// Constructs [`AsyncTrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AsyncTrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the interval of flushing records.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Sets the maximum number of optimization steps.
    pub fn max_opts(mut self, v: usize) -> Self {
        self.max_opts = Some(v);
        self
    }

    /// Sets the directory the trained model being saved.
    pub fn model_dir<T: Into<String>>(mut self, model_dir: T) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }
}
