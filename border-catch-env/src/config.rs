//! Configuration of [`CatchEnv`](super::CatchEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`CatchEnv`](super::CatchEnv).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CatchEnvConfig {
    /// Number of rows of the grid, including the row of the paddle.
    pub rows: usize,

    /// Number of columns of the grid.
    pub cols: usize,

    /// Side length of a cell in pixels.
    pub cell_size: usize,

    /// Number of balls dropped in an episode.
    pub balls_per_episode: usize,
}

impl Default for CatchEnvConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 5,
            cell_size: 1,
            balls_per_episode: 21,
        }
    }
}

impl CatchEnvConfig {
    /// Sets the number of rows.
    pub fn rows(mut self, v: usize) -> Self {
        self.rows = v;
        self
    }

    /// Sets the number of columns.
    pub fn cols(mut self, v: usize) -> Self {
        self.cols = v;
        self
    }

    /// Sets the side length of a cell in pixels.
    pub fn cell_size(mut self, v: usize) -> Self {
        self.cell_size = v;
        self
    }

    /// Sets the number of balls in an episode.
    pub fn balls_per_episode(mut self, v: usize) -> Self {
        self.balls_per_episode = v;
        self
    }

    /// Shape of observations, `[1, rows * cell_size, cols * cell_size]`.
    pub fn obs_shape(&self) -> Vec<usize> {
        vec![1, self.rows * self.cell_size, self.cols * self.cell_size]
    }

    /// Loads [`CatchEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CatchEnvConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.rows < 2 || self.cols == 0 || self.cell_size == 0 || self.balls_per_episode == 0 {
            anyhow::bail!("Invalid configuration of the catch environment: {:?}", self);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_catch_env_config() -> Result<()> {
        let config = CatchEnvConfig::default().rows(12).cols(6).cell_size(8);
        let dir = TempDir::new("catch_env_config")?;
        let path = dir.path().join("catch_env_config.yaml");
        config.save(&path)?;
        assert_eq!(CatchEnvConfig::load(&path)?, config);
        assert_eq!(config.obs_shape(), vec![1, 96, 48]);
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        assert!(CatchEnvConfig::default().rows(1).check().is_err());
        assert!(CatchEnvConfig::default().cell_size(0).check().is_err());
        assert!(CatchEnvConfig::default().check().is_ok());
    }
}
