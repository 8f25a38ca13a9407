//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of epochs.
    pub epochs: usize,

    /// The number of environment steps in an epoch.
    pub steps_per_epoch: usize,

    /// Environment steps taken with uniformly random actions before the agent acts.
    pub start_steps: usize,

    /// The maximum length of an episode during training and validation.
    pub max_ep_len: usize,

    /// The number of episodes run in a validation pass at the end of every epoch.
    pub n_validation_episodes: usize,

    /// Where to save the trained model.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            steps_per_epoch: 5000,
            start_steps: 10000,
            max_ep_len: 1000,
            n_validation_episodes: 10,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of epochs.
    pub fn epochs(mut self, v: usize) -> Self {
        self.epochs = v;
        self
    }

    /// Sets the number of environment steps in an epoch.
    pub fn steps_per_epoch(mut self, v: usize) -> Self {
        self.steps_per_epoch = v;
        self
    }

    /// Sets the number of initial steps with random actions.
    pub fn start_steps(mut self, v: usize) -> Self {
        self.start_steps = v;
        self
    }

    /// Sets the maximum length of an episode.
    pub fn max_ep_len(mut self, v: usize) -> Self {
        self.max_ep_len = v;
        self
    }

    /// Sets the number of validation episodes.
    pub fn n_validation_episodes(mut self, v: usize) -> Self {
        self.n_validation_episodes = v;
        self
    }

    /// Sets the directory where the trained model is saved.
    pub fn model_dir<T: Into<String>>(mut self, model_dir: T) -> Self {
        self.model_dir = Some(model_dir.into());
        self
    }

    /// Returns the total number of environment steps.
    pub fn total_steps(&self) -> usize {
        self.epochs * self.steps_per_epoch
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
