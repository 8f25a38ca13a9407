//! Normalization of the inputs of goal-conditioned policies.
use anyhow::Result;
use ddpg_core::error::DdpgError;
use serde::{Deserialize, Serialize};

/// Clipping thresholds of [`Normalizer`].
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct NormalizerConfig {
    /// Raw observations and goals are clipped to `[-clip_obs, clip_obs]`.
    pub clip_obs: f32,

    /// Normalized values are clipped to `[-clip_range, clip_range]`.
    pub clip_range: f32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            clip_obs: 200.0,
            clip_range: 5.0,
        }
    }
}

impl NormalizerConfig {
    /// Sets the clipping threshold of raw inputs.
    pub fn clip_obs(mut self, v: f32) -> Self {
        self.clip_obs = v;
        self
    }

    /// Sets the clipping threshold of normalized inputs.
    pub fn clip_range(mut self, v: f32) -> Self {
        self.clip_range = v;
        self
    }
}

/// Running statistics of observations and goals, frozen after training.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    obs_mean: Vec<f32>,
    obs_std: Vec<f32>,
    goal_mean: Vec<f32>,
    goal_std: Vec<f32>,
    config: NormalizerConfig,
}

fn check_dim(what: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(DdpgError::DimensionMismatch {
            what: what.to_string(),
            expected,
            got,
        }
        .into());
    }
    Ok(())
}

fn normalize(x: &[f32], mean: &[f32], std: &[f32], config: &NormalizerConfig) -> Vec<f32> {
    x.iter()
        .zip(mean.iter().zip(std))
        .map(|(x, (m, s))| {
            let x = x.clamp(-config.clip_obs, config.clip_obs);
            ((x - m) / s).clamp(-config.clip_range, config.clip_range)
        })
        .collect()
}

impl Normalizer {
    /// Creates a normalizer from the statistics of observations and goals.
    ///
    /// Means and standard deviations must have the same length.
    pub fn new(
        obs_mean: Vec<f32>,
        obs_std: Vec<f32>,
        goal_mean: Vec<f32>,
        goal_std: Vec<f32>,
        config: NormalizerConfig,
    ) -> Result<Self> {
        check_dim("obs_std", obs_mean.len(), obs_std.len())?;
        check_dim("goal_std", goal_mean.len(), goal_std.len())?;
        Ok(Self {
            obs_mean,
            obs_std,
            goal_mean,
            goal_std,
            config,
        })
    }

    /// Creates a normalizer leaving inputs within the clipping ranges unchanged.
    pub fn identity(obs_dim: usize, goal_dim: usize, config: NormalizerConfig) -> Self {
        Self {
            obs_mean: vec![0.0; obs_dim],
            obs_std: vec![1.0; obs_dim],
            goal_mean: vec![0.0; goal_dim],
            goal_std: vec![1.0; goal_dim],
            config,
        }
    }

    /// Returns `(obs_mean, obs_std, goal_mean, goal_std)`.
    pub fn stats(&self) -> (&[f32], &[f32], &[f32], &[f32]) {
        (&self.obs_mean, &self.obs_std, &self.goal_mean, &self.goal_std)
    }

    /// Returns the dimension of the concatenated input.
    pub fn input_dim(&self) -> usize {
        self.obs_mean.len() + self.goal_mean.len()
    }

    /// Returns the policy input `[obs_norm, goal_norm]`.
    ///
    /// Each part is clipped to `±clip_obs`, normalized by the stored mean and
    /// standard deviation, then clipped to `±clip_range`.
    pub fn process_inputs(&self, obs: &[f32], goal: &[f32]) -> Result<Vec<f32>> {
        check_dim("obs", self.obs_mean.len(), obs.len())?;
        check_dim("goal", self.goal_mean.len(), goal.len())?;

        let mut inputs = normalize(obs, &self.obs_mean, &self.obs_std, &self.config);
        inputs.extend(normalize(goal, &self.goal_mean, &self.goal_std, &self.config));
        Ok(inputs)
    }
}
