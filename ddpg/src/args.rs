//! Command-line options shared by the binaries.
use anyhow::Result;
use clap::Parser;
use ddpg_candle_agent::{ddpg::DdpgConfig, Device, NormalizerConfig};
use ddpg_core::{error::DdpgError, EnvParams, ReplayBufferConfig, TrainerConfig};
use ddpg_envs::EnvName;
use std::path::PathBuf;

/// Maximum episode length of evaluation runs when `--max-ep-len` is not given.
pub const EVAL_MAX_EP_LEN: usize = 200;

/// Maximum episode length of training when `--max-ep-len` is not given.
pub const TRAIN_MAX_EP_LEN: usize = 1000;

/// Train and evaluate DDPG agents
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Learning rate of the actor
    #[arg(long, default_value_t = 1e-3)]
    pub lr_actor: f64,

    /// Learning rate of the critic
    #[arg(long, default_value_t = 1e-3)]
    pub lr_critic: f64,

    /// Discount factor
    #[arg(long, default_value_t = 0.99)]
    pub gamma: f64,

    /// Smoothing coefficient of the target networks
    #[arg(long, default_value_t = 0.995)]
    pub polyak: f64,

    /// Capacity of the replay buffer
    #[arg(long, default_value_t = 1_000_000)]
    pub buff_size: usize,

    /// Number of epochs
    #[arg(long, default_value_t = 100)]
    pub epochs: usize,

    /// Environment steps in an epoch
    #[arg(long, default_value_t = 5000)]
    pub steps_in_epoch: usize,

    /// Environment steps with uniformly random actions at the beginning of training
    #[arg(long, default_value_t = 10000)]
    pub start_steps: usize,

    /// Maximum episode length; 1000 in training and 200 in evaluation if not given
    #[arg(long)]
    pub max_ep_len: Option<usize>,

    /// Standard deviation of the exploration noise
    #[arg(long, default_value_t = 0.1)]
    pub noise_scale: f32,

    /// Minibatch size
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of units in each of the two hidden layers of the networks
    #[arg(long, default_value_t = 256)]
    pub hidden: usize,

    /// Use CUDA device 0
    #[arg(long, default_value_t = false)]
    pub cuda: bool,

    /// Name of the environment
    #[arg(long, default_value = "Pendulum-v1")]
    pub env_name: String,

    /// Directory of saved models, the models of an environment are in its subdirectory
    #[arg(long, default_value = "saved_models")]
    pub model_dir: String,

    /// Clipping threshold of raw observations and goals
    #[arg(long, default_value_t = 200.0)]
    pub clip_obs: f32,

    /// Clipping threshold of normalized observations and goals
    #[arg(long, default_value_t = 5.0)]
    pub clip_range: f32,

    /// Number of evaluation episodes
    #[arg(long, default_value_t = 10)]
    pub test_episodes: usize,

    /// Random seed of the environments and the replay buffer
    #[arg(long, default_value_t = 42)]
    pub seed: i64,

    /// Writes the results of evaluation episodes in this CSV file
    #[arg(long)]
    pub csv: Option<String>,

    /// Policy file of the goal-conditioned evaluation, `<model_dir>/<env_name>/policy.safetensors` if not given
    #[arg(long)]
    pub bundle: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self::parse_from(["ddpg"])
    }
}

impl Args {
    /// Returns the environment selected with `--env-name`.
    pub fn env(&self) -> Result<EnvName> {
        Ok(self.env_name.parse::<EnvName>()?)
    }

    /// Directory in which the models of the environment are saved.
    pub fn env_model_dir(&self) -> PathBuf {
        PathBuf::from(&self.model_dir).join(&self.env_name)
    }

    /// Path of the goal-conditioned policy file.
    pub fn bundle_path(&self) -> PathBuf {
        match &self.bundle {
            Some(path) => PathBuf::from(path),
            None => self.env_model_dir().join("policy.safetensors"),
        }
    }

    /// Device of the networks.
    pub fn device(&self) -> Device {
        Device::from_flag(self.cuda)
    }

    /// Maximum episode length in training.
    pub fn train_max_ep_len(&self) -> usize {
        self.max_ep_len.unwrap_or(TRAIN_MAX_EP_LEN)
    }

    /// Maximum episode length in evaluation.
    pub fn eval_max_ep_len(&self) -> usize {
        self.max_ep_len.unwrap_or(EVAL_MAX_EP_LEN)
    }

    /// Configuration of the training loop.
    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig::default()
            .epochs(self.epochs)
            .steps_per_epoch(self.steps_in_epoch)
            .start_steps(self.start_steps)
            .max_ep_len(self.train_max_ep_len())
            .model_dir(self.env_model_dir().to_string_lossy())
    }

    /// Configuration of the agent for an environment.
    pub fn ddpg_config(&self, env_params: &EnvParams) -> DdpgConfig {
        DdpgConfig::from_env_params(env_params, self.hidden)
            .lr_actor(self.lr_actor)
            .lr_critic(self.lr_critic)
            .discount_factor(self.gamma)
            .polyak(self.polyak)
            .batch_size(self.batch_size)
            .noise_scale(self.noise_scale)
            .device(self.device())
    }

    /// Configuration of the replay buffer for an environment.
    ///
    /// Fails if `--buff-size` is zero.
    pub fn replay_buffer_config(&self, env_params: &EnvParams) -> Result<ReplayBufferConfig> {
        if self.buff_size == 0 {
            return Err(DdpgError::ZeroCapacity.into());
        }
        Ok(ReplayBufferConfig::default()
            .capacity(self.buff_size)
            .obs_dim(env_params.obs_dim)
            .act_dim(env_params.action_dim)
            .seed(self.seed as u64))
    }

    /// Clipping thresholds of the input normalization.
    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig::default()
            .clip_obs(self.clip_obs)
            .clip_range(self.clip_range)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_args_to_configs() -> Result<()> {
        let args = Args::parse_from([
            "ddpg_train",
            "--epochs",
            "3",
            "--steps-in-epoch",
            "50",
            "--buff-size",
            "500",
            "--model-dir",
            "models",
            "--lr-actor",
            "0.0001",
        ]);
        assert_eq!(args.env()?, EnvName::Pendulum);
        assert_eq!(args.eval_max_ep_len(), 200);

        let config = args.trainer_config();
        assert_eq!(config.total_steps(), 150);
        assert_eq!(config.max_ep_len, 1000);
        assert_eq!(config.model_dir.as_deref(), Some("models/Pendulum-v1"));

        let env_params = EnvParams {
            obs_dim: 3,
            goal_dim: 0,
            action_dim: 1,
            max_action: 2.0,
        };
        let config = args.ddpg_config(&env_params);
        assert_eq!(config.actor_config.max_action, 2.0);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.device, Some(Device::Cpu));
        let config = args.replay_buffer_config(&env_params)?;
        assert_eq!((config.capacity, config.obs_dim, config.act_dim), (500, 3, 1));
        Ok(())
    }

    #[test]
    fn test_zero_buff_size() {
        let args = Args::parse_from(["ddpg_train", "--buff-size", "0"]);
        let env_params = EnvParams {
            obs_dim: 3,
            goal_dim: 0,
            action_dim: 1,
            max_action: 2.0,
        };
        assert!(args.replay_buffer_config(&env_params).is_err());
    }

    #[test]
    fn test_unknown_env() {
        let args = Args::parse_from(["ddpg_train", "--env-name", "Walker-v0"]);
        assert!(args.env().is_err());
    }
}
