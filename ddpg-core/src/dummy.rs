//! This module is used for tests.
use crate::{
    record::{Record, RecordValue},
    Agent, Env, EnvParams, Policy, ReplayBufferBase, Step,
};
use anyhow::Result;
use std::{fs, path::Path};

/// Dummy observation, the number of steps since reset.
#[derive(Clone, Debug)]
pub struct DummyObs(pub Vec<f32>);

impl crate::Obs for DummyObs {
    fn observation(&self) -> &[f32] {
        &self.0
    }
}

/// Dummy action.
#[derive(Clone, Debug)]
pub struct DummyAct(pub Vec<f32>);

impl From<Vec<f32>> for DummyAct {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl crate::Act for DummyAct {
    fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug)]
pub struct DummyEnvConfig {
    /// Episode step at which the environment terminates.
    pub terminate_at: Option<usize>,

    /// Episode step at which the environment truncates the episode.
    pub truncate_at: Option<usize>,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            terminate_at: Some(10),
            truncate_at: None,
        }
    }
}

impl DummyEnvConfig {
    /// Sets the episode step of termination.
    pub fn terminate_at(mut self, v: Option<usize>) -> Self {
        self.terminate_at = v;
        self
    }

    /// Sets the episode step of truncation.
    pub fn truncate_at(mut self, v: Option<usize>) -> Self {
        self.truncate_at = v;
        self
    }
}

/// Dummy env.
///
/// Gives reward 1 at every step. [`Env::sample_action`] always returns `[-1]`.
pub struct DummyEnv {
    config: DummyEnvConfig,
    t: usize,
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Act = DummyAct;
    type Obs = DummyObs;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            t: 0,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.t = 0;
        Ok(DummyObs(vec![0.0]))
    }

    fn reset_with_index(&mut self, _ix: usize) -> Result<Self::Obs> {
        self.reset()
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        self.t += 1;
        let is_terminated = self.config.terminate_at == Some(self.t);
        let is_truncated = self.config.truncate_at == Some(self.t);
        let obs = DummyObs(vec![self.t as f32]);
        let step = Step::new(obs, a.clone(), 1.0, is_terminated, is_truncated, ());
        Ok((step, Record::empty()))
    }

    fn sample_action(&mut self) -> Self::Act {
        DummyAct(vec![-1.0])
    }

    fn env_params(&self) -> EnvParams {
        EnvParams {
            obs_dim: 1,
            goal_dim: 0,
            action_dim: 1,
            max_action: 1.0,
        }
    }
}

/// Dummy agent, counting calls to its methods.
///
/// [`Policy::sample`] always returns `[1]`.
#[derive(Debug, Default)]
pub struct DummyAgent {
    /// The number of calls to [`Policy::sample`].
    pub n_samples: usize,

    /// The number of optimization steps.
    pub n_opts: usize,

    is_train: bool,
}

impl Policy<DummyEnv> for DummyAgent {
    fn sample(&mut self, _obs: &DummyObs) -> Result<DummyAct> {
        self.n_samples += 1;
        Ok(DummyAct(vec![1.0]))
    }
}

impl<R: ReplayBufferBase> Agent<DummyEnv, R> for DummyAgent {
    fn train(&mut self) {
        self.is_train = true;
    }

    fn eval(&mut self) {
        self.is_train = false;
    }

    fn is_train(&self) -> bool {
        self.is_train
    }

    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Record> {
        let _ = buffer.batch(2)?;
        self.n_opts += 1;
        Ok(Record::from_slice(&[
            ("loss_critic", RecordValue::Scalar(1.0)),
            ("loss_actor", RecordValue::Scalar(-1.0)),
        ]))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        fs::write(path.join("agent.yaml"), serde_yaml::to_string(&self.n_opts)?)?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        let s = fs::read_to_string(path.join("agent.yaml"))?;
        self.n_opts = serde_yaml::from_str(&s)?;
        Ok(())
    }
}
