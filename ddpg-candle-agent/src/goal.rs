//! Policy of goal-conditioned environments stored in a single checkpoint file.
//!
//! The file is in safetensors format and holds the statistics of the
//! [`Normalizer`] (`obs_mean`, `obs_std`, `goal_mean`, `goal_std`) together with
//! the parameters of the actor, prefixed with `actor.`.
use crate::{
    ddpg::{Actor, ActorConfig},
    model::SubModel1,
    util::{named_tensors, set_named_tensors},
    Normalizer, NormalizerConfig,
};
use anyhow::Result;
use candle_core::{DType::F32, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use ddpg_core::{error::DdpgError, Env, Obs, Policy};
use log::info;
use std::{collections::HashMap, path::Path};

const STATS: [&str; 4] = ["obs_mean", "obs_std", "goal_mean", "goal_std"];

/// Saves the parameters of an actor and the statistics of a normalizer in a file.
pub fn save_goal_policy(
    path: impl AsRef<Path>,
    actor_varmap: &VarMap,
    normalizer: &Normalizer,
) -> Result<()> {
    let mut tensors = named_tensors(actor_varmap, "actor.")?;
    let (obs_mean, obs_std, goal_mean, goal_std) = normalizer.stats();
    for (name, v) in STATS.iter().zip([obs_mean, obs_std, goal_mean, goal_std]) {
        let t = Tensor::from_slice(v, (v.len(),), &Device::Cpu)?;
        tensors.insert(name.to_string(), t);
    }
    candle_core::safetensors::save(&tensors, path.as_ref())?;
    info!("Save goal-conditioned policy to {:?}", path.as_ref());
    Ok(())
}

/// Deterministic actor taking normalized observations and goals.
pub struct GoalPolicy {
    actor: Actor,
    normalizer: Normalizer,
    device: Device,
}

impl GoalPolicy {
    /// Loads the policy saved with [`save_goal_policy`].
    pub fn load(
        path: impl AsRef<Path>,
        actor_config: ActorConfig,
        normalizer_config: NormalizerConfig,
        device: crate::Device,
    ) -> Result<Self> {
        let device: Device = device.try_into()?;
        let tensors = candle_core::safetensors::load(path.as_ref(), &device)?;

        let normalizer = Normalizer::new(
            stat(&tensors, "obs_mean")?,
            stat(&tensors, "obs_std")?,
            stat(&tensors, "goal_mean")?,
            stat(&tensors, "goal_std")?,
            normalizer_config,
        )?;

        let in_dim = actor_config.mlp_config.in_dim();
        if in_dim != normalizer.input_dim() {
            return Err(DdpgError::DimensionMismatch {
                what: "actor input".to_string(),
                expected: in_dim,
                got: normalizer.input_dim(),
            }
            .into());
        }

        let varmap = VarMap::new();
        let actor = Actor::build(VarBuilder::from_varmap(&varmap, F32, &device), actor_config)?;
        set_named_tensors(&varmap, &tensors, "actor.")?;
        info!("Load goal-conditioned policy from {:?}", path.as_ref());

        Ok(Self {
            actor,
            normalizer,
            device,
        })
    }

    /// Returns the action for an observation and a desired goal.
    pub fn act(&self, obs: &[f32], goal: &[f32]) -> Result<Vec<f32>> {
        let inputs = self.normalizer.process_inputs(obs, goal)?;
        let inputs = Tensor::from_slice(&inputs[..], (1, inputs.len()), &self.device)?;
        Ok(self.actor.forward(&inputs)?.squeeze(0)?.to_vec1::<f32>()?)
    }

    /// Returns the normalizer of the inputs.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}

fn stat(tensors: &HashMap<String, Tensor>, name: &str) -> Result<Vec<f32>> {
    let t = tensors
        .get(name)
        .ok_or_else(|| DdpgError::MissingTensor(name.to_string()))?;
    Ok(t.to_vec1::<f32>()?)
}

impl<E: Env> Policy<E> for GoalPolicy {
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let goal = obs.desired_goal().ok_or_else(|| DdpgError::DimensionMismatch {
            what: "goal".to_string(),
            expected: self.normalizer.stats().2.len(),
            got: 0,
        })?;
        Ok(self.act(obs.observation(), goal)?.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    fn actor_config() -> ActorConfig {
        ActorConfig::new(5, vec![16], 2, 1.0)
    }

    #[test]
    fn test_save_and_load_goal_policy() -> Result<()> {
        let dir = TempDir::new("goal_policy")?;
        let path = dir.path().join("policy.safetensors");
        let config = NormalizerConfig::default();

        let varmap = VarMap::new();
        let actor = Actor::build(VarBuilder::from_varmap(&varmap, F32, &Device::Cpu), actor_config())?;
        let normalizer = Normalizer::new(
            vec![0.1, 0.2, 0.3],
            vec![1.0, 2.0, 3.0],
            vec![0.0, 0.5],
            vec![0.5, 0.5],
            config,
        )?;
        save_goal_policy(&path, &varmap, &normalizer)?;

        let policy = GoalPolicy::load(&path, actor_config(), config, crate::Device::Cpu)?;
        assert_eq!(policy.normalizer(), &normalizer);

        let (obs, goal) = ([1.0f32, -1.0, 0.5], [0.2f32, 0.7]);
        let inputs = normalizer.process_inputs(&obs, &goal)?;
        let inputs = Tensor::from_slice(&inputs[..], (1, 5), &Device::Cpu)?;
        let expected = actor.forward(&inputs)?.squeeze(0)?.to_vec1::<f32>()?;
        assert_eq!(policy.act(&obs, &goal)?, expected);
        Ok(())
    }

    #[test]
    fn test_missing_statistics() -> Result<()> {
        let dir = TempDir::new("goal_policy")?;
        let path = dir.path().join("actor_only.safetensors");

        let varmap = VarMap::new();
        let _ = Actor::build(VarBuilder::from_varmap(&varmap, F32, &Device::Cpu), actor_config())?;
        candle_core::safetensors::save(&named_tensors(&varmap, "actor.")?, &path)?;

        let config = NormalizerConfig::default();
        let err = GoalPolicy::load(&path, actor_config(), config, crate::Device::Cpu);
        assert!(err.is_err());
        Ok(())
    }

    #[test]
    fn test_input_dimension_mismatch() -> Result<()> {
        let dir = TempDir::new("goal_policy")?;
        let path = dir.path().join("policy.safetensors");
        let config = NormalizerConfig::default();

        let varmap = VarMap::new();
        let _ = Actor::build(VarBuilder::from_varmap(&varmap, F32, &Device::Cpu), actor_config())?;
        save_goal_policy(&path, &varmap, &Normalizer::identity(3, 3, config))?;

        assert!(GoalPolicy::load(&path, actor_config(), config, crate::Device::Cpu).is_err());
        Ok(())
    }
}
