use super::{Actor, Critic, DdpgConfig};
use crate::{
    model::{SubModel1, SubModel2},
    util::finite_scalar,
    TargetNetwork,
};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::loss::mse;
use ddpg_core::{
    error::DdpgError,
    record::{Record, RecordValue},
    replay_buffer::TransitionBatch,
    Agent, Env, Obs, Policy, ReplayBufferBase,
};
use log::{info, trace};
use std::{fs, marker::PhantomData, path::Path};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Deep deterministic policy gradient (DDPG) agent.
///
/// Actions are the output of the actor, plus Gaussian noise of standard deviation
/// `noise_scale` in training mode. Each call of [`Agent::opt`] performs one
/// minibatch update of the critic and the actor followed by a soft update of
/// both target networks.
///
/// ```mermaid
/// graph LR
///     B[ReplayBuffer] -->|TransitionBatch|C[Critic]
///     AT[Actor target] -->|"a'"|CT[Critic target]
///     CT -->|y|C
///     A[Actor] -->|"mu(s)"|C
///     C -.->|soft update|CT
///     A -.->|soft update|AT
/// ```
pub struct Ddpg<E, R>
where
    E: Env,
    R: ReplayBufferBase<Batch = TransitionBatch>,
{
    actor: TargetNetwork<Actor>,
    critic: TargetNetwork<Critic>,
    gamma: f64,
    batch_size: usize,
    noise_scale: f32,
    clip_action: bool,
    max_action: f32,
    obs_dim: usize,
    train: bool,
    n_opts: usize,
    device: Device,
    phantom: PhantomData<(E, R)>,
}

impl<E, R> Ddpg<E, R>
where
    E: Env,
    R: ReplayBufferBase<Batch = TransitionBatch>,
{
    /// Constructs DDPG agent.
    ///
    /// The agent starts in training mode.
    pub fn build(config: DdpgConfig) -> Result<Self> {
        let device: Device = config.device.unwrap_or(crate::Device::Cpu).try_into()?;
        let actor_config = config.actor_config.clone();
        let critic_config = config.critic_config.clone();
        let actor = TargetNetwork::build(
            |vb| Actor::build(vb, actor_config.clone()),
            &config.actor_opt_config,
            config.polyak,
            device.clone(),
        )?;
        let critic = TargetNetwork::build(
            |vb| Critic::build(vb, critic_config.clone()),
            &config.critic_opt_config,
            config.polyak,
            device.clone(),
        )?;
        info!("Build DDPG agent on {:?}", device);

        Ok(Self {
            actor,
            critic,
            gamma: config.gamma,
            batch_size: config.batch_size,
            noise_scale: config.noise_scale,
            clip_action: config.clip_action,
            max_action: config.actor_config.max_action,
            obs_dim: config.actor_config.mlp_config.in_dim(),
            train: true,
            n_opts: 0,
            device,
            phantom: PhantomData,
        })
    }

    /// Returns the action for an observation with additive Gaussian noise.
    ///
    /// When `clip_action` is set, the noisy action is clipped to `[-max_action, max_action]`.
    pub fn generate_action_with_noise(&self, obs: &[f32], noise_scale: f32) -> Result<Vec<f32>> {
        if obs.len() != self.obs_dim {
            return Err(DdpgError::DimensionMismatch {
                what: "obs".to_string(),
                expected: self.obs_dim,
                got: obs.len(),
            }
            .into());
        }

        let obs = Tensor::from_slice(obs, (1, self.obs_dim), &self.device)?;
        let act = self.actor.model().forward(&obs)?.squeeze(0)?;
        let act = match noise_scale > 0.0 {
            true => {
                let noise = Tensor::randn(0f32, 1f32, act.dims(), &self.device)?;
                (&act + (noise * noise_scale as f64)?)?
            }
            false => act,
        };
        let act = match self.clip_action {
            true => act.clamp(-self.max_action, self.max_action)?,
            false => act,
        };

        Ok(act.to_vec1::<f32>()?)
    }

    /// Returns the bootstrap target `r + gamma * (1 - done) * Q_tgt(s', mu_tgt(s'))`.
    ///
    /// The returned tensor is detached from the computation graph.
    pub fn compute_targets(
        &self,
        next_obs: &Tensor,
        reward: &Tensor,
        done: &Tensor,
    ) -> Result<Tensor> {
        let next_act = self.actor.target().forward(next_obs)?;
        let next_q = self.critic.target().forward(next_obs, &next_act)?;
        let y = (reward + ((1f64 - done)? * next_q)?.affine(self.gamma, 0.0)?)?;
        Ok(y.detach())
    }

    /// Returns `(obs, next_obs, act, reward, done)` on the device of the agent.
    fn to_tensors(&self, batch: &TransitionBatch) -> Result<[Tensor; 5]> {
        let (n, obs_dim, act_dim) = (batch.len(), batch.obs_dim, batch.act_dim);
        let device = &self.device;
        Ok([
            Tensor::from_slice(&batch.obs[..], (n, obs_dim), device)?,
            Tensor::from_slice(&batch.next_obs[..], (n, obs_dim), device)?,
            Tensor::from_slice(&batch.act[..], (n, act_dim), device)?,
            Tensor::from_slice(&batch.reward[..], (n,), device)?,
            Tensor::from_slice(&batch.done[..], (n,), device)?,
        ])
    }

    fn update_critic(
        &mut self,
        obs: &Tensor,
        act: &Tensor,
        next_obs: &Tensor,
        reward: &Tensor,
        done: &Tensor,
    ) -> Result<f32> {
        let y = self.compute_targets(next_obs, reward, done)?;
        let q = self.critic.model().forward(obs, act)?;
        let loss = mse(&q, &y)?;
        let value = finite_scalar("loss_critic", &loss)?;
        self.critic.backward_step(&loss)?;
        Ok(value)
    }

    fn update_actor(&mut self, obs: &Tensor) -> Result<f32> {
        let act = self.actor.model().forward(obs)?;
        let loss = self.critic.model().forward(obs, &act)?.mean_all()?.neg()?;
        let value = finite_scalar("loss_actor", &loss)?;

        // Gradients also flow into the critic, but only actor variables are stepped
        self.actor.backward_step(&loss)?;
        Ok(value)
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record> {
        trace!("batch()");
        let batch = buffer.batch(self.batch_size)?;
        let [obs, next_obs, act, reward, done] = self.to_tensors(&batch)?;

        trace!("update_critic()");
        let loss_critic = self.update_critic(&obs, &act, &next_obs, &reward, &done)?;

        trace!("update_actor()");
        let loss_actor = self.update_actor(&obs)?;

        trace!("soft_update()");
        self.critic.soft_update()?;
        self.actor.soft_update()?;

        self.n_opts += 1;

        Ok(Record::from_slice(&[
            ("loss_critic", RecordValue::Scalar(loss_critic)),
            ("loss_actor", RecordValue::Scalar(loss_actor)),
        ]))
    }

    /// Returns the actor with its target network.
    pub fn actor(&self) -> &TargetNetwork<Actor> {
        &self.actor
    }

    /// Loads the parameters of the actor from `actor.pt` in the given directory.
    ///
    /// This is enough for running the policy; the critic and the target networks
    /// are left untouched.
    pub fn load_actor(&mut self, path: &Path) -> Result<()> {
        self.actor.load_model(&path.join("actor.pt"))
    }

    /// Returns the number of optimization steps performed so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }
}

impl<E, R> Policy<E> for Ddpg<E, R>
where
    E: Env,
    R: ReplayBufferBase<Batch = TransitionBatch>,
{
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let noise_scale = match self.train {
            true => self.noise_scale,
            false => 0.0,
        };
        let act = self.generate_action_with_noise(obs.observation(), noise_scale)?;
        Ok(act.into())
    }
}

impl<E, R> Agent<E, R> for Ddpg<E, R>
where
    E: Env,
    R: ReplayBufferBase<Batch = TransitionBatch>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, buffer: &mut R) -> Result<Record> {
        self.opt_(buffer)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.actor
            .save(&path.join("actor.pt"), &path.join("actor_tgt.pt"))?;
        self.critic
            .save(&path.join("critic.pt"), &path.join("critic_tgt.pt"))?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.actor
            .load(&path.join("actor.pt"), &path.join("actor_tgt.pt"))?;
        self.critic
            .load(&path.join("critic.pt"), &path.join("critic_tgt.pt"))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        ddpg::{ActorConfig, CriticConfig},
        util::named_tensors,
    };
    use ddpg_core::{
        dummy::{DummyAct, DummyEnv, DummyObs},
        replay_buffer::{ReplayBuffer, ReplayBufferConfig},
    };
    use tempdir::TempDir;

    type TestAgent = Ddpg<DummyEnv, ReplayBuffer>;

    fn config() -> DdpgConfig {
        DdpgConfig::default()
            .actor_config(ActorConfig::new(1, vec![8, 8], 1, 1.0))
            .critic_config(CriticConfig::new(1, 1, vec![8, 8]))
            .batch_size(4)
    }

    fn buffer() -> Result<ReplayBuffer> {
        let config = ReplayBufferConfig::default()
            .capacity(16)
            .obs_dim(1)
            .act_dim(1);
        let mut buffer = ReplayBuffer::build(&config);
        for i in 0..8 {
            let t = i as f32;
            buffer.store(&[t], &[t + 1.0], &[0.5], 1.0, i == 7)?;
        }
        Ok(buffer)
    }

    #[test]
    fn test_deterministic_action_in_eval_mode() -> Result<()> {
        let mut agent = TestAgent::build(config())?;
        agent.eval();
        let obs = DummyObs(vec![0.3]);
        let DummyAct(a1) = agent.sample(&obs)?;
        let DummyAct(a2) = agent.sample(&obs)?;
        assert_eq!(a1, a2);
        assert!(a1[0].abs() <= 1.0);
        Ok(())
    }

    #[test]
    fn test_noisy_action_is_clipped() -> Result<()> {
        let agent = TestAgent::build(config())?;
        for _ in 0..20 {
            let a = agent.generate_action_with_noise(&[0.3], 100.0)?;
            assert_eq!(a.len(), 1);
            assert!(a[0].abs() <= 1.0);
        }
        assert!(agent.generate_action_with_noise(&[0.3, 0.1], 0.0).is_err());
        Ok(())
    }

    #[test]
    fn test_target_is_reward_at_terminal() -> Result<()> {
        let agent = TestAgent::build(config())?;
        let device = Device::Cpu;
        let next_obs = Tensor::from_slice(&[0.1f32, 0.5, -2.0], (3, 1), &device)?;
        let reward = Tensor::from_slice(&[1.0f32, -0.5, 3.0], (3,), &device)?;

        let done = Tensor::ones((3,), candle_core::DType::F32, &device)?;
        let y = agent.compute_targets(&next_obs, &reward, &done)?;
        assert_eq!(y.to_vec1::<f32>()?, vec![1.0, -0.5, 3.0]);

        let not_done = Tensor::zeros((3,), candle_core::DType::F32, &device)?;
        let y = agent.compute_targets(&next_obs, &reward, &not_done)?;
        let next_act = agent.actor.target().forward(&next_obs)?;
        let next_q = agent.critic.target().forward(&next_obs, &next_act)?;
        let expected = (&reward + (next_q * 0.99)?)?;
        let diff = (y - expected)?.abs()?.max(0)?.to_scalar::<f32>()?;
        assert!(diff < 1e-5);
        Ok(())
    }

    #[test]
    fn test_opt_records_finite_losses() -> Result<()> {
        let mut agent = TestAgent::build(config())?;
        let mut buffer = buffer()?;
        let critic_before = named_tensors(agent.critic.varmap(), "")?;

        for _ in 0..3 {
            let record = agent.opt_with_record(&mut buffer)?;
            assert!(record.get_scalar("loss_critic")?.is_finite());
            assert!(record.get_scalar("loss_actor")?.is_finite());
        }
        assert_eq!(agent.n_opts(), 3);

        let critic_after = named_tensors(agent.critic.varmap(), "")?;
        let w0 = critic_before["ln0.weight"].flatten_all()?.to_vec1::<f32>()?;
        let w1 = critic_after["ln0.weight"].flatten_all()?.to_vec1::<f32>()?;
        assert_ne!(w0, w1);
        Ok(())
    }

    fn flat_params(varmap: &candle_nn::VarMap) -> Result<Vec<(String, Vec<f32>)>> {
        let mut params = named_tensors(varmap, "")?
            .into_iter()
            .map(|(k, t)| Ok((k, t.flatten_all()?.to_vec1::<f32>()?)))
            .collect::<Result<Vec<_>>>()?;
        params.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(params)
    }

    #[test]
    fn test_actor_step_leaves_critic_unchanged() -> Result<()> {
        let mut agent = TestAgent::build(config())?;
        let obs = Tensor::from_slice(&[0.5f32, -1.0, 2.0, -0.3], (4, 1), &Device::Cpu)?;
        let critic_before = flat_params(agent.critic.varmap())?;
        let critic_tgt_before = flat_params(agent.critic.varmap_tgt())?;
        let actor_before = flat_params(agent.actor.varmap())?;

        agent.update_actor(&obs)?;

        assert_eq!(flat_params(agent.critic.varmap())?, critic_before);
        assert_eq!(flat_params(agent.critic.varmap_tgt())?, critic_tgt_before);
        assert_ne!(flat_params(agent.actor.varmap())?, actor_before);
        Ok(())
    }

    #[test]
    fn test_critic_file_holds_critic_params() -> Result<()> {
        let dir = TempDir::new("ddpg_agent")?;
        let mut agent = TestAgent::build(config())?;
        agent.opt(&mut buffer()?)?;
        agent.save_params(dir.path())?;

        for name in ["actor.pt", "actor_tgt.pt", "critic.pt", "critic_tgt.pt"] {
            assert!(dir.path().join(name).exists());
        }

        let actor = candle_core::safetensors::load(dir.path().join("actor.pt"), &Device::Cpu)?;
        let critic = candle_core::safetensors::load(dir.path().join("critic.pt"), &Device::Cpu)?;

        // The first layer of the critic takes the observation and the action
        assert_eq!(actor["ln0.weight"].dims(), [8, 1]);
        assert_eq!(critic["ln0.weight"].dims(), [8, 2]);

        let expected = named_tensors(agent.critic.varmap(), "")?;
        for (k, t) in expected.iter() {
            let t = t.flatten_all()?.to_vec1::<f32>()?;
            assert_eq!(critic[k].flatten_all()?.to_vec1::<f32>()?, t);
        }

        let mut agent2 = TestAgent::build(config())?;
        agent2.load_params(dir.path())?;
        let loaded = named_tensors(agent2.critic.varmap_tgt(), "")?;
        let saved = named_tensors(agent.critic.varmap_tgt(), "")?;
        for k in saved.keys() {
            assert_eq!(
                loaded[k].flatten_all()?.to_vec1::<f32>()?,
                saved[k].flatten_all()?.to_vec1::<f32>()?
            );
        }
        Ok(())
    }
}
