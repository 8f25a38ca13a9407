//! Train [`Agent`].
mod config;
use crate::{
    record::{AggregateRecorder, Record, RecordStorage, RecordValue::Scalar},
    Act, Agent, Env, Evaluator, ExperienceBufferBase, Obs, ReplayBufferBase, Step, Transition,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{debug, info};
use std::{marker::PhantomData, path::Path};

/// Phase of the training loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Interacting with the environment and storing transitions.
    Collecting,

    /// Running the per-episode parameter updates.
    Updating,
}

/// Statistics of the running episode.
#[derive(Debug, Default)]
struct Episode {
    ret: f32,
    len: usize,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages training loop and related objects.
///
/// # Training loop
///
/// The loop runs `epochs * steps_per_epoch` environment steps. It alternates between
/// two phases, [`Phase::Collecting`] and [`Phase::Updating`]:
///
/// 1. Reset [`Env`] and enter [`Phase::Collecting`].
/// 2. Take an action, which is [`Env::sample_action`] for the first `start_steps`
///    environment steps and [`Policy::sample`] afterwards, then push the transition
///    into the replay buffer. The stored `done` flag is [`Step::is_terminated`].
/// 3. If the environment terminated or truncated the episode, or the episode reached
///    `max_ep_len` steps, enter [`Phase::Updating`]:
///     1. Call [`Agent::opt_with_record`] as many times as the length of the episode.
///     2. Store the episode return, the episode length and the mean losses to the recorder.
///     3. Reset [`Env`] and go back to [`Phase::Collecting`].
/// 4. At the end of every epoch, save the agent in `model_dir`, then run the
///    [`Evaluator`]. If the evaluation return is the best so far, the agent is
///    also saved in `model_dir/best`.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|"Step&lt;E: Env&gt;"|C[Trainer]
///     C -->|Transition|D[ReplayBuffer]
///     D -->|TransitionBatch|A
/// ```
///
/// The environment, the agent and the replay buffer are owned by the caller and lent
/// to [`Trainer::train`].
///
/// [`Policy::sample`]: crate::Policy::sample
pub struct Trainer<E, R>
where
    E: Env,
    R: ExperienceBufferBase<Item = Transition> + ReplayBufferBase,
{
    config: TrainerConfig,

    phase: Phase,

    /// Environment steps done so far.
    env_steps: usize,

    /// Episodes finished so far.
    episodes: usize,

    /// Parameter updates done so far.
    opt_steps: usize,

    max_eval_return: f32,

    phantom: PhantomData<(E, R)>,
}

impl<E, R> Trainer<E, R>
where
    E: Env,
    R: ExperienceBufferBase<Item = Transition> + ReplayBufferBase,
{
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            config,
            phase: Phase::Collecting,
            env_steps: 0,
            episodes: 0,
            opt_steps: 0,
            max_eval_return: f32::MIN,
            phantom: PhantomData,
        }
    }

    /// Returns the current phase of the training loop.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the number of environment steps done so far.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }

    /// Returns the number of finished episodes.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Returns the number of parameter updates done so far.
    pub fn opt_steps(&self) -> usize {
        self.opt_steps
    }

    fn save_model<A: Agent<E, R>>(agent: &A, model_dir: &Path) -> Result<()> {
        agent.save_params(model_dir)?;
        info!("Saved the model in {:?}", model_dir);
        Ok(())
    }

    /// Performs an environment step and pushes the transition into the buffer.
    ///
    /// Returns the [`Step`] and whether the episode has to end here.
    fn collect<A: Agent<E, R>>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        buffer: &mut R,
        obs: &E::Obs,
        episode: &mut Episode,
    ) -> Result<(Step<E>, bool)> {
        let act = match self.env_steps < self.config.start_steps {
            true => env.sample_action(),
            false => agent.sample(obs)?,
        };
        let (step, _) = env.step(&act)?;
        self.env_steps += 1;
        episode.ret += step.reward;
        episode.len += 1;

        // Hitting the length cap alone is not a terminal state of the MDP
        buffer.push(Transition {
            obs: obs.observation().to_vec(),
            next_obs: step.obs.observation().to_vec(),
            act: act.as_slice().to_vec(),
            reward: step.reward,
            done: step.is_terminated,
        })?;

        let is_end = step.is_done() || episode.len >= self.config.max_ep_len;
        Ok((step, is_end))
    }

    /// Runs `n` parameter updates and returns the losses averaged over them.
    fn update<A: Agent<E, R>>(&mut self, agent: &mut A, buffer: &mut R, n: usize) -> Result<Record> {
        let mut storage = RecordStorage::new();
        for _ in 0..n {
            storage.store(agent.opt_with_record(buffer)?);
            self.opt_steps += 1;
        }

        let mut record = Record::empty();
        for key in ["loss_critic", "loss_actor"] {
            if let Some(v) = storage.mean(key) {
                record.insert(key, Scalar(v));
            }
        }
        Ok(record)
    }

    /// Saves the agent and runs validation at the end of an epoch.
    fn end_epoch<A, D>(&mut self, agent: &mut A, evaluator: &mut D, epoch: usize) -> Result<Record>
    where
        A: Agent<E, R>,
        D: Evaluator<E>,
    {
        if let Some(model_dir) = self.config.model_dir.as_ref() {
            Self::save_model(agent, Path::new(model_dir))?;
        }

        info!("Starts validation after epoch {}", epoch);
        agent.eval();
        let mut record = evaluator.evaluate(agent)?;
        agent.train();

        let eval_return = record.get_scalar("eval_return")?;
        info!("Epoch {}: eval_return = {}", epoch, eval_return);

        // Save the best model up to the current epoch
        if eval_return > self.max_eval_return {
            self.max_eval_return = eval_return;
            if let Some(model_dir) = self.config.model_dir.as_ref() {
                Self::save_model(agent, &Path::new(model_dir).join("best"))?;
            }
        }

        record.insert("epoch", Scalar(epoch as f32));
        Ok(record)
    }

    /// Train the agent.
    ///
    /// `env` is used for collecting transitions, while `evaluator` holds its own
    /// environment instance for validation.
    pub fn train<A, D>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        buffer: &mut R,
        evaluator: &mut D,
        recorder: &mut dyn AggregateRecorder,
    ) -> Result<()>
    where
        A: Agent<E, R>,
        D: Evaluator<E>,
    {
        let total_steps = self.config.total_steps();
        let mut obs = env.reset()?;
        let mut episode = Episode::default();
        self.phase = Phase::Collecting;
        agent.train();

        for t in 0..total_steps {
            let (step, is_end) = self.collect(env, agent, buffer, &obs, &mut episode)?;
            obs = step.obs;

            if is_end {
                self.phase = Phase::Updating;
                debug!(
                    "Episode {} ended: terminated = {}, truncated = {}, length = {}",
                    self.episodes, step.is_terminated, step.is_truncated, episode.len
                );

                let mut record = self.update(agent, buffer, episode.len)?;
                record.insert("episode_return", Scalar(episode.ret));
                record.insert("episode_length", Scalar(episode.len as f32));
                recorder.store(record);
                recorder.flush(self.env_steps as _);

                self.episodes += 1;
                episode = Episode::default();
                obs = env.reset()?;
                self.phase = Phase::Collecting;
            }

            if (t + 1) % self.config.steps_per_epoch == 0 {
                let epoch = (t + 1) / self.config.steps_per_epoch;
                let record = self.end_epoch(agent, evaluator, epoch)?;
                recorder.store(record);
                recorder.flush(self.env_steps as _);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dummy::{DummyAgent, DummyEnv, DummyEnvConfig},
        record::BufferedRecorder,
        DefaultEvaluator, ReplayBuffer, ReplayBufferConfig,
    };
    use tempdir::TempDir;

    fn buffer() -> ReplayBuffer {
        let config = ReplayBufferConfig::default()
            .capacity(1000)
            .obs_dim(1)
            .act_dim(1);
        ReplayBuffer::build(&config)
    }

    fn run(
        env_config: DummyEnvConfig,
        config: TrainerConfig,
    ) -> Result<(ReplayBuffer, DummyAgent, BufferedRecorder)> {
        let mut env = DummyEnv::build(&env_config, 0)?;
        let mut agent = DummyAgent::default();
        let mut buffer = buffer();
        let mut evaluator = DefaultEvaluator::<DummyEnv>::new(&env_config, 1, 2, config.max_ep_len)?;
        let mut recorder = BufferedRecorder::new();
        let mut trainer = Trainer::<DummyEnv, ReplayBuffer>::build(config);
        trainer.train(&mut env, &mut agent, &mut buffer, &mut evaluator, &mut recorder)?;
        assert_eq!(trainer.phase(), Phase::Collecting);
        Ok((buffer, agent, recorder))
    }

    #[test]
    fn test_length_cap_stores_not_done() -> Result<()> {
        // The environment never terminates, episodes are cut at 4 steps
        let env_config = DummyEnvConfig::default().terminate_at(None);
        let config = TrainerConfig::default()
            .epochs(1)
            .steps_per_epoch(8)
            .start_steps(0)
            .max_ep_len(4);
        let (buffer, agent, _) = run(env_config, config)?;

        assert_eq!(buffer.len(), 8);
        assert!((0..8).all(|i| !buffer.get(i).unwrap().done));
        // One update per collected transition
        assert_eq!(agent.n_opts, 8);
        Ok(())
    }

    #[test]
    fn test_termination_stores_done() -> Result<()> {
        let env_config = DummyEnvConfig::default().terminate_at(Some(3));
        let config = TrainerConfig::default()
            .epochs(1)
            .steps_per_epoch(6)
            .start_steps(0)
            .max_ep_len(100);
        let (buffer, _, _) = run(env_config, config)?;

        let dones = (0..6).map(|i| buffer.get(i).unwrap().done).collect::<Vec<_>>();
        assert_eq!(dones, vec![false, false, true, false, false, true]);
        Ok(())
    }

    #[test]
    fn test_termination_at_length_cap_stores_done() -> Result<()> {
        let env_config = DummyEnvConfig::default().terminate_at(Some(3));
        let config = TrainerConfig::default()
            .epochs(1)
            .steps_per_epoch(3)
            .start_steps(0)
            .max_ep_len(3);
        let (buffer, _, _) = run(env_config, config)?;

        assert!(buffer.last().unwrap().done);
        Ok(())
    }

    #[test]
    fn test_truncation_stores_not_done() -> Result<()> {
        let env_config = DummyEnvConfig::default()
            .terminate_at(None)
            .truncate_at(Some(2));
        let config = TrainerConfig::default()
            .epochs(1)
            .steps_per_epoch(4)
            .start_steps(0)
            .max_ep_len(100);
        let (buffer, _, recorder) = run(env_config, config)?;

        assert!((0..4).all(|i| !buffer.get(i).unwrap().done));
        let lengths = recorder
            .iter()
            .filter_map(|r| r.get_scalar("episode_length").ok())
            .collect::<Vec<_>>();
        assert_eq!(lengths, vec![2.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_warmup_uses_random_actions() -> Result<()> {
        let env_config = DummyEnvConfig::default().terminate_at(None);
        let config = TrainerConfig::default()
            .epochs(1)
            .steps_per_epoch(10)
            .start_steps(4)
            .max_ep_len(5);
        let (buffer, agent, _) = run(env_config, config)?;

        // DummyEnv samples -1, DummyAgent always returns 1
        let acts = (0..10)
            .map(|i| buffer.get(i).unwrap().act[0])
            .collect::<Vec<_>>();
        assert_eq!(acts[..4], [-1.0; 4]);
        assert_eq!(acts[4..], [1.0; 6]);
        // Training steps after warm-up plus two validation episodes of 5 steps
        assert_eq!(agent.n_samples, 6 + 10);
        Ok(())
    }

    #[test]
    fn test_epoch_end_saves_and_validates() -> Result<()> {
        let dir = TempDir::new("trainer")?;
        let model_dir = dir.path().to_str().unwrap().to_string();
        let env_config = DummyEnvConfig::default().terminate_at(Some(5));
        let config = TrainerConfig::default()
            .epochs(3)
            .steps_per_epoch(5)
            .start_steps(0)
            .max_ep_len(5)
            .model_dir(&model_dir);
        let (_, _, recorder) = run(env_config, config)?;

        let epochs = recorder
            .iter()
            .filter_map(|r| r.get_scalar("epoch").ok())
            .collect::<Vec<_>>();
        assert_eq!(epochs, vec![1.0, 2.0, 3.0]);
        assert!(recorder
            .iter()
            .all(|r| r.get("epoch").is_none() || r.get_scalar("eval_return").is_ok()));
        assert!(dir.path().join("agent.yaml").exists());
        assert!(dir.path().join("best").join("agent.yaml").exists());
        Ok(())
    }
}
