//! Training of a DDPG agent.
use crate::Args;
use anyhow::Result;
use ddpg_candle_agent::ddpg::Ddpg;
use ddpg_core::{
    record::LogRecorder, DefaultEvaluator, Env, ReplayBuffer, ReplayBufferBase, Trainer,
};
use ddpg_envs::{EnvName, Pendulum, PendulumConfig, PointReach, PointReachConfig};
use log::info;
use std::fs;

/// Trains an agent on the environment selected by `args`.
///
/// The configurations and the trained networks are saved in `<model_dir>/<env_name>`,
/// the best model in terms of validation return in its `best` subdirectory.
/// Goal-conditioned environments are trained on their observations only.
pub fn train(args: &Args) -> Result<()> {
    match args.env()? {
        EnvName::Pendulum => train_with::<Pendulum>(args, &PendulumConfig::default()),
        EnvName::PointReach => train_with::<PointReach>(args, &PointReachConfig::default()),
    }
}

fn train_with<E: Env>(args: &Args, env_config: &E::Config) -> Result<()> {
    let mut env = E::build(env_config, args.seed)?;
    let env_params = env.env_params();
    info!("Train DDPG agent on {}: {:?}", args.env_name, env_params);

    let trainer_config = args.trainer_config();
    let ddpg_config = args.ddpg_config(&env_params);
    let buffer_config = args.replay_buffer_config(&env_params)?;

    let model_dir = args.env_model_dir();
    fs::create_dir_all(&model_dir)?;
    trainer_config.save(model_dir.join("trainer.yaml"))?;
    ddpg_config.save(model_dir.join("agent.yaml"))?;
    buffer_config.save(model_dir.join("replay_buffer.yaml"))?;

    let mut evaluator = DefaultEvaluator::<E>::new(
        env_config,
        args.seed + 1,
        trainer_config.n_validation_episodes,
        trainer_config.max_ep_len,
    )?;
    let mut agent = Ddpg::<E, ReplayBuffer>::build(ddpg_config)?;
    let mut buffer = ReplayBuffer::build(&buffer_config);
    let mut recorder = LogRecorder::new();
    let mut trainer = Trainer::<E, ReplayBuffer>::build(trainer_config);

    trainer.train(&mut env, &mut agent, &mut buffer, &mut evaluator, &mut recorder)?;
    info!(
        "Finished training: {} episodes, {} optimization steps",
        trainer.episodes(),
        trainer.opt_steps()
    );

    Ok(())
}
