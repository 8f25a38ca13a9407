//! Evaluation of trained policies.
use crate::Args;
use anyhow::{bail, Result};
use ddpg_candle_agent::{ddpg::ActorConfig, ddpg::Ddpg, GoalPolicy};
use ddpg_core::{Agent, Env, Info, Policy, ReplayBuffer};
use ddpg_envs::{EnvName, Pendulum, PendulumConfig, PointReach, PointReachConfig};
use log::info;
use serde::Serialize;
use std::path::Path;

/// Result of an evaluation episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeResult {
    /// Index of the episode.
    pub episode: usize,

    /// Number of steps.
    pub length: usize,

    /// Sum of the rewards.
    #[serde(rename = "return")]
    pub ret: f32,

    /// Reward of the last step.
    pub final_reward: f32,

    /// If the task was accomplished at the last step, for environments defining success.
    pub success: Option<bool>,
}

/// Runs deterministic episodes with a policy, rendering every step.
///
/// An episode ends when the environment terminates or truncates it, or after
/// `max_ep_len` steps. The `i`-th episode starts from `env.reset_with_index(i)`.
pub fn run_episodes<E, P>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    max_ep_len: usize,
) -> Result<Vec<EpisodeResult>>
where
    E: Env,
    P: Policy<E>,
{
    let mut results = Vec::with_capacity(n_episodes);

    for episode in 0..n_episodes {
        let mut obs = env.reset_with_index(episode)?;
        let mut result = EpisodeResult {
            episode,
            length: 0,
            ret: 0.0,
            final_reward: 0.0,
            success: None,
        };

        while result.length < max_ep_len {
            env.render()?;
            let act = policy.sample(&obs)?;
            let (step, _) = env.step(&act)?;
            result.length += 1;
            result.ret += step.reward;
            result.final_reward = step.reward;
            result.success = step.info.is_success();
            if step.is_done() {
                break;
            }
            obs = step.obs;
        }

        results.push(result);
    }

    Ok(results)
}

/// Evaluates the actor saved in `<model_dir>/<env_name>/actor.pt`.
pub fn eval(args: &Args) -> Result<Vec<EpisodeResult>> {
    let results = match args.env()? {
        EnvName::Pendulum => eval_with::<Pendulum>(args, &PendulumConfig::default())?,
        EnvName::PointReach => eval_with::<PointReach>(args, &PointReachConfig::default())?,
    };

    for r in results.iter() {
        println!(
            "Episode number : {} Reward : {} Return : {}",
            r.episode, r.final_reward, r.ret
        );
    }
    write_csv(args, &results)?;
    Ok(results)
}

fn eval_with<E: Env>(args: &Args, env_config: &E::Config) -> Result<Vec<EpisodeResult>> {
    let mut env = E::build(env_config, args.seed)?;
    let model_dir = args.env_model_dir();

    let mut agent = Ddpg::<E, ReplayBuffer>::build(args.ddpg_config(&env.env_params()))?;
    agent.load_actor(&model_dir)?;
    agent.eval();
    info!("Evaluate the actor in {:?}", model_dir);

    run_episodes(&mut env, &mut agent, args.test_episodes, args.eval_max_ep_len())
}

/// Evaluates the goal-conditioned policy saved in [`Args::bundle_path`].
pub fn eval_goal(args: &Args) -> Result<Vec<EpisodeResult>> {
    let name = args.env()?;
    let results = match name {
        EnvName::PointReach => eval_goal_with::<PointReach>(args, &PointReachConfig::default())?,
        _ => bail!("{} is not a goal-conditioned environment", name),
    };

    for r in results.iter() {
        println!(
            "Episode number : {} Reward : {} Success : {}",
            r.episode,
            r.final_reward,
            r.success.unwrap_or(false)
        );
    }
    write_csv(args, &results)?;
    Ok(results)
}

fn eval_goal_with<E: Env>(args: &Args, env_config: &E::Config) -> Result<Vec<EpisodeResult>> {
    let mut env = E::build(env_config, args.seed)?;
    let p = env.env_params();
    let actor_config = ActorConfig::new(
        p.obs_dim + p.goal_dim,
        vec![args.hidden, args.hidden],
        p.action_dim,
        p.max_action,
    );

    let path = args.bundle_path();
    let mut policy = GoalPolicy::load(&path, actor_config, args.normalizer_config(), args.device())?;
    info!("Evaluate the goal-conditioned policy in {:?}", path);

    run_episodes(&mut env, &mut policy, args.test_episodes, args.eval_max_ep_len())
}

fn write_csv(args: &Args, results: &[EpisodeResult]) -> Result<()> {
    if let Some(path) = args.csv.as_ref() {
        let mut wtr = csv::Writer::from_path(Path::new(path))?;
        for r in results {
            wtr.serialize(r)?;
        }
        wtr.flush()?;
        info!("Write evaluation results to {}", path);
    }
    Ok(())
}
