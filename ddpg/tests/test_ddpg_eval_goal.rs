use anyhow::Result;
use clap::Parser;
use ddpg::{eval_goal, Args};
use ddpg_candle_agent::{
    ddpg::{ActorConfig, Ddpg},
    save_goal_policy, Normalizer,
};
use ddpg_core::{Env, ReplayBuffer};
use ddpg_envs::{PointReach, PointReachConfig};
use tempdir::TempDir;

fn args(env_name: &str, bundle: &str, csv: &str) -> Args {
    Args::parse_from([
        "ddpg_eval_goal",
        "--env-name",
        env_name,
        "--bundle",
        bundle,
        "--hidden",
        "16",
        "--test-episodes",
        "3",
        "--csv",
        csv,
    ])
}

/// Writes the policy file of a freshly initialized actor.
fn save_untrained_policy(args: &Args) -> Result<()> {
    let env = PointReach::build(&PointReachConfig::default(), 0)?;
    let p = env.env_params();
    let actor_config = ActorConfig::new(
        p.obs_dim + p.goal_dim,
        vec![16, 16],
        p.action_dim,
        p.max_action,
    );
    let config = args.ddpg_config(&p).actor_config(actor_config);
    let agent = Ddpg::<PointReach, ReplayBuffer>::build(config)?;

    let normalizer = Normalizer::new(
        vec![0.0; p.obs_dim],
        vec![0.5; p.obs_dim],
        vec![0.0; p.goal_dim],
        vec![0.5; p.goal_dim],
        args.normalizer_config(),
    )?;
    save_goal_policy(args.bundle_path(), agent.actor().varmap(), &normalizer)
}

#[test]
fn test_eval_goal_point_reach() -> Result<()> {
    let dir = TempDir::new("ddpg_eval_goal")?;
    let bundle = dir.path().join("policy.safetensors");
    let csv = dir.path().join("eval.csv");
    let args = args(
        "PointReach-v0",
        bundle.to_str().unwrap(),
        csv.to_str().unwrap(),
    );
    save_untrained_policy(&args)?;

    let results = eval_goal(&args)?;
    assert_eq!(results.len(), 3);
    for r in results.iter() {
        // The environment truncates episodes before the evaluation cap
        assert_eq!(r.length, 50);
        assert!(r.success.is_some());
        assert!(r.final_reward == 0.0 || r.final_reward == -1.0);
    }

    let mut rdr = csv::Reader::from_path(&csv)?;
    assert_eq!(rdr.records().count(), 3);
    Ok(())
}

#[test]
fn test_eval_goal_requires_goal_env() -> Result<()> {
    let dir = TempDir::new("ddpg_eval_goal")?;
    let bundle = dir.path().join("policy.safetensors");
    let csv = dir.path().join("eval.csv");
    let args = args("Pendulum-v1", bundle.to_str().unwrap(), csv.to_str().unwrap());
    assert!(eval_goal(&args).is_err());
    Ok(())
}
