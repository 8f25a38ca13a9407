use anyhow::Result;
use clap::Parser;
use ddpg::{eval, train, Args};
use ddpg_core::{ReplayBufferConfig, TrainerConfig};
use tempdir::TempDir;

fn args(model_dir: &str, csv: &str) -> Args {
    Args::parse_from([
        "ddpg_train",
        "--env-name",
        "Pendulum-v1",
        "--model-dir",
        model_dir,
        "--epochs",
        "2",
        "--steps-in-epoch",
        "60",
        "--start-steps",
        "30",
        "--max-ep-len",
        "20",
        "--buff-size",
        "1000",
        "--batch-size",
        "8",
        "--hidden",
        "16",
        "--test-episodes",
        "2",
        "--csv",
        csv,
    ])
}

#[test]
fn test_train_and_eval_pendulum() -> Result<()> {
    let dir = TempDir::new("ddpg_pendulum")?;
    let model_dir = dir.path().to_str().unwrap();
    let csv = dir.path().join("eval.csv");
    let args = args(model_dir, csv.to_str().unwrap());

    train(&args)?;

    let env_dir = dir.path().join("Pendulum-v1");
    for name in ["actor.pt", "actor_tgt.pt", "critic.pt", "critic_tgt.pt"] {
        assert!(env_dir.join(name).exists(), "{} is missing", name);
        assert!(env_dir.join("best").join(name).exists());
    }
    assert_eq!(
        TrainerConfig::load(env_dir.join("trainer.yaml"))?,
        args.trainer_config()
    );
    let buffer_config = ReplayBufferConfig::load(env_dir.join("replay_buffer.yaml"))?;
    assert_eq!(buffer_config.capacity, 1000);

    let results = eval(&args)?;
    assert_eq!(results.len(), 2);
    for r in results.iter() {
        assert_eq!(r.length, 20);
        assert!(r.ret.is_finite());
        assert_eq!(r.success, None);
    }

    let mut rdr = csv::Reader::from_path(&csv)?;
    let headers = rdr.headers()?.clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["episode", "length", "return", "final_reward", "success"]
    );
    assert_eq!(rdr.records().count(), 2);
    Ok(())
}

#[test]
fn test_eval_without_model_fails() -> Result<()> {
    let dir = TempDir::new("ddpg_pendulum")?;
    let csv = dir.path().join("eval.csv");
    let args = args(dir.path().to_str().unwrap(), csv.to_str().unwrap());
    assert!(eval(&args).is_err());
    Ok(())
}
