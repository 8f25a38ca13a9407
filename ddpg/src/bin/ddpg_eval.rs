//! Evaluates a trained DDPG actor.
use anyhow::Result;
use clap::Parser;
use ddpg::Args;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let _ = ddpg::eval(&args)?;
    Ok(())
}
