#![warn(missing_docs)]
//! Core functionalities of the DDPG workspace.
//!
//! This crate does not depend on any tensor backend. It provides
//!
//! * the interfaces between environments and agents ([`Env`], [`Obs`], [`Act`],
//!   [`Step`], [`Policy`], [`Agent`]),
//! * a fixed-capacity circular [`ReplayBuffer`],
//! * the [`Trainer`], which runs the episode-wise collect/update loop,
//! * [`Evaluator`]s for deterministic validation runs,
//! * [`record`], key-value records used for logging metrics.
pub mod dummy;
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{
    Act, Agent, Env, EnvParams, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase, Step,
};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use replay_buffer::{ReplayBuffer, ReplayBufferConfig, Transition, TransitionBatch};
pub use trainer::{Phase, Trainer, TrainerConfig};
