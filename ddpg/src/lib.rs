//! Command-line training and evaluation of DDPG agents.
//!
//! * `ddpg_train` trains an agent with [`train()`] and saves it in `<model_dir>/<env_name>`.
//! * `ddpg_eval` runs the saved actor with [`eval()`].
//! * `ddpg_eval_goal` runs a goal-conditioned policy file with [`eval_goal()`].
//!
//! All binaries take the same [`Args`].
mod args;
mod eval;
mod train;
pub use args::{Args, EVAL_MAX_EP_LEN, TRAIN_MAX_EP_LEN};
pub use eval::{eval, eval_goal, run_episodes, EpisodeResult};
pub use train::train;
