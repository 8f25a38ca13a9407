//! Deep deterministic policy gradient (DDPG) agent.
//!
//! The agent keeps an [`Actor`] and a [`Critic`], each paired with a target network
//! in a [`TargetNetwork`](crate::TargetNetwork). A minibatch update consists of
//!
//! 1. a critic step on the MSE between `Q(s, a)` and the detached target
//!    `y = r + gamma * (1 - done) * Q_tgt(s', mu_tgt(s'))`,
//! 2. an actor step on `-mean Q(s, mu(s))`,
//! 3. a soft update of both target networks.
mod actor;
mod base;
mod config;
mod critic;
pub use actor::{Actor, ActorConfig};
pub use base::Ddpg;
pub use config::DdpgConfig;
pub use critic::{Critic, CriticConfig};
