//! A fixed-capacity circular replay buffer of transitions.
//!
//! Transitions `(o_t, o_t+1, a_t, r_t, done_t)` are kept in flat, preallocated
//! `f32` columns. Once the buffer is full, the oldest transition is overwritten.
//! Batches are sampled uniformly with replacement from the valid entries.
//!
//! ```rust
//! use ddpg_core::{ReplayBuffer, ReplayBufferConfig, ReplayBufferBase};
//!
//! let config = ReplayBufferConfig::default()
//!     .capacity(100)
//!     .obs_dim(3)
//!     .act_dim(1);
//! let mut buffer = ReplayBuffer::build(&config);
//! buffer.store(&[0.0, 0.1, 0.2], &[0.1, 0.2, 0.3], &[0.5], -1.0, false).unwrap();
//! let batch = buffer.sample_batch(32).unwrap();
//! assert_eq!(batch.len(), 32);
//! ```
mod base;
mod batch;
mod config;
pub use base::ReplayBuffer;
pub use batch::{Transition, TransitionBatch};
pub use config::ReplayBufferConfig;
