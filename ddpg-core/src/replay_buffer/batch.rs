//! Transitions and batches of transitions.

/// A transition `(o_t, o_t+1, a_t, r_t, done_t)`.
///
/// `done` is `true` only when `o_t+1` is a terminal state of the MDP.
/// Episodes cut by a time limit are stored with `done == false`, so that
/// the bootstrap target of the last transition keeps the value of `o_t+1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation `o_t`.
    pub obs: Vec<f32>,

    /// Next observation `o_t+1`.
    pub next_obs: Vec<f32>,

    /// Action `a_t`.
    pub act: Vec<f32>,

    /// Reward `r_t`.
    pub reward: f32,

    /// Terminal flag of `o_t+1`.
    pub done: bool,
}

/// A batch of transitions in five parallel, row-major arrays.
#[derive(Debug, Clone)]
pub struct TransitionBatch {
    /// Observations, `[len, obs_dim]`.
    pub obs: Vec<f32>,

    /// Next observations, `[len, obs_dim]`.
    pub next_obs: Vec<f32>,

    /// Actions, `[len, act_dim]`.
    pub act: Vec<f32>,

    /// Rewards, `[len]`.
    pub reward: Vec<f32>,

    /// Terminal flags as `0.0` or `1.0`, `[len]`.
    pub done: Vec<f32>,

    /// Dimension of observations.
    pub obs_dim: usize,

    /// Dimension of actions.
    pub act_dim: usize,
}

impl TransitionBatch {
    /// Creates an empty batch.
    pub fn with_capacity(capacity: usize, obs_dim: usize, act_dim: usize) -> Self {
        Self {
            obs: Vec::with_capacity(capacity * obs_dim),
            next_obs: Vec::with_capacity(capacity * obs_dim),
            act: Vec::with_capacity(capacity * act_dim),
            reward: Vec::with_capacity(capacity),
            done: Vec::with_capacity(capacity),
            obs_dim,
            act_dim,
        }
    }

    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch has no transition.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}
