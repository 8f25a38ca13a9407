//! Observations.
use ddpg_core::Obs;

/// Flat observation vector.
#[derive(Clone, Debug, PartialEq)]
pub struct VecObs(pub Vec<f32>);

impl Obs for VecObs {
    fn observation(&self) -> &[f32] {
        &self.0
    }
}

/// Observation of a goal-conditioned environment.
///
/// The fields follow the dictionary observation of goal-based gym environments.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalObs {
    /// State of the environment.
    pub observation: Vec<f32>,

    /// The goal achieved in the current state.
    pub achieved_goal: Vec<f32>,

    /// The goal to be reached.
    pub desired_goal: Vec<f32>,
}

impl Obs for GoalObs {
    fn observation(&self) -> &[f32] {
        &self.observation
    }

    fn desired_goal(&self) -> Option<&[f32]> {
        Some(&self.desired_goal)
    }
}
