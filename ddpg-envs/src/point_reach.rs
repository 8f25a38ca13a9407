//! Goal-conditioned reaching of a point mass.
use crate::{GoalObs, VecAct};
use anyhow::Result;
use ddpg_core::{
    record::{Record, RecordValue},
    Env, EnvParams, Info, Step,
};
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const MAX_ACTION: f32 = 1.0;
const DT: f32 = 0.05;
const ARENA: f32 = 1.0;
const GOAL_RANGE: f32 = 0.8;

/// Info of goal-conditioned environments.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalInfo {
    /// `true` if the achieved goal is within the tolerance of the desired goal.
    pub is_success: bool,
}

impl Info for GoalInfo {
    fn is_success(&self) -> Option<bool> {
        Some(self.is_success)
    }
}

/// Configuration of [`PointReach`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PointReachConfig {
    /// Episodes are truncated after this number of steps.
    pub max_steps: usize,

    /// Distance under which the goal is regarded as reached.
    pub distance_threshold: f32,
}

impl Default for PointReachConfig {
    fn default() -> Self {
        Self {
            max_steps: 50,
            distance_threshold: 0.05,
        }
    }
}

impl PointReachConfig {
    /// Sets the number of steps after which episodes are truncated.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the distance threshold of success.
    pub fn distance_threshold(mut self, v: f32) -> Self {
        self.distance_threshold = v;
        self
    }
}

/// Move a point in the square `[-1, 1]^2` to a goal.
///
/// The action is a velocity command in `[-1, 1]^2`. The observation is the position
/// and the velocity of the point; the achieved goal is the position. The reward is
/// sparse, `0` when the goal is reached and `-1` otherwise. Like goal-based robotics
/// tasks, the episode never terminates and is truncated after `max_steps` steps.
pub struct PointReach {
    config: PointReachConfig,
    pos: [f32; 2],
    vel: [f32; 2],
    goal: [f32; 2],
    t: usize,
    rng: StdRng,
}

impl PointReach {
    fn obs(&self) -> GoalObs {
        GoalObs {
            observation: vec![self.pos[0], self.pos[1], self.vel[0], self.vel[1]],
            achieved_goal: self.pos.to_vec(),
            desired_goal: self.goal.to_vec(),
        }
    }

    fn distance(&self) -> f32 {
        ((self.pos[0] - self.goal[0]).powi(2) + (self.pos[1] - self.goal[1]).powi(2)).sqrt()
    }
}

impl Env for PointReach {
    type Config = PointReachConfig;
    type Obs = GoalObs;
    type Act = VecAct;
    type Info = GoalInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            pos: [0.0; 2],
            vel: [0.0; 2],
            goal: [0.0; 2],
            t: 0,
            rng: StdRng::seed_from_u64(seed as u64),
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("PointReach::reset()");
        self.pos = [0.0; 2];
        self.vel = [0.0; 2];
        self.goal = [
            self.rng.gen_range(-GOAL_RANGE..GOAL_RANGE),
            self.rng.gen_range(-GOAL_RANGE..GOAL_RANGE),
        ];
        self.t = 0;
        Ok(self.obs())
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.rng = StdRng::seed_from_u64(ix as u64);
        self.reset()
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        a.check_dim(2)?;
        for i in 0..2 {
            self.vel[i] = a.0[i].clamp(-MAX_ACTION, MAX_ACTION);
            self.pos[i] = (self.pos[i] + self.vel[i] * DT).clamp(-ARENA, ARENA);
        }
        self.t += 1;

        let distance = self.distance();
        let is_success = distance <= self.config.distance_threshold;
        let reward = if is_success { 0.0 } else { -1.0 };
        let is_truncated = self.t >= self.config.max_steps;
        let info = GoalInfo { is_success };
        let step = Step::new(self.obs(), a.clone(), reward, false, is_truncated, info);

        Ok((step, Record::from_slice(&[("distance", RecordValue::Scalar(distance))])))
    }

    fn sample_action(&mut self) -> Self::Act {
        VecAct(
            (0..2)
                .map(|_| self.rng.gen_range(-MAX_ACTION..MAX_ACTION))
                .collect(),
        )
    }

    fn env_params(&self) -> EnvParams {
        EnvParams {
            obs_dim: 4,
            goal_dim: 2,
            action_dim: 2,
            max_action: MAX_ACTION,
        }
    }

    fn render(&mut self) -> Result<()> {
        debug!(
            "t = {}, pos = {:?}, goal = {:?}, distance = {:.3}",
            self.t,
            self.pos,
            self.goal,
            self.distance()
        );
        Ok(())
    }
}
