//! Inverted pendulum swing-up.
use crate::{VecAct, VecObs};
use anyhow::Result;
use ddpg_core::{record::Record, Env, EnvParams, Step};
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

/// Configuration of [`Pendulum`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PendulumConfig {
    /// Episodes are truncated after this number of steps.
    pub max_steps: usize,
}

impl Default for PendulumConfig {
    fn default() -> Self {
        Self { max_steps: 200 }
    }
}

impl PendulumConfig {
    /// Sets the number of steps after which episodes are truncated.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }
}

/// Swing up a pendulum and keep it upright.
///
/// The observation is `[cos(theta), sin(theta), theta_dot]` and the action is the
/// torque in `[-2, 2]`. The reward is
/// `-(theta^2 + 0.1 * theta_dot^2 + 0.001 * torque^2)`, with `theta` normalized
/// into `[-pi, pi)`. The episode never terminates; it is truncated after
/// `max_steps` steps.
pub struct Pendulum {
    config: PendulumConfig,
    theta: f32,
    theta_dot: f32,
    t: usize,
    rng: StdRng,
}

fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

impl Pendulum {
    fn obs(&self) -> VecObs {
        VecObs(vec![self.theta.cos(), self.theta.sin(), self.theta_dot])
    }

    /// Returns the angle and the angular velocity.
    pub fn state(&self) -> (f32, f32) {
        (self.theta, self.theta_dot)
    }
}

impl Env for Pendulum {
    type Config = PendulumConfig;
    type Obs = VecObs;
    type Act = VecAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            theta: 0.0,
            theta_dot: 0.0,
            t: 0,
            rng: StdRng::seed_from_u64(seed as u64),
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        trace!("Pendulum::reset()");
        self.theta = self.rng.gen_range(-PI..PI);
        self.theta_dot = self.rng.gen_range(-1.0..1.0);
        self.t = 0;
        Ok(self.obs())
    }

    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        self.rng = StdRng::seed_from_u64(ix as u64);
        self.reset()
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        a.check_dim(1)?;
        let u = a.0[0].clamp(-MAX_TORQUE, MAX_TORQUE);
        let (th, thdot) = (self.theta, self.theta_dot);

        let cost = angle_normalize(th).powi(2) + 0.1 * thdot.powi(2) + 0.001 * u.powi(2);

        let thdot = thdot + (3.0 * G / (2.0 * L) * th.sin() + 3.0 / (M * L * L) * u) * DT;
        let thdot = thdot.clamp(-MAX_SPEED, MAX_SPEED);
        self.theta = th + thdot * DT;
        self.theta_dot = thdot;
        self.t += 1;

        let is_truncated = self.t >= self.config.max_steps;
        let step = Step::new(self.obs(), a.clone(), -cost, false, is_truncated, ());

        Ok((step, Record::empty()))
    }

    fn sample_action(&mut self) -> Self::Act {
        VecAct(vec![self.rng.gen_range(-MAX_TORQUE..MAX_TORQUE)])
    }

    fn env_params(&self) -> EnvParams {
        EnvParams {
            obs_dim: 3,
            goal_dim: 0,
            action_dim: 1,
            max_action: MAX_TORQUE,
        }
    }

    fn render(&mut self) -> Result<()> {
        debug!(
            "t = {}, theta = {:.3}, theta_dot = {:.3}",
            self.t,
            angle_normalize(self.theta),
            self.theta_dot
        );
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ddpg_core::Obs;

    #[test]
    fn test_truncated_after_max_steps() -> Result<()> {
        let mut env = Pendulum::build(&PendulumConfig::default(), 0)?;
        let obs = env.reset()?;
        assert_eq!(obs.observation().len(), env.env_params().obs_dim);

        for t in 1..=200 {
            let a = env.sample_action();
            let (step, _) = env.step(&a)?;
            let o = step.obs.observation();
            assert!((o[0].powi(2) + o[1].powi(2) - 1.0).abs() < 1e-4);
            assert!(o[2].abs() <= MAX_SPEED);
            assert!(step.reward <= 0.0);
            assert!(!step.is_terminated);
            assert_eq!(step.is_truncated, t == 200);
        }
        Ok(())
    }

    #[test]
    fn test_torque_is_clamped() -> Result<()> {
        let mut env1 = Pendulum::build(&PendulumConfig::default(), 3)?;
        let mut env2 = Pendulum::build(&PendulumConfig::default(), 3)?;
        env1.reset()?;
        env2.reset()?;

        let (s1, _) = env1.step(&VecAct(vec![2.0]))?;
        let (s2, _) = env2.step(&VecAct(vec![50.0]))?;
        assert_eq!(s1.obs, s2.obs);
        assert_eq!(s1.reward, s2.reward);
        Ok(())
    }

    #[test]
    fn test_wrong_action_length() -> Result<()> {
        let mut env = Pendulum::build(&PendulumConfig::default(), 0)?;
        env.reset()?;
        assert!(env.step(&VecAct(vec![])).is_err());
        assert!(env.step(&VecAct(vec![0.0, 0.0])).is_err());
        assert_eq!(env.t, 0);
        Ok(())
    }

    #[test]
    fn test_reset_with_index_is_reproducible() -> Result<()> {
        let mut env = Pendulum::build(&PendulumConfig::default(), 0)?;
        let o1 = env.reset_with_index(7)?;
        env.reset()?;
        let o2 = env.reset_with_index(7)?;
        assert_eq!(o1, o2);
        Ok(())
    }

    #[test]
    fn test_upright_at_rest_has_zero_cost() -> Result<()> {
        let mut env = Pendulum::build(&PendulumConfig::default(), 0)?;
        env.reset()?;
        env.theta = 0.0;
        env.theta_dot = 0.0;
        let (step, _) = env.step(&VecAct(vec![0.0]))?;
        assert_eq!(step.reward, 0.0);
        assert_eq!(env.state(), (0.0, 0.0));
        Ok(())
    }
}
