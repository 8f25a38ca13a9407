#![warn(missing_docs)]
//! Native continuous-control environments.
//!
//! * [`Pendulum`] - the classic inverted pendulum swing-up task (`Pendulum-v1`).
//! * [`PointReach`] - a goal-conditioned reaching task of a point mass in a plane
//!   (`PointReach-v0`). Its observation carries the desired goal and its info
//!   tells if the goal has been reached.
//!
//! Environments are selected by name with [`EnvName`].
mod act;
mod obs;
mod pendulum;
mod point_reach;
mod registry;
pub use act::VecAct;
pub use obs::{GoalObs, VecObs};
pub use pendulum::{Pendulum, PendulumConfig};
pub use point_reach::{GoalInfo, PointReach, PointReachConfig};
pub use registry::EnvName;
