//! DDPG agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! * [`Ddpg`](ddpg::Ddpg) - actor-critic agent trained with bootstrapped targets
//!   and Polyak-averaged target networks.
//! * [`TargetNetwork`] - a model together with its lagged copy and optimizer.
//! * [`Normalizer`] and [`GoalPolicy`] - input normalization and the policy of
//!   goal-conditioned environments loaded from a single checkpoint file.
pub mod ddpg;
mod goal;
pub mod mlp;
pub mod model;
mod normalizer;
pub mod opt;
mod target;
pub mod util;
use anyhow::Result;
pub use goal::{save_goal_policy, GoalPolicy};
pub use normalizer::{Normalizer, NormalizerConfig};
use serde::{Deserialize, Serialize};
pub use target::TargetNetwork;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Device {
    /// Returns [`Device::Cuda`] if `cuda` is `true`, otherwise [`Device::Cpu`].
    pub fn from_flag(cuda: bool) -> Self {
        match cuda {
            true => Self::Cuda(0),
            false => Self::Cpu,
        }
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = anyhow::Error;

    fn try_from(device: Device) -> Result<Self> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}
