//! Environments selected by name.
use ddpg_core::error::DdpgError;
use std::{fmt, str::FromStr};

/// Names of the environments in this crate.
///
/// ```rust
/// use ddpg_envs::EnvName;
///
/// let name: EnvName = "Pendulum-v1".parse().unwrap();
/// assert_eq!(name, EnvName::Pendulum);
/// assert!("HalfCheetah-v4".parse::<EnvName>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvName {
    /// [`Pendulum`](crate::Pendulum).
    Pendulum,

    /// [`PointReach`](crate::PointReach).
    PointReach,
}

impl EnvName {
    /// Returns the registered name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendulum => "Pendulum-v1",
            Self::PointReach => "PointReach-v0",
        }
    }

    /// Returns `true` if the observation of the environment carries a goal.
    pub fn is_goal_conditioned(&self) -> bool {
        matches!(self, Self::PointReach)
    }
}

impl FromStr for EnvName {
    type Err = DdpgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pendulum-v1" => Ok(Self::Pendulum),
            "PointReach-v0" => Ok(Self::PointReach),
            _ => Err(DdpgError::UnknownEnv(s.to_string())),
        }
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
