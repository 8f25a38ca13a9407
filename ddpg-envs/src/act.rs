//! Continuous action.
use anyhow::Result;
use ddpg_core::{error::DdpgError, Act};

/// Continuous action, a vector of `f32`.
#[derive(Clone, Debug, PartialEq)]
pub struct VecAct(pub Vec<f32>);

impl VecAct {
    /// Returns an error if the action does not have `expected` components.
    pub fn check_dim(&self, expected: usize) -> Result<()> {
        if self.0.len() != expected {
            return Err(DdpgError::DimensionMismatch {
                what: "act".to_string(),
                expected,
                got: self.0.len(),
            }
            .into());
        }
        Ok(())
    }
}

impl From<Vec<f32>> for VecAct {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl Act for VecAct {
    fn as_slice(&self) -> &[f32] {
        &self.0
    }
}
