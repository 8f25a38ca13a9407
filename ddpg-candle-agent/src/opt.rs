//! Optimizers.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::Optimizer as _;
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Configuration of the optimizer of a network.
///
/// In YAML, `Adam: { lr: 0.001 }`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam with the default moment decay rates of `candle_optimisers`.
    Adam {
        /// Learning rate.
        lr: f64,
    },
}

impl OptimizerConfig {
    /// Constructs an optimizer updating `vars` only.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        let Self::Adam { lr } = self;
        let params = ParamsAdam {
            lr: *lr,
            ..ParamsAdam::default()
        };
        Ok(Optimizer::Adam(Adam::new(vars, params)?))
    }

    /// Returns the configuration with the learning rate replaced.
    pub fn learning_rate(self, lr: f64) -> Self {
        match self {
            Self::Adam { .. } => Self::Adam { lr },
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 0.001 }
    }
}

/// An optimizer bound to the variables of a network.
pub enum Optimizer {
    /// Adam of `candle_optimisers`.
    Adam(Adam),
}

impl Optimizer {
    /// Computes the gradients of `loss` and updates the bound variables.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => Ok(opt.backward_step(loss)?),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_minimizes_quadratic() -> Result<()> {
        for config in [
            OptimizerConfig::Adam { lr: 0.1 },
            OptimizerConfig::default().learning_rate(0.1),
            serde_yaml::from_str("Adam:\n  lr: 0.1\n")?,
        ] {
            let x = Var::from_tensor(&Tensor::new(&[3f32], &Device::Cpu)?)?;
            let mut opt = config.build(vec![x.clone()])?;
            for _ in 0..100 {
                let loss = x.as_tensor().sqr()?.sum_all()?;
                opt.backward_step(&loss)?;
            }
            let x = x.as_tensor().to_vec1::<f32>()?[0];
            assert!(x.abs() < 1.0, "{:?}: {}", config, x);
        }
        Ok(())
    }

    #[test]
    fn test_unbound_variables_are_not_updated() -> Result<()> {
        let x = Var::from_tensor(&Tensor::new(&[3f32], &Device::Cpu)?)?;
        let y = Var::from_tensor(&Tensor::new(&[2f32], &Device::Cpu)?)?;
        let mut opt = OptimizerConfig::Adam { lr: 0.1 }.build(vec![x.clone()])?;

        let loss = (x.as_tensor() * y.as_tensor())?.sum_all()?;
        opt.backward_step(&loss)?;

        assert_ne!(x.as_tensor().to_vec1::<f32>()?[0], 3.0);
        assert_eq!(y.as_tensor().to_vec1::<f32>()?[0], 2.0);
        Ok(())
    }
}
