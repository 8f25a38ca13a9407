//! A network paired with its target network.
use crate::{
    opt::{Optimizer, OptimizerConfig},
    util::track,
};
use anyhow::Result;
use candle_core::{DType::F32, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use std::path::Path;

/// A model trained by gradient descent together with its lagged copy.
///
/// The target network has the same architecture and the same variable names as the
/// main network. Its parameters are an exact copy of the main parameters right
/// after [`TargetNetwork::build`] and thereafter only move by
/// [`TargetNetwork::soft_update`]:
///
/// `target <- polyak * target + (1 - polyak) * main`
///
/// The optimizer holds the variables of the main network only.
pub struct TargetNetwork<M> {
    polyak: f64,
    device: Device,
    varmap: VarMap,
    varmap_tgt: VarMap,
    model: M,
    model_tgt: M,
    opt: Optimizer,
}

impl<M> TargetNetwork<M> {
    /// Constructs the main and the target networks with `build_fn`.
    pub fn build<F>(
        build_fn: F,
        opt_config: &OptimizerConfig,
        polyak: f64,
        device: Device,
    ) -> Result<Self>
    where
        F: Fn(VarBuilder) -> Result<M>,
    {
        let varmap = VarMap::new();
        let model = build_fn(VarBuilder::from_varmap(&varmap, F32, &device))?;

        let varmap_tgt = VarMap::new();
        let model_tgt = build_fn(VarBuilder::from_varmap(&varmap_tgt, F32, &device))?;

        let opt = opt_config.build(varmap.all_vars())?;

        // Copy parameters
        track(&varmap_tgt, &varmap, 1.0)?;

        Ok(Self {
            polyak,
            device,
            varmap,
            varmap_tgt,
            model,
            model_tgt,
            opt,
        })
    }

    /// Returns the main network.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns the target network.
    pub fn target(&self) -> &M {
        &self.model_tgt
    }

    /// Returns the variables of the main network.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Returns the variables of the target network.
    pub fn varmap_tgt(&self) -> &VarMap {
        &self.varmap_tgt
    }

    /// Returns the device on which the variables are allocated.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Returns the smoothing coefficient of the target network.
    pub fn polyak(&self) -> f64 {
        self.polyak
    }

    /// Backward step for all variables in the main network.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Moves the target parameters toward the main parameters.
    pub fn soft_update(&mut self) -> Result<()> {
        track(&self.varmap_tgt, &self.varmap, 1.0 - self.polyak)
    }

    /// Saves the main and the target networks.
    pub fn save(&self, path: &Path, path_tgt: &Path) -> Result<()> {
        self.varmap.save(path)?;
        info!("Save network to {:?}", path);
        self.varmap_tgt.save(path_tgt)?;
        info!("Save target network to {:?}", path_tgt);
        Ok(())
    }

    /// Loads the main network only, leaving the target network as it is.
    pub fn load_model(&mut self, path: &Path) -> Result<()> {
        self.varmap.load(path)?;
        info!("Load network from {:?}", path);
        Ok(())
    }

    /// Loads the main and the target networks.
    pub fn load(&mut self, path: &Path, path_tgt: &Path) -> Result<()> {
        self.varmap.load(path)?;
        info!("Load network from {:?}", path);
        self.varmap_tgt.load(path_tgt)?;
        info!("Load target network from {:?}", path_tgt);
        Ok(())
    }
}
