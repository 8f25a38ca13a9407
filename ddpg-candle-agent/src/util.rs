//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::Tensor;
use candle_nn::VarMap;
use ddpg_core::error::DdpgError;
use log::trace;
use std::collections::HashMap;

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("dest");
    let dest = dest
        .data()
        .lock()
        .map_err(|_| anyhow!("Failed to lock variables"))?;
    trace!("src");
    let src = src
        .data()
        .lock()
        .map_err(|_| anyhow!("Failed to lock variables"))?;

    for (k, v_dest) in dest.iter() {
        let v_src = src
            .get(k)
            .ok_or_else(|| DdpgError::MissingTensor(k.clone()))?;
        let t_dest = ((tau * v_src.as_tensor())? + (1.0 - tau) * v_dest.as_tensor())?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// Returns copies of the variables, with `prefix` prepended to their names.
pub fn named_tensors(varmap: &VarMap, prefix: &str) -> Result<HashMap<String, Tensor>> {
    let data = varmap
        .data()
        .lock()
        .map_err(|_| anyhow!("Failed to lock variables"))?;

    data.iter()
        .map(|(k, v)| Ok((format!("{}{}", prefix, k), v.as_tensor().copy()?)))
        .collect()
}

/// Sets the variables from tensors named with `prefix` followed by the variable names.
pub fn set_named_tensors(
    varmap: &VarMap,
    tensors: &HashMap<String, Tensor>,
    prefix: &str,
) -> Result<()> {
    let data = varmap
        .data()
        .lock()
        .map_err(|_| anyhow!("Failed to lock variables"))?;

    for (k, v) in data.iter() {
        let name = format!("{}{}", prefix, k);
        let t = tensors
            .get(&name)
            .ok_or_else(|| DdpgError::MissingTensor(name.clone()))?;
        v.set(&t.to_device(v.device())?)?;
    }

    Ok(())
}

/// Returns the scalar value of a loss, or an error if it is not finite.
pub fn finite_scalar(name: &str, loss: &Tensor) -> Result<f32> {
    let value = loss.to_scalar::<f32>()?;
    if !value.is_finite() {
        return Err(DdpgError::NonFiniteLoss {
            name: name.to_string(),
            value,
        }
        .into());
    }
    Ok(value)
}
