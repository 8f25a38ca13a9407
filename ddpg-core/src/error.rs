//! Errors in the library.
use thiserror::Error;

/// Errors raised by the components of this workspace.
#[derive(Debug, Error)]
pub enum DdpgError {
    /// The key was not found in a record.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// The value in a record has a different type from the requested one.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// A batch was requested from a replay buffer holding no transition.
    #[error("Cannot sample a batch from an empty replay buffer")]
    EmptyReplayBuffer,

    /// A replay buffer was configured to hold no transition.
    #[error("Capacity of the replay buffer must be positive")]
    ZeroCapacity,

    /// A vector does not have the declared dimensionality.
    #[error("Dimension mismatch of {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// What was being checked, e.g. `"obs"`.
        what: String,
        /// Declared dimension.
        expected: usize,
        /// Actual dimension.
        got: usize,
    },

    /// No environment is registered under the name.
    #[error("Unknown environment: {0}")]
    UnknownEnv(String),

    /// A loss became NaN or infinite during optimization.
    #[error("Non-finite {name}: {value}")]
    NonFiniteLoss {
        /// Name of the loss.
        name: String,
        /// Its value.
        value: f32,
    },

    /// A tensor expected in a checkpoint file was not found.
    #[error("Tensor {0} is missing in the checkpoint")]
    MissingTensor(String),
}
