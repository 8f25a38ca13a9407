//! Types and traits for recording training metrics.
//!
//! * [`Record`] - A container of key-value pairs of various data types
//! * [`RecordValue`] - Values that can be stored in a record
//! * [`Recorder`] - Writes a record to some destination
//! * [`AggregateRecorder`] - Stores records and writes aggregated values on flush
//! * [`RecordStorage`] - Storage with aggregation of scalar values
//! * [`LogRecorder`] - Writes records through the `log` crate
//! * [`BufferedRecorder`] - Keeps records in memory
//!
//! ```rust
//! use ddpg_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode_length", RecordValue::Scalar(200.0));
//! record.insert("episode_return", RecordValue::Scalar(-1234.5));
//! assert_eq!(record.get_scalar("episode_length").unwrap(), 200.0);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
