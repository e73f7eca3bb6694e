//! Types and traits for recording training metrics.
//!
//! Metrics computed during training, such as losses of an optimization step or the
//! mean reward of recent episodes, are put into a [`Record`] and handed over to a
//! [`Recorder`]. Every record written to a recorder carries the step index under
//! the key [`STEP_KEY`].
//!
//! # Basic Usage
//!
//! ```rust
//! use border_core::record::{Record, RecordValue, STEP_KEY};
//!
//! // following values are obtained with some process in reality
//! let step = 1;
//! let loss = 0.5f32;
//!
//! let mut record = Record::empty();
//! record.insert(STEP_KEY, RecordValue::Step(step));
//! record.insert("loss_total", RecordValue::Scalar(loss));
//! ```
//!
//! # Aggregation
//!
//! Values of frequent events, like optimization steps, are usually stored with
//! [`AggregateRecorder::store`] and written as their means with
//! [`AggregateRecorder::flush`] at a fixed interval. [`RecordStorage`] implements the
//! aggregation.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;

/// Key of the step index in records written to a [`Recorder`].
pub const STEP_KEY: &str = "step";
