//! Writes training metrics as TFRecord files readable by Tensorboard.
use border_core::record::{
    AggregateRecorder, Record, RecordStorage, RecordValue, Recorder, STEP_KEY,
};
use log::warn;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    storage: RecordStorage,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: STEP_KEY.to_string(),
            storage: RecordStorage::new(),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// Only [`RecordValue::Scalar`] is written, other variants are ignored.
    /// A record without a step index is discarded.
    fn write(&mut self, record: Record) {
        let step = match record.get_step(&self.step_key) {
            Ok(step) => step,
            Err(_) => {
                warn!("Record without '{}' is discarded", self.step_key);
                return;
            }
        };

        for (k, v) in record.iter() {
            if let RecordValue::Scalar(v) = v {
                self.writer.add_scalar(k, *v, step);
            }
        }
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: usize) {
        if !self.storage.is_empty() {
            let mut record = self.storage.aggregate();
            record.insert(self.step_key.clone(), RecordValue::Step(step));
            self.write(record);
        }
        self.writer.flush();
    }
}
