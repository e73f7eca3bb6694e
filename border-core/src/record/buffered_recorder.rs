use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder, STEP_KEY};

/// Buffered recorder.
///
/// Keeps every written record in memory. This is used in tests and for inspecting
/// the metrics of short runs.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    storage: RecordStorage,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self {
            buf: Vec::default(),
            storage: RecordStorage::new(),
        }
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Returns the scalar values of the given key in the order they were written.
    pub fn scalars(&self, key: &str) -> Vec<f32> {
        self.buf
            .iter()
            .filter_map(|r| r.get_scalar(key).ok())
            .collect()
    }

    /// Returns the step indices of the records in the order they were written.
    pub fn steps(&self) -> Vec<usize> {
        self.buf
            .iter()
            .filter_map(|r| r.get_step(STEP_KEY).ok())
            .collect()
    }
}

impl Recorder for BufferedRecorder {
    /// Write a [`Record`] to the buffer.
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: usize) {
        if self.storage.is_empty() {
            return;
        }
        let mut record = self.storage.aggregate();
        record.insert(STEP_KEY, RecordValue::Step(step));
        self.write(record);
    }
}
