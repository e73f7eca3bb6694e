use super::Record;

/// Writes a record to an output destination with [`Recorder::write`].
///
/// The record is expected to contain the step index under [`STEP_KEY`](super::STEP_KEY).
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record);
}

/// A [`Recorder`] which stores records and writes their aggregation on demand.
pub trait AggregateRecorder: Recorder {
    /// Store the record.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records, tagged with `step`.
    ///
    /// Does nothing if no record has been stored since the last flush.
    fn flush(&mut self, step: usize);
}
