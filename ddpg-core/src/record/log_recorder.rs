use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// Writes records through the `log` crate.
///
/// Records given to [`AggregateRecorder::store`] are aggregated and logged
/// at [`AggregateRecorder::flush`], one line per step.
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Constructs a [`LogRecorder`].
    pub fn new() -> Self {
        Self {
            storage: RecordStorage::new(),
        }
    }
}

fn format_record(record: &Record) -> String {
    let mut items = record
        .iter()
        .filter_map(|(k, v)| match v {
            RecordValue::Scalar(v) => Some(format!("{} = {:.4}", k, v)),
            RecordValue::String(s) => Some(format!("{} = {}", k, s)),
            RecordValue::Array1(_) => None,
        })
        .collect::<Vec<_>>();
    items.sort();
    items.join(", ")
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("{}", format_record(&record));
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let record = self.storage.aggregate();
        info!("step {}: {}", step, format_record(&record));
    }
}
