//! Record storage and aggregation.
use super::{Record, RecordValue};
use std::collections::BTreeSet;

/// A storage of records with aggregation of scalar values.
///
/// Scalars stored under the same key are summarized by their min, max and mean.
/// For other value types, the most recent value is kept.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().fold(f32::MAX, |m, v| v.min(m)))
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().fold(f32::MIN, |m, v| v.max(m)))
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

impl RecordStorage {
    /// Creates a new empty record storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record in the storage.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn keys(&self) -> BTreeSet<String> {
        self.data
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect()
    }

    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    fn scalars(&self, key: &str) -> Vec<f32> {
        self.data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Returns the mean of the scalars stored under `key`.
    pub fn mean(&self, key: &str) -> Option<f32> {
        let vs = self.scalars(key);
        match vs.is_empty() {
            true => None,
            false => Some(vs.iter().sum::<f32>() / vs.len() as f32),
        }
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.keys() {
            match self.latest(&key) {
                Some(RecordValue::Scalar(_)) => {
                    let vs = self.scalars(&key);
                    if vs.len() == 1 {
                        record.insert(key, RecordValue::Scalar(vs[0]));
                    } else {
                        record.insert(format!("{}_min", key), min(&vs));
                        record.insert(format!("{}_max", key), max(&vs));
                        record.insert(format!("{}_mean", key), mean(&vs));
                    }
                }
                Some(v) => record.insert(key.clone(), v.clone()),
                None => {}
            }
        }

        self.data.clear();
        record
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_aggregate_scalars() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_scalar("loss_critic", 1.0));
        storage.store(Record::from_scalar("loss_critic", 3.0));
        storage.store(Record::from_scalar("eval_return", -150.0));
        assert_eq!(storage.mean("loss_critic"), Some(2.0));

        let record = storage.aggregate();
        assert_eq!(record.get_scalar("loss_critic_min").unwrap(), 1.0);
        assert_eq!(record.get_scalar("loss_critic_max").unwrap(), 3.0);
        assert_eq!(record.get_scalar("loss_critic_mean").unwrap(), 2.0);
        assert_eq!(record.get_scalar("eval_return").unwrap(), -150.0);
        assert!(storage.is_empty());
    }
}
