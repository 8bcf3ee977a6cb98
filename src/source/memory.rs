use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{RecordSource, SourceError, SourceResult};
use crate::record::{Record, RecordId};

/// In-memory record source.
///
/// Records are kept in id order, so `fetch_range` returns ascending ids.
#[derive(Debug, Default)]
pub struct MemorySource {
    name: String,
    records: RefCell<BTreeMap<RecordId, Record>>,
    persist_count: RefCell<usize>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RefCell::new(BTreeMap::new()),
            persist_count: RefCell::new(0),
        }
    }

    /// Build a source pre-populated with `records`.
    pub fn with_records(name: impl Into<String>, records: impl IntoIterator<Item = Record>) -> Self {
        let source = Self::new(name);
        for record in records {
            source.insert(record);
        }
        source
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: Record) {
        self.records.borrow_mut().insert(record.id, record);
    }

    pub fn get(&self, id: RecordId) -> Option<Record> {
        self.records.borrow().get(&id).cloned()
    }

    /// Snapshot of every record in id order.
    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().values().cloned().collect()
    }

    /// Number of successful `persist` calls so far.
    pub fn persist_count(&self) -> usize {
        *self.persist_count.borrow()
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_id(&self) -> SourceResult<RecordId> {
        Ok(self
            .records
            .borrow()
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0))
    }

    fn fetch_range(&self, min_id: RecordId, max_id: RecordId) -> SourceResult<Vec<Record>> {
        if min_id > max_id {
            return Ok(Vec::new());
        }
        Ok(self
            .records
            .borrow()
            .range(min_id..=max_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn persist(&self, record: &Record) -> SourceResult<()> {
        let mut records = self.records.borrow_mut();
        let stored = records
            .get_mut(&record.id)
            .ok_or_else(|| SourceError::MissingRecord {
                source_name: self.name.clone(),
                id: record.id,
            })?;
        *stored = record.clone();
        *self.persist_count.borrow_mut() += 1;
        Ok(())
    }
}
