//! Record source adapters.
//!
//! A source is one content type's table of stored text (posts, private
//! messages, signatures, ...). The engine and walker are written once
//! against [`RecordSource`]; each content type supplies an implementation.
//!
//! - `MemorySource` keeps records in a `BTreeMap` (tests, embedding).
//! - `SqliteSource` reads and updates one table described by a `TableSpec`.

mod memory;
mod sqlite;

pub use memory::MemorySource;
pub use sqlite::{FlagColumns, SqliteSource, TableSpec};

use thiserror::Error;

use crate::record::{Record, RecordId};

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Storage-side contract for one content type.
pub trait RecordSource {
    /// Stable identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Highest id currently stored, or 0 when the source is empty.
    fn max_id(&self) -> SourceResult<RecordId>;

    /// All records with `min_id <= id <= max_id`.
    ///
    /// Order must be stable for a given snapshot. An empty or inverted range
    /// yields an empty vector, never an error.
    fn fetch_range(&self, min_id: RecordId, max_id: RecordId) -> SourceResult<Vec<Record>>;

    /// Write the record's current text back to storage, keyed by id.
    ///
    /// Durable update of exactly one record. Failures are returned as-is;
    /// retrying is the caller's business.
    fn persist(&self, record: &Record) -> SourceResult<()>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn max_id(&self) -> SourceResult<RecordId> {
        (**self).max_id()
    }

    fn fetch_range(&self, min_id: RecordId, max_id: RecordId) -> SourceResult<Vec<Record>> {
        (**self).fetch_range(min_id, max_id)
    }

    fn persist(&self, record: &Record) -> SourceResult<()> {
        (**self).persist(record)
    }
}

/// Errors from record sources.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source '{source_name}' is unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("record {id} no longer exists in '{source_name}'")]
    MissingRecord { source_name: String, id: RecordId },

    #[error("invalid table prefix '{0}': only ASCII letters, digits and '_' are allowed")]
    InvalidPrefix(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
