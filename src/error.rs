use thiserror::Error;

use crate::record::RecordId;
use crate::renderer::RenderError;
use crate::source::SourceError;

/// Error type for reparse runs.
///
/// Every variant aborts the current batch. Records persisted earlier in the
/// batch stay committed.
#[derive(Debug, Error)]
pub enum ReparseError {
    #[error("failed to fetch records {min_id}..={max_id} from '{source_name}'")]
    Fetch {
        source_name: String,
        min_id: RecordId,
        max_id: RecordId,
        #[source]
        cause: SourceError,
    },

    #[error("failed to read max id of '{source_name}'")]
    MaxId {
        source_name: String,
        #[source]
        cause: SourceError,
    },

    #[error("failed to re-render record {id} of '{source_name}'")]
    Render {
        source_name: String,
        id: RecordId,
        #[source]
        cause: RenderError,
    },

    #[error("failed to persist record {id} of '{source_name}'")]
    Persist {
        source_name: String,
        id: RecordId,
        #[source]
        cause: SourceError,
    },

    #[error("batch size must be at least 1")]
    InvalidBatchSize,
}

impl ReparseError {
    /// Id of the record that caused the failure, if any.
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            ReparseError::Render { id, .. } | ReparseError::Persist { id, .. } => Some(*id),
            _ => None,
        }
    }
}
