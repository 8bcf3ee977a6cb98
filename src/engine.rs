//! Reparse engine: re-derive each record's stored text and write back changes.
//!
//! Per record, in one step:
//! 1. expand the stored text to its editable source
//! 2. encode that source again with the record's feature flags
//! 3. compare against the stored text; identical output is a no-op
//! 4. otherwise persist the new text through the record's source
//!
//! Reparsing a record already in canonical form never calls `persist`.

use tracing::{debug, warn};

use crate::detect::detect_features;
use crate::error::ReparseError;
use crate::record::{CapabilityMask, FeatureFlags, Record, RecordId};
use crate::renderer::{EditableText, MarkupRenderer};
use crate::source::RecordSource;

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Re-rendered text matched the stored text.
    Unchanged,
    /// Stored text was replaced and persisted.
    Rewritten,
}

/// Totals for one `reparse_range` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeReport {
    /// Records returned by the source.
    pub fetched: usize,
    pub unchanged: usize,
    pub rewritten: usize,
    /// Records the source returned outside the requested range.
    pub skipped: usize,
    /// Highest id processed in this range.
    pub last_id: Option<RecordId>,
}

impl RangeReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: &RangeReport) {
        self.fetched += other.fetched;
        self.unchanged += other.unchanged;
        self.rewritten += other.rewritten;
        self.skipped += other.skipped;
        self.last_id = self.last_id.max(other.last_id);
    }
}

/// Drives the external renderer over records of any source.
#[derive(Debug, Clone)]
pub struct Reparser<R> {
    renderer: R,
}

impl<R: MarkupRenderer> Reparser<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Reparse every record with `min_id <= id <= max_id`.
    ///
    /// Records are handled in the order the source returns them. The first
    /// failure aborts the range; records persisted before it stay written.
    pub fn reparse_range<S>(
        &self,
        source: &S,
        min_id: RecordId,
        max_id: RecordId,
    ) -> Result<RangeReport, ReparseError>
    where
        S: RecordSource + ?Sized,
    {
        let records = source
            .fetch_range(min_id, max_id)
            .map_err(|cause| ReparseError::Fetch {
                source_name: source.name().to_string(),
                min_id,
                max_id,
                cause,
            })?;

        let mut report = RangeReport {
            fetched: records.len(),
            ..RangeReport::default()
        };

        for record in records {
            if record.id < min_id || record.id > max_id {
                warn!(
                    source = source.name(),
                    id = record.id,
                    min_id,
                    max_id,
                    "Source returned record outside requested range, skipping"
                );
                report.skipped += 1;
                continue;
            }
            let id = record.id;
            match self.reparse_record(source, record)? {
                RecordOutcome::Unchanged => report.unchanged += 1,
                RecordOutcome::Rewritten => report.rewritten += 1,
            }
            report.last_id = report.last_id.max(Some(id));
        }

        Ok(report)
    }

    /// Reparse a single record, persisting it only if its text changed.
    pub fn reparse_record<S>(
        &self,
        source: &S,
        mut record: Record,
    ) -> Result<RecordOutcome, ReparseError>
    where
        S: RecordSource + ?Sized,
    {
        let render_error = |cause| ReparseError::Render {
            source_name: source.name().to_string(),
            id: record.id,
            cause,
        };

        let editable = self
            .renderer
            .expand_for_edit(&record.text, &record.markup_uid, CapabilityMask::ALL)
            .map_err(render_error)?;
        let flags = effective_flags(&record, &editable);
        let stored = self
            .renderer
            .encode_for_storage(&editable.text, &editable.uid, flags)
            .map_err(render_error)?;

        if stored.text == record.text {
            debug!(source = source.name(), id = record.id, "Record unchanged");
            return Ok(RecordOutcome::Unchanged);
        }

        record.text = stored.text;
        if stored.bitfield.is_some() {
            record.bitfield = stored.bitfield;
        }
        record.options = Some(stored.options.unwrap_or_else(|| flags.to_mask().bits()));
        source
            .persist(&record)
            .map_err(|cause| ReparseError::Persist {
                source_name: source.name().to_string(),
                id: record.id,
                cause,
            })?;
        debug!(source = source.name(), id = record.id, "Record rewritten");
        Ok(RecordOutcome::Rewritten)
    }
}

/// Flags to encode with: stored flags, then flags reported by the renderer,
/// then flags inferred from the stored text.
fn effective_flags(record: &Record, editable: &EditableText) -> FeatureFlags {
    record
        .feature_flags
        .or(editable.flags)
        .unwrap_or_else(|| detect_features(record))
}
