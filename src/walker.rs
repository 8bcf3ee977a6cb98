//! Range walker: drive the reparse engine across a whole id space in
//! fixed-size batches.
//!
//! # Design
//!
//! - `Cursor` holds the walk position; it is plain data so a job runner can
//!   record `start` and hand it back later via [`Cursor::resume_from`].
//! - `RangeWalker::step` processes exactly one batch and returns control.
//! - `RangeWalker::run` loops over steps for callers that want a whole walk
//!   (optionally capped by a batch count).
//!
//! Batches cover ascending, contiguous id ranges. A failure leaves the cursor
//! on the failed batch, and since reparsing is idempotent, running that batch
//! again is safe.

use tracing::info;

use crate::engine::{RangeReport, Reparser};
use crate::error::ReparseError;
use crate::record::RecordId;
use crate::renderer::MarkupRenderer;
use crate::source::RecordSource;

/// Records per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Resumable walk position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// First id of the next batch. 0 for a fresh walk.
    pub start: RecordId,
    pub batch_size: usize,
    /// Set once a batch comes back with fewer than `batch_size` records.
    pub done: bool,
}

impl Cursor {
    /// Fresh cursor starting at id 0.
    pub fn new(batch_size: usize) -> Result<Self, ReparseError> {
        Self::resume_from(0, batch_size)
    }

    /// Cursor continuing a walk at `start`.
    pub fn resume_from(start: RecordId, batch_size: usize) -> Result<Self, ReparseError> {
        if batch_size == 0 {
            return Err(ReparseError::InvalidBatchSize);
        }
        Ok(Self {
            start,
            batch_size,
            done: false,
        })
    }

    /// Inclusive id bounds of the next batch.
    pub fn next_range(&self) -> (RecordId, RecordId) {
        let span = (self.batch_size as RecordId).saturating_sub(1);
        (self.start, self.start.saturating_add(span))
    }
}

/// Result of one batch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub min_id: RecordId,
    pub max_id: RecordId,
    pub report: RangeReport,
    /// Whether this batch marked the cursor done.
    pub done: bool,
}

/// Totals for a multi-batch walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkReport {
    pub batches: usize,
    pub totals: RangeReport,
    /// Whether the whole id space was covered.
    pub finished: bool,
    /// Where a follow-up walk should resume.
    pub next_start: RecordId,
}

/// Walks a source batch by batch with one reparser.
#[derive(Debug, Clone)]
pub struct RangeWalker<R> {
    reparser: Reparser<R>,
}

impl<R: MarkupRenderer> RangeWalker<R> {
    pub fn new(reparser: Reparser<R>) -> Self {
        Self { reparser }
    }

    pub fn reparser(&self) -> &Reparser<R> {
        &self.reparser
    }

    /// Process the batch at the cursor and advance it.
    ///
    /// A full batch moves `start` forward by `batch_size`; a short batch
    /// marks the cursor done. A done cursor yields an empty report.
    pub fn step<S>(&self, source: &S, cursor: &mut Cursor) -> Result<BatchReport, ReparseError>
    where
        S: RecordSource + ?Sized,
    {
        let (min_id, max_id) = cursor.next_range();
        if cursor.done {
            return Ok(BatchReport {
                min_id,
                max_id,
                report: RangeReport::default(),
                done: true,
            });
        }

        let report = self.reparser.reparse_range(source, min_id, max_id)?;
        let in_range = report.fetched - report.skipped;
        if in_range >= cursor.batch_size && max_id < RecordId::MAX {
            cursor.start = max_id + 1;
        } else {
            cursor.done = true;
        }

        info!(
            source = source.name(),
            min_id,
            max_id,
            fetched = report.fetched,
            rewritten = report.rewritten,
            done = cursor.done,
            "Batch reparsed"
        );

        Ok(BatchReport {
            min_id,
            max_id,
            report,
            done: cursor.done,
        })
    }

    /// Step until the id space is exhausted or `max_batches` steps ran
    /// (0 means no cap).
    ///
    /// Deleted records leave gaps in the id space, so a short batch below the
    /// source's current max id does not end the walk: the cursor moves past
    /// the gap and walking continues.
    pub fn run<S>(
        &self,
        source: &S,
        cursor: &mut Cursor,
        max_batches: usize,
    ) -> Result<WalkReport, ReparseError>
    where
        S: RecordSource + ?Sized,
    {
        let max_id = source.max_id().map_err(|cause| ReparseError::MaxId {
            source_name: source.name().to_string(),
            cause,
        })?;

        let mut walk = WalkReport::default();
        while !cursor.done {
            if max_batches > 0 && walk.batches >= max_batches {
                break;
            }
            let batch = self.step(source, cursor)?;
            walk.batches += 1;
            walk.totals.absorb(&batch.report);

            if batch.done && batch.max_id < max_id {
                cursor.start = batch.max_id + 1;
                cursor.done = false;
            }
        }

        walk.finished = cursor.done;
        walk.next_start = cursor.start;
        info!(
            source = source.name(),
            batches = walk.batches,
            fetched = walk.totals.fetched,
            rewritten = walk.totals.rewritten,
            finished = walk.finished,
            "Walk complete"
        );
        Ok(walk)
    }
}
