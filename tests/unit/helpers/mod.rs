//! Test helper utilities

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use reparser::record::{CapabilityMask, FeatureFlags, Record, RecordId};
use reparser::renderer::{EditableText, MarkupRenderer, RenderResult, StoredText};
use reparser::source::{MemorySource, RecordSource, SourceError, SourceResult};

/// Renderer that hands text back untouched. Every record is canonical.
pub struct IdentityRenderer;

impl MarkupRenderer for IdentityRenderer {
    fn name(&self) -> &str {
        "identity"
    }

    fn expand_for_edit(
        &self,
        text: &str,
        uid: &str,
        _mask: CapabilityMask,
    ) -> RenderResult<EditableText> {
        Ok(EditableText {
            text: text.to_string(),
            uid: uid.to_string(),
            flags: None,
        })
    }

    fn encode_for_storage(
        &self,
        text: &str,
        _uid: &str,
        _flags: FeatureFlags,
    ) -> RenderResult<StoredText> {
        Ok(StoredText {
            text: text.to_string(),
            bitfield: None,
            options: None,
        })
    }
}

/// Renderer that replaces `from` with `to` on encode and remembers the
/// flags of every encode call.
pub struct ReplaceRenderer {
    pub from: &'static str,
    pub to: &'static str,
    pub seen_flags: RefCell<Vec<FeatureFlags>>,
}

impl ReplaceRenderer {
    pub fn new(from: &'static str, to: &'static str) -> Self {
        Self {
            from,
            to,
            seen_flags: RefCell::new(Vec::new()),
        }
    }
}

impl MarkupRenderer for ReplaceRenderer {
    fn name(&self) -> &str {
        "replace"
    }

    fn expand_for_edit(
        &self,
        text: &str,
        uid: &str,
        _mask: CapabilityMask,
    ) -> RenderResult<EditableText> {
        Ok(EditableText {
            text: text.to_string(),
            uid: uid.to_string(),
            flags: None,
        })
    }

    fn encode_for_storage(
        &self,
        text: &str,
        _uid: &str,
        flags: FeatureFlags,
    ) -> RenderResult<StoredText> {
        self.seen_flags.borrow_mut().push(flags);
        Ok(StoredText {
            text: text.replace(self.from, self.to),
            bitfield: Some("gA==".to_string()),
            options: Some(flags.to_mask().bits()),
        })
    }
}

/// Wraps a [`MemorySource`] and fails the `fail_on`-th persist call (1-based).
pub struct FailingSource {
    pub inner: MemorySource,
    fail_on: usize,
    attempts: Cell<usize>,
    fetched: Cell<usize>,
}

impl FailingSource {
    pub fn new(inner: MemorySource, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            attempts: Cell::new(0),
            fetched: Cell::new(0),
        }
    }

    /// Persist calls attempted, including the failing one.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    /// Number of `fetch_range` calls.
    pub fn fetch_calls(&self) -> usize {
        self.fetched.get()
    }
}

impl RecordSource for FailingSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn max_id(&self) -> SourceResult<RecordId> {
        self.inner.max_id()
    }

    fn fetch_range(&self, min_id: RecordId, max_id: RecordId) -> SourceResult<Vec<Record>> {
        self.fetched.set(self.fetched.get() + 1);
        self.inner.fetch_range(min_id, max_id)
    }

    fn persist(&self, record: &Record) -> SourceResult<()> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt == self.fail_on {
            return Err(SourceError::Unavailable {
                source_name: self.name().to_string(),
                reason: "disk full".to_string(),
            });
        }
        self.inner.persist(record)
    }
}

/// Source with records `ids`, each text containing `colour` so that a
/// [`ReplaceRenderer`] for colour/color rewrites all of them.
pub fn colour_source(ids: impl IntoIterator<Item = RecordId>) -> MemorySource {
    MemorySource::with_records(
        "posts",
        ids.into_iter()
            .map(|id| Record::new(id, format!("colour #{}", id), "").with_flags(FeatureFlags::all())),
    )
}

/// Source holding records `1..=count`.
pub fn numbered_source(count: RecordId) -> MemorySource {
    colour_source(1..=count)
}

/// Renderer that reports `flags` from `expand_for_edit` and remembers the
/// flags of every encode call. Text passes through unchanged.
pub struct FlagReportingRenderer {
    pub flags: FeatureFlags,
    pub seen_flags: RefCell<Vec<FeatureFlags>>,
}

impl FlagReportingRenderer {
    pub fn new(flags: FeatureFlags) -> Self {
        Self {
            flags,
            seen_flags: RefCell::new(Vec::new()),
        }
    }
}

impl MarkupRenderer for FlagReportingRenderer {
    fn name(&self) -> &str {
        "flag-reporting"
    }

    fn expand_for_edit(
        &self,
        text: &str,
        uid: &str,
        _mask: CapabilityMask,
    ) -> RenderResult<EditableText> {
        Ok(EditableText {
            text: text.to_string(),
            uid: uid.to_string(),
            flags: Some(self.flags),
        })
    }

    fn encode_for_storage(
        &self,
        text: &str,
        _uid: &str,
        flags: FeatureFlags,
    ) -> RenderResult<StoredText> {
        self.seen_flags.borrow_mut().push(flags);
        Ok(StoredText {
            text: text.to_string(),
            bitfield: None,
            options: None,
        })
    }
}

/// Wraps a [`MemorySource`] whose `fetch_range` also returns `stray`, a
/// record that may lie outside the requested range.
pub struct StraySource {
    pub inner: MemorySource,
    pub stray: Record,
}

impl StraySource {
    pub fn new(inner: MemorySource, stray: Record) -> Self {
        Self { inner, stray }
    }
}

impl RecordSource for StraySource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn max_id(&self) -> SourceResult<RecordId> {
        self.inner.max_id()
    }

    fn fetch_range(&self, min_id: RecordId, max_id: RecordId) -> SourceResult<Vec<Record>> {
        let mut records = self.inner.fetch_range(min_id, max_id)?;
        records.push(self.stray.clone());
        Ok(records)
    }

    fn persist(&self, record: &Record) -> SourceResult<()> {
        self.inner.persist(record)
    }
}
