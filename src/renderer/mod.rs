//! External markup renderer contract.
//!
//! The markup grammar (BBCode, smilies, link detection) lives outside this
//! crate. The reparser only needs two operations from it: expand stored text
//! back to its editable source, and encode editable source for storage.
//!
//! # Design
//!
//! `MarkupRenderer` is the seam. `CommandRenderer` drives a configured
//! external program; tests supply their own implementations.

mod command;

pub use command::{CommandRenderer, RendererCommand};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::record::{CapabilityMask, FeatureFlags};

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Text expanded back to its editable source form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableText {
    pub text: String,
    /// Uid to encode with. Renderers may hand back a fresh one.
    #[serde(default)]
    pub uid: String,
    /// Features the renderer reports as enabled, if it knows them.
    #[serde(default)]
    pub flags: Option<FeatureFlags>,
}

/// Freshly encoded text plus the metadata stored next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredText {
    pub text: String,
    /// Opaque bitfield of BBCodes in use. `None` keeps the stored one.
    #[serde(default)]
    pub bitfield: Option<String>,
    /// Option bits. `None` means "derive from the encode flags".
    #[serde(default)]
    pub options: Option<u32>,
}

/// Renderer used by the reparse engine.
///
/// Both operations are synchronous. Implementations must not retry
/// internally; a failure is reported and aborts the current batch.
pub trait MarkupRenderer {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Expand stored `text` into editable source.
    fn expand_for_edit(
        &self,
        text: &str,
        uid: &str,
        mask: CapabilityMask,
    ) -> RenderResult<EditableText>;

    /// Encode editable source for storage with the given features enabled.
    fn encode_for_storage(
        &self,
        text: &str,
        uid: &str,
        flags: FeatureFlags,
    ) -> RenderResult<StoredText>;
}

impl<R: MarkupRenderer + ?Sized> MarkupRenderer for &R {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn expand_for_edit(
        &self,
        text: &str,
        uid: &str,
        mask: CapabilityMask,
    ) -> RenderResult<EditableText> {
        (**self).expand_for_edit(text, uid, mask)
    }

    fn encode_for_storage(
        &self,
        text: &str,
        uid: &str,
        flags: FeatureFlags,
    ) -> RenderResult<StoredText> {
        (**self).encode_for_storage(text, uid, flags)
    }
}

impl<R: MarkupRenderer + ?Sized> MarkupRenderer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn expand_for_edit(
        &self,
        text: &str,
        uid: &str,
        mask: CapabilityMask,
    ) -> RenderResult<EditableText> {
        (**self).expand_for_edit(text, uid, mask)
    }

    fn encode_for_storage(
        &self,
        text: &str,
        uid: &str,
        flags: FeatureFlags,
    ) -> RenderResult<StoredText> {
        (**self).encode_for_storage(text, uid, flags)
    }
}

/// Errors from markup renderers.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer command not found: {0}")]
    NotAvailable(String),

    #[error("Renderer timed out after {0:?}")]
    Timeout(Duration),

    #[error("Exit code {code}: {}", truncate_stderr(stderr))]
    ExitCode { code: i32, stderr: String },

    #[error("Failed to parse renderer response as JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Renderer rejected input: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keep at most 200 characters of stderr in error messages.
fn truncate_stderr(stderr: &str) -> String {
    const MAX: usize = 200;
    let trimmed = stderr.trim();
    if trimmed.chars().count() <= MAX {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
