//! Text Reparser Library
//!
//! Rewrites stored forum text into the current canonical markup encoding,
//! in resumable id-range batches. Records whose canonical form is unchanged
//! are never written back.

pub mod cli;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod lock;
pub mod record;
pub mod registry;
pub mod renderer;
pub mod source;
pub mod walker;

pub use config::Config;
pub use detect::{detect_bbcode_usage, detect_features, detect_magic_url_usage, detect_smiley_usage};
pub use engine::{RangeReport, RecordOutcome, Reparser};
pub use error::ReparseError;
pub use lock::{JobLock, LockHeld, LockInfo};
pub use record::{CapabilityMask, Encoding, FeatureFlags, Record, RecordId};
pub use renderer::{CommandRenderer, MarkupRenderer, RenderError, RendererCommand};
pub use source::{MemorySource, RecordSource, SourceError, SqliteSource};
pub use walker::{BatchReport, Cursor, RangeWalker, WalkReport, DEFAULT_BATCH_SIZE};
