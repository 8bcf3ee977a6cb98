//! Stored rich-text records and the flags that describe how they were parsed.

use serde::{Deserialize, Serialize};

/// Record identifier, unique within one content source.
pub type RecordId = u64;

/// Marker prefixes identifying the structured (markup-tree) encoding.
///
/// `<r` opens a rich document, `<t` a plain-text one.
const STRUCTURED_PREFIXES: [&str; 2] = ["<r", "<t"];

/// Capability mask used when expanding stored text for editing.
///
/// The bit values match the host application's option flags, so the mask
/// can be stored directly in `*_options` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilityMask(u32);

impl CapabilityMask {
    pub const NONE: Self = Self(0);
    pub const BBCODE: Self = Self(1);
    pub const SMILIES: Self = Self(2);
    pub const LINKS: Self = Self(4);
    /// Every optional rendering feature.
    pub const ALL: Self = Self(1 | 2 | 4);

    /// Build a mask from raw option bits, ignoring unknown bits.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CapabilityMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Which optional rendering features were active for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub bbcode: bool,
    pub magic_url: bool,
    pub smilies: bool,
}

impl FeatureFlags {
    /// All features enabled.
    pub fn all() -> Self {
        Self {
            bbcode: true,
            magic_url: true,
            smilies: true,
        }
    }

    /// Decode flags from an option bitmask column.
    pub fn from_mask(mask: CapabilityMask) -> Self {
        Self {
            bbcode: mask.contains(CapabilityMask::BBCODE),
            magic_url: mask.contains(CapabilityMask::LINKS),
            smilies: mask.contains(CapabilityMask::SMILIES),
        }
    }

    /// Encode flags into the option bitmask representation.
    pub fn to_mask(self) -> CapabilityMask {
        let mut mask = CapabilityMask::NONE;
        if self.bbcode {
            mask = mask | CapabilityMask::BBCODE;
        }
        if self.smilies {
            mask = mask | CapabilityMask::SMILIES;
        }
        if self.magic_url {
            mask = mask | CapabilityMask::LINKS;
        }
        mask
    }
}

/// Storage encoding of a record's text, sniffed from its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// BBCode tags scoped by the record's markup uid, e.g. `[b:abc]`.
    Legacy,
    /// Markup-tree document, e.g. `<r><B><s>[b]</s>..</B></r>`.
    Structured,
}

impl Encoding {
    /// Determine the encoding of stored text.
    ///
    /// Anything that does not carry a structured marker is treated as legacy,
    /// including empty text.
    pub fn sniff(text: &str) -> Self {
        if STRUCTURED_PREFIXES.iter().any(|p| text.starts_with(p)) {
            Encoding::Structured
        } else {
            Encoding::Legacy
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Legacy => write!(f, "legacy"),
            Encoding::Structured => write!(f, "structured"),
        }
    }
}

/// One unit of stored rich text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    /// Stored representation in either encoding.
    pub text: String,
    /// Disambiguation token for legacy tags. Empty when unused.
    pub markup_uid: String,
    /// Absent on sources that never stored per-record flags.
    pub feature_flags: Option<FeatureFlags>,
    /// Renderer-produced bitfield, passed through to storage.
    pub bitfield: Option<String>,
    /// Renderer-produced option bits, passed through to storage.
    pub options: Option<u32>,
}

impl Record {
    pub fn new(id: RecordId, text: impl Into<String>, markup_uid: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            markup_uid: markup_uid.into(),
            feature_flags: None,
            bitfield: None,
            options: None,
        }
    }

    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.feature_flags = Some(flags);
        self
    }

    pub fn encoding(&self) -> Encoding {
        Encoding::sniff(&self.text)
    }
}
