//! Heuristic feature detection over stored text.
//!
//! Older content sources never stored which rendering features were active
//! when a record was saved. These helpers infer the flags from the stored
//! markup instead. The encoding is sniffed once per call and exactly one
//! pattern strategy runs against it.
//!
//! All checks are best-effort: a missed feature means the record is
//! re-rendered without it, a spurious one means redundant work. Nothing here
//! fails on malformed text; a missing pattern is simply `false`.

use crate::record::{Encoding, FeatureFlags, Record};

/// BBCode tags checked by [`detect_features`].
pub const DEFAULT_BBCODES: &[&str] = &[
    "b",
    "i",
    "u",
    "quote",
    "code",
    "list",
    "img",
    "url",
    "size",
    "color",
    "email",
    "flash",
    "attachment",
];

/// Comment markers the legacy encoder wrapped around auto-detected links.
const LEGACY_LINK_MARKERS: &[&str] = &["<!-- m -->", "<!-- w -->", "<!-- l -->", "<!-- e -->"];

/// Guess whether the BBCode `name` is used in `record`.
pub fn detect_bbcode_usage(record: &Record, name: &str) -> bool {
    bbcode_in(record.encoding(), record, name)
}

/// Guess whether `record` contains links that were detected automatically
/// rather than written as explicit `[url]` tags.
pub fn detect_magic_url_usage(record: &Record) -> bool {
    magic_url_in(record.encoding(), &record.text)
}

/// Guess whether `record` contains smilies.
pub fn detect_smiley_usage(record: &Record) -> bool {
    smilies_in(record.encoding(), &record.text)
}

/// Infer all feature flags for a record lacking stored ones.
pub fn detect_features(record: &Record) -> FeatureFlags {
    let encoding = record.encoding();
    FeatureFlags {
        bbcode: DEFAULT_BBCODES
            .iter()
            .any(|name| bbcode_in(encoding, record, name)),
        magic_url: magic_url_in(encoding, &record.text),
        smilies: smilies_in(encoding, &record.text),
    }
}

fn bbcode_in(encoding: Encoding, record: &Record, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let haystack = record.text.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    match encoding {
        Encoding::Legacy => {
            // Without a uid there is nothing to scope the closing tag to.
            if record.markup_uid.is_empty() {
                return false;
            }
            let needle = format!("[/{}:{}]", name, record.markup_uid.to_ascii_lowercase());
            haystack.contains(&needle)
        }
        Encoding::Structured => {
            // Closing tag kept inside an <e> element of the same name,
            // e.g. <e>[/url]</e></URL>
            let needle = format!("<e>[/{}]</e></{}>", name, name);
            haystack.contains(&needle)
        }
    }
}

fn magic_url_in(encoding: Encoding, text: &str) -> bool {
    match encoding {
        Encoding::Legacy => LEGACY_LINK_MARKERS.iter().any(|m| text.contains(m)),
        Encoding::Structured => has_untagged_url_element(text),
    }
}

fn smilies_in(encoding: Encoding, text: &str) -> bool {
    match encoding {
        Encoding::Legacy => text.contains("<!-- s"),
        Encoding::Structured => text.contains("<E>"),
    }
}

/// Look for a `<URL attr..>` element not immediately followed by `<s>`.
///
/// Explicit `[url]` tags keep their opening markup in an `<s>` element right
/// after the URL start tag; auto-linked URLs have none.
fn has_untagged_url_element(text: &str) -> bool {
    const OPEN: &str = "<URL ";
    let mut rest = text;
    while let Some(pos) = rest.find(OPEN) {
        let after = &rest[pos + OPEN.len()..];
        let Some(close) = after.find('>') else {
            return false;
        };
        let tail = &after[close + 1..];
        if close > 0 && !tail.starts_with("<s>") {
            return true;
        }
        rest = tail;
    }
    false
}
