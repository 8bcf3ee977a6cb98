//! Catalogue of the forum's reparsable content types.
//!
//! Each entry names one text column of the forum schema and how to read it.
//! Names match the host application's reparser task names; the
//! `text_reparser.` service prefix is accepted too.

use rusqlite::Connection;

use crate::source::{FlagColumns, SourceResult, SqliteSource, TableSpec};

/// Prefix the host application puts in front of reparser service names.
const SERVICE_PREFIX: &str = "text_reparser.";

/// One named reparser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparserDef {
    pub name: &'static str,
    pub description: &'static str,
    pub spec: TableSpec,
}

impl ReparserDef {
    /// Open this reparser's table on `conn`.
    pub fn open<'c>(&self, conn: &'c Connection, prefix: &str) -> SourceResult<SqliteSource<'c>> {
        SqliteSource::new(conn, self.name, prefix, self.spec)
    }
}

/// Every reparser, in the order a full run processes them.
pub const REPARSERS: &[ReparserDef] = &[
    ReparserDef {
        name: "post_text",
        description: "Post bodies",
        spec: TableSpec {
            table: "posts",
            id_column: "post_id",
            text_column: "post_text",
            uid_column: "bbcode_uid",
            bitfield_column: Some("bbcode_bitfield"),
            flags: FlagColumns::Separate {
                bbcode: "enable_bbcode",
                magic_url: "enable_magic_url",
                smilies: "enable_smilies",
            },
        },
    },
    ReparserDef {
        name: "pm_text",
        description: "Private message bodies",
        spec: TableSpec {
            table: "privmsgs",
            id_column: "msg_id",
            text_column: "message_text",
            uid_column: "bbcode_uid",
            bitfield_column: Some("bbcode_bitfield"),
            flags: FlagColumns::Separate {
                bbcode: "enable_bbcode",
                magic_url: "enable_magic_url",
                smilies: "enable_smilies",
            },
        },
    },
    ReparserDef {
        name: "user_signature",
        description: "User signatures",
        spec: TableSpec {
            table: "users",
            id_column: "user_id",
            text_column: "user_sig",
            uid_column: "user_sig_bbcode_uid",
            bitfield_column: Some("user_sig_bbcode_bitfield"),
            flags: FlagColumns::None,
        },
    },
    ReparserDef {
        name: "forum_description",
        description: "Forum descriptions",
        spec: TableSpec {
            table: "forums",
            id_column: "forum_id",
            text_column: "forum_desc",
            uid_column: "forum_desc_uid",
            bitfield_column: Some("forum_desc_bitfield"),
            flags: FlagColumns::Options("forum_desc_options"),
        },
    },
    ReparserDef {
        name: "forum_rules",
        description: "Forum rules",
        spec: TableSpec {
            table: "forums",
            id_column: "forum_id",
            text_column: "forum_rules",
            uid_column: "forum_rules_uid",
            bitfield_column: Some("forum_rules_bitfield"),
            flags: FlagColumns::Options("forum_rules_options"),
        },
    },
    ReparserDef {
        name: "group_description",
        description: "Group descriptions",
        spec: TableSpec {
            table: "groups",
            id_column: "group_id",
            text_column: "group_desc",
            uid_column: "group_desc_uid",
            bitfield_column: Some("group_desc_bitfield"),
            flags: FlagColumns::Options("group_desc_options"),
        },
    },
];

/// Look up a reparser by name.
pub fn find(name: &str) -> Option<&'static ReparserDef> {
    let name = name.strip_prefix(SERVICE_PREFIX).unwrap_or(name);
    REPARSERS.iter().find(|def| def.name == name)
}
