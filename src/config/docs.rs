//! Config field documentation, used by `reparser config show` to annotate
//! the TOML output with inline comments.

use std::collections::HashMap;

/// Documentation for a config section.
pub struct SectionDoc {
    /// TOML section name (e.g., "database")
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldDoc],
}

/// Documentation for a config field.
pub struct FieldDoc {
    /// Field name as it appears in TOML
    pub name: &'static str,
    pub description: &'static str,
    /// Default value as a display string
    pub default_display: &'static str,
}

/// Config sections in canonical display order.
pub const CONFIG_SECTIONS: &[SectionDoc] = &[
    SectionDoc {
        name: "database",
        description: "Forum database settings",
        fields: &[
            FieldDoc {
                name: "path",
                description: "Path to the forum's SQLite database",
                default_display: "~/forum/forum.sqlite",
            },
            FieldDoc {
                name: "table_prefix",
                description: "Prefix in front of every table name",
                default_display: "phpbb_",
            },
        ],
    },
    SectionDoc {
        name: "reparse",
        description: "Batching settings",
        fields: &[FieldDoc {
            name: "batch_size",
            description: "Records processed per batch step",
            default_display: "250",
        }],
    },
    SectionDoc {
        name: "renderer",
        description: "External markup renderer",
        fields: &[
            FieldDoc {
                name: "command",
                description: "Program that expands and encodes markup (JSON over stdin/stdout)",
                default_display: "php",
            },
            FieldDoc {
                name: "args",
                description: "Arguments passed to the renderer program",
                default_display: r#"["bin/render.php"]"#,
            },
            FieldDoc {
                name: "timeout_secs",
                description: "Timeout per renderer call in seconds",
                default_display: "30",
            },
        ],
    },
];

/// Prefix each documented field line with a `# description` comment.
pub fn annotate_config(toml_str: &str) -> String {
    let mut lookup: HashMap<(&str, &str), &str> = HashMap::new();
    for section in CONFIG_SECTIONS {
        for field in section.fields {
            lookup.insert((section.name, field.name), field.description);
        }
    }

    let mut result = String::new();
    let mut current_section = String::new();

    for line in toml_str.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            let name = trimmed
                .trim_start_matches('[')
                .split(']')
                .next()
                .unwrap_or("")
                .trim();
            current_section = name.to_string();
            result.push_str(line);
            result.push('\n');
            continue;
        }

        if let Some((before_eq, _)) = trimmed.split_once('=') {
            let key = before_eq.trim();
            if let Some(desc) = lookup.get(&(current_section.as_str(), key)) {
                result.push_str(&format!("# {}\n", desc));
            }
        }

        result.push_str(line);
        result.push('\n');
    }

    result
}
