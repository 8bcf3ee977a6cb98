//! Detect command handler

use anyhow::{Context, Result};
use std::path::Path;

use reparser::detect::{detect_bbcode_usage, detect_features, DEFAULT_BBCODES};
use reparser::{FeatureFlags, RecordSource};

use super::{find_reparser, load_config, open_database};

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn describe_flags(flags: FeatureFlags) -> String {
    format!(
        "bbcode={} magic_url={} smilies={}",
        yes_no(flags.bbcode),
        yes_no(flags.magic_url),
        yes_no(flags.smilies)
    )
}

/// Print the encoding and detected features of one record.
#[cfg(not(tarpaulin_include))]
pub fn handle(config_path: Option<&Path>, name: &str, id: u64) -> Result<()> {
    let def = find_reparser(name)?;
    let config = load_config(config_path)?;
    let conn = open_database(&config)?;
    let source = def.open(&conn, &config.database.table_prefix)?;

    let record = source
        .fetch_range(id, id)
        .with_context(|| format!("Failed to read {} record {}", def.name, id))?
        .into_iter()
        .find(|r| r.id == id)
        .with_context(|| format!("No {} record with id {}", def.name, id))?;

    let detected = detect_features(&record);
    let bbcodes: Vec<&str> = DEFAULT_BBCODES
        .iter()
        .copied()
        .filter(|tag| detect_bbcode_usage(&record, tag))
        .collect();

    println!("{} #{}", def.name, record.id);
    println!("  encoding:  {}", record.encoding());
    println!("  uid:       {}", record.markup_uid);
    println!("  detected:  {}", describe_flags(detected));
    match record.feature_flags {
        Some(flags) => println!("  stored:    {}", describe_flags(flags)),
        None => println!("  stored:    (none)"),
    }
    if bbcodes.is_empty() {
        println!("  bbcodes:   (none)");
    } else {
        println!("  bbcodes:   {}", bbcodes.join(", "));
    }
    Ok(())
}
