//! List command handler

use anyhow::Result;
use std::path::Path;

use reparser::registry::REPARSERS;
use reparser::RecordSource;

use super::{load_config, open_database};

/// List every registered reparser with its current highest id.
#[cfg(not(tarpaulin_include))]
pub fn handle(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let conn = open_database(&config)?;
    let prefix = &config.database.table_prefix;

    println!("{:<20} {:<22} {:>10}", "NAME", "TABLE", "MAX ID");
    for def in REPARSERS {
        let table = format!("{}{}", prefix, def.spec.table);
        let max_id = def
            .open(&conn, prefix)
            .and_then(|source| source.max_id())
            .map(|id| id.to_string())
            .unwrap_or_else(|_| "unavailable".to_string());
        println!("{:<20} {:<22} {:>10}", def.name, table, max_id);
    }
    Ok(())
}
