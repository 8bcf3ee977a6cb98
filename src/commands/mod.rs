//! Command handlers for the reparser CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod config;
pub mod detect;
pub mod list;
pub mod run;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

use reparser::registry::{self, ReparserDef};
use reparser::Config;

/// A reparser name that is not registered. Exits with status 2.
#[derive(Debug, thiserror::Error)]
#[error("Unknown reparser '{0}' (see 'reparser list')")]
pub struct UnknownReparser(pub String);

/// Load config from an explicit path, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Open the configured database. The file must already exist.
pub fn open_database(config: &Config) -> Result<Connection> {
    let path = config.database_path();
    Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_WRITE)
        .with_context(|| format!("Failed to open database: {}", path.display()))
}

/// Look up a reparser, failing with [`UnknownReparser`].
pub fn find_reparser(name: &str) -> Result<&'static ReparserDef> {
    registry::find(name).ok_or_else(|| UnknownReparser(name.to_string()).into())
}
