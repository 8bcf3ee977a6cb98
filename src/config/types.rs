//! Configuration types

use serde::{Deserialize, Serialize};

use crate::walker::DEFAULT_BATCH_SIZE;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reparse: ReparseConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
}

/// Forum database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Path to the SQLite database (`~/` is expanded)
    #[serde(default = "default_database_path")]
    pub path: String,
    /// Prefix in front of every table name
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
}

fn default_database_path() -> String {
    "~/forum/forum.sqlite".to_string()
}

fn default_table_prefix() -> String {
    "phpbb_".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            table_prefix: default_table_prefix(),
        }
    }
}

/// Batch settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReparseConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for ReparseConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

/// External renderer command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RendererConfig {
    #[serde(default = "default_renderer_command")]
    pub command: String,
    #[serde(default = "default_renderer_args")]
    pub args: Vec<String>,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_renderer_command() -> String {
    "php".to_string()
}

fn default_renderer_args() -> Vec<String> {
    vec!["bin/render.php".to_string()]
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: default_renderer_command(),
            args: default_renderer_args(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.reparse.batch_size == 0 {
            return Err("reparse.batch_size must be > 0".to_string());
        }
        if !self
            .database
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!(
                "database.table_prefix '{}' may only contain letters, digits and '_'",
                self.database.table_prefix
            ));
        }
        if self.renderer.command.trim().is_empty() {
            return Err("renderer.command must not be empty".to_string());
        }
        if self.renderer.timeout_secs == 0 {
            return Err("renderer.timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}
