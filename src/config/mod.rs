//! Configuration management for the reparser

pub mod docs;
mod io;
mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::renderer::RendererCommand;

impl Config {
    /// Get the config file path (~/.config/reparser/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Load configuration from the default path, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, or return defaults if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::save_to(self, path)
    }

    /// Expand ~ in the database path
    pub fn database_path(&self) -> PathBuf {
        let path = &self.database.path;
        if let Some(stripped) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        PathBuf::from(path)
    }

    /// Renderer command described by the `[renderer]` section
    pub fn renderer_command(&self) -> RendererCommand {
        RendererCommand::new(self.renderer.command.clone())
            .args(self.renderer.args.iter().cloned())
            .timeout(Duration::from_secs(self.renderer.timeout_secs))
    }
}
