//! Config subcommands handler

use anyhow::Result;
use std::path::Path;

use reparser::config::docs::annotate_config;
use reparser::Config;

use super::load_config;

/// Show current configuration as TOML with inline documentation comments.
#[cfg(not(tarpaulin_include))]
pub fn handle_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    print!("{}", annotate_config(&toml_str));
    Ok(())
}

/// Print the path of the config file in use.
#[cfg(not(tarpaulin_include))]
pub fn handle_path(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };
    println!("{}", path.display());
    Ok(())
}
