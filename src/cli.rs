//! CLI definitions for the reparser
//!
//! This module contains the clap CLI structure definitions, separated from main.rs
//! so they can be accessed by xtask for documentation generation (man pages, markdown).

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Build clap styles for help output.
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "reparser")]
#[command(about = "Rewrite stored forum text into the current markup encoding")]
#[command(
    long_about = "reparser - Batched rewrite of stored forum text.

Walks a forum database in id-range batches, expands every stored text back
to its editable source with an external renderer, encodes it again and writes
it back only when the canonical form changed. Runs are resumable and safe to
repeat: records already in canonical form are never written.

QUICK START:
    reparser list                       Show reparsers and their highest id
    reparser run                        Reparse every content type
    reparser run post_text              Reparse post bodies only
    reparser detect post_text 42        Inspect how a record is encoded

Configuration lives in ~/.config/reparser/config.toml (see 'reparser config show')."
)]
#[command(version)]
pub struct Cli {
    /// Path to an alternative config file
    #[arg(long, global = true, help = "Config file (default: ~/.config/reparser/config.toml)")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reparse one content type, or all of them
    #[command(long_about = "Reparse stored text in batches.

Takes the job lock next to the database first; a second concurrent run exits
with status 1. An unknown reparser name exits with status 2.

Without NAME every registered reparser runs in order. With --range-min and
--range-max exactly that id range is reparsed once; otherwise the whole id
space is walked in batches of --batch-size records.

EXAMPLES:
    reparser run                               Reparse everything
    reparser run post_text --batch-size 500    Bigger batches
    reparser run pm_text --max-batches 10      Stop after 10 batches
    reparser run post_text --resume-from 75000 Continue an earlier walk
    reparser run forum_rules --range-min 1 --range-max 20")]
    Run(RunArgs),

    /// List reparsers with their highest record id
    #[command(
        visible_alias = "ls",
        long_about = "List every registered reparser with its table and highest record id.

EXAMPLE:
    reparser list"
    )]
    List,

    /// Show how one record is encoded and which features it uses
    #[command(long_about = "Inspect a single record without modifying it.

Prints the record's encoding (legacy or structured) and the features the
detectors find in its text.

EXAMPLE:
    reparser detect post_text 42")]
    Detect {
        /// Reparser name (see 'reparser list')
        #[arg(help = "Reparser name (see 'reparser list')")]
        name: String,
        /// Record id
        #[arg(help = "Record id")]
        id: u64,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Options for `reparser run`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Reparser to run; all when omitted
    #[arg(help = "Reparser to run (default: all)")]
    pub name: Option<String>,

    /// Lowest id of an explicit range
    #[arg(long, requires = "range_max", help = "Lowest id of an explicit range")]
    pub range_min: Option<u64>,

    /// Highest id of an explicit range
    #[arg(long, requires = "range_min", help = "Highest id of an explicit range")]
    pub range_max: Option<u64>,

    /// Records per batch (overrides config)
    #[arg(long, help = "Records per batch (overrides config)")]
    pub batch_size: Option<usize>,

    /// Stop after this many batches per reparser (0 = no limit)
    #[arg(long, default_value_t = 0, help = "Stop after N batches per reparser (0 = no limit)")]
    pub max_batches: usize,

    /// First id of the walk; ids are per reparser, so NAME is required
    #[arg(
        long,
        requires = "name",
        conflicts_with = "range_min",
        help = "First id of the walk (continue an earlier run of NAME)"
    )]
    pub resume_from: Option<u64>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    #[command(long_about = "Display the effective configuration as TOML.

Each field is preceded by a comment describing it. Values not set in the
config file show their defaults.

EXAMPLE:
    reparser config show")]
    Show,
    /// Print the config file path
    Path,
}
