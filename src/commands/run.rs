//! Run command handler

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use reparser::cli::RunArgs;
use reparser::registry::{ReparserDef, REPARSERS};
use reparser::renderer::CommandRenderer;
use reparser::walker::{Cursor, RangeWalker};
use reparser::{Config, JobLock, Reparser};

use super::{find_reparser, load_config, open_database};

/// Reparse the named content type, or every registered one.
///
/// Holds the job lock for the whole run; it is released on return,
/// including when a reparser fails part way.
#[cfg(not(tarpaulin_include))]
pub fn handle(config_path: Option<&Path>, args: &RunArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let conn = open_database(&config)?;

    let task = args.name.as_deref().unwrap_or("all");
    let _lock = JobLock::acquire(&config.database_path(), task)?;

    let defs: Vec<&ReparserDef> = match &args.name {
        Some(name) => vec![find_reparser(name)?],
        None => REPARSERS.iter().collect(),
    };

    let batch_size = args.batch_size.unwrap_or(config.reparse.batch_size);
    let walker = RangeWalker::new(Reparser::new(CommandRenderer::new(
        config.renderer_command(),
    )));

    for def in defs {
        run_one(&conn, &config, &walker, def, args, batch_size)?;
    }
    Ok(())
}

fn run_one(
    conn: &rusqlite::Connection,
    config: &Config,
    walker: &RangeWalker<CommandRenderer>,
    def: &ReparserDef,
    args: &RunArgs,
    batch_size: usize,
) -> Result<()> {
    let source = def
        .open(conn, &config.database.table_prefix)
        .with_context(|| format!("Failed to open reparser {}", def.name))?;

    if let (Some(min), Some(max)) = (args.range_min, args.range_max) {
        info!(reparser = def.name, min, max, "Reparsing explicit range");
        let report = walker
            .reparser()
            .reparse_range(&source, min, max)
            .with_context(|| format!("Reparser {} failed", def.name))?;
        println!(
            "{}: ids {}-{}, {} records, {} rewritten",
            def.name, min, max, report.fetched, report.rewritten
        );
        return Ok(());
    }

    let mut cursor = Cursor::resume_from(args.resume_from.unwrap_or(0), batch_size)?;
    let result = walker.run(&source, &mut cursor, args.max_batches);
    let walk = match result {
        Ok(walk) => walk,
        Err(e) => {
            eprintln!(
                "{}: stopped at batch starting at id {}; resume with `reparser run {} --resume-from {}`",
                def.name, cursor.start, def.name, cursor.start
            );
            return Err(e).with_context(|| format!("Reparser {} failed", def.name));
        }
    };

    if walk.finished {
        println!(
            "{}: {} batches, {} records, {} rewritten",
            def.name, walk.batches, walk.totals.fetched, walk.totals.rewritten
        );
    } else {
        println!(
            "{}: {} batches, {} records, {} rewritten (resume with `reparser run {} --resume-from {}`)",
            def.name,
            walk.batches,
            walk.totals.fetched,
            walk.totals.rewritten,
            def.name,
            walk.next_start
        );
    }
    Ok(())
}
