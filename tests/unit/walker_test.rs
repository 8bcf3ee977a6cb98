//! Batch walking: boundedness, resumability and completion signalling

use reparser::engine::Reparser;
use reparser::record::{FeatureFlags, Record};
use reparser::walker::{Cursor, RangeWalker};

use crate::helpers::{
    colour_source, numbered_source, FailingSource, ReplaceRenderer, StraySource,
};

fn walker() -> RangeWalker<ReplaceRenderer> {
    RangeWalker::new(Reparser::new(ReplaceRenderer::new("colour", "color")))
}

#[test]
fn full_batch_continues() {
    let source = colour_source(0..250);
    let mut cursor = Cursor::new(250).unwrap();
    let batch = walker().step(&source, &mut cursor).unwrap();

    assert_eq!((batch.min_id, batch.max_id), (0, 249));
    assert_eq!(batch.report.fetched, 250);
    assert!(!batch.done);
    assert_eq!(cursor.start, 250);
}

#[test]
fn short_batch_is_done() {
    let source = colour_source(0..249);
    let mut cursor = Cursor::new(250).unwrap();
    let batch = walker().step(&source, &mut cursor).unwrap();

    assert_eq!(batch.report.fetched, 249);
    assert!(batch.done);
    assert!(cursor.done);
}

#[test]
fn batch_padded_by_out_of_range_record_is_not_full() {
    // 249 records in range plus one stray make 250 fetched
    let stray = Record::new(10_000, "colour #10000", "").with_flags(FeatureFlags::all());
    let source = StraySource::new(colour_source(0..249), stray);
    let mut cursor = Cursor::new(250).unwrap();
    let batch = walker().step(&source, &mut cursor).unwrap();

    assert_eq!(batch.report.fetched, 250);
    assert_eq!(batch.report.skipped, 1);
    assert!(batch.done);
    assert!(cursor.done);
    assert_eq!(cursor.start, 0);
}

#[test]
fn done_cursor_does_no_work() {
    let source = FailingSource::new(colour_source(0..10), 0);
    let mut cursor = Cursor::new(250).unwrap();
    let w = walker();
    w.step(&source, &mut cursor).unwrap();
    let again = w.step(&source, &mut cursor).unwrap();

    assert!(again.done);
    assert_eq!(again.report.fetched, 0);
    assert_eq!(source.fetch_calls(), 1);
}

#[test]
fn one_step_touches_at_most_one_batch() {
    let source = numbered_source(1000);
    let mut cursor = Cursor::new(100).unwrap();
    walker().step(&source, &mut cursor).unwrap();

    let rewritten = source
        .records()
        .iter()
        .filter(|r| r.text.starts_with("color"))
        .count();
    assert!(rewritten <= 100);
    assert_eq!(source.persist_count(), rewritten);
}

#[test]
fn split_ranges_match_single_range() {
    let split = colour_source(0..600);
    let whole = colour_source(0..600);
    let reparser = Reparser::new(ReplaceRenderer::new("colour", "color"));

    reparser.reparse_range(&split, 0, 249).unwrap();
    reparser.reparse_range(&split, 250, 499).unwrap();
    reparser.reparse_range(&whole, 0, 499).unwrap();

    assert_eq!(split.records(), whole.records());
}

#[test]
fn resumed_walk_matches_uninterrupted_walk() {
    let interrupted = colour_source(0..1000);
    let uninterrupted = colour_source(0..1000);
    let w = walker();

    let mut cursor = Cursor::new(250).unwrap();
    let first = w.run(&interrupted, &mut cursor, 2).unwrap();
    assert!(!first.finished);
    assert_eq!(first.next_start, 500);

    let mut resumed = Cursor::resume_from(first.next_start, 250).unwrap();
    let rest = w.run(&interrupted, &mut resumed, 0).unwrap();
    assert!(rest.finished);

    let mut fresh = Cursor::new(250).unwrap();
    w.run(&uninterrupted, &mut fresh, 0).unwrap();

    assert_eq!(interrupted.records(), uninterrupted.records());
    assert_eq!(first.totals.rewritten + rest.totals.rewritten, 1000);
}

#[test]
fn run_walks_past_id_gaps() {
    // ids 1..=10 and 600..=610; batch [250, 499] is empty
    let source = colour_source((1..=10).chain(600..=610));
    let mut cursor = Cursor::new(250).unwrap();
    let walk = walker().run(&source, &mut cursor, 0).unwrap();

    assert!(walk.finished);
    assert_eq!(walk.totals.rewritten, 21);
    assert_eq!(walk.batches, 3);
}

#[test]
fn run_on_empty_source_finishes_after_one_batch() {
    let source = colour_source(std::iter::empty());
    let mut cursor = Cursor::new(250).unwrap();
    let walk = walker().run(&source, &mut cursor, 0).unwrap();

    assert!(walk.finished);
    assert_eq!(walk.batches, 1);
    assert_eq!(walk.totals.fetched, 0);
}

#[test]
fn failed_batch_leaves_cursor_in_place() {
    let source = FailingSource::new(colour_source(0..500), 300);
    let mut cursor = Cursor::new(250).unwrap();
    let w = walker();

    w.step(&source, &mut cursor).unwrap();
    assert_eq!(cursor.start, 250);
    assert!(w.step(&source, &mut cursor).is_err());
    assert_eq!(cursor.start, 250);
    assert!(!cursor.done);

    // Rerunning the failed batch completes it
    w.step(&source, &mut cursor).unwrap();
    assert_eq!(source.inner.persist_count(), 500);
    assert_eq!(cursor.start, 500);
}
