//! Reparse engine behaviour over in-memory sources

use reparser::engine::{RecordOutcome, Reparser};
use reparser::error::ReparseError;
use reparser::record::{FeatureFlags, Record};
use reparser::source::{MemorySource, RecordSource, SourceError};

use crate::helpers::{
    colour_source, FailingSource, FlagReportingRenderer, IdentityRenderer, ReplaceRenderer,
    StraySource,
};

#[test]
fn identical_rerender_makes_no_persist_calls() {
    let source = MemorySource::with_records(
        "posts",
        [Record::new(1, "[b:abc]hi[/b:abc]", "abc").with_flags(FeatureFlags::all())],
    );
    let report = Reparser::new(IdentityRenderer)
        .reparse_range(&source, 0, 249)
        .unwrap();

    assert_eq!(report.fetched, 1);
    assert_eq!(report.unchanged, 1);
    assert_eq!(source.persist_count(), 0);
    assert_eq!(source.get(1).unwrap().text, "[b:abc]hi[/b:abc]");
}

#[test]
fn magic_url_record_without_flags_is_rewritten_once() {
    let source = MemorySource::with_records(
        "posts",
        [Record::new(2, "<!-- m --><URL>http://x</URL><!-- m -->", "")],
    );
    let renderer = ReplaceRenderer::new("<!-- m -->", "");
    let report = Reparser::new(&renderer)
        .reparse_range(&source, 0, 249)
        .unwrap();

    assert!(renderer.seen_flags.borrow()[0].magic_url);
    assert_eq!(report.rewritten, 1);
    assert_eq!(source.persist_count(), 1);
    assert_eq!(source.get(2).unwrap().text, "<URL>http://x</URL>");
}

#[test]
fn second_pass_is_idempotent() {
    let source = colour_source(1..=20);
    let reparser = Reparser::new(ReplaceRenderer::new("colour", "color"));

    let first = reparser.reparse_range(&source, 0, 100).unwrap();
    assert_eq!(first.rewritten, 20);
    let persisted = source.persist_count();

    let second = reparser.reparse_range(&source, 0, 100).unwrap();
    assert_eq!(second.rewritten, 0);
    assert_eq!(second.unchanged, 20);
    assert_eq!(source.persist_count(), persisted);
}

#[test]
fn persist_failure_keeps_earlier_writes_and_stops() {
    let source = FailingSource::new(colour_source(1..=10), 5);
    let err = Reparser::new(ReplaceRenderer::new("colour", "color"))
        .reparse_range(&source, 1, 10)
        .unwrap_err();

    match &err {
        ReparseError::Persist { id, cause, .. } => {
            assert_eq!(*id, 5);
            assert!(matches!(cause, SourceError::Unavailable { .. }));
        }
        other => panic!("expected persist error, got {other:?}"),
    }
    assert_eq!(source.attempts(), 5);
    assert_eq!(source.inner.persist_count(), 4);

    for id in 1..=4 {
        assert_eq!(source.inner.get(id).unwrap().text, format!("color #{}", id));
    }
    for id in 5..=10 {
        assert_eq!(source.inner.get(id).unwrap().text, format!("colour #{}", id));
    }
}

#[test]
fn range_is_bounded_by_min_and_max() {
    let source = colour_source(1..=30);
    let report = Reparser::new(ReplaceRenderer::new("colour", "color"))
        .reparse_range(&source, 10, 19)
        .unwrap();

    assert_eq!(report.fetched, 10);
    assert_eq!(report.last_id, Some(19));
    for record in source.records() {
        let touched = (10..=19).contains(&record.id);
        assert_eq!(record.text.starts_with("color"), touched, "id {}", record.id);
    }
}

#[test]
fn inverted_range_does_nothing() {
    let source = colour_source(1..=5);
    let report = Reparser::new(ReplaceRenderer::new("colour", "color"))
        .reparse_range(&source, 5, 1)
        .unwrap();
    assert_eq!(report.fetched, 0);
    assert_eq!(source.persist_count(), 0);
}

#[test]
fn single_record_outcome_reports_rewrite() {
    let source = colour_source([7]);
    let record = source.fetch_range(7, 7).unwrap().remove(0);
    let outcome = Reparser::new(ReplaceRenderer::new("colour", "color"))
        .reparse_record(&source, record)
        .unwrap();
    assert_eq!(outcome, RecordOutcome::Rewritten);
    let stored = source.get(7).unwrap();
    assert_eq!(stored.bitfield.as_deref(), Some("gA=="));
    assert_eq!(stored.options, Some(7));
}

#[test]
fn record_outside_range_is_skipped_and_not_persisted() {
    let stray = Record::new(900, "colour #900", "").with_flags(FeatureFlags::all());
    let source = StraySource::new(colour_source(1..=3), stray);
    let renderer = ReplaceRenderer::new("colour", "color");
    let report = Reparser::new(&renderer)
        .reparse_range(&source, 1, 3)
        .unwrap();

    assert_eq!(report.fetched, 4);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.rewritten, 3);
    assert_eq!(report.last_id, Some(3));
    // The renderer never saw the stray record
    assert_eq!(renderer.seen_flags.borrow().len(), 3);
    assert_eq!(source.inner.persist_count(), 3);
    assert!(source.inner.get(900).is_none());
    assert_eq!(source.stray.text, "colour #900");
}

#[test]
fn renderer_reported_flags_beat_detection() {
    let reported = FeatureFlags {
        bbcode: false,
        magic_url: false,
        smilies: true,
    };
    // Detection alone would report bbcode and magic_url for this text
    let source = MemorySource::with_records(
        "posts",
        [Record::new(4, "[b:abc]x[/b:abc] <!-- m --><a href=\"x\">x</a><!-- m -->", "abc")],
    );
    let renderer = FlagReportingRenderer::new(reported);
    let report = Reparser::new(&renderer)
        .reparse_range(&source, 0, 10)
        .unwrap();

    assert_eq!(report.unchanged, 1);
    assert_eq!(renderer.seen_flags.borrow().as_slice(), &[reported]);
}

#[test]
fn stored_flags_beat_renderer_reported_flags() {
    let stored = FeatureFlags {
        bbcode: true,
        magic_url: false,
        smilies: false,
    };
    let source = MemorySource::with_records(
        "posts",
        [Record::new(5, "plain", "").with_flags(stored)],
    );
    let renderer = FlagReportingRenderer::new(FeatureFlags::all());
    Reparser::new(&renderer)
        .reparse_range(&source, 0, 10)
        .unwrap();

    assert_eq!(renderer.seen_flags.borrow().as_slice(), &[stored]);
}
