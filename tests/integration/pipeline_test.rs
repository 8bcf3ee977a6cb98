//! Library pipeline over SQLite with an external renderer process

#![cfg(unix)]

use reparser::registry;
use reparser::renderer::{CommandRenderer, RendererCommand};
use reparser::source::RecordSource;
use reparser::walker::{Cursor, RangeWalker};
use reparser::Reparser;

use crate::helpers::Forum;

fn sed_walker() -> RangeWalker<CommandRenderer> {
    let command = RendererCommand::new("sed").args(["-e", "s/colour/color/g"]);
    RangeWalker::new(Reparser::new(CommandRenderer::new(command)))
}

#[test]
fn walk_over_sqlite_resumes_where_it_stopped() {
    let forum = Forum::rewriting();
    let posts: Vec<(i64, String)> = (1..=12).map(|id| (id, format!("colour {}", id))).collect();
    let refs: Vec<(i64, &str)> = posts.iter().map(|(id, t)| (*id, t.as_str())).collect();
    forum.insert_posts(&refs);

    let conn = forum.conn();
    let source = registry::find("post_text")
        .unwrap()
        .open(&conn, "phpbb_")
        .unwrap();
    let walker = sed_walker();

    let mut cursor = Cursor::new(5).unwrap();
    let first = walker.run(&source, &mut cursor, 1).unwrap();
    assert!(!first.finished);
    assert_eq!(first.totals.rewritten, 4);

    let mut resumed = Cursor::resume_from(first.next_start, 5).unwrap();
    let rest = walker.run(&source, &mut resumed, 0).unwrap();
    assert!(rest.finished);
    assert_eq!(rest.totals.rewritten, 8);

    let records = source.fetch_range(0, 100).unwrap();
    assert_eq!(records.len(), 12);
    assert!(records.iter().all(|r| r.text.starts_with("color ")));
}

#[test]
fn canonical_sqlite_rows_are_left_alone() {
    let forum = Forum::rewriting();
    forum.insert_posts(&[(1, "already color"), (2, "nothing to do")]);

    let conn = forum.conn();
    let source = registry::find("post_text")
        .unwrap()
        .open(&conn, "phpbb_")
        .unwrap();
    let report = sed_walker()
        .reparser()
        .reparse_range(&source, 0, 10)
        .unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.unchanged, 2);
    assert_eq!(report.rewritten, 0);
    assert_eq!(conn.changes(), 0);
}
