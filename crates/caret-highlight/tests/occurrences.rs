use caret_core::{Command, CursorCommand, Document, Motion, Position, Preferences, Workspace};
use caret_highlight::{
    HighlightOptions, HighlightRect, Matcher, Occurrence, OccurrencePlugin, ScrollbarMark,
    ViewGeometry, compute, selection_needle,
};
use pretty_assertions::assert_eq;

fn geometry(top: usize) -> ViewGeometry {
    ViewGeometry {
        top,
        offset_px: 0.0,
        line_height: 20.0,
        height_px: 40.0,
        char_width: 8.0,
        text_x: 50.0,
        track_height: 100.0,
    }
}

fn options(case_sensitive: bool, min_len: usize) -> HighlightOptions {
    HighlightOptions {
        case_sensitive,
        min_len,
        ..HighlightOptions::default()
    }
}

// Trigger

#[test]
fn test_whitespace_selection_never_triggers() {
    let mut doc = Document::from_text("t", "a    b");
    doc.select_set(0, 1, 0, 5);
    assert_eq!(selection_needle(&doc, &options(true, 1)), None);
}

#[test]
fn test_short_selections_respect_min_len() {
    let mut doc = Document::from_text("t", "x = x + 1");
    doc.select_set(0, 0, 0, 1);
    assert_eq!(selection_needle(&doc, &options(true, 2)), None);
    assert_eq!(selection_needle(&doc, &options(true, 1)).as_deref(), Some("x"));
}

#[test]
fn test_multi_line_selection_never_triggers() {
    let mut doc = Document::from_text("t", "foo\nfoo");
    doc.select_set(0, 0, 1, 3);
    assert_eq!(selection_needle(&doc, &HighlightOptions::default()), None);
}

#[test]
fn test_flipped_selection_triggers() {
    let mut doc = Document::from_text("t", "foo bar");
    doc.select_set(0, 7, 0, 4);
    assert_eq!(
        selection_needle(&doc, &HighlightOptions::default()).as_deref(),
        Some("bar")
    );
}

// Matching

#[test]
fn test_occurrences_across_lines() {
    let doc = Document::from_text("t", "foo bar foo\nfoo\nbar");
    let matcher = Matcher::new("foo", &HighlightOptions::default()).unwrap();
    assert_eq!(
        matcher.occurrences(&doc, 0..10),
        vec![
            Occurrence { line: 0, start: 0, end: 3 },
            Occurrence { line: 0, start: 8, end: 11 },
            Occurrence { line: 1, start: 0, end: 3 },
        ]
    );
}

#[test]
fn test_case_sensitivity() {
    let line = "Foo foo FOO";
    let sensitive = Matcher::new("foo", &options(true, 2)).unwrap();
    let insensitive = Matcher::new("foo", &options(false, 2)).unwrap();
    assert_eq!(sensitive.find_in_line(line), vec![4..7]);
    assert_eq!(insensitive.find_in_line(line), vec![0..3, 4..7, 8..11]);
}

#[test]
fn test_matches_are_capped_per_line() {
    let line = "ab".repeat(3000);
    let matcher = Matcher::new("ab", &HighlightOptions::default()).unwrap();
    assert_eq!(matcher.find_in_line(&line).len(), 1000);
}

// Geometry

#[test]
fn test_rects_cover_visible_lines_only() {
    let mut doc = Document::from_text("t", "foo\nfoo\nfoo\nfoo\nfoo");
    doc.select_set(0, 0, 0, 3);
    let highlights = compute(&doc, &HighlightOptions::default(), &geometry(1))
        .unwrap()
        .unwrap();

    assert_eq!(highlights.needle, "foo");
    assert_eq!(highlights.total, 5);
    // Two full rows plus the partially visible one below.
    assert_eq!(highlights.rects.len(), 3);
    assert_eq!(
        highlights.rects[0],
        HighlightRect {
            x: 50.0,
            y: 0.0,
            width: 24.0,
            height: 20.0,
        }
    );
    assert_eq!(highlights.rects[2].y, 40.0);
}

#[test]
fn test_scrollbar_marks_cover_the_whole_document() {
    let mut doc = Document::from_text("t", "foo\nbar\nfoo foo\nbar");
    doc.select_set(0, 0, 0, 3);
    let highlights = compute(&doc, &HighlightOptions::default(), &geometry(0))
        .unwrap()
        .unwrap();
    assert_eq!(highlights.total, 3);
    assert_eq!(
        highlights.marks,
        vec![
            ScrollbarMark { line: 0, y: 0.0, height: 25.0 },
            ScrollbarMark { line: 2, y: 50.0, height: 25.0 },
        ]
    );
}

#[test]
fn test_tabs_expand_before_the_match() {
    let mut doc = Document::from_text("t", "\tfoo\nfoo");
    doc.select_set(1, 0, 1, 3);
    let highlights = compute(&doc, &HighlightOptions::default(), &geometry(0))
        .unwrap()
        .unwrap();
    assert_eq!(highlights.rects[0].x, 50.0 + 4.0 * 8.0);
    assert_eq!(highlights.rects[1].x, 50.0);
}

#[test]
fn test_no_selection_means_no_highlights() {
    let doc = Document::from_text("t", "foo foo");
    assert_eq!(compute(&doc, &HighlightOptions::default(), &geometry(0)).unwrap(), None);
}

// Plugin

#[test]
fn test_plugin_tracks_selection_per_space() {
    let mut ws = Workspace::new();
    let plugin = OccurrencePlugin::new(HighlightOptions::from(ws.preferences()));
    let highlighter = plugin.highlighter();
    ws.register_plugin(Box::new(plugin)).unwrap();

    let left = ws.add_space();
    let right = ws.add_space();
    let id = ws.add_document(Document::from_text("t", "foo bar foo")).unwrap();
    ws.attach(left, id).unwrap();
    ws.attach(right, id).unwrap();

    ws.execute(
        left,
        Command::Cursor(CursorCommand::Select {
            anchor: Position::new(0, 0),
            focus: Position::new(0, 3),
        }),
    )
    .unwrap();
    assert_eq!(highlighter.borrow().needle(left), Some("foo"));
    assert_eq!(highlighter.borrow().needle(right), None);

    let doc = ws.document(id).unwrap();
    let highlights = highlighter
        .borrow()
        .highlights(left, doc, &geometry(0))
        .unwrap()
        .unwrap();
    assert_eq!(highlights.total, 2);

    ws.execute(
        left,
        Command::Cursor(CursorCommand::Move {
            motion: Motion::Right,
            select: false,
        }),
    )
    .unwrap();
    assert_eq!(highlighter.borrow().needle(left), None);
}

#[test]
fn test_plugin_switched_off_by_preferences() {
    let mut prefs = Preferences::default();
    prefs.set_plugin_enabled(caret_highlight::PLUGIN_NAME, false);
    let mut ws = Workspace::with_preferences(prefs).unwrap();
    let plugin = OccurrencePlugin::new(HighlightOptions::default());
    let highlighter = plugin.highlighter();
    ws.register_plugin(Box::new(plugin)).unwrap();

    let space = ws.add_space();
    let id = ws.add_document(Document::from_text("t", "foo foo")).unwrap();
    ws.attach(space, id).unwrap();
    ws.execute(space, Command::Cursor(CursorCommand::SelectAll)).unwrap();
    assert_eq!(highlighter.borrow().needle(space), None);
}
