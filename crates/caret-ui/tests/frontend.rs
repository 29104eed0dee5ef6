use caret_core::{Document, DocumentId, Position, SpaceId, ViewportId, Workspace};
use caret_ui::resize::handle_rect;
use caret_ui::{
    Action, Edge, Event, EventOutcome, Frontend, Input, Key, ListView, Modifiers, MouseButton,
    Point, Rect, RegionStyle, ResizeMode, SurfaceId, Widget, WidgetId, WidgetKind,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

fn frontend(text: &str) -> (Frontend, SpaceId, DocumentId) {
    let mut ws = Workspace::new();
    let space = ws.add_space();
    let doc = ws.add_document(Document::from_text("test", text)).unwrap();
    ws.attach(space, doc).unwrap();
    let mut ui = Frontend::new(ws);
    ui.add_region(space, Rect::new(0.0, 0.0, 400.0, 200.0), RegionStyle::default())
        .unwrap();
    (ui, space, doc)
}

fn numbered_lines(n: usize) -> String {
    (0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
}

fn viewport(ui: &Frontend, space: SpaceId) -> ViewportId {
    ui.workspace().space(space).unwrap().viewport.unwrap()
}

fn press(at: Point) -> Event {
    Event::MousePress {
        button: MouseButton::Left,
        at,
        modifiers: Modifiers::NONE,
    }
}

fn release(at: Point) -> Event {
    Event::MouseRelease {
        button: MouseButton::Left,
        at,
    }
}

fn add_input(ui: &mut Frontend, space: SpaceId) -> WidgetId {
    let input = Widget::new(
        WidgetKind::Input(Box::new(Input::new("search"))),
        Rect::new(0.0, 170.0, 388.0, 30.0),
    );
    ui.add_widget(space, None, input).unwrap()
}

fn input_text(ui: &Frontend, space: SpaceId, id: WidgetId) -> String {
    let widget = ui.tree(space).unwrap().widget(id).unwrap();
    widget.as_input().unwrap().text().to_string()
}

// Input focus

#[test]
fn test_focused_input_takes_editing_keys() {
    let (mut ui, space, doc) = frontend("hello");
    let input = add_input(&mut ui, space);
    let now = Instant::now();

    let outcome = ui.handle_event(space, press(Point::new(50.0, 180.0)), now).unwrap();
    assert_eq!(outcome, EventOutcome::Handled);
    assert_eq!(ui.focused_input(space), Some(input));

    for ch in ['a', 'b', 'c'] {
        ui.handle_event(space, Event::typed(ch), now).unwrap();
    }
    ui.handle_event(space, Event::key(Key::Backspace, Modifiers::NONE), now)
        .unwrap();
    assert_eq!(input_text(&ui, space, input), "ab");
    assert_eq!(ui.workspace().document(doc).unwrap().text(), "hello");

    let outcome = ui
        .handle_event(space, Event::key(Key::Escape, Modifiers::NONE), now)
        .unwrap();
    assert_eq!(outcome, EventOutcome::Handled);
    assert_eq!(ui.focused_input(space), None);

    ui.handle_event(space, Event::typed('y'), now).unwrap();
    assert_eq!(ui.workspace().document(doc).unwrap().text(), "yhello");
    assert_eq!(input_text(&ui, space, input), "ab");
}

#[test]
fn test_clicking_text_defocuses_input() {
    let (mut ui, space, doc) = frontend("hello");
    let input = add_input(&mut ui, space);
    let now = Instant::now();

    ui.handle_event(space, press(Point::new(50.0, 180.0)), now).unwrap();
    ui.handle_event(space, release(Point::new(50.0, 180.0)), now).unwrap();
    ui.handle_event(space, press(Point::new(16.0, 5.0)), now).unwrap();
    ui.handle_event(space, release(Point::new(16.0, 5.0)), now).unwrap();
    assert_eq!(ui.focused_input(space), None);

    ui.handle_event(space, Event::typed('!'), now).unwrap();
    assert_eq!(ui.workspace().document(doc).unwrap().text(), "he!llo");
    assert_eq!(input_text(&ui, space, input), "");
}

#[test]
fn test_input_works_without_a_document() {
    let mut ws = Workspace::new();
    let space = ws.add_space();
    let mut ui = Frontend::new(ws);
    ui.add_region(space, Rect::new(0.0, 0.0, 400.0, 200.0), RegionStyle::default())
        .unwrap();
    let input = add_input(&mut ui, space);
    let now = Instant::now();

    ui.handle_event(space, press(Point::new(50.0, 180.0)), now).unwrap();
    ui.handle_event(space, Event::typed('q'), now).unwrap();
    assert_eq!(input_text(&ui, space, input), "q");

    ui.handle_event(space, Event::key(Key::Escape, Modifiers::NONE), now)
        .unwrap();
    let outcome = ui.handle_event(space, Event::typed('r'), now).unwrap();
    assert_eq!(outcome, EventOutcome::PassThrough);
}

// Scrollbar

#[test]
fn test_thumb_drag_maps_pointer_to_view_ratio() {
    let (mut ui, space, _) = frontend(&numbered_lines(100));
    let vp = viewport(&ui, space);
    let now = Instant::now();

    ui.handle_event(space, press(Point::new(394.0, 5.0)), now).unwrap();
    assert!(ui.modal().is_some());
    ui.handle_event(space, Event::MouseMove { at: Point::new(394.0, 95.0) }, now)
        .unwrap();
    assert_eq!(ui.workspace().scroll().top(vp), 45);

    let outcome = ui.handle_event(space, release(Point::new(394.0, 95.0)), now).unwrap();
    assert_eq!(outcome, EventOutcome::Handled);
    assert!(ui.modal().is_none());
}

#[test]
fn test_gutter_press_pages_down() {
    let (mut ui, space, _) = frontend(&numbered_lines(100));
    let vp = viewport(&ui, space);
    let now = Instant::now();

    ui.handle_event(space, press(Point::new(394.0, 150.0)), now).unwrap();
    assert!(ui.needs_timer());
    ui.handle_event(space, Event::Timer, now + Duration::from_secs(1))
        .unwrap();
    assert_eq!(ui.workspace().scroll().top(vp), 9);
    assert!(!ui.needs_timer());
}

#[test]
fn test_window_deactivate_ends_drag() {
    let (mut ui, space, _) = frontend(&numbered_lines(100));
    let now = Instant::now();
    ui.handle_event(space, press(Point::new(394.0, 5.0)), now).unwrap();
    assert!(ui.modal().is_some());
    ui.handle_event(space, Event::WindowDeactivate, now).unwrap();
    assert!(ui.modal().is_none());
}

// Wheel

#[test]
fn test_wheel_scrolls_document_and_alt_multiplies() {
    let (mut ui, space, _) = frontend(&numbered_lines(100));
    let vp = viewport(&ui, space);
    let now = Instant::now();
    let at = Point::new(50.0, 50.0);

    ui.handle_event(space, Event::Wheel { ticks: 1, at, modifiers: Modifiers::NONE }, now)
        .unwrap();
    let later = now + Duration::from_secs(1);
    ui.handle_event(space, Event::Timer, later).unwrap();
    assert_eq!(ui.workspace().scroll().top(vp), 3);

    ui.handle_event(space, Event::Wheel { ticks: 1, at, modifiers: Modifiers::ALT }, later)
        .unwrap();
    ui.handle_event(space, Event::Timer, later + Duration::from_secs(1))
        .unwrap();
    assert_eq!(ui.workspace().scroll().top(vp), 12);
}

#[test]
fn test_list_takes_wheel_and_clicks() {
    let (mut ui, space, _) = frontend(&numbered_lines(100));
    let mut list = ListView::new(SurfaceId(1), 20.0);
    list.set_items((0..20).map(|i| format!("item {i}")).collect());
    let id = ui
        .add_widget(space, None, Widget::new(WidgetKind::ListView(list), Rect::new(0.0, 0.0, 200.0, 100.0)))
        .unwrap();
    let now = Instant::now();

    ui.handle_event(space, press(Point::new(10.0, 45.0)), now).unwrap();
    ui.handle_event(
        space,
        Event::Wheel { ticks: 1, at: Point::new(10.0, 45.0), modifiers: Modifiers::NONE },
        now,
    )
    .unwrap();

    let WidgetKind::ListView(list) = &ui.tree(space).unwrap().widget(id).unwrap().kind else {
        panic!("not a list");
    };
    assert_eq!(list.selected(), Some(2));
    assert_eq!(list.text().top(), 3.0);
    assert_eq!(ui.workspace().scroll().top(viewport(&ui, space)), 0);
}

// Text selection

#[test]
fn test_drag_select_follows_pointer() {
    let (mut ui, space, doc) = frontend("alpha beta gamma\nsecond line");
    let now = Instant::now();

    ui.handle_event(space, press(Point::new(16.0, 5.0)), now).unwrap();
    ui.handle_event(space, Event::MouseMove { at: Point::new(64.0, 5.0) }, now)
        .unwrap();
    ui.handle_event(space, release(Point::new(64.0, 5.0)), now).unwrap();

    let cursor = ui.workspace().document(doc).unwrap().cursor();
    assert_eq!(cursor.anchor, Position::new(0, 2));
    assert_eq!(cursor.focus, Position::new(0, 8));
}

#[test]
fn test_double_click_drag_extends_by_words() {
    let (mut ui, space, doc) = frontend("alpha beta gamma");
    let now = Instant::now();

    ui.handle_event(space, Event::DoubleClick { at: Point::new(56.0, 5.0) }, now)
        .unwrap();
    let cursor = ui.workspace().document(doc).unwrap().cursor();
    assert_eq!(cursor.sorted(), (Position::new(0, 6), Position::new(0, 10)));

    ui.handle_event(space, Event::MouseMove { at: Point::new(104.0, 5.0) }, now)
        .unwrap();
    let cursor = ui.workspace().document(doc).unwrap().cursor();
    assert_eq!(cursor.sorted(), (Position::new(0, 6), Position::new(0, 16)));
}

#[test]
fn test_position_at_clamps_to_document() {
    let (ui, space, _) = frontend("ab\ncd");
    assert_eq!(ui.position_at(space, Point::new(8.0, 25.0)), Some(Position::new(1, 1)));
    assert_eq!(ui.position_at(space, Point::new(300.0, 190.0)), Some(Position::new(1, 2)));
}

// Overlays, resizing, host actions

#[test]
fn test_escape_dismisses_overlays_then_passes_through() {
    let (mut ui, space, _) = frontend("x");
    let now = Instant::now();
    ui.show_overlay(space, Widget::new(WidgetKind::Panel, Rect::new(10.0, 10.0, 50.0, 50.0)))
        .unwrap();

    let esc = Event::key(Key::Escape, Modifiers::NONE);
    assert_eq!(ui.handle_event(space, esc.clone(), now).unwrap(), EventOutcome::Handled);
    assert!(ui.overlays(space).unwrap().is_empty());
    assert_eq!(ui.handle_event(space, esc, now).unwrap(), EventOutcome::PassThrough);
}

#[test]
fn test_resize_drag_and_cancel() {
    let (mut ui, space, _) = frontend("x");
    let now = Instant::now();
    let panel_rect = Rect::new(100.0, 50.0, 100.0, 60.0);
    let panel = ui
        .add_widget(space, None, Widget::new(WidgetKind::Panel, panel_rect))
        .unwrap();
    let edge = Edge::Right;
    let handle = Widget::new(
        WidgetKind::EdgeResizer { edge, target: panel },
        handle_rect(panel_rect, ResizeMode::Edge(edge)),
    );
    ui.add_widget(space, None, handle).unwrap();

    ui.handle_event(space, press(Point::new(199.0, 70.0)), now).unwrap();
    ui.handle_event(space, Event::MouseMove { at: Point::new(259.0, 70.0) }, now)
        .unwrap();
    assert_eq!(ui.tree(space).unwrap().widget(panel).unwrap().rect.w, 160.0);

    ui.handle_event(space, Event::key(Key::Escape, Modifiers::NONE), now)
        .unwrap();
    assert_eq!(ui.tree(space).unwrap().widget(panel).unwrap().rect, panel_rect);
    assert!(ui.modal().is_none());
}

#[test]
fn test_search_goes_to_host() {
    let (mut ui, space, _) = frontend("x");
    let outcome = ui
        .handle_event(
            space,
            Event::key(Key::Char('f'), Modifiers::CTRL),
            Instant::now(),
        )
        .unwrap();
    assert_eq!(outcome, EventOutcome::Host(Action::Search));
}

#[test]
fn test_unknown_space_is_an_error() {
    let (mut ui, _, _) = frontend("x");
    let ghost = SpaceId::from_raw(99);
    assert!(ui.handle_event(ghost, Event::typed('a'), Instant::now()).is_err());
}
