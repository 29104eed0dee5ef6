use caret_core::{
    Command, CommandResult, CursorCommand, Document, EditCommand, HookError, HookOutcome,
    HookScope, Motion, Overrides, Plugin, PluginError, PluginStatus, Position, Preferences,
    ViewCommand, Verb, Workspace,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn insert(text: &str) -> Command {
    Command::Edit(EditCommand::Insert {
        text: text.to_string(),
    })
}

fn numbered(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_spaces_share_documents_but_not_retained_columns() {
    let mut ws = Workspace::new();
    let left = ws.add_space();
    let right = ws.add_space();
    let id = ws.add_document(Document::from_text("t", "abcdef\nab\nabcdef")).unwrap();
    ws.attach(left, id).unwrap();
    ws.attach(right, id).unwrap();

    ws.document_mut(id).unwrap().select_caret(0, 5);
    ws.execute(
        left,
        Command::Cursor(CursorCommand::Move {
            motion: Motion::Down,
            select: false,
        }),
    )
    .unwrap();
    assert!(ws.space(left).unwrap().retained.is_some());
    assert!(ws.space(right).unwrap().retained.is_none());

    ws.execute(right, insert("x")).unwrap();
    assert_eq!(ws.document(id).unwrap().lines(), vec!["abcdef", "abx", "abcdef"]);
}

#[test]
fn test_host_step_never_creates_or_destroys_documents() {
    let mut ws = Workspace::new();
    let space = ws.add_space();
    let id = ws.add_document(Document::new("main")).unwrap();
    ws.attach(space, id).unwrap();
    ws.execute(space, insert("(")).unwrap();

    let report = ws
        .host_step(|documents, spaces| {
            documents.remove(id);
            let created = documents.insert(Document::from_text("ghost", "boo")).unwrap();
            if let Some(state) = spaces.values_mut().next() {
                state.document = Some(created);
            }
        })
        .unwrap();

    assert_eq!(report.restored, vec![id]);
    assert_eq!(report.removed.len(), 1);
    assert_eq!(ws.documents().len(), 1);
    assert_eq!(ws.document(id).unwrap().text(), "()");
    assert_eq!(ws.active_document(space), Some(id));

    // History survives the round trip.
    ws.execute(space, Command::Edit(EditCommand::Undo)).unwrap();
    assert_eq!(ws.document(id).unwrap().text(), "");
}

#[test]
fn test_post_hooks_see_results_and_failing_pre_hooks_are_ignored() {
    let mut ws = Workspace::new();
    let space = ws.add_space();
    let id = ws.add_document(Document::new("t")).unwrap();
    ws.attach(space, id).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    ws.overrides_mut()
        .add_post(Verb::Delete, HookScope::Global, move |ctx| {
            log.borrow_mut().push(ctx.result.cloned());
            Ok(HookOutcome::Continue)
        });
    ws.overrides_mut()
        .add_pre_any(HookScope::Global, |_| Err(HookError::Failed("broken".into())));

    let delete = Command::Edit(EditCommand::Delete {
        mode: caret_core::DeleteMode::PreviousChar,
    });
    assert_eq!(ws.execute(space, delete).unwrap(), CommandResult::Cancelled);
    ws.execute(space, insert("a")).unwrap();
    assert_eq!(ws.document(id).unwrap().text(), "a");
    assert_eq!(*seen.borrow(), vec![Some(CommandResult::Cancelled)]);
}

#[test]
fn test_wheel_scroll_animates_and_snaps() {
    let mut ws = Workspace::new();
    let space = ws.add_space();
    let id = ws.add_document(Document::from_text("t", &numbered(100))).unwrap();
    ws.attach(space, id).unwrap();
    let viewport = ws.space(space).unwrap().viewport.unwrap();

    let t0 = Instant::now();
    ws.execute_at(space, Command::View(ViewCommand::Wheel { ticks: 1, alt: false }), t0)
        .unwrap();
    assert!(ws.tick(t0 + Duration::from_millis(50)));
    let midway = ws.scroll().position(viewport);
    assert!(midway > 0.0 && midway < 3.0, "{midway}");

    assert!(!ws.tick(t0 + Duration::from_millis(200)));
    assert_eq!(ws.scroll().top(viewport), 3);
    assert_eq!(ws.scroll().offset_px(viewport), 0);

    ws.execute_at(space, Command::View(ViewCommand::Wheel { ticks: 2, alt: true }), t0)
        .unwrap();
    ws.execute(space, Command::View(ViewCommand::Jump { top: 10 })).unwrap();
    assert_eq!(ws.scroll().job_count(viewport), 0);
    assert_eq!(ws.scroll().top(viewport), 10);
}

#[test]
fn test_caret_moves_drag_the_view_along() {
    let mut ws = Workspace::new();
    let space = ws.add_space();
    let id = ws.add_document(Document::from_text("t", &numbered(100))).unwrap();
    ws.attach(space, id).unwrap();
    let viewport = ws.space(space).unwrap().viewport.unwrap();

    let t0 = Instant::now();
    ws.execute_at(
        space,
        Command::Cursor(CursorCommand::Move {
            motion: Motion::DocumentEnd,
            select: false,
        }),
        t0,
    )
    .unwrap();
    ws.tick(t0 + Duration::from_secs(1));
    let top = ws.scroll().top(viewport);
    assert!(top > 60, "{top}");
    assert_eq!(ws.document(id).unwrap().cursor().focus, Position::new(99, 7));
}

#[derive(Default)]
struct Shout {
    hook: Option<caret_core::HookId>,
}

impl Plugin for Shout {
    fn name(&self) -> &str {
        "shout"
    }

    fn enable(&mut self, overrides: &mut Overrides) -> Result<(), PluginError> {
        self.hook = Some(overrides.add_pre(Verb::Insert, HookScope::Global, |_| {
            Ok(HookOutcome::Handled)
        }));
        Ok(())
    }

    fn disable(&mut self, overrides: &mut Overrides) -> Result<(), PluginError> {
        if let Some(id) = self.hook.take() {
            overrides.remove(id);
        }
        Ok(())
    }
}

#[test]
fn test_plugins_follow_preferences() {
    let mut prefs = Preferences::default();
    prefs.set_plugin_enabled("shout", false);
    let mut ws = Workspace::with_preferences(prefs).unwrap();
    ws.register_plugin(Box::new(Shout::default())).unwrap();
    assert_eq!(ws.plugins().status("shout"), Some(&PluginStatus::Disabled));

    let space = ws.add_space();
    let id = ws.add_document(Document::new("t")).unwrap();
    ws.attach(space, id).unwrap();

    ws.set_plugin_enabled("shout", true).unwrap();
    ws.execute(space, insert("a")).unwrap();
    assert_eq!(ws.document(id).unwrap().text(), "");
    assert!(ws.preferences().plugin_enabled("shout"));

    ws.shutdown();
    assert!(ws.documents().is_empty());
    assert_eq!(ws.plugins().status("shout"), Some(&PluginStatus::Disabled));
}

#[test]
fn test_invalid_preferences_are_rejected() {
    let prefs = Preferences {
        num_scroll_lines: 0,
        ..Preferences::default()
    };
    assert!(Workspace::with_preferences(prefs).is_err());
}
