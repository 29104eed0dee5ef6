//! Per-space highlight state and the plugin that keeps it current.

use crate::{HighlightError, HighlightOptions, Highlights, ViewGeometry, highlights_for, selection_needle};
use caret_core::{
    Document, HookError, HookId, HookOutcome, HookScope, Overrides, Plugin, PluginError, SpaceId,
    Verb,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Preferences key of the plugin (`[plugin.highlight_occurrences]`).
pub const PLUGIN_NAME: &str = "highlight_occurrences";

/// Verbs after which the selection may have changed.
const TRACKED_VERBS: [Verb; 15] = [
    Verb::Insert,
    Verb::Delete,
    Verb::LineBreak,
    Verb::Indent,
    Verb::Unindent,
    Verb::ToggleComment,
    Verb::Undo,
    Verb::Redo,
    Verb::Move,
    Verb::Select,
    Verb::SelectAll,
    Verb::ExpandToBrackets,
    Verb::ExpandToPath,
    Verb::Cut,
    Verb::Paste,
];

/// The needle each space is currently highlighting.
#[derive(Debug, Default)]
pub struct OccurrenceHighlighter {
    options: HighlightOptions,
    needles: BTreeMap<SpaceId, String>,
}

impl OccurrenceHighlighter {
    /// Create an empty highlighter.
    pub fn new(options: HighlightOptions) -> Self {
        Self {
            options,
            needles: BTreeMap::new(),
        }
    }

    /// Matching options.
    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    /// Replace the matching options. Needles are kept; they are re-checked on the next update.
    pub fn set_options(&mut self, options: HighlightOptions) {
        self.options = options;
    }

    /// Re-read the selection of `doc` shown in `space`. Returns `true` if the needle changed.
    pub fn update(&mut self, space: SpaceId, doc: &Document) -> bool {
        match selection_needle(doc, &self.options) {
            Some(needle) => {
                let previous = self.needles.insert(space, needle.clone());
                previous.as_deref() != Some(needle.as_str())
            }
            None => self.needles.remove(&space).is_some(),
        }
    }

    /// Stop highlighting in `space`.
    pub fn clear(&mut self, space: SpaceId) {
        self.needles.remove(&space);
    }

    /// Forget every space.
    pub fn clear_all(&mut self) {
        self.needles.clear();
    }

    /// Needle of `space`.
    pub fn needle(&self, space: SpaceId) -> Option<&str> {
        self.needles.get(&space).map(String::as_str)
    }

    /// Highlights to draw in `space`, or `None` when nothing is selected there.
    pub fn highlights(
        &self,
        space: SpaceId,
        doc: &Document,
        geom: &ViewGeometry,
    ) -> Result<Option<Highlights>, HighlightError> {
        let Some(needle) = self.needles.get(&space) else {
            return Ok(None);
        };
        highlights_for(doc, needle, &self.options, geom).map(Some)
    }
}

/// Installs post-hooks that keep an [`OccurrenceHighlighter`] in sync with each space's
/// selection.
#[derive(Debug)]
pub struct OccurrencePlugin {
    state: Rc<RefCell<OccurrenceHighlighter>>,
    hooks: Vec<HookId>,
}

impl OccurrencePlugin {
    /// Create the plugin with its own highlighter.
    pub fn new(options: HighlightOptions) -> Self {
        Self {
            state: Rc::new(RefCell::new(OccurrenceHighlighter::new(options))),
            hooks: Vec::new(),
        }
    }

    /// Shared handle to the highlighter, for drawing.
    pub fn highlighter(&self) -> Rc<RefCell<OccurrenceHighlighter>> {
        Rc::clone(&self.state)
    }
}

impl Plugin for OccurrencePlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn enable(&mut self, overrides: &mut Overrides) -> Result<(), PluginError> {
        for verb in TRACKED_VERBS {
            let state = Rc::clone(&self.state);
            let id = overrides.add_post(verb, HookScope::Global, move |ctx| {
                let mut state = state
                    .try_borrow_mut()
                    .map_err(|err| HookError::Failed(err.to_string()))?;
                match ctx.document {
                    Some(doc) => {
                        state.update(ctx.space, doc);
                    }
                    None => state.clear(ctx.space),
                }
                Ok(HookOutcome::Continue)
            });
            self.hooks.push(id);
        }
        Ok(())
    }

    fn disable(&mut self, overrides: &mut Overrides) -> Result<(), PluginError> {
        for id in self.hooks.drain(..) {
            overrides.remove(id);
        }
        self.state
            .try_borrow_mut()
            .map_err(|err| PluginError::Failed {
                name: PLUGIN_NAME.to_string(),
                reason: err.to_string(),
            })?
            .clear_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_reports_changes() {
        let space = SpaceId::from_raw(0);
        let mut doc = Document::from_text("t", "alpha beta alpha");
        let mut highlighter = OccurrenceHighlighter::new(HighlightOptions::default());

        doc.select_set(0, 0, 0, 5);
        assert!(highlighter.update(space, &doc));
        assert!(!highlighter.update(space, &doc));
        assert_eq!(highlighter.needle(space), Some("alpha"));

        doc.select_caret(0, 2);
        assert!(highlighter.update(space, &doc));
        assert_eq!(highlighter.needle(space), None);
        assert!(!highlighter.update(space, &doc));
    }

    #[test]
    fn test_enable_and_disable_manage_hooks() {
        let mut overrides = Overrides::new();
        let mut plugin = OccurrencePlugin::new(HighlightOptions::default());
        plugin.enable(&mut overrides).unwrap();
        assert_eq!(overrides.len(), TRACKED_VERBS.len());
        plugin.disable(&mut overrides).unwrap();
        assert!(overrides.is_empty());
    }
}
