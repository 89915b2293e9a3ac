//! Editor state and the single transition function.
//!
//! [`reduce`] is the only place where an [`EditorAction`] turns into a new
//! [`EditorState`]. The store, the shared handle, and the WASM bridge all
//! go through it.

use crate::action::EditorAction;
use crate::history::History;
use pb_core::id::ComponentId;
use pb_core::model::{Forest, NodeRef};
use pb_core::tree;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Preview width. Presentation only, never touches the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsiveMode {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl ResponsiveMode {
    /// Preview viewport width in CSS pixels.
    pub fn preview_width(self) -> u32 {
        match self {
            ResponsiveMode::Desktop => 1200,
            ResponsiveMode::Tablet => 768,
            ResponsiveMode::Mobile => 375,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponsiveMode::Desktop => "desktop",
            ResponsiveMode::Tablet => "tablet",
            ResponsiveMode::Mobile => "mobile",
        }
    }
}

/// Everything the editor knows about the open document.
///
/// The live tree is `history.present()`; there is no second copy.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub history: History,
    pub selected: Option<ComponentId>,
    pub responsive_mode: ResponsiveMode,
    pub is_dirty: bool,
    /// Bumped on every observable change.
    pub version: u64,
}

impl EditorState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            history: History::new(Forest::new(), history_limit),
            selected: None,
            responsive_mode: ResponsiveMode::default(),
            is_dirty: false,
            version: 0,
        }
    }

    pub fn components(&self) -> &Forest {
        self.history.present()
    }

    /// The selected node, if the selection points at a live node.
    pub fn selected_component(&self) -> Option<&NodeRef> {
        self.selected.and_then(|id| tree::find(self.components(), id))
    }

    /// Commit `next` as a history-producing edit: the current tree goes to
    /// `past`, `future` is cleared and the document is dirty, even when
    /// `next` is the current snapshot.
    fn commit(&mut self, next: Forest) {
        if next.ptr_eq(self.components()) {
            log::trace!("edit left the tree unchanged, recording anyway");
        }
        self.history.record(next);
        self.is_dirty = true;
    }
}

/// First id of the incoming subtree that is repeated inside it or already
/// live in `forest`.
fn clashing_id(forest: &Forest, incoming: &NodeRef) -> Option<ComponentId> {
    let mut seen: HashSet<ComponentId> = forest.ids().into_iter().collect();
    Forest::from_roots(vec![Arc::clone(incoming)])
        .iter()
        .map(|n| n.id)
        .find(|&id| !seen.insert(id))
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(crate::history::DEFAULT_HISTORY_LIMIT)
    }
}

/// Apply `action` to `state`, returning the next state.
///
/// `state` is never modified; untouched parts of the tree are shared with
/// the result. Every edit is total: an edit naming an unknown id still
/// records a history entry holding the unchanged tree, so each edit is
/// undone by exactly one `Undo`. Empty history makes Undo/Redo no-ops.
pub fn reduce(state: &EditorState, action: EditorAction) -> EditorState {
    let mut next = state.clone();
    let changed = apply(&mut next, action);
    if changed {
        next.version = state.version.wrapping_add(1);
    }
    next
}

fn apply(state: &mut EditorState, action: EditorAction) -> bool {
    match action {
        EditorAction::AddComponent {
            component,
            parent_id,
        } => {
            let node: NodeRef = Arc::new(*component);
            if let Some(clash) = clashing_id(state.components(), &node) {
                log::warn!("add: id {clash} already in the tree, ignoring");
                return false;
            }
            let new_id = node.id;
            let next = tree::insert(state.components(), node, parent_id);
            state.commit(next);
            state.selected = Some(new_id);
            true
        }

        EditorAction::UpdateComponent { id, props } => {
            let next = tree::update(state.components(), id, &props);
            state.commit(next);
            true
        }

        EditorAction::DeleteComponent { id } => {
            let next = tree::delete_node(state.components(), id);
            state.commit(next);
            state.selected = None;
            true
        }

        EditorAction::MoveComponent {
            id,
            new_parent_id,
            new_index,
        } => {
            let next = tree::move_node(state.components(), id, new_parent_id, new_index);
            state.commit(next);
            true
        }

        EditorAction::DuplicateComponent { id } => {
            let (next, copy_id) = tree::duplicate(state.components(), id);
            state.commit(next);
            if copy_id.is_some() {
                state.selected = copy_id;
            }
            true
        }

        EditorAction::SelectComponent { id } => {
            if let Some(id) = id {
                if !tree::contains(state.components(), id) {
                    log::trace!("select: {id} not found");
                    return false;
                }
            }
            if state.selected == id {
                return false;
            }
            state.selected = id;
            true
        }

        EditorAction::Undo => {
            if !state.history.undo() {
                return false;
            }
            state.is_dirty = true;
            log::debug!(
                "undo: {} past, {} future",
                state.history.past().len(),
                state.history.future().len()
            );
            true
        }

        EditorAction::Redo => {
            if !state.history.redo() {
                return false;
            }
            state.is_dirty = true;
            log::debug!(
                "redo: {} past, {} future",
                state.history.past().len(),
                state.history.future().len()
            );
            true
        }

        EditorAction::SetResponsiveMode { mode } => {
            if state.responsive_mode == mode {
                return false;
            }
            state.responsive_mode = mode;
            true
        }

        EditorAction::LoadState { components } => {
            if let Some(id) = state.selected {
                if !tree::contains(&components, id) {
                    state.selected = None;
                }
            }
            state.history.reset(components);
            state.is_dirty = false;
            true
        }

        EditorAction::MarkClean => {
            let was_dirty = state.is_dirty;
            state.is_dirty = false;
            was_dirty
        }
    }
}
