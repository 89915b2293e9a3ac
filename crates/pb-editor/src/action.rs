//! Editor actions: the closed set of state transitions.
//!
//! Serialized adjacently tagged, matching the frontend's action objects:
//! `{"type": "MOVE_COMPONENT", "payload": {"id": "...", "newIndex": 2}}`.

use crate::state::ResponsiveMode;
use pb_core::id::ComponentId;
use pb_core::model::{ComponentInstance, Forest, Props};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum EditorAction {
    /// Insert an already-instantiated component (see the registry).
    AddComponent {
        component: Box<ComponentInstance>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<ComponentId>,
    },
    /// Shallow-merge props into a component.
    UpdateComponent { id: ComponentId, props: Props },
    DeleteComponent { id: ComponentId },
    /// Re-parent and/or reorder a component with its subtree.
    MoveComponent {
        id: ComponentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_parent_id: Option<ComponentId>,
        new_index: usize,
    },
    /// Deep-copy a component with fresh ids; the copy lands at root level.
    DuplicateComponent { id: ComponentId },
    SelectComponent { id: Option<ComponentId> },
    Undo,
    Redo,
    SetResponsiveMode { mode: ResponsiveMode },
    /// Replace the tree wholesale and reset history.
    LoadState { components: Forest },
    /// The persistence layer saved the current tree.
    MarkClean,
}

impl EditorAction {
    /// Whether applying this action records a history entry (when it
    /// changes the tree).
    pub fn is_history_affecting(&self) -> bool {
        matches!(
            self,
            EditorAction::AddComponent { .. }
                | EditorAction::UpdateComponent { .. }
                | EditorAction::DeleteComponent { .. }
                | EditorAction::MoveComponent { .. }
                | EditorAction::DuplicateComponent { .. }
        )
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            EditorAction::AddComponent { .. } => "add component",
            EditorAction::UpdateComponent { .. } => "update component",
            EditorAction::DeleteComponent { .. } => "delete component",
            EditorAction::MoveComponent { .. } => "move component",
            EditorAction::DuplicateComponent { .. } => "duplicate component",
            EditorAction::SelectComponent { .. } => "select component",
            EditorAction::Undo => "undo",
            EditorAction::Redo => "redo",
            EditorAction::SetResponsiveMode { .. } => "set responsive mode",
            EditorAction::LoadState { .. } => "load state",
            EditorAction::MarkClean => "mark clean",
        }
    }

    pub fn add(component: ComponentInstance, parent_id: Option<ComponentId>) -> Self {
        EditorAction::AddComponent {
            component: Box::new(component),
            parent_id,
        }
    }
}
