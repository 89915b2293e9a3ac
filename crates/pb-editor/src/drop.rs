//! Translate resolved drag-and-drop gestures into editor actions.
//!
//! The gesture layer reports where something was dropped; these functions
//! decide whether that drop is legal and which action it becomes. Nothing
//! here touches the store.

use crate::action::EditorAction;
use pb_core::id::ComponentId;
use pb_core::model::Forest;
use pb_core::registry::ComponentRegistry;
use pb_core::tree;
use serde::{Deserialize, Serialize};

/// A completed drop of an existing component.
///
/// Container ids are `None` for the root sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEvent {
    pub moved_id: ComponentId,
    #[serde(default)]
    pub source_container_id: Option<ComponentId>,
    #[serde(default)]
    pub target_container_id: Option<ComponentId>,
    pub target_index: usize,
}

/// Turn a drop into a `MoveComponent`, or `None` if the drop is illegal or
/// would change nothing.
///
/// Rejected: unknown moved node, unknown target, a target whose type
/// cannot hold children, a target inside the moved subtree, and dropping
/// back onto the current position.
pub fn translate_drop(
    forest: &Forest,
    registry: &impl ComponentRegistry,
    event: &DropEvent,
) -> Option<EditorAction> {
    let id = event.moved_id;
    let Some(path) = tree::locate(forest, id) else {
        log::trace!("drop: {id} not in tree");
        return None;
    };

    if let Some(target) = event.target_container_id {
        let container = tree::find(forest, target)?;
        if !registry.can_have_children(&container.component_type) {
            log::trace!("drop: {} cannot have children", container.component_type);
            return None;
        }
        if target == id || tree::is_descendant_of(forest, target, id) {
            log::trace!("drop: {target} is inside {id}");
            return None;
        }
    }

    let current_parent = tree::parent_of(forest, id);
    let current_index = path.last().copied().unwrap_or_default();
    if current_parent == event.target_container_id && current_index == event.target_index {
        return None;
    }
    if current_parent != event.source_container_id {
        log::debug!("drop: source container mismatch for {id}, using tree position");
    }

    Some(EditorAction::MoveComponent {
        id,
        new_parent_id: event.target_container_id,
        new_index: event.target_index,
    })
}

/// Turn a palette drop (a component type dragged from the catalog) into an
/// `AddComponent` with a freshly created instance.
pub fn palette_drop(
    forest: &Forest,
    registry: &impl ComponentRegistry,
    component_type: &str,
    target_container_id: Option<ComponentId>,
) -> Option<EditorAction> {
    if let Some(target) = target_container_id {
        let container = tree::find(forest, target)?;
        if !registry.can_have_children(&container.component_type) {
            log::trace!("palette drop: {} cannot have children", container.component_type);
            return None;
        }
    }
    let instance = registry.create_instance(component_type)?;
    Some(EditorAction::add(instance, target_container_id))
}
