//! Pure tree operations over a [`Forest`].
//!
//! Every operation takes the current forest by reference and returns a new
//! one. Only the path from the root sequence to the edited node is rebuilt;
//! every other subtree is shared with the input. When an operation finds
//! nothing to do (unknown id, missing parent) it returns a clone of the
//! input that is [`Forest::ptr_eq`] to it, which is how callers detect a
//! no-op without a structural comparison.
//!
//! Traversal is always top-down from the root sequence. `parent_id` on a
//! node is stamped for consumers but never read here.

use crate::id::ComponentId;
use crate::model::{ComponentInstance, Forest, NodeRef, Props};
use smallvec::SmallVec;
use std::sync::Arc;

/// Child-index path from the root sequence down to a node.
pub type NodePath = SmallVec<[usize; 8]>;

// ─── Queries ─────────────────────────────────────────────────────────────

/// Depth-first, pre-order search. Returns the first match.
pub fn find(forest: &Forest, id: ComponentId) -> Option<&NodeRef> {
    forest.iter().find(|n| n.id == id)
}

pub fn contains(forest: &Forest, id: ComponentId) -> bool {
    find(forest, id).is_some()
}

/// Index path to the first pre-order match.
pub fn locate(forest: &Forest, id: ComponentId) -> Option<NodePath> {
    fn walk(seq: &[NodeRef], id: ComponentId, path: &mut NodePath) -> bool {
        for (i, node) in seq.iter().enumerate() {
            path.push(i);
            if node.id == id || walk(&node.children, id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = NodePath::new();
    walk(forest.roots(), id, &mut path).then_some(path)
}

/// Resolve a path produced by [`locate`].
pub fn node_at<'a>(forest: &'a Forest, path: &[usize]) -> Option<&'a NodeRef> {
    let (&first, rest) = path.split_first()?;
    let mut node = forest.roots().get(first)?;
    for &i in rest {
        node = node.children.get(i)?;
    }
    Some(node)
}

/// Structural parent of `id`, found by traversal (not via `parent_id`).
/// `None` for root-level nodes and unknown ids.
pub fn parent_of(forest: &Forest, id: ComponentId) -> Option<ComponentId> {
    let path = locate(forest, id)?;
    let parent_path = &path[..path.len() - 1];
    node_at(forest, parent_path).map(|n| n.id)
}

/// True if `id` sits somewhere below `ancestor`. A node is not its own
/// descendant.
pub fn is_descendant_of(forest: &Forest, id: ComponentId, ancestor: ComponentId) -> bool {
    find(forest, ancestor)
        .map(|a| {
            Forest::from_roots(a.children.clone())
                .iter()
                .any(|n| n.id == id)
        })
        .unwrap_or(false)
}

// ─── Path rebuilding ─────────────────────────────────────────────────────

/// Copy `seq`, rebuilding only the nodes along `path` and applying `edit`
/// to the node at its end.
fn rebuild_along<F>(seq: &[NodeRef], path: &[usize], edit: F) -> Vec<NodeRef>
where
    F: FnOnce(&mut ComponentInstance),
{
    let mut out = seq.to_vec();
    let Some((&head, rest)) = path.split_first() else {
        return out;
    };
    let mut node = ComponentInstance::clone(&out[head]);
    if rest.is_empty() {
        edit(&mut node);
    } else {
        node.children = rebuild_along(&node.children, rest, edit);
    }
    out[head] = Arc::new(node);
    out
}

/// Rebuild the sequence that owns children of `parent` (or the root
/// sequence when `parent` is `None`), applying `edit` to it.
fn edit_sequence<F>(forest: &Forest, parent: Option<ComponentId>, edit: F) -> Forest
where
    F: FnOnce(&mut Vec<NodeRef>),
{
    match parent {
        None => {
            let mut roots = forest.roots().to_vec();
            edit(&mut roots);
            Forest::from_roots(roots)
        }
        Some(parent_id) => match locate(forest, parent_id) {
            Some(path) => Forest::from_roots(rebuild_along(forest.roots(), &path, |node| {
                edit(&mut node.children)
            })),
            None => {
                log::trace!("parent {parent_id} not found, tree unchanged");
                forest.clone()
            }
        },
    }
}

/// Stamp `parent_id` and `order` on a node, cloning it only if needed.
fn stamped(mut node: NodeRef, parent: Option<ComponentId>, order: usize) -> NodeRef {
    if node.parent_id != parent || node.order != order {
        let inner = Arc::make_mut(&mut node);
        inner.parent_id = parent;
        inner.order = order;
    }
    node
}

// ─── Edits ───────────────────────────────────────────────────────────────

/// Append `node` to the root sequence or to the children of `parent`.
///
/// The inserted node gets `order` = its index and `parent_id` = `parent`.
/// If `parent` does not exist anywhere the forest is returned unchanged.
pub fn insert(
    forest: &Forest,
    node: impl Into<NodeRef>,
    parent: Option<ComponentId>,
) -> Forest {
    let node = node.into();
    edit_sequence(forest, parent, move |seq| {
        let order = seq.len();
        seq.push(stamped(node, parent, order));
    })
}

/// Shallow-merge `props` into the node's props. Supplied keys overwrite,
/// others are retained. Unchanged if `id` is unknown or every supplied
/// value is already present.
pub fn update(forest: &Forest, id: ComponentId, props: &Props) -> Forest {
    let Some(path) = locate(forest, id) else {
        log::trace!("update: {id} not found");
        return forest.clone();
    };
    let already_applied = node_at(forest, &path)
        .map(|n| props.iter().all(|(k, v)| n.props.get(k) == Some(v)))
        .unwrap_or(false);
    if already_applied {
        return forest.clone();
    }
    Forest::from_roots(rebuild_along(forest.roots(), &path, |node| {
        node.props
            .extend(props.iter().map(|(k, v)| (k.clone(), v.clone())));
    }))
}

/// Remove every node with `id` (and its subtree) from whichever sequence
/// holds it, at every depth.
pub fn delete_node(forest: &Forest, id: ComponentId) -> Forest {
    fn remove_all(seq: &[NodeRef], id: ComponentId) -> Option<Vec<NodeRef>> {
        let mut changed = false;
        let mut out = Vec::with_capacity(seq.len());
        for node in seq {
            if node.id == id {
                changed = true;
                continue;
            }
            match remove_all(&node.children, id) {
                Some(children) => {
                    changed = true;
                    let mut rebuilt = ComponentInstance::clone(node);
                    rebuilt.children = children;
                    out.push(Arc::new(rebuilt));
                }
                None => out.push(Arc::clone(node)),
            }
        }
        changed.then_some(out)
    }

    match remove_all(forest.roots(), id) {
        Some(roots) => Forest::from_roots(roots),
        None => {
            log::trace!("delete: {id} not found");
            forest.clone()
        }
    }
}

/// Move a node (with its whole subtree) under `new_parent` (root when
/// `None`) at position `new_index`.
///
/// The node is detached and spliced in at `new_index`, clamped to the
/// destination length; the destination's `order` fields are renumbered to
/// match positions. Moving a node into itself or its own subtree, or under
/// a parent that does not exist, leaves the forest unchanged.
pub fn move_node(
    forest: &Forest,
    id: ComponentId,
    new_parent: Option<ComponentId>,
    new_index: usize,
) -> Forest {
    let Some(node) = find(forest, id).cloned() else {
        log::trace!("move: {id} not found");
        return forest.clone();
    };
    if let Some(parent) = new_parent {
        if parent == id || is_descendant_of(forest, parent, id) {
            log::trace!("move: refusing to move {id} into its own subtree");
            return forest.clone();
        }
        if !contains(forest, parent) {
            log::trace!("move: target parent {parent} not found");
            return forest.clone();
        }
    }

    let detached = delete_node(forest, id);
    let moved = edit_sequence(&detached, new_parent, move |seq| {
        let at = new_index.min(seq.len());
        seq.insert(at, node);
        for (i, slot) in seq.iter_mut().enumerate() {
            let parent = if i == at { new_parent } else { slot.parent_id };
            *slot = stamped(Arc::clone(slot), parent, i);
        }
    });

    if moved == *forest {
        return forest.clone();
    }
    moved
}

/// Deep-copy a subtree, giving every node in it a fresh id. The copy root
/// has no `parent_id`; descendants point at their copied parents.
pub fn clone_with_fresh_ids(node: &ComponentInstance) -> ComponentInstance {
    fn copy(node: &ComponentInstance, parent: Option<ComponentId>) -> ComponentInstance {
        let id = ComponentId::generate();
        ComponentInstance {
            id,
            component_type: node.component_type.clone(),
            props: node.props.clone(),
            children: node
                .children
                .iter()
                .map(|c| Arc::new(copy(c, Some(id))))
                .collect(),
            parent_id: parent,
            order: node.order,
        }
    }
    copy(node, None)
}

/// Duplicate the node `id`. The copy is appended to the root sequence.
///
/// Returns the new forest and the id of the copy; `(unchanged, None)` when
/// `id` is unknown.
pub fn duplicate(forest: &Forest, id: ComponentId) -> (Forest, Option<ComponentId>) {
    let Some(original) = find(forest, id) else {
        log::trace!("duplicate: {id} not found");
        return (forest.clone(), None);
    };
    let copy = clone_with_fresh_ids(original);
    let new_id = copy.id;
    (insert(forest, copy, None), Some(new_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropValue;

    fn id(s: &str) -> ComponentId {
        ComponentId::intern(s)
    }

    fn node(name: &str, ty: &str) -> ComponentInstance {
        ComponentInstance::new(id(name), ty)
    }

    /// t_page ─┬─ t_header ── t_title
    ///         └─ t_body ─┬─ t_para
    ///                    └─ t_cta
    /// t_footer
    fn sample() -> Forest {
        Forest::from(vec![
            node("t_page", "container")
                .with_child(node("t_header", "container").with_child(node("t_title", "heading")))
                .with_child(
                    node("t_body", "container")
                        .with_child(node("t_para", "text"))
                        .with_child(node("t_cta", "button")),
                ),
            node("t_footer", "container"),
        ])
    }

    fn child_ids(forest: &Forest, parent: &str) -> Vec<String> {
        find(forest, id(parent))
            .unwrap()
            .children
            .iter()
            .map(|c| c.id.to_string())
            .collect()
    }

    fn root_ids(forest: &Forest) -> Vec<String> {
        forest.roots().iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn locate_and_parent_of() {
        let forest = sample();
        assert_eq!(locate(&forest, id("t_cta")).unwrap().as_slice(), &[0, 1, 1]);
        assert_eq!(parent_of(&forest, id("t_cta")), Some(id("t_body")));
        assert_eq!(parent_of(&forest, id("t_footer")), None);
        assert!(locate(&forest, id("t_nope")).is_none());
    }

    #[test]
    fn descendant_check() {
        let forest = sample();
        assert!(is_descendant_of(&forest, id("t_title"), id("t_page")));
        assert!(!is_descendant_of(&forest, id("t_page"), id("t_page")));
        assert!(!is_descendant_of(&forest, id("t_footer"), id("t_page")));
    }

    #[test]
    fn insert_at_root_and_nested() {
        let forest = sample();
        let at_root = insert(&forest, node("t_new_root", "text"), None);
        assert_eq!(at_root.roots().len(), 3);
        assert_eq!(at_root.roots()[2].order, 2);
        assert_eq!(at_root.roots()[2].parent_id, None);

        let nested = insert(&forest, node("t_new_child", "text"), Some(id("t_body")));
        let inserted = find(&nested, id("t_new_child")).unwrap();
        assert_eq!(inserted.order, 2);
        assert_eq!(inserted.parent_id, Some(id("t_body")));
        assert_eq!(child_ids(&nested, "t_body"), vec!["t_para", "t_cta", "t_new_child"]);
    }

    #[test]
    fn insert_shares_untouched_subtrees() {
        let forest = sample();
        let next = insert(&forest, node("t_share", "text"), Some(id("t_body")));
        // Header subtree and footer are reused by pointer.
        let old_header = &forest.roots()[0].children[0];
        let new_header = &next.roots()[0].children[0];
        assert!(Arc::ptr_eq(old_header, new_header));
        assert!(Arc::ptr_eq(&forest.roots()[1], &next.roots()[1]));
        // The path to the edit is rebuilt.
        assert!(!Arc::ptr_eq(&forest.roots()[0], &next.roots()[0]));
    }

    #[test]
    fn insert_under_missing_parent_is_noop() {
        let forest = sample();
        let next = insert(&forest, node("t_lost", "text"), Some(id("t_missing")));
        assert!(next.ptr_eq(&forest));
    }

    #[test]
    fn update_merges_props() {
        let forest = Forest::from(vec![
            node("t_btn", "button")
                .with_prop("label", "Click")
                .with_prop("padding", "4px"),
        ]);
        let mut props = Props::new();
        props.insert("label".into(), PropValue::from("Buy now"));
        props.insert("disabled".into(), PropValue::from(false));
        let next = update(&forest, id("t_btn"), &props);

        let btn = find(&next, id("t_btn")).unwrap();
        assert_eq!(btn.prop("label"), Some(&PropValue::from("Buy now")));
        assert_eq!(btn.prop("padding"), Some(&PropValue::from("4px")));
        assert_eq!(btn.prop("disabled"), Some(&PropValue::from(false)));
        // Input untouched.
        let before = find(&forest, id("t_btn")).unwrap();
        assert_eq!(before.prop("label"), Some(&PropValue::from("Click")));
    }

    #[test]
    fn update_missing_or_identical_is_noop() {
        let forest = Forest::from(vec![node("t_same", "text").with_prop("content", "hi")]);
        let mut props = Props::new();
        props.insert("content".into(), PropValue::from("hi"));
        assert!(update(&forest, id("t_same"), &props).ptr_eq(&forest));
        assert!(update(&forest, id("t_ghost"), &props).ptr_eq(&forest));
    }

    #[test]
    fn delete_removes_subtree() {
        let forest = sample();
        let next = delete_node(&forest, id("t_body"));
        assert!(find(&next, id("t_body")).is_none());
        assert!(find(&next, id("t_para")).is_none());
        assert!(find(&next, id("t_cta")).is_none());
        assert_eq!(next.len(), 4);
        assert_eq!(forest.len(), 7);
    }

    #[test]
    fn delete_removes_every_occurrence() {
        // Malformed input with a repeated id at two depths.
        let forest = Forest::from(vec![
            node("t_dup_holder", "container").with_child(node("t_dup", "text")),
            node("t_dup", "text"),
        ]);
        let next = delete_node(&forest, id("t_dup"));
        assert_eq!(next.ids(), vec![id("t_dup_holder")]);
    }

    #[test]
    fn delete_missing_is_noop() {
        let forest = sample();
        assert!(delete_node(&forest, id("t_absent")).ptr_eq(&forest));
    }

    #[test]
    fn move_splices_at_index_and_renumbers() {
        let forest = sample();
        let next = move_node(&forest, id("t_footer"), Some(id("t_body")), 1);
        assert_eq!(child_ids(&next, "t_body"), vec!["t_para", "t_footer", "t_cta"]);
        let body = find(&next, id("t_body")).unwrap();
        let orders: Vec<usize> = body.children.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(find(&next, id("t_footer")).unwrap().parent_id, Some(id("t_body")));
        assert_eq!(root_ids(&next), vec!["t_page"]);
    }

    #[test]
    fn move_carries_children() {
        let forest = sample();
        let next = move_node(&forest, id("t_body"), None, 0);
        assert_eq!(root_ids(&next), vec!["t_body", "t_page", "t_footer"]);
        assert_eq!(child_ids(&next, "t_body"), vec!["t_para", "t_cta"]);
        assert_eq!(find(&next, id("t_body")).unwrap().parent_id, None);
    }

    #[test]
    fn move_index_is_clamped() {
        let forest = sample();
        let next = move_node(&forest, id("t_para"), Some(id("t_header")), 99);
        assert_eq!(child_ids(&next, "t_header"), vec!["t_title", "t_para"]);
    }

    #[test]
    fn move_into_own_subtree_is_noop() {
        let forest = sample();
        assert!(move_node(&forest, id("t_page"), Some(id("t_body")), 0).ptr_eq(&forest));
        assert!(move_node(&forest, id("t_page"), Some(id("t_page")), 0).ptr_eq(&forest));
    }

    #[test]
    fn move_to_missing_parent_or_unknown_node_is_noop() {
        let forest = sample();
        assert!(move_node(&forest, id("t_cta"), Some(id("t_void")), 0).ptr_eq(&forest));
        assert!(move_node(&forest, id("t_void"), None, 0).ptr_eq(&forest));
    }

    #[test]
    fn move_to_same_position_is_noop() {
        let forest = sample();
        assert!(move_node(&forest, id("t_cta"), Some(id("t_body")), 1).ptr_eq(&forest));
    }

    #[test]
    fn duplicate_appends_fresh_copy_at_root() {
        let forest = sample();
        let (next, new_id) = duplicate(&forest, id("t_body"));
        let new_id = new_id.unwrap();
        assert_ne!(new_id, id("t_body"));

        let copy = next.roots().last().unwrap();
        assert_eq!(copy.id, new_id);
        assert_eq!(copy.parent_id, None);
        assert_eq!(copy.order, 2);
        assert_eq!(copy.component_type, "container");
        assert_eq!(copy.children.len(), 2);
        assert_eq!(copy.children[0].parent_id, Some(new_id));

        // Every id is still unique.
        let mut ids = next.ids();
        let total = ids.len();
        ids.sort_by_key(|i| i.to_string());
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn duplicate_missing_is_noop() {
        let forest = sample();
        let (next, new_id) = duplicate(&forest, id("t_phantom"));
        assert!(next.ptr_eq(&forest));
        assert!(new_id.is_none());
    }
}
