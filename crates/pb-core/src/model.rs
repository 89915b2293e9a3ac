//! Core document model for the page builder.
//!
//! A page is a forest: an ordered sequence of root-level component instances,
//! each owning an ordered list of children. Position is defined solely by a
//! node's place in its parent's `children` (or the root sequence); `order`
//! is advisory metadata kept alongside.
//!
//! Nodes are shared through `Arc`, so every edit rebuilds only the path from
//! the root to the touched node and reuses all untouched subtrees. A `Forest`
//! value is never mutated after construction; edits always produce a new one.

use crate::id::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let channels: Vec<u8> = match bytes.len() {
            3 | 4 => bytes
                .iter()
                .map(|&c| hex_val(c).map(|v| v * 17))
                .collect::<Option<_>>()?,
            6 | 8 => bytes
                .chunks(2)
                .map(|pair| Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?))
                .collect::<Option<_>>()?,
            _ => return None,
        };

        let unit = |v: u8| v as f32 / 255.0;
        let a = channels.get(3).copied().map(unit).unwrap_or(1.0);
        Some(Self::rgba(
            unit(channels[0]),
            unit(channels[1]),
            unit(channels[2]),
            a,
        ))
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (byte(self.r), byte(self.g), byte(self.b), byte(self.a));
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Property values ─────────────────────────────────────────────────────

/// A single property value.
///
/// Serialized untagged so documents keep the plain JSON shape
/// (`"fontSize": "14px"`, `"columns": 3`, `"disabled": false`). Colors and
/// enum choices are carried as text and interpreted by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropValue {
    pub fn color(color: Color) -> Self {
        PropValue::Text(color.to_hex())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        self.as_str().and_then(Color::from_hex)
    }

    /// True for the empty string. `required` treats it as missing.
    pub fn is_blank(&self) -> bool {
        matches!(self, PropValue::Text(s) if s.is_empty())
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Text(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Text(s)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

/// Property name → value. Ordered so serialized output is deterministic.
pub type Props = BTreeMap<String, PropValue>;

// ─── Component instances ─────────────────────────────────────────────────

/// Shared handle to a node. Untouched subtrees are reused across edits.
pub type NodeRef = Arc<ComponentInstance>;

/// A single node in the page tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    /// Globally unique, assigned at creation, never reused.
    pub id: ComponentId,

    /// Key into the component registry (e.g. `container`, `button`).
    #[serde(rename = "type")]
    pub component_type: String,

    #[serde(default)]
    pub props: Props,

    /// Ordered children; sequence order is visual order.
    #[serde(default)]
    pub children: Vec<NodeRef>,

    /// Informational back-reference. Never used for traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ComponentId>,

    /// Advisory sibling position.
    #[serde(default)]
    pub order: usize,
}

impl ComponentInstance {
    pub fn new(id: ComponentId, component_type: impl Into<String>) -> Self {
        Self {
            id,
            component_type: component_type.into(),
            props: Props::new(),
            children: Vec::new(),
            parent_id: None,
            order: 0,
        }
    }

    /// Builder-style prop setter.
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Builder-style child append. Stamps `parent_id` and `order`.
    pub fn with_child(mut self, mut child: ComponentInstance) -> Self {
        child.parent_id = Some(self.id);
        child.order = self.children.len();
        self.children.push(Arc::new(child));
        self
    }

    pub fn prop(&self, name: &str) -> Option<&PropValue> {
        self.props.get(name)
    }
}

// ─── Forest ──────────────────────────────────────────────────────────────

/// The whole document: an ordered sequence of root-level nodes.
///
/// Cloning is O(1). Two forests compare equal when they are structurally
/// equal; use [`Forest::ptr_eq`] to ask whether they are the same snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Arc<Vec<NodeRef>>,
}

impl Forest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_roots(roots: Vec<NodeRef>) -> Self {
        Self {
            roots: Arc::new(roots),
        }
    }

    pub fn roots(&self) -> &[NodeRef] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// True when both values share the same root allocation.
    pub fn ptr_eq(&self, other: &Forest) -> bool {
        Arc::ptr_eq(&self.roots, &other.roots)
    }

    /// Depth-first, pre-order traversal over every node.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Total number of nodes at all depths.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// All node IDs in pre-order.
    pub fn ids(&self) -> Vec<ComponentId> {
        self.iter().map(|n| n.id).collect()
    }
}

impl From<Vec<ComponentInstance>> for Forest {
    fn from(nodes: Vec<ComponentInstance>) -> Self {
        Self::from_roots(nodes.into_iter().map(Arc::new).collect())
    }
}

/// Pre-order iterator returned by [`Forest::iter`].
pub struct PreOrder<'a> {
    stack: Vec<&'a NodeRef>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
