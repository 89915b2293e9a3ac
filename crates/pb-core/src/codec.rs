//! Serialized forms of a page tree.
//!
//! JSON is the load surface shared with the web frontend: an array of
//! components with `id`, `type`, `props`, `children`, `order` (and an
//! optional `parentId`). MessagePack carries the same structure in a compact
//! binary form for snapshots handed to a persistence layer.
//!
//! Decoding rejects forests whose ids are not unique, since every tree
//! operation assumes they are.

use crate::id::ComponentId;
use crate::model::Forest;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid MessagePack: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("could not encode MessagePack: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("component id `{0}` appears more than once")]
    DuplicateId(ComponentId),
}

/// First id that appears twice in pre-order, if any.
pub fn first_duplicate_id(forest: &Forest) -> Option<ComponentId> {
    let mut seen = HashSet::new();
    forest.iter().map(|n| n.id).find(|&id| !seen.insert(id))
}

fn checked(forest: Forest) -> Result<Forest, LoadError> {
    match first_duplicate_id(&forest) {
        Some(id) => Err(LoadError::DuplicateId(id)),
        None => Ok(forest),
    }
}

impl Forest {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        checked(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, LoadError> {
        checked(rmp_serde::from_slice(bytes)?)
    }

    /// Encoded with field names so the payload stays self-describing.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, LoadError> {
        Ok(rmp_serde::to_vec_named(self)?)
    }
}
