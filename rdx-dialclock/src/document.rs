//! The host-document capability: placeholder enumeration and element lookup.
//!
//! The engine only ever asks a document two things: whether an element with a
//! given id still exists, and which candidate placeholders it holds (so that
//! discovery can read their class tokens and give them ids).

use crate::common::ElementId;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identifies a candidate placeholder node within a document, whether or
    /// not it carries an element id yet.
    pub struct NodeKey;
}

/// A candidate placeholder as seen by discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub node: NodeKey,
    pub id: Option<ElementId>,
    /// The element's full class attribute.
    pub class: String,
}

/// A document that hosts clock placeholders.
pub trait HostDocument: Send + Sync {
    /// Whether an element with this id is still in the document.
    fn contains(&self, id: &ElementId) -> bool;

    /// Every candidate placeholder element, in document order.
    fn placeholders(&self) -> Vec<Placeholder>;

    /// Gives an id to a placeholder that has none.
    fn assign_id(&mut self, node: NodeKey, id: ElementId);
}

#[derive(Debug, Clone)]
struct Node {
    id: Option<ElementId>,
    class: String,
}

/// An in-memory document of placeholder elements.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    nodes: SlotMap<NodeKey, Node>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element without an id.
    pub fn insert(&mut self, class: impl Into<String>) -> NodeKey {
        self.nodes.insert(Node {
            id: None,
            class: class.into(),
        })
    }

    /// Appends an element with an id.
    pub fn insert_with_id(
        &mut self,
        id: impl Into<ElementId>,
        class: impl Into<String>,
    ) -> NodeKey {
        self.nodes.insert(Node {
            id: Some(id.into()),
            class: class.into(),
        })
    }

    /// Removes the element with this id. Returns `true` if one was found.
    pub fn remove(&mut self, id: &ElementId) -> bool {
        let found = self
            .nodes
            .iter()
            .find(|(_, node)| node.id.as_ref() == Some(id))
            .map(|(key, _)| key);
        match found {
            Some(key) => self.nodes.remove(key).is_some(),
            None => false,
        }
    }

    pub fn id_of(&self, node: NodeKey) -> Option<&ElementId> {
        self.nodes.get(node).and_then(|node| node.id.as_ref())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl HostDocument for MemoryDocument {
    fn contains(&self, id: &ElementId) -> bool {
        self.nodes.values().any(|node| node.id.as_ref() == Some(id))
    }

    fn placeholders(&self) -> Vec<Placeholder> {
        self.nodes
            .iter()
            .map(|(key, node)| Placeholder {
                node: key,
                id: node.id.clone(),
                class: node.class.clone(),
            })
            .collect()
    }

    fn assign_id(&mut self, node: NodeKey, id: ElementId) {
        if let Some(node) = self.nodes.get_mut(node) {
            node.id = Some(id);
        }
    }
}
