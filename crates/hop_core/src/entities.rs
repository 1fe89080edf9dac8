//! Entity identity and lifetime.
//!
//! Ids are dense indices. Freed ids wait in a FIFO queue and are handed out
//! again before any never-used id, so the live set always stays a subset of
//! `[0, end_id)`. Each live id owns a node in the entity graph that records
//! its parent (if any) and its ordered children; renderers walk this graph to
//! compose hierarchical transforms.

use std::collections::VecDeque;
use std::fmt;

use crate::error::{EcsError, EcsResult};

pub const DEFAULT_MAX_ENTITIES: usize = 4096;

/// Opaque, densely packed entity handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityGraphNode {
    /// `None` marks a root.
    pub parent: Option<EntityId>,
    pub children: Vec<EntityId>,
}

pub struct EntityManager {
    end_id: usize,
    max_entities: usize,
    vacant_ids: VecDeque<EntityId>,
    graph: Vec<Option<EntityGraphNode>>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::with_max_entities(DEFAULT_MAX_ENTITIES)
    }

    pub fn with_max_entities(max_entities: usize) -> Self {
        Self {
            end_id: 0,
            max_entities,
            vacant_ids: VecDeque::new(),
            graph: Vec::new(),
        }
    }

    /// Allocate an id, preferring the oldest recycled one.
    pub fn next_id(&mut self) -> EcsResult<EntityId> {
        let id = if let Some(id) = self.vacant_ids.pop_front() {
            id
        } else if self.end_id >= self.max_entities {
            return Err(EcsError::Exhausted {
                max: self.max_entities,
            });
        } else {
            let id = EntityId::from_index(self.end_id);
            self.end_id += 1;
            self.graph.push(None);
            id
        };

        self.graph[id.index()] = Some(EntityGraphNode::default());
        Ok(id)
    }

    /// Exclusive upper bound of every id ever allocated. Not a live count.
    pub fn end_id(&self) -> EntityId {
        EntityId::from_index(self.end_id)
    }

    pub fn max_entities(&self) -> usize {
        self.max_entities
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.node(id).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.end_id - self.vacant_ids.len()
    }

    pub fn node(&self, id: EntityId) -> Option<&EntityGraphNode> {
        self.graph.get(id.index()).and_then(Option::as_ref)
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn is_root(&self, id: EntityId) -> bool {
        self.node(id).is_some_and(|node| node.parent.is_none())
    }

    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Free `id`: detach it from its parent, orphan its children (they become
    /// roots) and queue the id for reuse.
    pub fn remove_id(&mut self, id: EntityId) -> EcsResult<()> {
        let node = self
            .graph
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(EcsError::NotLive(id))?;

        if let Some(parent) = node.parent {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|&child| child != id);
            }
        }
        for child in node.children {
            if let Some(child_node) = self.node_mut(child) {
                child_node.parent = None;
            }
        }

        self.vacant_ids.push_back(id);
        Ok(())
    }

    /// Attach `child` under `parent`, appending it to the parent's children.
    /// A child that already has a parent is moved.
    pub fn link_parent_child(&mut self, parent: EntityId, child: EntityId) -> EcsResult<()> {
        if !self.is_live(parent) {
            return Err(EcsError::NotLive(parent));
        }
        if !self.is_live(child) {
            return Err(EcsError::NotLive(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(EcsError::Cycle { parent, child });
        }

        if let Some(old_parent) = self.parent(child) {
            if let Some(old_node) = self.node_mut(old_parent) {
                old_node.children.retain(|&c| c != child);
            }
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = Some(parent);
        }
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(child);
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: EntityId, mut id: EntityId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn node_mut(&mut self, id: EntityId) -> Option<&mut EntityGraphNode> {
        self.graph.get_mut(id.index()).and_then(Option::as_mut)
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}
