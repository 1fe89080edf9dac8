//! Per-type component storage indexed directly by the dense entity id.
//!
//! A missing slot means the component is absent; there is no default value.

use crate::entities::EntityId;

#[derive(Debug, Clone)]
pub struct ComponentStore<T> {
    slots: Vec<Option<T>>,
    len: usize,
}

impl<T> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
        }
    }

    /// Insert or replace; returns the previous value.
    pub fn insert(&mut self, id: EntityId, value: T) -> Option<T> {
        let index = id.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let previous = self.slots[index].replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let removed = self.slots.get_mut(id.index()).and_then(Option::take);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|v| (EntityId::from_index(index), v)))
    }
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
