//! Directional input as a FIFO of discrete events.
//!
//! Every press becomes exactly one queued `InputKind`. Presses are
//! edge-triggered: a key that is already held (OS key repeat) does not queue
//! again until it has been released, so one physical tap is one move.

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
}

impl Key {
    pub fn input_kind(self) -> InputKind {
        match self {
            Key::Up | Key::W => InputKind::Up,
            Key::Down | Key::S => InputKind::Down,
            Key::Left | Key::A => InputKind::Left,
            Key::Right | Key::D => InputKind::Right,
        }
    }
}

#[derive(Debug, Default)]
pub struct InputQueue {
    held: HashSet<Key>,
    pending: VecDeque<InputKind>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.pending.push_back(key.input_kind());
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Queue an input directly, bypassing key tracking (replays, scripted input).
    pub fn push(&mut self, input: InputKind) {
        self.pending.push_back(input);
    }

    pub fn pop(&mut self) -> Option<InputKind> {
        self.pending.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputKind> + '_ {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
