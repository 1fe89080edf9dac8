use std::collections::VecDeque;

use glam::{Mat4, Vec3};
use hop_core::bounding_box::BoundingBox3D;
use hop_core::input::InputKind;
use serde::Deserialize;

/// Something the renderer draws. `mat` is the entity's accumulated transform
/// (relative to its parent for child entities).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub model_index: usize,
    pub mat: Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    WearShoe,
}

impl ActionKind {
    pub fn from_input(input: InputKind) -> Self {
        match input {
            InputKind::Up => ActionKind::MoveForward,
            InputKind::Down => ActionKind::MoveBack,
            InputKind::Left => ActionKind::MoveLeft,
            InputKind::Right => ActionKind::MoveRight,
        }
    }

    /// One grid step in world space; forward is -Z. `None` for non-movement
    /// actions.
    pub fn displacement(self, step_size: f32) -> Option<Vec3> {
        match self {
            ActionKind::MoveForward => Some(Vec3::new(0.0, 0.0, -step_size)),
            ActionKind::MoveBack => Some(Vec3::new(0.0, 0.0, step_size)),
            ActionKind::MoveLeft => Some(Vec3::new(-step_size, 0.0, 0.0)),
            ActionKind::MoveRight => Some(Vec3::new(step_size, 0.0, 0.0)),
            ActionKind::WearShoe => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    /// Last movement started; committed when its animation finishes.
    pub current_action: Option<ActionKind>,
    pub actions: VecDeque<ActionKind>,
    pub speed_multiplier: f32,
    pub model_bb: BoundingBox3D,
}

impl Character {
    pub fn new(model_bb: BoundingBox3D) -> Self {
        Self {
            current_action: None,
            actions: VecDeque::new(),
            speed_multiplier: 1.0,
            model_bb,
        }
    }
}

/// Static zone that blocks the listed actions while the character overlaps it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRestriction {
    pub bounding_box: BoundingBox3D,
    pub restrictions: Vec<ActionKind>,
    /// Keep blocking even in pass-through mode (map edges).
    pub ignore_passthrough: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinZone {
    pub bounding_box: BoundingBox3D,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Car {
    pub vel: Vec3,
    pub model_bb: BoundingBox3D,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShoeItem {
    pub model_bb: BoundingBox3D,
}
