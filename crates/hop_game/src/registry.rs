use std::collections::HashSet;

use glam::Mat4;
use hop_core::animation::Animation;
use hop_core::input::InputQueue;
use hop_core::{ComponentStore, EntityId};

use crate::components::{
    ActionKind, ActionRestriction, Car, Character, Mesh, ShoeItem, WinZone,
};
use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    #[default]
    InProgress,
    Win,
    Lose,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        self != GameState::InProgress
    }
}

/// One entry of the frame's draw list: a model and its final world matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub entity: EntityId,
    pub model_index: usize,
    pub mat: Mat4,
}

/// Every component store plus the shared game state the systems read and
/// write between each other.
#[derive(Default)]
pub struct Registry {
    pub meshes: ComponentStore<Mesh>,
    pub characters: ComponentStore<Character>,
    pub action_restrictions: ComponentStore<ActionRestriction>,
    pub cars: ComponentStore<Car>,
    pub win_zones: ComponentStore<WinZone>,
    pub animations: ComponentStore<Animation>,
    pub shoe_items: ComponentStore<ShoeItem>,

    pub state: GameState,
    pub character_id: Option<EntityId>,
    pub input_queue: InputQueue,
    /// Rebuilt every frame from the restriction zones the character touches.
    pub blocked_actions: HashSet<ActionKind>,
    pub pass_through: bool,

    pub config: GameConfig,
    /// Furthest row reached so far (forward moves count up).
    pub score: i32,
    pub player_row: i32,
    pub draw_list: Vec<DrawItem>,
}

impl Registry {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == GameState::InProgress
    }

    /// Move to a terminal state. Only the first transition out of
    /// `InProgress` sticks.
    pub fn finish(&mut self, state: GameState) {
        if !self.is_in_progress() || !state.is_terminal() {
            return;
        }
        self.state = state;
        match state {
            GameState::Win => log::info!("YOU WIN! (score {})", self.score),
            GameState::Lose => log::info!("GAME OVER (score {})", self.score),
            GameState::InProgress => {}
        }
    }

    pub fn set_pass_through(&mut self, enabled: bool) {
        if self.pass_through == enabled {
            return;
        }
        self.pass_through = enabled;
        log::info!(
            "Pass-through {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Track the player's row after a committed move; returns true on a new
    /// best.
    pub fn record_move(&mut self, action: ActionKind) -> bool {
        match action {
            ActionKind::MoveForward => self.player_row += 1,
            ActionKind::MoveBack => self.player_row -= 1,
            _ => return false,
        }
        if self.player_row > self.score {
            self.score = self.player_row;
            log::info!("Score: {}", self.score);
            return true;
        }
        false
    }

    /// Transform applied on top of the entity's mesh matrix by its animation,
    /// identity when it has none.
    pub fn animation_mat(&self, id: EntityId) -> Mat4 {
        self.animations
            .get(id)
            .map(|animation| animation.mat)
            .unwrap_or(Mat4::IDENTITY)
    }
}
