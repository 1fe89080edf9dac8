use serde::Deserialize;

/// Tunables for the playfield and movement. Scene files may override any
/// subset; missing fields fall back to `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Columns across the playfield.
    pub grid_size: u32,
    /// World size of one grid cell.
    pub step_size: f32,
    /// Seconds one move animation takes at speed multiplier 1.
    pub move_duration: f32,
    /// Speed factor granted by each shoe pickup.
    pub shoe_multiplier: f32,
    pub max_entities: usize,
    pub wrap_left_factor: f32,
    pub wrap_right_factor: f32,
    pub wrap_offset_factor: f32,
    /// Longest real frame the clock accepts before capping.
    pub max_frame_dt: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        let grid_size = 8;
        Self {
            grid_size,
            step_size: 2.0 / grid_size as f32,
            move_duration: 0.2,
            shoe_multiplier: 2.0,
            max_entities: hop_core::entities::DEFAULT_MAX_ENTITIES,
            wrap_left_factor: 2.0,
            wrap_right_factor: 1.0,
            wrap_offset_factor: 3.0,
            max_frame_dt: 0.25,
        }
    }
}

impl GameConfig {
    fn world_width(&self) -> f32 {
        self.step_size * self.grid_size as f32
    }

    /// Cars moving left wrap once their right edge is below this X.
    pub fn wrap_left_threshold(&self) -> f32 {
        -self.world_width() * self.wrap_left_factor
    }

    /// Cars moving right wrap once their left edge is beyond this X.
    pub fn wrap_right_threshold(&self) -> f32 {
        self.world_width() * self.wrap_right_factor
    }

    pub fn wrap_offset(&self) -> f32 {
        self.world_width() * self.wrap_offset_factor
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.grid_size == 0 {
            return Err("Config validation failed: grid_size must be > 0".to_string());
        }
        if self.step_size <= 0.0 {
            return Err("Config validation failed: step_size must be > 0".to_string());
        }
        if self.move_duration <= 0.0 {
            return Err("Config validation failed: move_duration must be > 0".to_string());
        }
        if self.shoe_multiplier <= 0.0 {
            return Err("Config validation failed: shoe_multiplier must be > 0".to_string());
        }
        if self.max_entities == 0 {
            return Err("Config validation failed: max_entities must be > 0".to_string());
        }
        if self.max_frame_dt <= 0.0 {
            return Err("Config validation failed: max_frame_dt must be > 0".to_string());
        }
        Ok(())
    }
}
