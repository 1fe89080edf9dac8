//! Animation clip library and the system that ticks every animation.
//!
//! Clips come from animation definition files (`hop_core::animation`). The
//! library holds several files at once and resolves clips by name, either
//! inside one file or across all of them.

use std::collections::HashMap;
use std::path::Path;

use hop_core::animation::{load_animation_file, AnimationInfo};
use hop_core::{Context, EcsResult, EntityId, System};

use crate::registry::Registry;

/// Clips from multiple animation files, keyed by `animation_id` then clip name.
#[derive(Default)]
pub struct AnimationLibrary {
    clips: HashMap<String, HashMap<String, AnimationInfo>>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an animation file and register its clips under its `animation_id`.
    pub fn load_file(&mut self, path: &Path) -> Result<(), String> {
        let file = load_animation_file(path)?;
        log::info!(
            "Loaded {} animation clip(s) from '{}'",
            file.clips.len(),
            file.animation_id
        );
        self.clips.insert(file.animation_id, file.clips);
        Ok(())
    }

    #[allow(dead_code)]
    pub fn insert_clip(&mut self, animation_id: &str, name: &str, info: AnimationInfo) {
        self.clips
            .entry(animation_id.to_string())
            .or_default()
            .insert(name.to_string(), info);
    }

    /// Resolve a clip by name. With `source`, only that file is searched;
    /// otherwise files are searched in id order and the first match wins.
    pub fn resolve_clip(&self, source: Option<&str>, name: &str) -> Option<&AnimationInfo> {
        if let Some(source_id) = source {
            return self.clips.get(source_id).and_then(|clips| clips.get(name));
        }
        let mut ids: Vec<&String> = self.clips.keys().collect();
        ids.sort();
        ids.into_iter()
            .find_map(|id| self.clips.get(id).and_then(|clips| clips.get(name)))
    }

    pub fn clip_count(&self) -> usize {
        self.clips.values().map(HashMap::len).sum()
    }
}

/// Ticks every animation component by the frame's delta time.
pub struct AnimationSystem;

impl System<Registry> for AnimationSystem {
    fn name(&self) -> &'static str {
        "animation"
    }

    fn should_apply(&mut self, ctx: &Context<Registry>, id: EntityId) -> bool {
        ctx.registry.is_in_progress() && ctx.registry.animations.contains(id)
    }

    fn update_single(&mut self, ctx: &mut Context<Registry>, id: EntityId) -> EcsResult<()> {
        let dt = ctx.delta_time();
        if let Some(animation) = ctx.registry.animations.get_mut(id) {
            animation.tick(dt);
        }
        Ok(())
    }
}
