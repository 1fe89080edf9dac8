use glam::{Mat4, Vec3};
use hop_core::{Context, EcsResult, EntityId, System};

use crate::registry::Registry;

/// Drives cars along their velocity and wraps them back across the road once
/// they leave the visible band.
pub struct CarSystem;

impl System<Registry> for CarSystem {
    fn name(&self) -> &'static str {
        "car"
    }

    fn should_apply(&mut self, ctx: &Context<Registry>, id: EntityId) -> bool {
        ctx.registry.is_in_progress() && ctx.registry.cars.contains(id)
    }

    fn update_single(&mut self, ctx: &mut Context<Registry>, id: EntityId) -> EcsResult<()> {
        let dt = ctx.delta_time();
        let registry = &mut ctx.registry;
        let config = registry.config;
        let (Some(car), Some(mesh)) = (registry.cars.get(id), registry.meshes.get_mut(id)) else {
            return Ok(());
        };

        let bb = car.model_bb.transform(&mesh.mat);
        let offset = config.wrap_offset();
        if car.vel.x < 0.0 && bb.max_point.x < config.wrap_left_threshold() {
            mesh.mat = Mat4::from_translation(Vec3::new(offset, 0.0, 0.0)) * mesh.mat;
            log::trace!("Car {} wrapped to the right", id);
        } else if car.vel.x > 0.0 && bb.min_point.x > config.wrap_right_threshold() {
            mesh.mat = Mat4::from_translation(Vec3::new(-offset, 0.0, 0.0)) * mesh.mat;
            log::trace!("Car {} wrapped to the left", id);
        }

        mesh.mat = Mat4::from_translation(car.vel * dt) * mesh.mat;
        Ok(())
    }
}
