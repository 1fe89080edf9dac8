//! World-space bounding boxes for the entities the character can touch.
//!
//! Model-space boxes live on the components; gameplay compares them after
//! pushing them through the entity's current transforms. The character box
//! includes the in-flight move animation, so a hop is judged where the
//! character is drawn, not where the last committed step left it.

use glam::Mat4;
use hop_core::bounding_box::BoundingBox3D;
use hop_core::EntityId;

use crate::registry::Registry;

/// `model_bb` pushed through the entity's mesh matrix. Entities without a
/// mesh are treated as sitting at the origin.
pub fn mesh_world_box(registry: &Registry, id: EntityId, model_bb: &BoundingBox3D) -> BoundingBox3D {
    let mat = registry
        .meshes
        .get(id)
        .map(|mesh| mesh.mat)
        .unwrap_or(Mat4::IDENTITY);
    model_bb.transform(&mat)
}

/// The controlled character's box under `mesh.mat * animation.mat`.
/// `None` when there is no character or it has no mesh.
pub fn character_world_box(registry: &Registry) -> Option<BoundingBox3D> {
    let id = registry.character_id?;
    let character = registry.characters.get(id)?;
    let mesh = registry.meshes.get(id)?;
    let mat = mesh.mat * registry.animation_mat(id);
    Some(character.model_bb.transform(&mat))
}
