//! Builds the frame's draw list from the entity graph.
//!
//! Roots are mesh entities without a parent. Each is drawn with
//! `mesh.mat * animation.mat`; its children are drawn relative to that, with
//! their own mesh and animation matrices appended, recursively. Children
//! without a mesh are skipped along with their subtree.

use glam::Mat4;
use hop_core::{Context, EcsResult, EntityId, EntityManager, System};

use crate::registry::{DrawItem, Registry};

pub struct RenderSystem;

impl System<Registry> for RenderSystem {
    fn name(&self) -> &'static str {
        "render"
    }

    fn should_apply(&mut self, ctx: &Context<Registry>, id: EntityId) -> bool {
        ctx.registry.meshes.contains(id) && ctx.entities.is_live(id) && ctx.entities.is_root(id)
    }

    fn pre_update(&mut self, ctx: &mut Context<Registry>) -> EcsResult<()> {
        ctx.registry.draw_list.clear();
        Ok(())
    }

    fn update_single(&mut self, ctx: &mut Context<Registry>, id: EntityId) -> EcsResult<()> {
        push_subtree(&ctx.entities, &mut ctx.registry, id, Mat4::IDENTITY);
        Ok(())
    }

    fn post_update(&mut self, ctx: &mut Context<Registry>) -> EcsResult<()> {
        log::trace!("Draw list: {} item(s)", ctx.registry.draw_list.len());
        Ok(())
    }
}

fn push_subtree(entities: &EntityManager, registry: &mut Registry, id: EntityId, base: Mat4) {
    let Some(mesh) = registry.meshes.get(id) else {
        return;
    };
    let model_index = mesh.model_index;
    let mat = base * mesh.mat * registry.animation_mat(id);
    registry.draw_list.push(DrawItem {
        entity: id,
        model_index,
        mat,
    });
    for &child in entities.children(id) {
        push_subtree(entities, registry, child, mat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Mesh;
    use crate::config::GameConfig;
    use crate::registry::GameState;
    use glam::Vec3;
    use hop_core::animation::Animation;

    fn render_world() -> Context<Registry> {
        let mut ctx = Context::new(Registry::new(GameConfig::default()));
        ctx.add_system(Box::new(RenderSystem));
        ctx
    }

    fn add_mesh(ctx: &mut Context<Registry>, model_index: usize, mat: Mat4) -> EntityId {
        let id = ctx.entities.next_id().expect("id");
        ctx.registry.meshes.insert(id, Mesh { model_index, mat });
        id
    }

    #[test]
    fn child_matrix_composes_parent_chain() {
        let mut ctx = render_world();
        let parent_mat = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let child_mat = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let parent = add_mesh(&mut ctx, 0, parent_mat);
        let child = add_mesh(&mut ctx, 1, child_mat);
        ctx.entities.link_parent_child(parent, child).expect("link");

        let parent_anim_mat = Mat4::from_translation(Vec3::new(0.0, 0.0, -0.25));
        let child_anim_mat = Mat4::from_rotation_x(0.5);
        for (id, mat) in [(parent, parent_anim_mat), (child, child_anim_mat)] {
            let mut animation = Animation::disabled();
            animation.mat = mat;
            ctx.registry.animations.insert(id, animation);
        }

        ctx.update(0.016).expect("frame");

        let draw_list = &ctx.registry.draw_list;
        assert_eq!(draw_list.len(), 2);
        let root_mat = parent_mat * parent_anim_mat;
        assert_eq!(draw_list[0].entity, parent);
        assert_eq!(draw_list[0].mat, root_mat);
        assert_eq!(draw_list[1].entity, child);
        assert_eq!(draw_list[1].model_index, 1);
        assert!(draw_list[1]
            .mat
            .abs_diff_eq(root_mat * child_mat * child_anim_mat, 1e-6));
    }

    #[test]
    fn children_without_mesh_are_skipped() {
        let mut ctx = render_world();
        let parent = add_mesh(&mut ctx, 0, Mat4::IDENTITY);
        let pivot = ctx.entities.next_id().expect("pivot");
        let grandchild = add_mesh(&mut ctx, 3, Mat4::IDENTITY);
        ctx.entities.link_parent_child(parent, pivot).expect("link");
        ctx.entities.link_parent_child(pivot, grandchild).expect("link");

        ctx.update(0.016).expect("frame");

        let drawn: Vec<_> = ctx.registry.draw_list.iter().map(|item| item.entity).collect();
        assert_eq!(drawn, vec![parent]);
    }

    #[test]
    fn draw_list_is_rebuilt_every_frame_even_after_game_over() {
        let mut ctx = render_world();
        let car = add_mesh(&mut ctx, 2, Mat4::IDENTITY);
        ctx.update(0.016).expect("frame");
        ctx.registry.finish(GameState::Lose);
        ctx.update(0.016).expect("frame");
        assert_eq!(ctx.registry.draw_list.len(), 1);

        ctx.registry.meshes.remove(car);
        ctx.update(0.016).expect("frame");
        assert!(ctx.registry.draw_list.is_empty());
    }
}
