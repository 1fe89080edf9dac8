//! Grid-hopping character: collision against the world each frame, then the
//! action queue once the frame's blocked set is known.
//!
//! A move is an animation from identity to one grid step. While it plays the
//! mesh stays put; the step is folded into the mesh matrix on the frame after
//! the animation reports `Finished`, and only then is the next action popped.

use glam::{Mat4, Vec3};
use hop_core::animation::{Animation, AnimationInfo, AnimationKind};
use hop_core::{Context, EcsResult, EntityId, System};

use crate::collision::{character_world_box, mesh_world_box};
use crate::components::ActionKind;
use crate::registry::{GameState, Registry};

/// One-shot clip translating by `displacement` over `duration` seconds.
pub fn move_clip(displacement: Vec3, duration: f32) -> AnimationInfo {
    AnimationInfo::new(AnimationKind::Once)
        .with_keyframe(0.0, Mat4::IDENTITY)
        .with_keyframe(duration, Mat4::from_translation(displacement))
}

pub struct CharacterSystem;

impl System<Registry> for CharacterSystem {
    fn name(&self) -> &'static str {
        "character"
    }

    fn should_apply(&mut self, ctx: &Context<Registry>, id: EntityId) -> bool {
        let registry = &ctx.registry;
        registry.is_in_progress()
            && (registry.action_restrictions.contains(id)
                || registry.win_zones.contains(id)
                || registry.cars.contains(id)
                || registry.shoe_items.contains(id))
    }

    fn pre_update(&mut self, ctx: &mut Context<Registry>) -> EcsResult<()> {
        ctx.registry.blocked_actions.clear();
        Ok(())
    }

    fn update_single(&mut self, ctx: &mut Context<Registry>, id: EntityId) -> EcsResult<()> {
        let Some(character_bb) = character_world_box(&ctx.registry) else {
            return Ok(());
        };
        let registry = &mut ctx.registry;

        if let Some(zone) = registry.action_restrictions.get(id) {
            if registry.pass_through && !zone.ignore_passthrough {
                return Ok(());
            }
            if character_bb.intersect_with(&zone.bounding_box) {
                registry
                    .blocked_actions
                    .extend(zone.restrictions.iter().copied());
            }
        } else if let Some(zone) = registry.win_zones.get(id) {
            if character_bb.contained_in(&zone.bounding_box) {
                registry.finish(GameState::Win);
            }
        } else if let Some(shoe) = registry.shoe_items.get(id) {
            let shoe_bb = mesh_world_box(registry, id, &shoe.model_bb);
            if !shoe_bb.intersect_with(&character_bb) {
                return Ok(());
            }
            registry.meshes.remove(id);
            registry.shoe_items.remove(id);
            if let Some(character) = registry
                .character_id
                .and_then(|character_id| registry.characters.get_mut(character_id))
            {
                character.actions.push_back(ActionKind::WearShoe);
            }
            ctx.entities.remove_id(id)?;
            log::info!("Picked up shoe {}", id);
        } else if let Some(car) = registry.cars.get(id) {
            if registry.pass_through {
                return Ok(());
            }
            let car_bb = mesh_world_box(registry, id, &car.model_bb);
            if car_bb.intersect_with(&character_bb) {
                log::debug!("Character hit by car {}", id);
                registry.finish(GameState::Lose);
            }
        }
        Ok(())
    }

    fn post_update(&mut self, ctx: &mut Context<Registry>) -> EcsResult<()> {
        let Some(character_id) = ctx.registry.character_id else {
            return Ok(());
        };
        commit_finished_move(&mut ctx.registry, character_id);
        start_next_action(ctx, character_id);
        Ok(())
    }
}

/// Fold a finished move into the mesh matrix and park the animation.
fn commit_finished_move(registry: &mut Registry, character_id: EntityId) {
    let step_size = registry.config.step_size;
    let (Some(character), Some(mesh), Some(animation)) = (
        registry.characters.get(character_id),
        registry.meshes.get_mut(character_id),
        registry.animations.get_mut(character_id),
    ) else {
        return;
    };
    if !animation.is_finished() {
        return;
    }

    let committed = character.current_action;
    if let Some(displacement) = committed.and_then(|action| action.displacement(step_size)) {
        mesh.mat *= Mat4::from_translation(displacement);
    }
    animation.disable();
    animation.reset();
    // The step now lives in the mesh matrix.
    animation.mat = Mat4::IDENTITY;

    if let Some(action) = committed {
        registry.record_move(action);
    }
}

/// Pop the next queued action unless a move is still animating. Actions that
/// are blocked this frame are dropped.
fn start_next_action(ctx: &mut Context<Registry>, character_id: EntityId) {
    let registry = &mut ctx.registry;
    if registry
        .animations
        .get(character_id)
        .is_some_and(Animation::is_running)
    {
        return;
    }
    let Some(character) = registry.characters.get_mut(character_id) else {
        return;
    };
    let Some(action) = character.actions.pop_front() else {
        return;
    };
    if registry.blocked_actions.contains(&action) {
        log::debug!("Action {:?} blocked", action);
        return;
    }

    match action.displacement(registry.config.step_size) {
        Some(displacement) => {
            let duration = registry.config.move_duration / character.speed_multiplier;
            character.current_action = Some(action);
            let clip = move_clip(displacement, duration);
            match registry.animations.get_mut(character_id) {
                Some(animation) => animation.set(clip),
                None => {
                    registry.animations.insert(character_id, Animation::new(clip));
                }
            }
        }
        None => {
            let multiplier = registry.config.shoe_multiplier;
            character.speed_multiplier *= multiplier;
            log::info!("Speed multiplier now {}", character.speed_multiplier);
            for &child in ctx.entities.children(character_id) {
                if let Some(animation) = registry.animations.get_mut(child) {
                    let scaled = animation.info.time_scaled(multiplier);
                    animation.set(scaled);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ActionRestriction, Car, Character, Mesh, ShoeItem, WinZone};
    use crate::config::GameConfig;
    use hop_core::bounding_box::BoundingBox3D;

    fn small_box() -> BoundingBox3D {
        BoundingBox3D::new(Vec3::splat(-0.05), Vec3::splat(0.05))
    }

    /// Context with just the character system and a character at `position`.
    fn world_with_character(position: Vec3) -> (Context<Registry>, EntityId) {
        let mut ctx = Context::new(Registry::new(GameConfig::default()));
        ctx.add_system(Box::new(CharacterSystem));
        let id = ctx.entities.next_id().expect("character id");
        let registry = &mut ctx.registry;
        registry.character_id = Some(id);
        registry.characters.insert(id, Character::new(small_box()));
        registry.meshes.insert(
            id,
            Mesh {
                model_index: 0,
                mat: Mat4::from_translation(position),
            },
        );
        registry.animations.insert(id, Animation::disabled());
        (ctx, id)
    }

    fn spawn_at(ctx: &mut Context<Registry>, position: Vec3) -> EntityId {
        let id = ctx.entities.next_id().expect("entity id");
        ctx.registry.meshes.insert(
            id,
            Mesh {
                model_index: 1,
                mat: Mat4::from_translation(position),
            },
        );
        id
    }

    #[test]
    fn restriction_blocks_and_drops_action() {
        let (mut ctx, character) = world_with_character(Vec3::ZERO);
        let zone = ctx.entities.next_id().expect("zone id");
        ctx.registry.action_restrictions.insert(
            zone,
            ActionRestriction {
                bounding_box: BoundingBox3D::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
                restrictions: vec![ActionKind::MoveLeft],
                ignore_passthrough: false,
            },
        );
        ctx.registry
            .characters
            .get_mut(character)
            .expect("character")
            .actions
            .push_back(ActionKind::MoveLeft);

        ctx.update(0.016).expect("frame");

        assert!(ctx.registry.blocked_actions.contains(&ActionKind::MoveLeft));
        let character_state = ctx.registry.characters.get(character).expect("character");
        assert!(character_state.actions.is_empty());
        assert_eq!(character_state.current_action, None);
        assert_eq!(
            ctx.registry.animations.get(character).expect("animation").info.kind,
            AnimationKind::Disabled
        );
    }

    #[test]
    fn pass_through_skips_soft_restrictions_only() {
        let (mut ctx, _) = world_with_character(Vec3::ZERO);
        ctx.registry.pass_through = true;
        for (action, ignore_passthrough) in
            [(ActionKind::MoveLeft, false), (ActionKind::MoveRight, true)]
        {
            let zone = ctx.entities.next_id().expect("zone id");
            ctx.registry.action_restrictions.insert(
                zone,
                ActionRestriction {
                    bounding_box: BoundingBox3D::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
                    restrictions: vec![action],
                    ignore_passthrough,
                },
            );
        }

        ctx.update(0.016).expect("frame");

        assert!(!ctx.registry.blocked_actions.contains(&ActionKind::MoveLeft));
        assert!(ctx.registry.blocked_actions.contains(&ActionKind::MoveRight));
    }

    #[test]
    fn blocked_set_is_rebuilt_each_frame() {
        let (mut ctx, _) = world_with_character(Vec3::ZERO);
        ctx.registry.blocked_actions.insert(ActionKind::MoveBack);
        ctx.update(0.016).expect("frame");
        assert!(ctx.registry.blocked_actions.is_empty());
    }

    #[test]
    fn win_requires_full_containment() {
        let (mut ctx, _) = world_with_character(Vec3::new(0.0, 0.0, -2.0));
        let zone = ctx.entities.next_id().expect("zone id");
        // Overlaps the character but does not contain it.
        ctx.registry.win_zones.insert(
            zone,
            WinZone {
                bounding_box: BoundingBox3D::new(
                    Vec3::new(0.0, -1.0, -3.0),
                    Vec3::new(1.0, 1.0, -1.0),
                ),
            },
        );
        ctx.update(0.016).expect("frame");
        assert_eq!(ctx.registry.state, GameState::InProgress);

        ctx.registry.win_zones.insert(
            zone,
            WinZone {
                bounding_box: BoundingBox3D::new(
                    Vec3::new(-1.0, -1.0, -3.0),
                    Vec3::new(1.0, 1.0, -1.0),
                ),
            },
        );
        ctx.update(0.016).expect("frame");
        assert_eq!(ctx.registry.state, GameState::Win);
    }

    #[test]
    fn car_contact_loses_unless_pass_through() {
        let (mut ctx, _) = world_with_character(Vec3::ZERO);
        let car = spawn_at(&mut ctx, Vec3::new(0.05, 0.0, 0.0));
        ctx.registry.cars.insert(
            car,
            Car {
                vel: Vec3::new(1.0, 0.0, 0.0),
                model_bb: small_box(),
            },
        );

        ctx.registry.pass_through = true;
        ctx.update(0.016).expect("frame");
        assert_eq!(ctx.registry.state, GameState::InProgress);

        ctx.registry.pass_through = false;
        ctx.update(0.016).expect("frame");
        assert_eq!(ctx.registry.state, GameState::Lose);
    }

    #[test]
    fn shoe_pickup_removes_entity_and_queues_wear() {
        let (mut ctx, character) = world_with_character(Vec3::ZERO);
        let shoe = spawn_at(&mut ctx, Vec3::new(0.02, 0.0, 0.0));
        ctx.registry.shoe_items.insert(
            shoe,
            ShoeItem {
                model_bb: small_box(),
            },
        );

        ctx.update(0.016).expect("frame");

        assert!(!ctx.entities.is_live(shoe));
        assert!(!ctx.registry.meshes.contains(shoe));
        assert!(!ctx.registry.shoe_items.contains(shoe));
        // Queued during the scan, consumed in the same frame's post pass.
        let character_state = ctx.registry.characters.get(character).expect("character");
        assert!(character_state.actions.is_empty());
        assert_eq!(character_state.speed_multiplier, 2.0);
    }

    #[test]
    fn wear_shoe_speeds_up_child_animations() {
        let (mut ctx, character) = world_with_character(Vec3::ZERO);
        let leg = ctx.entities.next_id().expect("leg id");
        ctx.entities
            .link_parent_child(character, leg)
            .expect("link leg");
        ctx.registry.animations.insert(
            leg,
            Animation::new(
                AnimationInfo::new(AnimationKind::Loop)
                    .with_keyframe(0.0, Mat4::IDENTITY)
                    .with_keyframe(0.4, Mat4::from_rotation_x(0.5)),
            ),
        );
        ctx.registry
            .characters
            .get_mut(character)
            .expect("character")
            .actions
            .push_back(ActionKind::WearShoe);

        ctx.update(0.016).expect("frame");

        let leg_animation = ctx.registry.animations.get(leg).expect("leg animation");
        assert!((leg_animation.info.duration() - 0.2).abs() < 1e-6);
        assert_eq!(leg_animation.info.kind, AnimationKind::Loop);
    }

    #[test]
    fn move_starts_then_commits_after_finish() {
        let (mut ctx, character) = world_with_character(Vec3::ZERO);
        ctx.registry
            .characters
            .get_mut(character)
            .expect("character")
            .actions
            .push_back(ActionKind::MoveForward);

        ctx.update(0.016).expect("frame");
        let animation = ctx.registry.animations.get(character).expect("animation");
        assert_eq!(animation.info.kind, AnimationKind::Once);
        assert!((animation.info.duration() - 0.2).abs() < 1e-6);
        assert_eq!(
            ctx.registry.characters.get(character).expect("character").current_action,
            Some(ActionKind::MoveForward)
        );

        // No animation system here, so mark it done by hand.
        let animation = ctx
            .registry
            .animations
            .get_mut(character)
            .expect("animation");
        animation.state = hop_core::animation::AnimationState::Finished;
        animation.mat = Mat4::from_translation(Vec3::new(0.0, 0.0, -0.25));

        ctx.update(0.016).expect("frame");
        let mesh = ctx.registry.meshes.get(character).expect("mesh");
        assert!((mesh.mat.w_axis.z + 0.25).abs() < 1e-6);
        let animation = ctx.registry.animations.get(character).expect("animation");
        assert_eq!(animation.info.kind, AnimationKind::Disabled);
        assert_eq!(animation.mat, Mat4::IDENTITY);
        assert_eq!(ctx.registry.player_row, 1);
        assert_eq!(ctx.registry.score, 1);
    }

    #[test]
    fn queued_action_waits_for_running_move() {
        let (mut ctx, character) = world_with_character(Vec3::ZERO);
        let animation = ctx
            .registry
            .animations
            .get_mut(character)
            .expect("animation");
        animation.set(move_clip(Vec3::new(0.25, 0.0, 0.0), 0.2));
        animation.state = hop_core::animation::AnimationState::Running;
        ctx.registry
            .characters
            .get_mut(character)
            .expect("character")
            .actions
            .push_back(ActionKind::MoveBack);

        ctx.update(0.016).expect("frame");

        assert_eq!(
            ctx.registry.characters.get(character).expect("character").actions.len(),
            1
        );
    }
}
