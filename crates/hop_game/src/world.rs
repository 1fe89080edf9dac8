//! World assembly and the headless frame driver.

use hop_core::animation::AnimationKind;
use hop_core::time::FrameClock;
use hop_core::{Context, EcsResult, EntityManager};

use crate::animation::AnimationSystem;
use crate::car::CarSystem;
use crate::character::CharacterSystem;
use crate::config::GameConfig;
use crate::input_handler::InputHandlerSystem;
use crate::registry::{GameState, Registry};
use crate::render::RenderSystem;
use crate::replay::{ReplaySequence, ReplayStep};

/// Frames the driver keeps running after the replay ends, waiting for queued
/// moves to finish.
pub const MAX_SETTLE_FRAMES: u64 = 600;

/// Empty world with every game system registered in frame order.
pub fn build_world(config: GameConfig) -> Context<Registry> {
    let entities = EntityManager::with_max_entities(config.max_entities);
    let mut ctx = Context::with_entities(entities, Registry::new(config));
    ctx.add_system(Box::new(InputHandlerSystem));
    ctx.add_system(Box::new(CarSystem));
    ctx.add_system(Box::new(CharacterSystem));
    ctx.add_system(Box::new(AnimationSystem));
    ctx.add_system(Box::new(RenderSystem));
    ctx
}

pub fn apply_step(registry: &mut Registry, step: &ReplayStep) {
    if let Some(enabled) = step.pass_through {
        registry.set_pass_through(enabled);
    }
    if let Some(input) = step.input {
        registry.input_queue.push(input);
    }
}

/// True once nothing is left to play out: the game is over, or no input or
/// action is queued and no move is animating.
pub fn is_settled(registry: &Registry) -> bool {
    if registry.state.is_terminal() {
        return true;
    }
    if !registry.input_queue.is_empty() {
        return false;
    }
    let Some(id) = registry.character_id else {
        return true;
    };
    let no_actions = registry
        .characters
        .get(id)
        .map_or(true, |character| character.actions.is_empty());
    let no_move = registry
        .animations
        .get(id)
        .map_or(true, |animation| animation.info.kind == AnimationKind::Disabled);
    no_actions && no_move
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub state: GameState,
    pub frames: u64,
    pub score: i32,
}

/// Play `replay` frame by frame at its fixed timestep until it is exhausted
/// and the world has settled, or the game ends.
pub fn run_replay(ctx: &mut Context<Registry>, replay: &ReplaySequence) -> EcsResult<RunSummary> {
    let max_frame_dt = ctx.registry.config.max_frame_dt.max(replay.fixed_dt);
    let mut clock = FrameClock::new(replay.fixed_dt, max_frame_dt);
    let mut steps = replay.expanded_steps().into_iter();
    let mut settle_frames = 0;

    while !ctx.registry.state.is_terminal() {
        clock.advance(clock.fixed_dt);
        while clock.should_step() {
            match steps.next() {
                Some(step) => apply_step(&mut ctx.registry, &step),
                None => settle_frames += 1,
            }
            ctx.update(clock.fixed_dt)?;
        }

        if steps.len() == 0 {
            if is_settled(&ctx.registry) {
                break;
            }
            if settle_frames >= MAX_SETTLE_FRAMES {
                log::warn!(
                    "World did not settle within {} frames after the replay ended",
                    MAX_SETTLE_FRAMES
                );
                break;
            }
        }
    }

    Ok(RunSummary {
        state: ctx.registry.state,
        frames: ctx.frame_count(),
        score: ctx.registry.score,
    })
}
