//! The per-frame system protocol and the world context that drives it.
//!
//! Each frame the context runs every registered system in registration order:
//!
//!   1. `pre_update` once
//!   2. for every id in `[0, end_id)`, ascending, `update_single` if
//!      `should_apply` accepts it
//!   3. `post_update` once
//!
//! The scan includes freed and never-populated ids, so `should_apply` must
//! check component presence itself. Systems never call each other; they talk
//! through the registry, and later systems see what earlier ones wrote in the
//! same frame. The elapsed time is fixed before the first system runs and is
//! stable for the whole frame.

use crate::entities::{EntityId, EntityManager};
use crate::error::EcsResult;

pub trait System<R> {
    fn name(&self) -> &'static str;

    fn should_apply(&mut self, _ctx: &Context<R>, _id: EntityId) -> bool {
        true
    }

    fn pre_update(&mut self, _ctx: &mut Context<R>) -> EcsResult<()> {
        Ok(())
    }

    fn update_single(&mut self, ctx: &mut Context<R>, id: EntityId) -> EcsResult<()>;

    fn post_update(&mut self, _ctx: &mut Context<R>) -> EcsResult<()> {
        Ok(())
    }
}

/// Run one system's full frame pass against `ctx`.
pub fn run_system<R>(system: &mut dyn System<R>, ctx: &mut Context<R>) -> EcsResult<()> {
    system.pre_update(ctx)?;

    // `end_id` is re-read every step so ids allocated mid-pass are visited.
    let mut index = 0;
    while index < ctx.entities.end_id().index() {
        let id = EntityId::from_index(index);
        if system.should_apply(ctx, id) {
            system.update_single(ctx, id)?;
        }
        index += 1;
    }

    system.post_update(ctx)
}

/// World context: entity manager, registry and the ordered system list.
pub struct Context<R> {
    pub entities: EntityManager,
    pub registry: R,
    systems: Vec<Box<dyn System<R>>>,
    delta_time: f32,
    frame_count: u64,
}

impl<R> Context<R> {
    pub fn new(registry: R) -> Self {
        Self::with_entities(EntityManager::new(), registry)
    }

    pub fn with_entities(entities: EntityManager, registry: R) -> Self {
        Self {
            entities,
            registry,
            systems: Vec::new(),
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    /// Append a system; it runs after every system registered before it.
    pub fn add_system(&mut self, system: Box<dyn System<R>>) {
        log::debug!("Registered system '{}'", system.name());
        self.systems.push(system);
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Seconds elapsed since the previous frame.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance one frame of `delta_time` seconds. Stops at the first system
    /// error; the remaining systems do not run for this frame.
    pub fn update(&mut self, delta_time: f32) -> EcsResult<()> {
        self.delta_time = delta_time;

        let mut systems = std::mem::take(&mut self.systems);
        let result = systems
            .iter_mut()
            .try_for_each(|system| run_system(system.as_mut(), self));
        // Keep anything registered while the frame was running.
        systems.append(&mut self.systems);
        self.systems = systems;

        self.frame_count += 1;
        result
    }
}
