use hop_core::{Context, EcsResult, EntityId, System};

use crate::components::ActionKind;
use crate::registry::Registry;

/// Turns queued directional inputs into character actions, in arrival order.
pub struct InputHandlerSystem;

impl System<Registry> for InputHandlerSystem {
    fn name(&self) -> &'static str {
        "input"
    }

    fn should_apply(&mut self, ctx: &Context<Registry>, id: EntityId) -> bool {
        ctx.registry.is_in_progress() && ctx.registry.characters.contains(id)
    }

    fn update_single(&mut self, ctx: &mut Context<Registry>, id: EntityId) -> EcsResult<()> {
        let registry = &mut ctx.registry;
        let Some(character) = registry.characters.get_mut(id) else {
            return Ok(());
        };
        character
            .actions
            .extend(registry.input_queue.drain().map(ActionKind::from_input));
        Ok(())
    }
}
