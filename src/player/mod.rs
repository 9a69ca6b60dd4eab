//! Player tool domain — latches tool swings until their impact frame.
//!
//! Requires `FarmingPlugin`, which owns the grid the latched actions land on.

use bevy::prelude::*;
use crate::farming::events_handler;
use crate::shared::*;

pub mod latch;
mod tools;

pub use latch::{LatchError, PendingToolAction, ToolActionLatch, ToolTicket};

pub struct ToolLatchPlugin;

impl Plugin for ToolLatchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolActionLatch>()
            .add_event::<ToolUseEvent>()
            .add_event::<ToolImpactEvent>()
            .add_event::<ToolCancelEvent>()
            .add_event::<ToolResolvedEvent>()
            .add_event::<TileResetEvent>()
            .add_event::<DayStartedEvent>()
            .add_systems(
                Update,
                (
                    tools::clear_tool_actions_on_day_start,
                    tools::handle_tool_cancel,
                    tools::invalidate_on_tile_reset,
                    tools::expire_stale_tool_actions,
                    tools::handle_tool_use,
                    tools::handle_tool_impact,
                )
                    .chain()
                    .after(events_handler::on_day_started),
            );
    }
}
