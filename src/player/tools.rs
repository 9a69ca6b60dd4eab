use bevy::prelude::*;
use crate::farming::FarmGrid;
use crate::shared::*;
use super::latch::ToolActionLatch;

/// Latch each new swing until its impact frame.
pub fn handle_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut latch: ResMut<ToolActionLatch>,
    grid: Res<FarmGrid>,
    time: Res<Time>,
) {
    for event in tool_events.read() {
        if !grid.is_valid_tile(event.coordinate) {
            debug!("[Tools] Swing at {} is off the farm", event.coordinate);
            continue;
        }
        match latch.submit(event.actor, event.coordinate, event.intent.clone(), time.elapsed()) {
            Ok(ticket) => debug!("[Tools] {:?} latched for {:?}", ticket, event.actor),
            Err(err) => debug!("[Tools] {}", err),
        }
    }
}

/// Apply the latched action when the animation lands.
pub fn handle_tool_impact(
    mut impact_events: EventReader<ToolImpactEvent>,
    mut latch: ResMut<ToolActionLatch>,
    mut grid: ResMut<FarmGrid>,
    time: Res<Time>,
    mut resolved_events: EventWriter<ToolResolvedEvent>,
) {
    for event in impact_events.read() {
        let Some(coordinate) = latch.pending(event.actor).map(|action| action.coordinate) else {
            continue;
        };
        match latch.resolve_for_actor(event.actor, time.elapsed(), &mut grid) {
            Ok(outcome) => {
                if outcome == ToolOutcome::Cleared {
                    latch.invalidate_coordinate(coordinate);
                }
                resolved_events.send(ToolResolvedEvent {
                    actor: event.actor,
                    coordinate,
                    outcome,
                });
            }
            Err(err) => debug!("[Tools] {}", err),
        }
    }
}

pub fn handle_tool_cancel(
    mut cancel_events: EventReader<ToolCancelEvent>,
    mut latch: ResMut<ToolActionLatch>,
) {
    for event in cancel_events.read() {
        if latch.cancel_actor(event.actor) {
            debug!("[Tools] Cancelled pending swing for {:?}", event.actor);
        }
    }
}

/// A reset tile is no longer the tile the swing was aimed at.
pub fn invalidate_on_tile_reset(
    mut reset_events: EventReader<TileResetEvent>,
    mut latch: ResMut<ToolActionLatch>,
) {
    for event in reset_events.read() {
        latch.invalidate_coordinate(event.coordinate);
    }
}

pub fn expire_stale_tool_actions(mut latch: ResMut<ToolActionLatch>, time: Res<Time>) {
    if latch.timeout().is_none() || latch.is_empty() {
        return;
    }
    let expired = latch.sweep_expired(time.elapsed());
    if expired > 0 {
        debug!("[Tools] {} pending swing(s) expired", expired);
    }
}

/// Nothing survives the night.
pub fn clear_tool_actions_on_day_start(
    mut day_events: EventReader<DayStartedEvent>,
    mut latch: ResMut<ToolActionLatch>,
) {
    if day_events.read().count() == 0 {
        return;
    }
    let dropped = latch.clear();
    if dropped > 0 {
        debug!("[Tools] Dropped {} pending swing(s) at day start", dropped);
    }
}
