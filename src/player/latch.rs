//! Single-slot pending tool action per actor.
//!
//! A swing is submitted when input fires and resolved when the animation's
//! impact frame arrives. Between the two the intent sits here; a second swing
//! from the same actor is refused until the first is resolved or cancelled.

use bevy::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::data::FarmConfig;
use crate::farming::FarmGrid;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PendingToolAction {
    pub ticket: ToolTicket,
    pub actor: Entity,
    pub coordinate: GridCoordinate,
    pub intent: ToolIntent,
    pub submitted_at: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatchError {
    #[error("actor {actor:?} already has tool action {pending:?} pending")]
    PendingActionRejected { actor: Entity, pending: ToolTicket },

    #[error("tool action {0:?} is not pending")]
    UnknownTicket(ToolTicket),

    #[error("tool action {0:?} expired before its impact frame")]
    Expired(ToolTicket),

    #[error("actor {0:?} has no pending tool action")]
    NothingPending(Entity),
}

#[derive(Resource, Debug)]
pub struct ToolActionLatch {
    pending: HashMap<Entity, PendingToolAction>,
    next_ticket: u64,
    timeout: Option<Duration>,
}

impl FromWorld for ToolActionLatch {
    fn from_world(world: &mut World) -> Self {
        let Some(config) = world.get_resource::<FarmConfig>() else {
            return Self::new(None);
        };
        if let Err(err) = config.validate() {
            warn!("[Tools] {}", err);
        }
        Self::new(config.latch_timeout())
    }
}

impl ToolActionLatch {
    /// `timeout: None` keeps a pending action until it is resolved or cancelled.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            pending: HashMap::new(),
            next_ticket: 0,
            timeout,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn pending(&self, actor: Entity) -> Option<&PendingToolAction> {
        self.pending.get(&actor)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Latch a tool intent for `actor`. Refused while another is pending;
    /// the earlier one stays queued.
    pub fn submit(
        &mut self,
        actor: Entity,
        coordinate: GridCoordinate,
        intent: ToolIntent,
        now: Duration,
    ) -> Result<ToolTicket, LatchError> {
        if let Some(existing) = self.pending.get(&actor) {
            return Err(LatchError::PendingActionRejected {
                actor,
                pending: existing.ticket,
            });
        }
        self.next_ticket += 1;
        let ticket = ToolTicket(self.next_ticket);
        self.pending.insert(
            actor,
            PendingToolAction {
                ticket,
                actor,
                coordinate,
                intent,
                submitted_at: now,
            },
        );
        Ok(ticket)
    }

    /// Consume `ticket` and apply its intent to the grid. The ticket is gone
    /// afterwards whatever the outcome, so an action never applies twice.
    pub fn resolve(
        &mut self,
        ticket: ToolTicket,
        now: Duration,
        grid: &mut FarmGrid,
    ) -> Result<ToolOutcome, LatchError> {
        let actor = self
            .pending
            .values()
            .find(|action| action.ticket == ticket)
            .map(|action| action.actor)
            .ok_or(LatchError::UnknownTicket(ticket))?;
        self.resolve_for_actor(actor, now, grid)
    }

    /// Impact frames identify the actor, not the ticket.
    pub fn resolve_for_actor(
        &mut self,
        actor: Entity,
        now: Duration,
        grid: &mut FarmGrid,
    ) -> Result<ToolOutcome, LatchError> {
        let action = self
            .pending
            .remove(&actor)
            .ok_or(LatchError::NothingPending(actor))?;
        if self.is_expired(&action, now) {
            return Err(LatchError::Expired(action.ticket));
        }
        Ok(grid.apply_tool(action.coordinate, &action.intent))
    }

    pub fn cancel(&mut self, ticket: ToolTicket) -> bool {
        let before = self.pending.len();
        self.pending.retain(|_, action| action.ticket != ticket);
        self.pending.len() != before
    }

    /// Tool switched or unequipped.
    pub fn cancel_actor(&mut self, actor: Entity) -> bool {
        self.pending.remove(&actor).is_some()
    }

    /// Drop every pending action aimed at `coordinate`. Returns how many.
    pub fn invalidate_coordinate(&mut self, coordinate: GridCoordinate) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, action| action.coordinate != coordinate);
        before - self.pending.len()
    }

    /// Drop actions older than the timeout. Returns how many.
    pub fn sweep_expired(&mut self, now: Duration) -> usize {
        let Some(timeout) = self.timeout else {
            return 0;
        };
        let before = self.pending.len();
        self.pending
            .retain(|_, action| now.saturating_sub(action.submitted_at) <= timeout);
        before - self.pending.len()
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    fn is_expired(&self, action: &PendingToolAction, now: Duration) -> bool {
        self.timeout
            .is_some_and(|timeout| now.saturating_sub(action.submitted_at) > timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FertilizerTable;

    fn grid() -> FarmGrid {
        let config = FarmConfig {
            width: 4,
            height: 4,
            ..default()
        };
        FarmGrid::new(&config, FertilizerTable::default())
    }

    fn actor(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    const AT: GridCoordinate = GridCoordinate::new(1, 2);

    #[test]
    fn resolve_applies_exactly_once() {
        let mut grid = grid();
        let mut latch = ToolActionLatch::new(None);
        let ticket = latch.submit(actor(1), AT, ToolIntent::Hoe, Duration::ZERO).unwrap();

        assert_eq!(
            latch.resolve(ticket, Duration::ZERO, &mut grid),
            Ok(ToolOutcome::Tilled)
        );
        assert_eq!(grid.tile(AT).unwrap().state(), TileState::Tilled);
        assert_eq!(
            latch.resolve(ticket, Duration::ZERO, &mut grid),
            Err(LatchError::UnknownTicket(ticket))
        );
        assert!(latch.is_empty());
    }

    #[test]
    fn second_submit_is_rejected_and_first_kept() {
        let mut latch = ToolActionLatch::new(None);
        let first = latch.submit(actor(1), AT, ToolIntent::Hoe, Duration::ZERO).unwrap();
        let second = latch.submit(
            actor(1),
            AT.offset(1, 0),
            ToolIntent::WateringCan,
            Duration::ZERO,
        );
        assert_eq!(
            second,
            Err(LatchError::PendingActionRejected {
                actor: actor(1),
                pending: first
            })
        );
        let pending = latch.pending(actor(1)).unwrap();
        assert_eq!(pending.ticket, first);
        assert_eq!(pending.intent, ToolIntent::Hoe);

        // Other actors have their own slot.
        assert!(latch
            .submit(actor(2), AT, ToolIntent::Hoe, Duration::ZERO)
            .is_ok());
        assert_eq!(latch.len(), 2);
    }

    #[test]
    fn failed_guard_still_consumes_ticket() {
        let mut grid = grid();
        let mut latch = ToolActionLatch::new(None);
        latch
            .submit(actor(1), AT, ToolIntent::WateringCan, Duration::ZERO)
            .unwrap();
        assert_eq!(
            latch.resolve_for_actor(actor(1), Duration::ZERO, &mut grid),
            Ok(ToolOutcome::Rejected(RejectReason::GuardFailed))
        );
        assert!(latch.pending(actor(1)).is_none());
        assert_eq!(
            latch.resolve_for_actor(actor(1), Duration::ZERO, &mut grid),
            Err(LatchError::NothingPending(actor(1)))
        );
    }

    #[test]
    fn cancel_frees_the_slot() {
        let mut latch = ToolActionLatch::new(None);
        let ticket = latch.submit(actor(1), AT, ToolIntent::Hoe, Duration::ZERO).unwrap();
        assert!(latch.cancel(ticket));
        assert!(!latch.cancel(ticket));
        assert!(latch.submit(actor(1), AT, ToolIntent::Hoe, Duration::ZERO).is_ok());
        assert!(latch.cancel_actor(actor(1)));
        assert!(!latch.cancel_actor(actor(1)));
    }

    #[test]
    fn invalidated_coordinate_drops_actions() {
        let mut latch = ToolActionLatch::new(None);
        latch.submit(actor(1), AT, ToolIntent::Hoe, Duration::ZERO).unwrap();
        latch.submit(actor(2), AT, ToolIntent::Scythe, Duration::ZERO).unwrap();
        latch
            .submit(actor(3), AT.offset(0, 1), ToolIntent::Hoe, Duration::ZERO)
            .unwrap();
        assert_eq!(latch.invalidate_coordinate(AT), 2);
        assert_eq!(latch.len(), 1);
    }

    #[test]
    fn stale_action_expires_without_applying() {
        let mut grid = grid();
        let mut latch = ToolActionLatch::new(Some(Duration::from_millis(500)));
        let ticket = latch
            .submit(actor(1), AT, ToolIntent::Hoe, Duration::from_secs(1))
            .unwrap();
        assert_eq!(
            latch.resolve(ticket, Duration::from_secs(3), &mut grid),
            Err(LatchError::Expired(ticket))
        );
        assert_eq!(grid.tile(AT).unwrap().state(), TileState::Empty);
        assert!(latch.is_empty());
    }

    #[test]
    fn sweep_respects_timeout() {
        let mut latch = ToolActionLatch::new(Some(Duration::from_secs(1)));
        latch.submit(actor(1), AT, ToolIntent::Hoe, Duration::ZERO).unwrap();
        latch
            .submit(actor(2), AT, ToolIntent::Hoe, Duration::from_millis(900))
            .unwrap();
        assert_eq!(latch.sweep_expired(Duration::from_millis(1500)), 1);
        assert!(latch.pending(actor(2)).is_some());

        let mut forever = ToolActionLatch::new(None);
        forever.submit(actor(1), AT, ToolIntent::Hoe, Duration::ZERO).unwrap();
        assert_eq!(forever.sweep_expired(Duration::from_secs(3600)), 0);
        assert_eq!(forever.clear(), 1);
    }
}
