//! Systems that connect the grid to the rest of the game through events.

use bevy::prelude::*;

use super::grid::{FarmGrid, FarmNotice};
use crate::data::CropCatalog;
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Day start
// ─────────────────────────────────────────────────────────────────────────────

/// Mirror the clock's season and advance every active crop by one day.
pub fn on_day_started(
    mut day_events: EventReader<DayStartedEvent>,
    mut grid: ResMut<FarmGrid>,
    mut season: ResMut<CurrentSeason>,
) {
    for event in day_events.read() {
        if season.0 != event.season {
            info!("[Farming] Season is now {:?}", event.season);
            season.0 = event.season;
        }
        grid.on_day_passed();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rain
// ─────────────────────────────────────────────────────────────────────────────

pub fn on_rainfall(mut rain_events: EventReader<RainfallEvent>, mut grid: ResMut<FarmGrid>) {
    // Several rain events in one frame water the same crops once.
    if rain_events.read().count() == 0 {
        return;
    }
    let watered = grid.water_active_crops();
    debug!("[Farming] Rain watered {} crops", watered);
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve the crop id and reject seeds that are out of season before the
/// grid ever sees them.
pub fn handle_plant_requests(
    mut plant_events: EventReader<PlantRequestEvent>,
    mut grid: ResMut<FarmGrid>,
    catalog: Res<CropCatalog>,
    season: Res<CurrentSeason>,
) {
    for event in plant_events.read() {
        let Some(definition) = catalog.get(&event.crop_id) else {
            warn!("[Farming] Plant failed — unknown crop '{}'", event.crop_id);
            continue;
        };
        if !definition.grows_in(season.0) {
            debug!(
                "[Farming] {} cannot be planted in {:?}",
                definition.id, season.0
            );
            continue;
        }
        grid.plant_crop(event.coordinate, definition);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reset
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_tile_resets(mut reset_events: EventReader<TileResetEvent>, mut grid: ResMut<FarmGrid>) {
    for event in reset_events.read() {
        grid.reset_tile(event.coordinate);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Publish
// ─────────────────────────────────────────────────────────────────────────────

/// Drain the grid's notices into Bevy events. Each collaborator subscribes
/// with its own `EventReader` and stops hearing about changes when its
/// system is removed.
pub fn publish_farm_notices(
    mut grid: ResMut<FarmGrid>,
    mut refresh_events: EventWriter<TileRefreshEvent>,
    mut harvest_events: EventWriter<CropHarvestedEvent>,
) {
    // Checked through Deref so quiet frames don't mark the grid as changed.
    if !grid.has_pending_notices() {
        return;
    }
    for notice in grid.drain_notices() {
        match notice {
            FarmNotice::TileChanged(coordinate) => {
                refresh_events.send(TileRefreshEvent { coordinate });
            }
            FarmNotice::CropHarvested { coordinate, items } => {
                harvest_events.send(CropHarvestedEvent { coordinate, items });
            }
        }
    }
}
