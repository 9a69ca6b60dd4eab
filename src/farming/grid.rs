//! The farm grid — sole owner of every `FarmTile`, keyed by coordinate.
//!
//! Action wrappers look the tile up, delegate to the tile's guarded
//! transition and, only on success, queue a `FarmNotice` for the coordinate.
//! The farming plugin drains those notices into Bevy events once per frame,
//! so renderers and inventory never touch the grid's internals.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;

use super::registry::CropGrowthRegistry;
use super::soil::FarmTile;
use crate::data::{validate_definition, FarmConfig, FertilizerTable};
use crate::shared::*;

/// A change the grid wants its collaborators to hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum FarmNotice {
    TileChanged(GridCoordinate),
    CropHarvested {
        coordinate: GridCoordinate,
        items: Vec<HarvestItem>,
    },
}

#[derive(Resource, Debug)]
pub struct FarmGrid {
    origin: GridCoordinate,
    width: u32,
    height: u32,
    tiles: HashMap<GridCoordinate, FarmTile>,
    registry: CropGrowthRegistry,
    fertilizers: FertilizerTable,
    rng: StdRng,
    day: u32,
    notices: Vec<FarmNotice>,
}

impl FromWorld for FarmGrid {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<FarmConfig>().cloned().unwrap_or_default();
        let fertilizers = world
            .get_resource::<FertilizerTable>()
            .cloned()
            .unwrap_or_default();
        Self::new(&config, fertilizers)
    }
}

impl FarmGrid {
    /// One empty tile for every coordinate of the configured rectangle.
    /// A config that fails validation is replaced by the default farm.
    pub fn new(config: &FarmConfig, fertilizers: FertilizerTable) -> Self {
        let fallback;
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                warn!("[Farming] {} — using the default farm", err);
                fallback = FarmConfig::default();
                &fallback
            }
        };
        let tiles: HashMap<GridCoordinate, FarmTile> = config
            .coordinates()
            .map(|coordinate| (coordinate, FarmTile::new(coordinate)))
            .collect();
        info!(
            "[Farming] Grid ready: {}x{} at {} ({} tiles)",
            config.width,
            config.height,
            config.origin,
            tiles.len()
        );
        Self {
            origin: config.origin,
            width: config.width,
            height: config.height,
            tiles,
            registry: CropGrowthRegistry::default(),
            fertilizers,
            rng: StdRng::seed_from_u64(config.rng_seed),
            day: 0,
            notices: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    pub fn origin(&self) -> GridCoordinate {
        self.origin
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn current_day(&self) -> u32 {
        self.day
    }

    pub fn is_valid_tile(&self, coordinate: GridCoordinate) -> bool {
        self.tiles.contains_key(&coordinate)
    }

    pub fn tile(&self, coordinate: GridCoordinate) -> Option<&FarmTile> {
        self.tiles.get(&coordinate)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &FarmTile> {
        self.tiles.values()
    }

    pub fn fertilizers(&self) -> &FertilizerTable {
        &self.fertilizers
    }

    /// Swap in reloaded fertilizer coefficients.
    pub fn set_fertilizers(&mut self, fertilizers: FertilizerTable) {
        self.fertilizers = fertilizers;
    }

    /// Coordinates the next day tick will visit.
    pub fn planted_coordinates(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.registry.iter()
    }

    pub fn active_crop_count(&self) -> usize {
        self.registry.len()
    }

    /// True when the registry lists exactly the tiles that carry a crop.
    pub fn registry_matches_tiles(&self) -> bool {
        let planted = self.tiles.values().filter(|tile| tile.has_crop()).count();
        planted == self.registry.len()
            && self
                .registry
                .iter()
                .all(|c| self.tiles.get(&c).is_some_and(FarmTile::has_crop))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tile actions
    // ─────────────────────────────────────────────────────────────────────

    pub fn till_tile(&mut self, coordinate: GridCoordinate) -> bool {
        let Some(tile) = self.tiles.get_mut(&coordinate) else {
            return out_of_bounds("till", coordinate);
        };
        let tilled = tile.till();
        if tilled {
            self.notify_changed(coordinate);
        }
        tilled
    }

    pub fn water_tile(&mut self, coordinate: GridCoordinate) -> bool {
        let Some(tile) = self.tiles.get_mut(&coordinate) else {
            return out_of_bounds("water", coordinate);
        };
        let watered = tile.water();
        if watered {
            self.notify_changed(coordinate);
        }
        watered
    }

    pub fn plant_crop(
        &mut self,
        coordinate: GridCoordinate,
        definition: &Arc<CropDefinition>,
    ) -> bool {
        let Some(tile) = self.tiles.get_mut(&coordinate) else {
            return out_of_bounds("plant", coordinate);
        };
        if let Err(err) = validate_definition(definition) {
            debug!("[Farming] Plant at {} refused: {}", coordinate, err);
            return false;
        }
        if !tile.plant(Arc::clone(definition), self.day) {
            return false;
        }
        self.registry.register(coordinate);
        debug!("[Farming] Planted {} at {}", definition.id, coordinate);
        self.notify_changed(coordinate);
        true
    }

    pub fn harvest_tile(&mut self, coordinate: GridCoordinate) -> Option<Vec<HarvestItem>> {
        let Self {
            tiles,
            registry,
            fertilizers,
            rng,
            notices,
            ..
        } = self;
        let Some(tile) = tiles.get_mut(&coordinate) else {
            out_of_bounds("harvest", coordinate);
            return None;
        };
        let harvest = tile.harvest(fertilizers, rng)?;
        if harvest.crop_removed {
            registry.unregister(coordinate);
        }
        debug!(
            "[Farming] Harvested {} item stack(s) at {}",
            harvest.items.len(),
            coordinate
        );
        notices.push(FarmNotice::TileChanged(coordinate));
        notices.push(FarmNotice::CropHarvested {
            coordinate,
            items: harvest.items.clone(),
        });
        Some(harvest.items)
    }

    pub fn apply_fertilizer(&mut self, coordinate: GridCoordinate, fertilizer: FertilizerType) -> bool {
        let Some(tile) = self.tiles.get_mut(&coordinate) else {
            return out_of_bounds("fertilize", coordinate);
        };
        let applied = tile.apply_fertilizer(fertilizer);
        if applied {
            self.notify_changed(coordinate);
        }
        applied
    }

    /// Unconditional reset; only fails for coordinates outside the farm.
    pub fn reset_tile(&mut self, coordinate: GridCoordinate) -> bool {
        let Some(tile) = self.tiles.get_mut(&coordinate) else {
            return out_of_bounds("reset", coordinate);
        };
        if tile.reset_tile() {
            self.registry.unregister(coordinate);
        }
        self.notify_changed(coordinate);
        true
    }

    /// Dispatch a tool intent to the matching action.
    pub fn apply_tool(&mut self, coordinate: GridCoordinate, intent: &ToolIntent) -> ToolOutcome {
        if !self.is_valid_tile(coordinate) {
            return ToolOutcome::Rejected(RejectReason::OutOfBounds);
        }
        let outcome = match intent {
            ToolIntent::Hoe => self.till_tile(coordinate).then_some(ToolOutcome::Tilled),
            ToolIntent::WateringCan => self.water_tile(coordinate).then_some(ToolOutcome::Watered),
            ToolIntent::Seed(definition) => self
                .plant_crop(coordinate, definition)
                .then_some(ToolOutcome::Planted),
            ToolIntent::Fertilizer(kind) => self
                .apply_fertilizer(coordinate, *kind)
                .then_some(ToolOutcome::Fertilized),
            ToolIntent::Scythe => self.harvest_tile(coordinate).map(ToolOutcome::Harvested),
            ToolIntent::Pickaxe => self.reset_tile(coordinate).then_some(ToolOutcome::Cleared),
        };
        outcome.unwrap_or(ToolOutcome::Rejected(RejectReason::GuardFailed))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Day tick
    // ─────────────────────────────────────────────────────────────────────

    /// Advance every planted tile by one day. Visits the registry only,
    /// never the empty part of the grid. Returns the ticked coordinates.
    pub fn on_day_passed(&mut self) -> Vec<GridCoordinate> {
        self.day += 1;
        let Self {
            tiles,
            registry,
            fertilizers,
            rng,
            notices,
            day,
            ..
        } = self;

        let mut ticked = Vec::with_capacity(registry.len());
        let mut grew = 0usize;
        for coordinate in registry.iter() {
            let Some(tile) = tiles.get_mut(&coordinate) else {
                warn!("[Farming] Registry lists {} which is not a farm tile", coordinate);
                continue;
            };
            if tile.on_day_passed(fertilizers, rng) {
                grew += 1;
            }
            ticked.push(coordinate);
            notices.push(FarmNotice::TileChanged(coordinate));
        }

        info!(
            "[Farming] Day {} — {} active crops, {} grew",
            day,
            ticked.len(),
            grew
        );
        ticked
    }

    /// Rain: water every active crop that is still dry. Returns how many.
    pub fn water_active_crops(&mut self) -> usize {
        let Self {
            tiles,
            registry,
            notices,
            ..
        } = self;
        let mut watered = 0;
        for coordinate in registry.iter() {
            if tiles.get_mut(&coordinate).is_some_and(FarmTile::water) {
                notices.push(FarmNotice::TileChanged(coordinate));
                watered += 1;
            }
        }
        watered
    }

    // ─────────────────────────────────────────────────────────────────────
    // Notices
    // ─────────────────────────────────────────────────────────────────────

    pub fn has_pending_notices(&self) -> bool {
        !self.notices.is_empty()
    }

    /// Hand out queued notices in the order they happened.
    pub fn drain_notices(&mut self) -> std::vec::Drain<'_, FarmNotice> {
        self.notices.drain(..)
    }

    fn notify_changed(&mut self, coordinate: GridCoordinate) {
        self.notices.push(FarmNotice::TileChanged(coordinate));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Restore support (see `save`)
    // ─────────────────────────────────────────────────────────────────────

    pub(crate) fn set_current_day(&mut self, day: u32) {
        self.day = day;
    }

    /// Replace a tile wholesale, keeping the registry in step.
    pub(crate) fn replace_tile(&mut self, tile: FarmTile) -> bool {
        let coordinate = tile.coordinate();
        let Some(slot) = self.tiles.get_mut(&coordinate) else {
            return false;
        };
        let planted = tile.has_crop();
        *slot = tile;
        if planted {
            self.registry.register(coordinate);
        } else {
            self.registry.unregister(coordinate);
        }
        self.notices.push(FarmNotice::TileChanged(coordinate));
        true
    }
}

fn out_of_bounds(action: &str, coordinate: GridCoordinate) -> bool {
    debug!("[Farming] {} ignored: {} is outside the farm", action, coordinate);
    false
}
