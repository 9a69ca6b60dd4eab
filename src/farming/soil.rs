//! Tile state machine — tilling, watering, planting, harvesting, reset.
//!
//! A tile stores only whether its soil is tilled and the crop it carries.
//! The observable `TileState`, the watered flag and the fertilizer are all
//! read through from those two fields, which is what keeps "crop present ⇔
//! planted" and "watered ⇒ crop present" true at every instant.

use rand::Rng;
use std::sync::Arc;

use super::crops::CropInstance;
use crate::data::FertilizerTable;
use crate::shared::*;

/// Result of a successful tile harvest.
#[derive(Debug, Clone, PartialEq)]
pub struct TileHarvest {
    pub items: Vec<HarvestItem>,
    /// False when a regrowable crop stayed on the tile.
    pub crop_removed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FarmTile {
    coordinate: GridCoordinate,
    is_tilled: bool,
    crop: Option<CropInstance>,
}

impl FarmTile {
    pub fn new(coordinate: GridCoordinate) -> Self {
        Self {
            coordinate,
            is_tilled: false,
            crop: None,
        }
    }

    /// Rebuild a tile from persisted fields. A crop implies tilled soil.
    pub(crate) fn restore(
        coordinate: GridCoordinate,
        is_tilled: bool,
        crop: Option<CropInstance>,
    ) -> Self {
        Self {
            coordinate,
            is_tilled: is_tilled || crop.is_some(),
            crop,
        }
    }

    pub fn coordinate(&self) -> GridCoordinate {
        self.coordinate
    }

    pub fn state(&self) -> TileState {
        match &self.crop {
            Some(crop) if crop.watered_today() => TileState::Watered,
            Some(_) => TileState::Planted,
            None if self.is_tilled => TileState::Tilled,
            None => TileState::Empty,
        }
    }

    pub fn is_tilled(&self) -> bool {
        self.is_tilled
    }

    pub fn is_watered(&self) -> bool {
        self.crop.as_ref().is_some_and(CropInstance::watered_today)
    }

    pub fn fertilizer(&self) -> FertilizerType {
        self.crop
            .as_ref()
            .map_or(FertilizerType::None, CropInstance::fertilizer)
    }

    pub fn crop(&self) -> Option<&CropInstance> {
        self.crop.as_ref()
    }

    pub fn has_crop(&self) -> bool {
        self.crop.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Hoe
    // ─────────────────────────────────────────────────────────────────────

    pub fn can_hoe(&self) -> bool {
        self.state() == TileState::Empty
    }

    pub fn till(&mut self) -> bool {
        if !self.can_hoe() {
            return false;
        }
        self.is_tilled = true;
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Watering can — acts on the crop, bare soil cannot be watered
    // ─────────────────────────────────────────────────────────────────────

    pub fn can_water(&self) -> bool {
        self.crop.as_ref().is_some_and(|crop| !crop.watered_today())
    }

    pub fn water(&mut self) -> bool {
        if !self.can_water() {
            return false;
        }
        if let Some(crop) = self.crop.as_mut() {
            crop.mark_watered();
        }
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Seeds
    // ─────────────────────────────────────────────────────────────────────

    pub fn can_plant(&self) -> bool {
        self.state() == TileState::Tilled && self.crop.is_none()
    }

    pub fn plant(&mut self, definition: Arc<CropDefinition>, day: u32) -> bool {
        if !self.can_plant() {
            return false;
        }
        self.crop = Some(CropInstance::new(definition, day));
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Harvest
    // ─────────────────────────────────────────────────────────────────────

    pub fn can_harvest(&self) -> bool {
        self.crop.as_ref().is_some_and(CropInstance::is_harvestable)
    }

    /// Harvest a mature crop. Single-harvest crops leave bare, untilled
    /// ground behind; regrowable ones drop back to their regrow stage.
    pub fn harvest<R: Rng + ?Sized>(
        &mut self,
        fertilizers: &FertilizerTable,
        rng: &mut R,
    ) -> Option<TileHarvest> {
        let crop = self.crop.as_mut()?;
        let items = crop.harvest(fertilizers.effect(crop.fertilizer()), rng)?;

        if crop.definition().regrow_stage().is_some() {
            crop.reset_for_regrow();
            return Some(TileHarvest {
                items,
                crop_removed: false,
            });
        }

        self.crop = None;
        self.is_tilled = false;
        Some(TileHarvest {
            items,
            crop_removed: true,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fertilizer
    // ─────────────────────────────────────────────────────────────────────

    pub fn apply_fertilizer(&mut self, fertilizer: FertilizerType) -> bool {
        let Some(crop) = self.crop.as_mut() else {
            return false;
        };
        crop.set_fertilizer(fertilizer);
        true
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reset / day tick
    // ─────────────────────────────────────────────────────────────────────

    /// Back to untouched ground no matter what was there.
    /// Returns true if a crop was removed.
    pub fn reset_tile(&mut self) -> bool {
        self.is_tilled = false;
        self.crop.take().is_some()
    }

    /// Forward the day tick to the crop, if any. Returns true if the crop's
    /// stage changed.
    pub fn on_day_passed<R: Rng + ?Sized>(
        &mut self,
        fertilizers: &FertilizerTable,
        rng: &mut R,
    ) -> bool {
        match self.crop.as_mut() {
            Some(crop) => {
                let effect = fertilizers.effect(crop.fertilizer());
                crop.advance_day(effect, rng)
            }
            None => false,
        }
    }
}
