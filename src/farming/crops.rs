//! Crop growth lifecycle — one `CropInstance` per planted tile.

use rand::Rng;
use std::sync::Arc;

use crate::shared::*;

/// Live growth state of one planted crop. Owned by its `FarmTile`.
#[derive(Debug, Clone, PartialEq)]
pub struct CropInstance {
    definition: Arc<CropDefinition>,
    current_stage: u8,
    watered_today: bool,
    fertilizer: FertilizerType,
    planted_on_day: u32,
}

impl CropInstance {
    /// A fresh seed: stage 0, dry, unfertilized.
    pub fn new(definition: Arc<CropDefinition>, planted_on_day: u32) -> Self {
        Self {
            definition,
            current_stage: 0,
            watered_today: false,
            fertilizer: FertilizerType::None,
            planted_on_day,
        }
    }

    /// Rebuild a crop from persisted fields. `None` if the stage is past the
    /// definition's final stage.
    pub(crate) fn restore(
        definition: Arc<CropDefinition>,
        current_stage: u8,
        watered_today: bool,
        fertilizer: FertilizerType,
        planted_on_day: u32,
    ) -> Option<Self> {
        if current_stage > definition.final_stage_index() {
            return None;
        }
        Some(Self {
            definition,
            current_stage,
            watered_today,
            fertilizer,
            planted_on_day,
        })
    }

    pub fn definition(&self) -> &Arc<CropDefinition> {
        &self.definition
    }

    pub fn current_stage(&self) -> u8 {
        self.current_stage
    }

    pub fn final_stage_index(&self) -> u8 {
        self.definition.final_stage_index()
    }

    pub fn watered_today(&self) -> bool {
        self.watered_today
    }

    pub fn fertilizer(&self) -> FertilizerType {
        self.fertilizer
    }

    pub fn planted_on_day(&self) -> u32 {
        self.planted_on_day
    }

    pub fn is_harvestable(&self) -> bool {
        self.current_stage == self.final_stage_index()
    }

    pub fn mark_watered(&mut self) {
        self.watered_today = true;
    }

    /// Replaces whatever fertilizer was there; fertilizers never stack.
    pub fn set_fertilizer(&mut self, fertilizer: FertilizerType) {
        self.fertilizer = fertilizer;
    }

    /// The day tick. A watered crop grows one stage (plus any fertilizer
    /// skip), a dry one stalls. Either way the crop starts the new day dry.
    ///
    /// Returns true if the stage changed.
    pub fn advance_day<R: Rng + ?Sized>(&mut self, effect: FertilizerEffect, rng: &mut R) -> bool {
        let before = self.current_stage;
        if self.watered_today {
            let steps = 1u8.saturating_add(bonus_stages(effect.growth_multiplier, rng));
            self.current_stage = self
                .current_stage
                .saturating_add(steps)
                .min(self.final_stage_index());
        }
        self.watered_today = false;
        self.current_stage != before
    }

    /// Roll the harvest. `None` unless the crop is at its final stage.
    ///
    /// The base quantity is uniform over `[min_yield, max_yield]`; the
    /// fertilizer's yield bonus is added on top. Does not change the crop;
    /// the owning tile decides between clearing and regrowing.
    pub fn harvest<R: Rng + ?Sized>(
        &self,
        effect: FertilizerEffect,
        rng: &mut R,
    ) -> Option<Vec<HarvestItem>> {
        if !self.is_harvestable() {
            return None;
        }
        let low = self.definition.min_yield.max(1);
        let high = self.definition.max_yield.max(low);
        let quantity = rng.gen_range(low..=high).saturating_add(effect.yield_bonus);
        Some(vec![HarvestItem {
            definition: Arc::clone(&self.definition),
            quantity,
        }])
    }

    /// Drop back to the regrow stage after a regrowable harvest.
    /// Fertilizer stays applied.
    pub fn reset_for_regrow(&mut self) {
        if let Some(stage) = self.definition.regrow_stage() {
            self.current_stage = stage.min(self.final_stage_index());
        }
        self.watered_today = false;
    }
}

/// Extra stages granted by a growth multiplier above 1.0: the whole part
/// always, the fractional part as a probability.
fn bonus_stages<R: Rng + ?Sized>(growth_multiplier: f32, rng: &mut R) -> u8 {
    let extra = (growth_multiplier - 1.0).max(0.0);
    let whole = extra.trunc();
    let fraction = f64::from(extra - whole);
    let mut stages = whole.min(f32::from(u8::MAX)) as u8;
    if fraction > 0.0 && rng.gen_bool(fraction.min(1.0)) {
        stages = stages.saturating_add(1);
    }
    stages
}
