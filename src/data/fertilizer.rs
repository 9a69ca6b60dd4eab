use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::{read_data_file, DataError};
use crate::shared::*;

/// Lookup from `FertilizerType` to its growth/yield coefficients.
///
/// Missing entries (and `FertilizerType::None`) resolve to the neutral
/// effect, so an empty table simply disables fertilizer.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FertilizerTable {
    effects: HashMap<FertilizerType, FertilizerEffect>,
}

impl FertilizerTable {
    /// Parse a RON map such as `{ Basic: (growth_multiplier: 1.0, yield_bonus: 1) }`.
    pub fn from_ron_str(source: &str) -> Result<Self, DataError> {
        let effects: HashMap<FertilizerType, FertilizerEffect> = ron::from_str(source)?;
        let mut table = Self::default();
        for (kind, effect) in effects {
            table.set(kind, effect)?;
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let table = Self::from_ron_str(&read_data_file(path.as_ref())?)?;
        info!(
            "[Data] Fertilizers loaded: {} from {}",
            table.effects.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    pub fn set(&mut self, kind: FertilizerType, effect: FertilizerEffect) -> Result<(), DataError> {
        if !effect.growth_multiplier.is_finite() || effect.growth_multiplier < 1.0 {
            return Err(DataError::InvalidFertilizer(kind));
        }
        if kind != FertilizerType::None {
            self.effects.insert(kind, effect);
        }
        Ok(())
    }

    pub fn effect(&self, kind: FertilizerType) -> FertilizerEffect {
        match kind {
            FertilizerType::None => FertilizerEffect::NEUTRAL,
            other => self.effects.get(&other).copied().unwrap_or_default(),
        }
    }
}
