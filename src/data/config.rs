use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::{read_data_file, DataError};
use crate::shared::*;

/// Shape and tuning of the farm grid.
///
/// Insert this resource before adding `FarmingPlugin`; the grid is built from
/// whatever config is present at that point.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Lowest (x, y) corner of the farm rectangle.
    pub origin: GridCoordinate,
    pub width: u32,
    pub height: u32,
    /// Seed for yield rolls and fertilizer stage skips.
    pub rng_seed: u64,
    /// How long a latched tool action may wait for its impact frame.
    /// `None` keeps it pending until resolved or cancelled.
    pub latch_timeout_secs: Option<f32>,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            origin: GridCoordinate::new(0, 0),
            width: DEFAULT_FARM_WIDTH,
            height: DEFAULT_FARM_HEIGHT,
            rng_seed: DEFAULT_RNG_SEED,
            latch_timeout_secs: None,
        }
    }
}

impl FarmConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, DataError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::from_ron_str(&read_data_file(path.as_ref())?)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.width == 0 || self.height == 0 {
            return Err(DataError::InvalidConfig(format!(
                "farm must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        let fits = |origin: i32, extent: u32| {
            i32::try_from(extent)
                .ok()
                .and_then(|extent| origin.checked_add(extent))
                .is_some()
        };
        if !fits(self.origin.x, self.width) || !fits(self.origin.y, self.height) {
            return Err(DataError::InvalidConfig(format!(
                "{}x{} farm at {} overflows the coordinate range",
                self.width, self.height, self.origin
            )));
        }
        if let Some(secs) = self.latch_timeout_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(DataError::InvalidConfig(format!(
                    "latch_timeout_secs must be positive, got {secs}"
                )));
            }
        }
        Ok(())
    }

    pub fn contains(&self, coordinate: GridCoordinate) -> bool {
        let dx = i64::from(coordinate.x) - i64::from(self.origin.x);
        let dy = i64::from(coordinate.y) - i64::from(self.origin.y);
        (0..i64::from(self.width)).contains(&dx) && (0..i64::from(self.height)).contains(&dy)
    }

    /// Every coordinate of the rectangle, row by row.
    pub fn coordinates(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        (0..self.height).flat_map(move |dy| {
            (0..self.width).map(move |dx| self.origin.offset(dx as i32, dy as i32))
        })
    }

    /// Non-positive or unrepresentable timeouts read as no timeout.
    pub fn latch_timeout(&self) -> Option<Duration> {
        self.latch_timeout_secs
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f32(secs).ok())
    }
}
