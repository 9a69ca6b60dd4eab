//! Persistence shape of the farm grid.
//!
//! The core never touches the filesystem. `FarmGrid::snapshot` produces a
//! serde-friendly value and `FarmGrid::restore` rebuilds a grid from one; the
//! embedding game picks the format and the file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{CropCatalog, FarmConfig, FertilizerTable};
use crate::farming::{CropInstance, FarmGrid, FarmTile};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SNAPSHOT_VERSION: u32 = 1;

/// Every observable field of one tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub coordinate: GridCoordinate,
    pub state: TileState,
    pub is_watered: bool,
    pub is_tilled: bool,
    #[serde(default)]
    pub fertilizer: FertilizerType,
    #[serde(default)]
    pub crop_id: Option<CropId>,
    #[serde(default)]
    pub current_stage: Option<u8>,
    #[serde(default)]
    pub planted_on_day: Option<u32>,
}

impl TileSnapshot {
    pub fn capture(tile: &FarmTile) -> Self {
        let crop = tile.crop();
        Self {
            coordinate: tile.coordinate(),
            state: tile.state(),
            is_watered: tile.is_watered(),
            is_tilled: tile.is_tilled(),
            fertilizer: tile.fertilizer(),
            crop_id: crop.map(|crop| crop.definition().id.clone()),
            current_stage: crop.map(CropInstance::current_stage),
            planted_on_day: crop.map(CropInstance::planted_on_day),
        }
    }

    /// Untouched soil carries no information worth saving.
    pub fn is_default(&self) -> bool {
        self.state == TileState::Empty && !self.is_tilled && self.crop_id.is_none()
    }
}

/// A whole farm. Tiles not listed are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub version: u32,
    pub day: u32,
    pub tiles: Vec<TileSnapshot>,
}

impl FarmSnapshot {
    /// Non-empty tiles only, ordered by coordinate so equal farms produce
    /// equal snapshots.
    pub fn capture(grid: &FarmGrid) -> Self {
        let mut tiles: Vec<TileSnapshot> = grid
            .tiles()
            .map(TileSnapshot::capture)
            .filter(|tile| !tile.is_default())
            .collect();
        tiles.sort_by_key(|tile| tile.coordinate);
        Self {
            version: SNAPSHOT_VERSION,
            day: grid.current_day(),
            tiles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot version {0} is not supported (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion(u32),

    #[error("tile {0} lies outside the farm")]
    OutOfBounds(GridCoordinate),

    #[error("tile {coordinate}: unknown crop '{crop_id}'")]
    UnknownCrop {
        coordinate: GridCoordinate,
        crop_id: CropId,
    },

    #[error("tile {coordinate}: stage {stage} is past the last stage of '{crop_id}'")]
    StageOutOfRange {
        coordinate: GridCoordinate,
        crop_id: CropId,
        stage: u8,
    },

    #[error("tile {coordinate}: {reason}")]
    Inconsistent {
        coordinate: GridCoordinate,
        reason: &'static str,
    },
}

// ═══════════════════════════════════════════════════════════════════════
// CAPTURE / RESTORE
// ═══════════════════════════════════════════════════════════════════════

impl FarmGrid {
    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot::capture(self)
    }

    /// Build a fresh grid from `config` and apply every tile of `snapshot`.
    /// Fails on the first tile that could not have been produced by play.
    pub fn restore(
        config: &FarmConfig,
        fertilizers: FertilizerTable,
        snapshot: &FarmSnapshot,
        catalog: &CropCatalog,
    ) -> Result<FarmGrid, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        let mut grid = FarmGrid::new(config, fertilizers);
        for saved in &snapshot.tiles {
            let tile = restore_tile(saved, catalog)?;
            if !grid.replace_tile(tile) {
                return Err(SnapshotError::OutOfBounds(saved.coordinate));
            }
        }
        grid.set_current_day(snapshot.day);
        // A restored farm starts quiet; the caller redraws everything anyway.
        grid.drain_notices();
        Ok(grid)
    }
}

fn restore_tile(saved: &TileSnapshot, catalog: &CropCatalog) -> Result<FarmTile, SnapshotError> {
    let coordinate = saved.coordinate;
    let inconsistent = |reason| SnapshotError::Inconsistent { coordinate, reason };

    let crop = match (&saved.crop_id, saved.current_stage, saved.planted_on_day) {
        (None, None, None) => None,
        (Some(crop_id), Some(stage), Some(planted_on_day)) => {
            let definition = catalog.get(crop_id).ok_or_else(|| SnapshotError::UnknownCrop {
                coordinate,
                crop_id: crop_id.clone(),
            })?;
            let crop = CropInstance::restore(
                definition.clone(),
                stage,
                saved.is_watered,
                saved.fertilizer,
                planted_on_day,
            )
            .ok_or_else(|| SnapshotError::StageOutOfRange {
                coordinate,
                crop_id: crop_id.clone(),
                stage,
            })?;
            Some(crop)
        }
        _ => return Err(inconsistent("crop fields are only partly present")),
    };

    if crop.is_none() {
        if saved.is_watered {
            return Err(inconsistent("watered without a crop"));
        }
        if saved.fertilizer != FertilizerType::None {
            return Err(inconsistent("fertilized without a crop"));
        }
    } else if !saved.is_tilled {
        return Err(inconsistent("crop on untilled soil"));
    }

    let tile = FarmTile::restore(coordinate, saved.is_tilled, crop);
    if tile.state() != saved.state {
        return Err(inconsistent("state disagrees with the other fields"));
    }
    Ok(tile)
}
