//! Shared components, resources, events and value types for the farm core.
//!
//! This is the type contract. The farming, player and save domains import
//! from here; no domain reaches into another domain's internals.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════
// GRID
// ═══════════════════════════════════════════════════════════════════════

/// Logical key of one farm cell. Never reused for a different cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridCoordinate {
    pub x: i32,
    pub y: i32,
}

impl GridCoordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for GridCoordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Observable soil state of a tile.
///
/// `Watered` is the watered-today face of a planted tile: both `Planted` and
/// `Watered` carry a crop, `Empty` and `Tilled` never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    Empty,
    Tilled,
    Watered,
    Planted,
}

impl TileState {
    pub fn has_crop(self) -> bool {
        matches!(self, TileState::Planted | TileState::Watered)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CALENDAR
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }
}

/// The clock collaborator's current season, mirrored from `DayStartedEvent`.
/// Read by planting callers; the grid itself never consults it.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrentSeason(pub Season);

// ═══════════════════════════════════════════════════════════════════════
// CROPS
// ═══════════════════════════════════════════════════════════════════════

/// Content identifier for a crop species. String IDs keep the data files
/// readable.
pub type CropId = String;

/// Immutable content data describing one plantable crop species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDefinition {
    pub id: CropId,
    pub name: String,
    /// Number of growth stages, at least 1. The last stage is harvestable.
    pub growth_stage_count: u8,
    #[serde(default)]
    pub is_regrowable: bool,
    /// Stage a regrowable crop falls back to after harvest.
    #[serde(default)]
    pub regrow_stage_index: Option<u8>,
    pub min_yield: u32,
    pub max_yield: u32,
    /// Empty means the crop grows in any season.
    #[serde(default)]
    pub allowed_seasons: Vec<Season>,
}

impl CropDefinition {
    pub fn final_stage_index(&self) -> u8 {
        self.growth_stage_count.saturating_sub(1)
    }

    pub fn grows_in(&self, season: Season) -> bool {
        self.allowed_seasons.is_empty() || self.allowed_seasons.contains(&season)
    }

    /// Regrow stage, or `None` for single-harvest crops.
    pub fn regrow_stage(&self) -> Option<u8> {
        if self.is_regrowable {
            self.regrow_stage_index
        } else {
            None
        }
    }
}

/// One entry of a harvest result, handed to the inventory collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestItem {
    pub definition: Arc<CropDefinition>,
    pub quantity: u32,
}

impl HarvestItem {
    pub fn crop_id(&self) -> &str {
        &self.definition.id
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FERTILIZER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FertilizerType {
    #[default]
    None,
    Basic,
    Quality,
    SpeedGro,
    DeluxeSpeedGro,
}

/// Growth and yield modifiers for one fertilizer type. Coefficients are
/// content data, see `data::FertilizerTable`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FertilizerEffect {
    /// 1.0 = normal growth. Everything above 1.0 is a chance of skipping
    /// extra stages on a watered day.
    pub growth_multiplier: f32,
    /// Flat bonus added to every harvest roll.
    pub yield_bonus: u32,
}

impl FertilizerEffect {
    pub const NEUTRAL: Self = Self {
        growth_multiplier: 1.0,
        yield_bonus: 0,
    };
}

impl Default for FertilizerEffect {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TOOLS
// ═══════════════════════════════════════════════════════════════════════

/// What a tool swing should do to its target tile once it lands.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolIntent {
    Hoe,
    WateringCan,
    Seed(Arc<CropDefinition>),
    Fertilizer(FertilizerType),
    Scythe,
    /// Clears the tile back to untouched ground.
    Pickaxe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    OutOfBounds,
    GuardFailed,
}

/// Result of applying a `ToolIntent` to the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Tilled,
    Watered,
    Planted,
    Fertilized,
    Harvested(Vec<HarvestItem>),
    Cleared,
    Rejected(RejectReason),
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ToolOutcome::Rejected(_))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Sent by the clock collaborator once per in-game day.
#[derive(Event, Debug, Clone)]
pub struct DayStartedEvent {
    pub day: u32,
    pub season: Season,
}

/// Sent by the weather collaborator on a rainy day.
#[derive(Event, Debug, Clone)]
pub struct RainfallEvent;

/// A tool swing has started; its effect is latched until the impact frame.
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub actor: Entity,
    pub coordinate: GridCoordinate,
    pub intent: ToolIntent,
}

/// The animation reached its impact frame.
#[derive(Event, Debug, Clone)]
pub struct ToolImpactEvent {
    pub actor: Entity,
}

/// Tool switched, unequipped or swing interrupted.
#[derive(Event, Debug, Clone)]
pub struct ToolCancelEvent {
    pub actor: Entity,
}

/// A latched tool action was applied (successfully or not).
#[derive(Event, Debug, Clone)]
pub struct ToolResolvedEvent {
    pub actor: Entity,
    pub coordinate: GridCoordinate,
    pub outcome: ToolOutcome,
}

/// Seed use from the interaction layer. Seed deduction already happened.
#[derive(Event, Debug, Clone)]
pub struct PlantRequestEvent {
    pub coordinate: GridCoordinate,
    pub crop_id: CropId,
}

/// Administrative reset of one tile.
#[derive(Event, Debug, Clone)]
pub struct TileResetEvent {
    pub coordinate: GridCoordinate,
}

/// A tile's observable state may have changed; renderers refresh it.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TileRefreshEvent {
    pub coordinate: GridCoordinate,
}

/// Harvest output for the inventory collaborator.
#[derive(Event, Debug, Clone)]
pub struct CropHarvestedEvent {
    pub coordinate: GridCoordinate,
    pub items: Vec<HarvestItem>,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const DEFAULT_FARM_WIDTH: u32 = 64;
pub const DEFAULT_FARM_HEIGHT: u32 = 64;
pub const DEFAULT_RNG_SEED: u64 = 0x5EED_F00D;
