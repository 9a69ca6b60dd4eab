//! Farming domain — soil tilling, watering, planting, crop growth, harvest.
//!
//! Communicates with other domains exclusively through crate::shared events/resources.

use bevy::prelude::*;

use crate::data::{CropCatalog, FarmConfig, FertilizerTable};
use crate::shared::*;

pub mod crops;
pub mod events_handler;
pub mod grid;
pub mod registry;
pub mod soil;

pub use crops::CropInstance;
pub use grid::{FarmGrid, FarmNotice};
pub use registry::CropGrowthRegistry;
pub use soil::{FarmTile, TileHarvest};

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app
            // Content and configuration; anything inserted earlier wins.
            .init_resource::<FarmConfig>()
            .init_resource::<FertilizerTable>()
            .init_resource::<CropCatalog>()
            .init_resource::<CurrentSeason>()
            // Built from the config and fertilizer table above.
            .init_resource::<FarmGrid>()
            // Inbound
            .add_event::<DayStartedEvent>()
            .add_event::<RainfallEvent>()
            .add_event::<PlantRequestEvent>()
            .add_event::<TileResetEvent>()
            // Outbound
            .add_event::<TileRefreshEvent>()
            .add_event::<CropHarvestedEvent>()
            // ------------------------------------------------------------------
            // Day tick first, so rain and requests act on the new day.
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    events_handler::on_day_started,
                    events_handler::on_rainfall,
                    events_handler::handle_plant_requests,
                    events_handler::handle_tile_resets,
                )
                    .chain(),
            )
            // ------------------------------------------------------------------
            // Publish — runs after all grid mutations of the frame
            // ------------------------------------------------------------------
            .add_systems(PostUpdate, events_handler::publish_farm_notices);
    }
}
