//! Headless demo: a scripted farmhand works a small plot for a couple of
//! seasons while the core logs what happens.

use std::error::Error;
use std::path::Path;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use furrow::data::{CropCatalog, FarmConfig, FertilizerTable};
use furrow::farming::events_handler;
use furrow::farming::{FarmGrid, FarmingPlugin};
use furrow::player::ToolLatchPlugin;
use furrow::shared::*;

const DAYS_PER_SEASON: u32 = 28;
const DEMO_DAYS: u32 = DAYS_PER_SEASON * 2;
const PLOT_WIDTH: i32 = 4;
const PLOT_HEIGHT: i32 = 3;

/// The scripted worker and the tiles it tends.
#[derive(Resource, Debug)]
struct Farmhand {
    actor: Entity,
    plot: Vec<GridCoordinate>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let config = FarmConfig::load(data_dir.join("farm.ron"))?;
    let fertilizers = FertilizerTable::load(data_dir.join("fertilizers.ron"))?;
    let catalog = CropCatalog::load(data_dir.join("crops.ron"))?;

    let plot_origin = config.origin.offset(2, 2);
    let plot = (0..PLOT_HEIGHT)
        .flat_map(|dy| (0..PLOT_WIDTH).map(move |dx| plot_origin.offset(dx, dy)))
        .collect();

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .insert_resource(config)
        .insert_resource(fertilizers)
        .insert_resource(catalog)
        .add_plugins((FarmingPlugin, ToolLatchPlugin))
        .add_systems(
            Update,
            tend_plot.after(events_handler::on_day_started),
        )
        .add_systems(Last, (log_harvests, log_tool_results));

    let actor = app.world_mut().spawn_empty().id();
    app.insert_resource(Farmhand { actor, plot });

    let mut season = Season::Spring;
    for day in 1..=DEMO_DAYS {
        if day > 1 && (day - 1) % DAYS_PER_SEASON == 0 {
            season = season.next();
        }
        let world = app.world_mut();
        world.send_event(DayStartedEvent { day, season });
        if day % 5 == 0 {
            world.send_event(RainfallEvent);
        }
        // Every morning the farmhand swings the hoe at the next free tile
        // beside the plot; the impact lands in the same frame.
        world.send_event(ToolUseEvent {
            actor,
            coordinate: plot_origin.offset(PLOT_WIDTH + (day as i32 % 3), 0),
            intent: ToolIntent::Hoe,
        });
        world.send_event(ToolImpactEvent { actor });
        app.update();
    }

    let snapshot = app.world().resource::<FarmGrid>().snapshot();
    let json = serde_json::to_string(&snapshot)?;
    info!(
        "[Save] Day {}: {} tiles worth saving, {} bytes as JSON",
        snapshot.day,
        snapshot.tiles.len(),
        json.len()
    );
    Ok(())
}

/// Harvest what is ripe, re-till and re-seed what is bare, water the rest.
fn tend_plot(
    farmhand: Res<Farmhand>,
    mut grid: ResMut<FarmGrid>,
    catalog: Res<CropCatalog>,
    season: Res<CurrentSeason>,
) {
    let mut seeds: Vec<_> = catalog
        .iter()
        .filter(|definition| definition.grows_in(season.0))
        .cloned()
        .collect();
    seeds.sort_by(|a, b| a.id.cmp(&b.id));

    for (index, &coordinate) in farmhand.plot.iter().enumerate() {
        let Some(tile) = grid.tile(coordinate) else {
            continue;
        };
        if tile.can_harvest() {
            grid.harvest_tile(coordinate);
        }
        grid.till_tile(coordinate);
        if !seeds.is_empty() {
            let seed = &seeds[index % seeds.len()];
            if grid.plant_crop(coordinate, seed) && index % 4 == 0 {
                grid.apply_fertilizer(coordinate, FertilizerType::SpeedGro);
            }
        }
        grid.water_tile(coordinate);
    }
}

fn log_harvests(mut harvest_events: EventReader<CropHarvestedEvent>) {
    for event in harvest_events.read() {
        for item in &event.items {
            info!(
                "[Farming] Harvested {} x{} at {}",
                item.definition.name, item.quantity, event.coordinate
            );
        }
    }
}

fn log_tool_results(mut resolved_events: EventReader<ToolResolvedEvent>) {
    for event in resolved_events.read() {
        debug!(
            "[Tools] {:?} swing at {}: {:?}",
            event.actor, event.coordinate, event.outcome
        );
    }
}
