//! Headless integration tests for the farming core.
//!
//! These tests drive `FarmingPlugin` and `ToolLatchPlugin` through their
//! events without a window or GPU. They use Bevy's `MinimalPlugins` to tick
//! the app and inspect the grid, the latch and the published events.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use furrow::data::{CropCatalog, FarmConfig};
use furrow::farming::{FarmGrid, FarmingPlugin};
use furrow::player::{ToolActionLatch, ToolLatchPlugin};
use furrow::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

fn crop(id: &str, stages: u8, yields: (u32, u32), seasons: Vec<Season>) -> CropDefinition {
    CropDefinition {
        id: id.to_string(),
        name: id.to_string(),
        growth_stage_count: stages,
        is_regrowable: false,
        regrow_stage_index: None,
        min_yield: yields.0,
        max_yield: yields.1,
        allowed_seasons: seasons,
    }
}

/// Builds a minimal app with an 8x8 farm and a small catalog:
/// turnip (3 stages, spring), tomato (3 stages, summer) and radish
/// (1 stage, any season, always yields 2).
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);

    let catalog = CropCatalog::from_definitions(vec![
        crop("turnip", 3, (1, 1), vec![Season::Spring]),
        crop("tomato", 3, (1, 2), vec![Season::Summer]),
        crop("radish", 1, (2, 2), Vec::new()),
    ])
    .expect("test catalog is valid");

    app.insert_resource(FarmConfig {
        width: 8,
        height: 8,
        rng_seed: 7,
        ..default()
    })
    .insert_resource(catalog)
    .add_plugins((FarmingPlugin, ToolLatchPlugin));
    app
}

fn spawn_actor(app: &mut App) -> Entity {
    app.world_mut().spawn_empty().id()
}

fn definition(app: &App, id: &str) -> std::sync::Arc<CropDefinition> {
    app.world()
        .resource::<CropCatalog>()
        .get(id)
        .cloned()
        .expect("crop is in the test catalog")
}

fn tile_state(app: &App, coordinate: GridCoordinate) -> TileState {
    app.world()
        .resource::<FarmGrid>()
        .tile(coordinate)
        .expect("coordinate is on the farm")
        .state()
}

fn swing(app: &mut App, actor: Entity, coordinate: GridCoordinate, intent: ToolIntent) {
    app.world_mut().send_event(ToolUseEvent {
        actor,
        coordinate,
        intent,
    });
}

fn impact(app: &mut App, actor: Entity) {
    app.world_mut().send_event(ToolImpactEvent { actor });
}

/// Every event of type `E` still buffered in the world.
fn collect_events<E: Event + Clone>(app: &App) -> Vec<E> {
    let events = app.world().resource::<Events<E>>();
    events.get_cursor().read(events).cloned().collect()
}

const A: GridCoordinate = GridCoordinate::new(2, 3);
const B: GridCoordinate = GridCoordinate::new(5, 1);

// ─────────────────────────────────────────────────────────────────────────────
// Day tick
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_day_tick_advances_watered_crop_and_publishes_refresh() {
    let mut app = build_test_app();
    let turnip = definition(&app, "turnip");
    {
        let mut grid = app.world_mut().resource_mut::<FarmGrid>();
        assert!(grid.till_tile(A));
        assert!(grid.plant_crop(A, &turnip));
        assert!(grid.water_tile(A));
        assert!(grid.till_tile(B));
        assert!(grid.plant_crop(B, &turnip));
    }
    app.update();

    app.world_mut().send_event(DayStartedEvent {
        day: 1,
        season: Season::Spring,
    });
    app.update();

    let grid = app.world().resource::<FarmGrid>();
    assert_eq!(grid.current_day(), 1);
    let watered = grid.tile(A).unwrap();
    assert_eq!(watered.crop().unwrap().current_stage(), 1);
    assert_eq!(watered.state(), TileState::Planted, "watered flag resets every tick");
    assert_eq!(grid.tile(B).unwrap().crop().unwrap().current_stage(), 0);

    let refreshed = collect_events::<TileRefreshEvent>(&app);
    assert!(refreshed.contains(&TileRefreshEvent { coordinate: A }));
    assert!(refreshed.contains(&TileRefreshEvent { coordinate: B }));
}

#[test]
fn test_rain_waters_every_active_crop() {
    let mut app = build_test_app();
    let turnip = definition(&app, "turnip");
    {
        let mut grid = app.world_mut().resource_mut::<FarmGrid>();
        for coordinate in [A, B] {
            grid.till_tile(coordinate);
            grid.plant_crop(coordinate, &turnip);
        }
    }
    app.world_mut().send_event(RainfallEvent);
    app.world_mut().send_event(RainfallEvent);
    app.update();

    assert_eq!(tile_state(&app, A), TileState::Watered);
    assert_eq!(tile_state(&app, B), TileState::Watered);
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting requests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_out_of_season_plant_request_is_ignored() {
    let mut app = build_test_app();
    {
        let mut grid = app.world_mut().resource_mut::<FarmGrid>();
        grid.till_tile(A);
        grid.till_tile(B);
    }
    app.world_mut().send_event(PlantRequestEvent {
        coordinate: A,
        crop_id: "tomato".into(),
    });
    app.world_mut().send_event(PlantRequestEvent {
        coordinate: B,
        crop_id: "turnip".into(),
    });
    app.world_mut().send_event(PlantRequestEvent {
        coordinate: B,
        crop_id: "mandrake".into(),
    });
    app.update();

    assert_eq!(tile_state(&app, A), TileState::Tilled);
    assert_eq!(tile_state(&app, B), TileState::Planted);
    let grid = app.world().resource::<FarmGrid>();
    assert_eq!(grid.active_crop_count(), 1);
    assert!(grid.registry_matches_tiles());
}

#[test]
fn test_season_from_day_event_gates_planting() {
    let mut app = build_test_app();
    app.world_mut().resource_mut::<FarmGrid>().till_tile(A);
    app.world_mut().send_event(DayStartedEvent {
        day: 29,
        season: Season::Summer,
    });
    app.world_mut().send_event(PlantRequestEvent {
        coordinate: A,
        crop_id: "tomato".into(),
    });
    app.update();

    assert_eq!(app.world().resource::<CurrentSeason>().0, Season::Summer);
    assert_eq!(tile_state(&app, A), TileState::Planted);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool latch
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_tool_swing_applies_on_impact() {
    let mut app = build_test_app();
    let actor = spawn_actor(&mut app);

    swing(&mut app, actor, A, ToolIntent::Hoe);
    app.update();
    assert_eq!(tile_state(&app, A), TileState::Empty, "nothing happens before impact");
    assert!(app.world().resource::<ToolActionLatch>().pending(actor).is_some());

    impact(&mut app, actor);
    app.update();
    assert_eq!(tile_state(&app, A), TileState::Tilled);
    assert!(app.world().resource::<ToolActionLatch>().is_empty());

    let resolved = collect_events::<ToolResolvedEvent>(&app);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].coordinate, A);
    assert_eq!(resolved[0].outcome, ToolOutcome::Tilled);
}

#[test]
fn test_second_swing_is_rejected_while_first_pending() {
    let mut app = build_test_app();
    let actor = spawn_actor(&mut app);

    swing(&mut app, actor, A, ToolIntent::Hoe);
    app.update();
    swing(&mut app, actor, B, ToolIntent::Hoe);
    app.update();

    let pending = app
        .world()
        .resource::<ToolActionLatch>()
        .pending(actor)
        .cloned()
        .expect("first swing stays latched");
    assert_eq!(pending.coordinate, A);

    impact(&mut app, actor);
    app.update();
    assert_eq!(tile_state(&app, A), TileState::Tilled);
    assert_eq!(tile_state(&app, B), TileState::Empty);
}

#[test]
fn test_scythe_swing_publishes_harvest() {
    let mut app = build_test_app();
    let actor = spawn_actor(&mut app);
    let radish = definition(&app, "radish");
    {
        let mut grid = app.world_mut().resource_mut::<FarmGrid>();
        grid.till_tile(A);
        grid.plant_crop(A, &radish);
    }
    swing(&mut app, actor, A, ToolIntent::Scythe);
    impact(&mut app, actor);
    app.update();

    let harvested = collect_events::<CropHarvestedEvent>(&app);
    assert_eq!(harvested.len(), 1);
    assert_eq!(harvested[0].coordinate, A);
    assert_eq!(harvested[0].items.len(), 1);
    assert_eq!(harvested[0].items[0].crop_id(), "radish");
    assert_eq!(harvested[0].items[0].quantity, 2);

    assert_eq!(tile_state(&app, A), TileState::Empty);
    assert_eq!(app.world().resource::<FarmGrid>().active_crop_count(), 0);
}

#[test]
fn test_day_start_clears_pending_swings() {
    let mut app = build_test_app();
    let actor = spawn_actor(&mut app);

    swing(&mut app, actor, A, ToolIntent::Hoe);
    app.update();

    app.world_mut().send_event(DayStartedEvent {
        day: 2,
        season: Season::Spring,
    });
    impact(&mut app, actor);
    app.update();

    assert!(app.world().resource::<ToolActionLatch>().is_empty());
    assert_eq!(tile_state(&app, A), TileState::Empty);
}

#[test]
fn test_cancel_and_tile_reset_drop_pending_swings() {
    let mut app = build_test_app();
    let first = spawn_actor(&mut app);
    let second = spawn_actor(&mut app);

    swing(&mut app, first, A, ToolIntent::Hoe);
    swing(&mut app, second, B, ToolIntent::Hoe);
    app.update();
    assert_eq!(app.world().resource::<ToolActionLatch>().len(), 2);

    app.world_mut().send_event(ToolCancelEvent { actor: first });
    app.world_mut().send_event(TileResetEvent { coordinate: B });
    impact(&mut app, first);
    impact(&mut app, second);
    app.update();

    assert!(app.world().resource::<ToolActionLatch>().is_empty());
    assert_eq!(tile_state(&app, A), TileState::Empty);
    assert_eq!(tile_state(&app, B), TileState::Empty);
    assert!(collect_events::<ToolResolvedEvent>(&app).is_empty());
}

#[test]
fn test_swing_off_the_farm_is_not_latched() {
    let mut app = build_test_app();
    let actor = spawn_actor(&mut app);

    swing(&mut app, actor, GridCoordinate::new(-1, 40), ToolIntent::Hoe);
    app.update();
    assert!(app.world().resource::<ToolActionLatch>().is_empty());
}

#[test]
fn test_cleared_tile_drops_other_swings_aimed_at_it() {
    let mut app = build_test_app();
    let digger = spawn_actor(&mut app);
    let hoer = spawn_actor(&mut app);
    app.world_mut().resource_mut::<FarmGrid>().till_tile(A);

    swing(&mut app, digger, A, ToolIntent::Pickaxe);
    swing(&mut app, hoer, A, ToolIntent::Hoe);
    app.update();
    assert_eq!(app.world().resource::<ToolActionLatch>().len(), 2);

    impact(&mut app, digger);
    app.update();
    assert_eq!(tile_state(&app, A), TileState::Empty);
    assert!(app.world().resource::<ToolActionLatch>().is_empty());

    impact(&mut app, hoer);
    app.update();
    assert_eq!(tile_state(&app, A), TileState::Empty);
    let resolved = collect_events::<ToolResolvedEvent>(&app);
    assert!(resolved.iter().all(|event| event.actor == digger));
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unchecked_config_resource_does_not_panic() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(FarmConfig {
            origin: GridCoordinate::new(i32::MAX, 0),
            width: 2,
            height: 2,
            latch_timeout_secs: Some(-1.0),
            ..default()
        })
        .add_plugins((FarmingPlugin, ToolLatchPlugin));
    app.update();

    let fallback = FarmConfig::default();
    let grid = app.world().resource::<FarmGrid>();
    assert_eq!(grid.origin(), fallback.origin);
    assert_eq!(grid.width(), fallback.width);
    assert_eq!(app.world().resource::<ToolActionLatch>().timeout(), None);
}
