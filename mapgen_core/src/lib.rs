//! Procedural map generation engine.
//!
//! Turns a height field and four world knobs into a typed tile grid:
//! land/water split, climate, relief, biome clusters, ocean depth bands and
//! continent numbering. [`generate_map`] runs the whole pipeline;
//! [`build_headless_app`] wraps it in a Bevy app that generates one world at
//! startup.

mod assigner;
mod climate;
mod continents;
mod error;
mod generator;
mod grid;
mod heightfield;
mod land;
pub mod map_preset;
mod ocean;
mod placement;
mod random;
mod relief;
mod resources;
pub mod ruleset_config;
mod selector;
mod snapshot;
mod systems;

use bevy::prelude::*;

pub use assigner::{
    assign_terrain, AssignmentReport, BiomeCategory, BiomeParams, BiomeShares, CategoryFold,
    ElevationCondition, WetnessCondition, CATEGORY_COUNT,
};
pub use climate::{
    colatitude, land_ratio, map_climate, ClimateLevels, ClimateMap, ClimateParams,
    ClimateSummary, DRY_WETNESS_LEVEL,
};
pub use continents::{map_continents, ContinentReport, LAKE_MAX_SIZE};
pub use error::MapGenError;
pub use generator::{generate_map, GeneratedMap, GenerationReport, MapGenSettings};
pub use grid::{TemperatureZone, Tile, TileGrid, HEIGHT_UNIT, MAX_COLATITUDE, MAX_LEVEL};
pub use heightfield::{fractal_height_field, ElevationField, HeightNoiseOptions, FLAT_FIELD_LEVEL};
pub use land::{classify_land, shore_level, LandClassification, DEEP_WATER_DEPTH, OCEAN_DEPTH_MAXIMUM};
pub use map_preset::{
    load_map_presets_from_env, MapPreset, MapPresetDimensions, MapPresets, MapPresetsError,
    MapPresetsHandle, MapPresetsMetadata,
};
pub use ocean::{
    smooth_ocean_depth, OceanDepthReport, CONSENSUS_NEIGHBOURS, OCEAN_DEPTH_RAND,
    OCEAN_DEPTH_STEP, OCEAN_DIST_MAX,
};
pub use placement::PlacementMap;
pub use random::{MapRng, RandomSource};
pub use relief::{mountain_fraction, place_relief, GeneratorMode, ReliefReport};
pub use resources::{MapGenConfig, MapRequest, WorldGenSeed, WorldMap};
pub use ruleset_config::{
    load_terrain_ruleset_from_env, TerrainRulesetHandle, TerrainRulesetMetadata,
};
pub use selector::{Constraint, SelectionRequest, TerrainSelector, RELAXATION_ORDER};
pub use snapshot::build_snapshot;
pub use systems::generate_world;

/// Construct a Bevy [`App`] that generates one world on startup.
///
/// Ruleset and presets come from their environment overrides or the builtin
/// data; the result lands in the [`WorldMap`] resource after the first
/// `update`.
pub fn build_headless_app() -> App {
    build_app_with_config(MapGenConfig::default())
}

pub fn build_app_with_config(config: MapGenConfig) -> App {
    let mut app = App::new();

    let (ruleset, ruleset_metadata) = load_terrain_ruleset_from_env();
    let (presets, presets_metadata) = load_map_presets_from_env();

    app.insert_resource(config)
        .insert_resource(TerrainRulesetHandle::new(ruleset))
        .insert_resource(ruleset_metadata)
        .insert_resource(MapPresetsHandle::new(presets))
        .insert_resource(presets_metadata)
        .add_plugins(MinimalPlugins)
        .add_systems(Startup, systems::generate_world_map);

    app
}
