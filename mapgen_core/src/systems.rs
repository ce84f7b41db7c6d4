use bevy::prelude::*;
use map_runtime::TerrainRuleset;

use crate::{
    error::MapGenError,
    generator::generate_map,
    heightfield::fractal_height_field,
    map_preset::MapPresetsHandle,
    random::MapRng,
    resources::{MapGenConfig, MapRequest, WorldGenSeed, WorldMap},
    ruleset_config::TerrainRulesetHandle,
    snapshot::build_snapshot,
};

/// Generates the map described by `request`.
///
/// The height field and the random stream both derive from the request
/// seed, so a request always yields the same world.
pub fn generate_world(
    request: &MapRequest,
    ruleset: &TerrainRuleset,
) -> Result<WorldMap, MapGenError> {
    let field = fractal_height_field(
        request.grid_size.x,
        request.grid_size.y,
        request.seed,
        &request.height,
    )?;
    let mut rng = MapRng::seed_from_u64(request.seed);
    let map = generate_map(&field, &request.settings, ruleset, &mut rng)?;
    let snapshot = build_snapshot(
        &map.grid,
        ruleset,
        request.seed,
        map.report.continents.continent_count(),
    );
    Ok(WorldMap {
        preset_id: request.preset_id.clone(),
        grid: map.grid,
        report: map.report,
        snapshot,
    })
}

pub fn generate_world_map(
    mut commands: Commands,
    config: Res<MapGenConfig>,
    presets: Res<MapPresetsHandle>,
    ruleset: Res<TerrainRulesetHandle>,
) {
    let request = config.resolve(&presets.get());
    commands.insert_resource(WorldGenSeed(request.seed));

    match generate_world(&request, &ruleset.get()) {
        Ok(world) => {
            tracing::info!(
                target: "mapgen::app",
                preset = %world.preset_id,
                seed = request.seed,
                width = request.grid_size.x,
                height = request.grid_size.y,
                hash = world.snapshot.header.hash,
                "mapgen.world.ready"
            );
            commands.insert_resource(world);
        }
        Err(err) => {
            tracing::error!(
                target: "mapgen::app",
                preset = %request.preset_id,
                error = %err,
                "mapgen.world.failed"
            );
        }
    }
}
