use map_runtime::TerrainRuleset;
use serde::{Deserialize, Serialize};

use crate::{
    assigner::{assign_terrain, AssignmentReport, BiomeParams},
    climate::{map_climate, ClimateParams, ClimateSummary},
    continents::{map_continents, ContinentReport},
    error::MapGenError,
    grid::TileGrid,
    heightfield::ElevationField,
    land::{classify_land, LandClassification},
    ocean::{smooth_ocean_depth, OceanDepthReport},
    placement::PlacementMap,
    random::RandomSource,
    relief::{place_relief, GeneratorMode, ReliefReport},
    selector::TerrainSelector,
};

/// The four world knobs (each `0..=100`) and the relief mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGenSettings {
    pub landpercent: u8,
    pub steepness: u8,
    pub wetness: u8,
    pub temperature: u8,
    pub generator: GeneratorMode,
}

impl Default for MapGenSettings {
    fn default() -> Self {
        Self {
            landpercent: 30,
            steepness: 30,
            wetness: 50,
            temperature: 50,
            generator: GeneratorMode::Standard,
        }
    }
}

impl MapGenSettings {
    pub fn validate(&self) -> Result<(), MapGenError> {
        let knobs = [
            ("landpercent", self.landpercent),
            ("steepness", self.steepness),
            ("wetness", self.wetness),
            ("temperature", self.temperature),
        ];
        for (name, value) in knobs {
            if value > 100 {
                return Err(MapGenError::ParameterOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

/// What each stage did, in stage order.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub land: LandClassification,
    pub climate: ClimateSummary,
    pub relief: ReliefReport,
    pub assignment: AssignmentReport,
    /// Tiles marked placed once terrain assignment finished.
    pub placed_tiles: usize,
    pub ocean: OceanDepthReport,
    pub continents: ContinentReport,
}

impl GenerationReport {
    pub fn shore_level(&self) -> i32 {
        self.land.shore_level
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub grid: TileGrid,
    pub report: GenerationReport,
}

/// Runs every stage over a fresh grid shaped like `field`.
///
/// Deterministic for a given field, settings, ruleset and random stream.
/// Stages run to completion one after another and share the single
/// placement map.
pub fn generate_map(
    field: &ElevationField,
    settings: &MapGenSettings,
    ruleset: &TerrainRuleset,
    rng: &mut dyn RandomSource,
) -> Result<GeneratedMap, MapGenError> {
    settings.validate()?;
    let w = field.width as usize;
    let h = field.height as usize;
    let levels = field.normalised_levels();

    let mut grid = TileGrid::new(w, h);
    let mut placement = PlacementMap::new(w, h);
    placement.reset();
    let selector = TerrainSelector::new(ruleset);

    let land = classify_land(
        &mut grid,
        &levels,
        settings.landpercent,
        ruleset,
        &mut placement,
    );
    let climate = map_climate(
        &mut grid,
        ruleset,
        ClimateParams {
            shore_level: land.shore_level,
            steepness: settings.steepness,
            wetness: settings.wetness,
            temperature: settings.temperature,
        },
    );
    let relief = place_relief(
        &mut grid,
        &mut placement,
        &selector,
        land.shore_level,
        settings.steepness,
        settings.generator,
        rng,
    );
    let assignment = assign_terrain(
        &mut grid,
        &mut placement,
        &selector,
        &climate,
        BiomeParams {
            landpercent: settings.landpercent,
            steepness: settings.steepness,
            wetness: settings.wetness,
            temperature: settings.temperature,
        },
        rng,
    );
    let placed_tiles = placement.placed_count();
    let ocean = smooth_ocean_depth(&mut grid, &selector, rng);
    let continents = map_continents(&mut grid, ruleset, rng);

    for tile in grid.tiles_mut() {
        tile.properties = ruleset.weights(tile.terrain);
    }

    tracing::info!(
        target: "mapgen::generate",
        width = w,
        height = h,
        generator = ?settings.generator,
        land = land.land_tiles,
        relief = relief.total(),
        placed = placed_tiles,
        continents = continents.continent_count(),
        lakes = continents.lake_bodies,
        "mapgen.generate.completed"
    );

    Ok(GeneratedMap {
        grid,
        report: GenerationReport {
            land,
            climate: climate.summary(),
            relief,
            assignment,
            placed_tiles,
            ocean,
            continents,
        },
    })
}
