use map_runtime::TerrainProperty;
use serde::{Deserialize, Serialize};

use crate::{
    climate::land_ratio,
    grid::{neighbors8, TileGrid},
    placement::PlacementMap,
    random::RandomSource,
    selector::{SelectionRequest, TerrainSelector},
};

/// How the height field was produced, which decides the relief rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorMode {
    #[default]
    Standard,
    Fracture,
}

const FRACTURE_RELIEF_SCALE: f64 = 1.5;
const MAX_MOUNTAIN_FRACTION: f64 = 0.5;
const PEAK_PREFER_GREEN_CHANCE: f64 = 0.4;
const RIDGE_AVOID_GREEN_CHANCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReliefReport {
    /// Tiles in the upper band.
    pub peaks: usize,
    /// Tiles in the band just below the peaks.
    pub ridges: usize,
    pub skipped_coastal: usize,
}

impl ReliefReport {
    pub fn total(&self) -> usize {
        self.peaks + self.ridges
    }
}

/// Share of the land height span given to each relief band.
pub fn mountain_fraction(steepness: u8, mode: GeneratorMode) -> f64 {
    let base = f64::from(steepness) / 300.0;
    let fraction = match mode {
        GeneratorMode::Standard => base,
        GeneratorMode::Fracture => base * FRACTURE_RELIEF_SCALE,
    };
    fraction.clamp(0.0, MAX_MOUNTAIN_FRACTION)
}

/// Places mountain-biased terrain on the highest unplaced land.
///
/// Visits tiles row-major. Only tiles inside a relief band draw: one draw
/// for the prefer/avoid bias, then one for the selection. Fracture mode
/// skips land touching water without drawing.
pub fn place_relief(
    grid: &mut TileGrid,
    placement: &mut PlacementMap,
    selector: &TerrainSelector<'_>,
    shore_level: i32,
    steepness: u8,
    mode: GeneratorMode,
    rng: &mut dyn RandomSource,
) -> ReliefReport {
    let ruleset = selector.ruleset();
    let w = grid.width();
    let h = grid.height();
    let fraction = mountain_fraction(steepness, mode);
    let peak_floor = 1.0 - fraction;
    let ridge_floor = 1.0 - 2.0 * fraction;
    let mut report = ReliefReport::default();

    for y in 0..h {
        for x in 0..w {
            if !placement.not_placed(x, y) || !ruleset.is_land(grid.terrain_at(x, y)) {
                continue;
            }
            let ratio = land_ratio(grid.tile(x, y).elevation, shore_level);
            if ratio <= ridge_floor {
                continue;
            }
            if mode == GeneratorMode::Fracture
                && neighbors8(x, y, w, h).any(|(nx, ny)| ruleset.is_water(grid.terrain_at(nx, ny)))
            {
                report.skipped_coastal += 1;
                continue;
            }

            let request = if ratio > peak_floor {
                report.peaks += 1;
                let prefer = if rng.next_unit() < PEAK_PREFER_GREEN_CHANCE {
                    None
                } else {
                    Some(TerrainProperty::Green)
                };
                SelectionRequest::new(Some(TerrainProperty::Mountainous), prefer, None)
            } else {
                report.ridges += 1;
                let avoid = if rng.next_unit() < RIDGE_AVOID_GREEN_CHANCE {
                    Some(TerrainProperty::Green)
                } else {
                    None
                };
                SelectionRequest::new(Some(TerrainProperty::Mountainous), None, avoid)
            };
            let terrain = selector.pick(request, rng);
            grid.set_terrain(x, y, terrain);
            placement.set_placed(x, y);
        }
    }

    tracing::info!(
        target: "mapgen::relief",
        mode = ?mode,
        fraction,
        peaks = report.peaks,
        ridges = report.ridges,
        skipped_coastal = report.skipped_coastal,
        "mapgen.relief.placed"
    );
    report
}
