use map_runtime::{TerrainId, TerrainRuleset};
use rayon::prelude::*;

use crate::{
    grid::{neighbors8, TileGrid, MAX_LEVEL},
    placement::PlacementMap,
};

/// Ceiling of the provisional water depth.
pub const OCEAN_DEPTH_MAXIMUM: i32 = 100;
/// Provisional depth at which water starts out as the deepest type.
pub const DEEP_WATER_DEPTH: i32 = 50;
const NEIGHBOUR_DEPTH_BIAS: i32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandClassification {
    pub shore_level: i32,
    pub land_tiles: usize,
    pub shallow_tiles: usize,
    pub deep_tiles: usize,
}

pub fn shore_level(landpercent: u8) -> i32 {
    MAX_LEVEL * (100 - i32::from(landpercent.min(100))) / 100
}

/// Splits the grid into water and land placeholders at the shore level.
///
/// Water gets a coarse shallow/deep type and is marked placed; land becomes
/// [`TerrainId::LAND_FILL`]. `levels` must be the normalised heights.
pub fn classify_land(
    grid: &mut TileGrid,
    levels: &[i32],
    landpercent: u8,
    ruleset: &TerrainRuleset,
    placement: &mut PlacementMap,
) -> LandClassification {
    let w = grid.width();
    let h = grid.height();
    debug_assert_eq!(levels.len(), w * h);
    let shore = shore_level(landpercent);

    let depths: Vec<Option<i32>> = (0..w * h)
        .into_par_iter()
        .map(|i| water_depth(i % w, i / w, levels, shore, w, h))
        .collect();

    let shallow = ruleset.shallowest_water();
    let deep = ruleset.deepest_water();
    let mut summary = LandClassification {
        shore_level: shore,
        ..Default::default()
    };
    for (i, depth) in depths.into_iter().enumerate() {
        let (x, y) = (i % w, i / w);
        let tile = grid.tile_mut(x, y);
        tile.elevation = levels[i];
        match depth {
            Some(depth) => {
                if depth >= DEEP_WATER_DEPTH {
                    tile.terrain = deep;
                    summary.deep_tiles += 1;
                } else {
                    tile.terrain = shallow;
                    summary.shallow_tiles += 1;
                }
                placement.set_placed(x, y);
            }
            None => {
                tile.terrain = TerrainId::LAND_FILL;
                summary.land_tiles += 1;
            }
        }
    }

    tracing::info!(
        target: "mapgen::land",
        shore_level = shore,
        land = summary.land_tiles,
        shallow = summary.shallow_tiles,
        deep = summary.deep_tiles,
        "mapgen.land.classified"
    );
    summary
}

/// `None` for land; otherwise the clamped provisional depth.
fn water_depth(x: usize, y: usize, levels: &[i32], shore: i32, w: usize, h: usize) -> Option<i32> {
    let height = levels[y * w + x];
    if height >= shore {
        return None;
    }
    let mut depth = (shore - height) * 100 / shore;

    let mut ocean = 0i32;
    let mut land = 0i32;
    for (nx, ny) in neighbors8(x, y, w, h) {
        if levels[ny * w + nx] < shore {
            ocean += 1;
        } else {
            land += 1;
        }
    }
    depth += NEIGHBOUR_DEPTH_BIAS * (ocean - land) / (ocean + land).max(1);
    Some(depth.clamp(0, OCEAN_DEPTH_MAXIMUM))
}
