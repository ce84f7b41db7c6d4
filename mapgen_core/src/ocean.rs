use std::collections::{HashMap, VecDeque};

use map_runtime::TerrainId;

use crate::{
    grid::{neighbors8, TileGrid},
    land::OCEAN_DEPTH_MAXIMUM,
    random::RandomSource,
    selector::TerrainSelector,
};

pub const OCEAN_DEPTH_STEP: i32 = 25;
pub const OCEAN_DEPTH_RAND: i32 = 15;
/// Search radius for the nearest land, in tiles.
pub const OCEAN_DIST_MAX: u32 = (OCEAN_DEPTH_MAXIMUM / OCEAN_DEPTH_STEP) as u32;
/// Neighbours that must agree before a water tile takes their type.
pub const CONSENSUS_NEIGHBOURS: usize = 2 * 8 / 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OceanDepthReport {
    /// Mean computed depth per distance to land: index 0 is distance 1,
    /// index `OCEAN_DIST_MAX - 1` is the search radius and the last slot
    /// collects water beyond it.
    pub mean_depth_by_distance: Vec<f64>,
    pub tiles_by_distance: Vec<usize>,
    pub smoothed: usize,
}

/// Distance recorded for water with no land within `OCEAN_DIST_MAX`.
const BEYOND_RADIUS: u32 = OCEAN_DIST_MAX + 1;

/// Chebyshev distance from every tile to the nearest land, up to
/// `OCEAN_DIST_MAX`; farther water gets `BEYOND_RADIUS`. Land tiles are 0.
fn land_distance(grid: &TileGrid, is_water: &[bool]) -> Vec<u32> {
    let w = grid.width();
    let h = grid.height();
    let idx = |x: usize, y: usize| -> usize { y * w + x };
    let mut distance = vec![BEYOND_RADIUS; w * h];
    let mut dq = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            if !is_water[idx(x, y)] {
                distance[idx(x, y)] = 0;
                dq.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = dq.pop_front() {
        let next = distance[idx(x, y)] + 1;
        if next > OCEAN_DIST_MAX {
            continue;
        }
        for (nx, ny) in neighbors8(x, y, w, h) {
            let ni = idx(nx, ny);
            if distance[ni] > next {
                distance[ni] = next;
                dq.push_back((nx, ny));
            }
        }
    }

    distance
}

/// Re-types every water tile by its distance to land, then lets a strong
/// neighbour majority override isolated types.
///
/// The majority pass reads a frozen copy of the first pass.
pub fn smooth_ocean_depth(
    grid: &mut TileGrid,
    selector: &TerrainSelector<'_>,
    rng: &mut dyn RandomSource,
) -> OceanDepthReport {
    let ruleset = selector.ruleset();
    let w = grid.width();
    let h = grid.height();
    let is_water: Vec<bool> = grid
        .tiles()
        .iter()
        .map(|tile| ruleset.is_water(tile.terrain))
        .collect();
    let distance = land_distance(grid, &is_water);

    let buckets = BEYOND_RADIUS as usize;
    let mut depth_sums = vec![0i64; buckets];
    let mut report = OceanDepthReport {
        tiles_by_distance: vec![0; buckets],
        ..Default::default()
    };

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if !is_water[i] {
                continue;
            }
            let dist = distance[i];
            let depth = if dist <= OCEAN_DIST_MAX {
                let jitter = (rng.next_unit() * f64::from(OCEAN_DEPTH_RAND)).floor() as i32;
                dist as i32 * OCEAN_DEPTH_STEP + jitter.min(OCEAN_DEPTH_RAND - 1)
            } else {
                OCEAN_DEPTH_MAXIMUM
            };
            let bucket = (dist.max(1) as usize - 1).min(buckets - 1);
            depth_sums[bucket] += i64::from(depth);
            report.tiles_by_distance[bucket] += 1;
            grid.set_terrain(x, y, selector.pick_water(depth));
        }
    }

    report.mean_depth_by_distance = depth_sums
        .iter()
        .zip(&report.tiles_by_distance)
        .map(|(&sum, &count)| {
            if count == 0 {
                0.0
            } else {
                sum as f64 / count as f64
            }
        })
        .collect();

    let frozen = grid.terrain_ids();
    let mut tally: HashMap<TerrainId, usize> = HashMap::new();
    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            if !is_water[i] {
                continue;
            }
            tally.clear();
            for (nx, ny) in neighbors8(x, y, w, h) {
                let ni = ny * w + nx;
                if is_water[ni] {
                    *tally.entry(frozen[ni]).or_insert(0) += 1;
                }
            }
            // At least five of eight agreeing leaves a single candidate.
            let majority = tally
                .iter()
                .find(|(_, count)| **count >= CONSENSUS_NEIGHBOURS)
                .map(|(terrain, _)| *terrain);
            if let Some(terrain) = majority {
                if terrain != frozen[i] {
                    grid.set_terrain(x, y, terrain);
                    report.smoothed += 1;
                }
            }
        }
    }

    tracing::info!(
        target: "mapgen::ocean",
        tiles = report.tiles_by_distance.iter().sum::<usize>(),
        smoothed = report.smoothed,
        mean_depth = ?report.mean_depth_by_distance,
        "mapgen.ocean.smoothed"
    );
    report
}
