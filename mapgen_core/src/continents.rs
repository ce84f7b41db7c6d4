use std::collections::VecDeque;

use map_runtime::TerrainRuleset;

use crate::{
    grid::{neighbors4, square_around, TileGrid},
    random::RandomSource,
};

/// Water bodies up to this many tiles become lakes.
pub const LAKE_MAX_SIZE: usize = 2;
const TINY_ISLAND_RADIUS: usize = 2;
/// Island threshold is drawn from `BASE..BASE + SPREAD`.
const TINY_ISLAND_THRESHOLD_BASE: usize = 3;
const TINY_ISLAND_THRESHOLD_SPREAD: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinentReport {
    pub removed_islands: usize,
    /// Tile count per continent after island removal; continent `id` is at
    /// `id - 1`.
    pub continent_sizes: Vec<usize>,
    /// Tile count per water body before lake conversion.
    pub ocean_body_sizes: Vec<usize>,
    /// Water body label per tile (0 on land), row-major.
    pub ocean_bodies: Vec<u32>,
    pub lake_bodies: usize,
    pub lake_tiles: usize,
}

impl ContinentReport {
    pub fn continent_count(&self) -> usize {
        self.continent_sizes.len()
    }
}

/// 4-connected component labels over `member`, starting at 1 in row-major
/// seed order; non-members stay 0.
fn label_components(member: &[bool], w: usize, h: usize) -> (Vec<u32>, Vec<usize>) {
    let idx = |x: usize, y: usize| -> usize { y * w + x };
    let mut labels = vec![0u32; w * h];
    let mut sizes = Vec::new();
    let mut q = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            let seed = idx(x, y);
            if !member[seed] || labels[seed] != 0 {
                continue;
            }
            let label = sizes.len() as u32 + 1;
            let mut size = 0usize;
            labels[seed] = label;
            q.push_back((x, y));
            while let Some((cx, cy)) = q.pop_front() {
                size += 1;
                for (nx, ny) in neighbors4(cx, cy, w, h) {
                    let ni = idx(nx, ny);
                    if member[ni] && labels[ni] == 0 {
                        labels[ni] = label;
                        q.push_back((nx, ny));
                    }
                }
            }
            sizes.push(size);
        }
    }

    (labels, sizes)
}

/// Drops land specks whose radius-2 neighbourhood holds too little land.
///
/// Row-major and in place: a sunk tile no longer counts for the tiles after
/// it. Sunk tiles become the shallowest water, leave their continent and
/// shrink its size. One draw per tile that is still land when visited.
fn remove_tiny_islands(
    grid: &mut TileGrid,
    land: &mut [bool],
    continent_sizes: &mut [usize],
    ruleset: &TerrainRuleset,
    rng: &mut dyn RandomSource,
) -> usize {
    let w = grid.width();
    let h = grid.height();
    let shallow = ruleset.shallowest_water();
    let mut removed = 0;

    for y in 0..h {
        for x in 0..w {
            if !land[y * w + x] {
                continue;
            }
            let count = 1 + square_around(x, y, TINY_ISLAND_RADIUS, w, h)
                .filter(|&(nx, ny)| land[ny * w + nx])
                .count();
            let threshold = TINY_ISLAND_THRESHOLD_BASE
                + (rng.next_unit() * TINY_ISLAND_THRESHOLD_SPREAD as f64).floor() as usize;
            if count <= threshold {
                land[y * w + x] = false;
                let tile = grid.tile_mut(x, y);
                if let Some(size) = (tile.continent_id as usize)
                    .checked_sub(1)
                    .and_then(|slot| continent_sizes.get_mut(slot))
                {
                    *size = size.saturating_sub(1);
                }
                tile.terrain = shallow;
                tile.continent_id = 0;
                removed += 1;
            }
        }
    }
    removed
}

/// Numbers continents, labels water bodies, turns the smallest of them into
/// lakes and finally sinks tiny islands.
///
/// Ids and water labels are fixed before any island is sunk, so a sunk
/// continent keeps its id slot with size 0 and sunk tiles carry no water
/// label.
pub fn map_continents(
    grid: &mut TileGrid,
    ruleset: &TerrainRuleset,
    rng: &mut dyn RandomSource,
) -> ContinentReport {
    let w = grid.width();
    let h = grid.height();

    let mut land: Vec<bool> = grid
        .tiles()
        .iter()
        .map(|tile| ruleset.is_land(tile.terrain))
        .collect();
    let (continents, mut continent_sizes) = label_components(&land, w, h);
    for (tile, continent) in grid.tiles_mut().iter_mut().zip(&continents) {
        tile.continent_id = *continent;
    }

    let water: Vec<bool> = land.iter().map(|is_land| !is_land).collect();
    let (ocean_bodies, ocean_body_sizes) = label_components(&water, w, h);
    let lake = ruleset.lake();
    let lake_bodies = ocean_body_sizes
        .iter()
        .filter(|size| **size <= LAKE_MAX_SIZE)
        .count();
    let mut lake_tiles = 0;
    for (tile, body) in grid.tiles_mut().iter_mut().zip(&ocean_bodies) {
        if *body != 0 && ocean_body_sizes[*body as usize - 1] <= LAKE_MAX_SIZE {
            tile.terrain = lake;
            lake_tiles += 1;
        }
    }

    let removed_islands =
        remove_tiny_islands(grid, &mut land, &mut continent_sizes, ruleset, rng);

    let report = ContinentReport {
        removed_islands,
        continent_sizes,
        ocean_body_sizes,
        ocean_bodies,
        lake_bodies,
        lake_tiles,
    };
    tracing::info!(
        target: "mapgen::continents",
        continents = report.continent_count(),
        ocean_bodies = report.ocean_body_sizes.len(),
        lakes = report.lake_bodies,
        removed_islands = report.removed_islands,
        "mapgen.continents.mapped"
    );
    report
}
