use map_runtime::{MapSnapshot, SnapshotHeader, TerrainRuleset, TileState};

use crate::grid::{Tile, TileGrid};

fn tile_state(tile: &Tile) -> TileState {
    TileState {
        x: tile.x,
        y: tile.y,
        terrain: tile.terrain.0,
        elevation: tile.elevation,
        continent: tile.continent_id,
        temperature: tile.temperature.ordinal(),
        wetness: tile.wetness,
        river_mask: tile.river_mask,
    }
}

/// Captures a generated grid as a hashed, serialisable snapshot.
///
/// Tile terrain values index the ruleset's key table, which is carried in
/// `terrain_names`.
pub fn build_snapshot(
    grid: &TileGrid,
    ruleset: &TerrainRuleset,
    seed: u64,
    continent_count: usize,
) -> MapSnapshot {
    let header = SnapshotHeader::new(
        grid.width() as u32,
        grid.height() as u32,
        seed,
        continent_count,
    );
    let snapshot = MapSnapshot {
        header,
        terrain_names: ruleset.terrain_names(),
        tiles: grid.tiles().iter().map(tile_state).collect(),
    }
    .finalize();

    tracing::debug!(
        target: "mapgen::snapshot",
        tiles = snapshot.tiles.len(),
        hash = snapshot.header.hash,
        "mapgen.snapshot.captured"
    );
    snapshot
}
