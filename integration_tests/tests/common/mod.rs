#![allow(dead_code)]

use map_runtime::TerrainRuleset;
use mapgen_core::{generate_map, ElevationField, GeneratedMap, MapGenSettings, MapRng, TileGrid};

/// Square paraboloid hill centred on the map; about 30% of tiles clear the
/// default shore level.
pub fn island_field(size: u32) -> anyhow::Result<ElevationField> {
    let centre = (size as f32 - 1.0) / 2.0;
    let mut values = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - centre;
            let dy = y as f32 - centre;
            values.push(-(dx * dx + dy * dy));
        }
    }
    Ok(ElevationField::new(size, size, values)?)
}

/// Field from rows of `#` (high) and `.` (low).
pub fn field_from_rows(rows: &[&str]) -> anyhow::Result<ElevationField> {
    let width = rows[0].len() as u32;
    let values = rows
        .iter()
        .flat_map(|row| row.chars())
        .map(|glyph| if glyph == '#' { 10.0 } else { 0.0 })
        .collect();
    Ok(ElevationField::new(width, rows.len() as u32, values)?)
}

pub fn generate(
    field: &ElevationField,
    settings: &MapGenSettings,
    seed: u64,
) -> anyhow::Result<GeneratedMap> {
    let ruleset = TerrainRuleset::builtin();
    let mut rng = MapRng::seed_from_u64(seed);
    Ok(generate_map(field, settings, &ruleset, &mut rng)?)
}

pub fn count_keys(grid: &TileGrid, ruleset: &TerrainRuleset, keys: &[&str]) -> usize {
    grid.tiles()
        .iter()
        .filter(|tile| keys.contains(&ruleset.key_of(tile.terrain)))
        .count()
}
