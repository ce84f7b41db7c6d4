mod common;

use map_runtime::TerrainRuleset;
use mapgen_core::{GeneratorMode, MapGenSettings, TileGrid, OCEAN_DIST_MAX};

const WATER_KEYS: [&str; 4] = ["coast", "ocean", "deep_ocean", "lake"];
const RELIEF_KEYS: [&str; 2] = ["hills", "mountains"];

fn touches_water(grid: &TileGrid, ruleset: &TerrainRuleset, x: usize, y: usize) -> bool {
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            let (nx, ny) = (x as i64 + dx, y as i64 + dy);
            if (dx, dy) == (0, 0) || nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if grid.in_bounds(nx, ny) && ruleset.is_water(grid.terrain_at(nx, ny)) {
                return true;
            }
        }
    }
    false
}

#[test]
fn every_tile_is_typed_and_numbered() -> anyhow::Result<()> {
    let ruleset = TerrainRuleset::builtin();
    let field = common::island_field(40)?;
    for generator in [GeneratorMode::Standard, GeneratorMode::Fracture] {
        let settings = MapGenSettings {
            generator,
            ..Default::default()
        };
        let map = common::generate(&field, &settings, 17)?;
        for tile in map.grid.tiles() {
            assert!(!tile.terrain.is_placeholder(), "{tile:?}");
            if ruleset.is_water(tile.terrain) {
                assert!(WATER_KEYS.contains(&ruleset.key_of(tile.terrain)));
                assert_eq!(tile.continent_id, 0);
            } else {
                assert!(tile.continent_id > 0);
            }
        }
    }
    Ok(())
}

#[test]
fn relief_share_stays_bounded() -> anyhow::Result<()> {
    let ruleset = TerrainRuleset::builtin();
    let map = common::generate(&common::island_field(40)?, &MapGenSettings::default(), 4)?;
    let mountains = common::count_keys(&map.grid, &ruleset, &["mountains"]);
    let hills = common::count_keys(&map.grid, &ruleset, &["hills"]);
    let land = map
        .grid
        .tiles()
        .iter()
        .filter(|tile| ruleset.is_land(tile.terrain))
        .count();
    assert!(mountains > 0);
    assert!(hills > 0);
    let share = (mountains + hills) as f64 / land as f64;
    assert!(share > 0.05 && share < 0.5, "relief share {share}");
    Ok(())
}

#[test]
fn fracture_keeps_relief_off_the_coast() -> anyhow::Result<()> {
    let ruleset = TerrainRuleset::builtin();
    let settings = MapGenSettings {
        generator: GeneratorMode::Fracture,
        ..Default::default()
    };
    let map = common::generate(&common::island_field(40)?, &settings, 8)?;
    assert!(map.report.relief.total() > 0);
    let grid = &map.grid;
    for tile in grid.tiles() {
        let (x, y) = (tile.x as usize, tile.y as usize);
        if RELIEF_KEYS.contains(&ruleset.key_of(tile.terrain)) {
            assert!(!touches_water(grid, &ruleset, x, y), "relief on coast at {x},{y}");
        }
    }
    Ok(())
}

#[test]
fn enclosed_single_tile_water_becomes_lake() -> anyhow::Result<()> {
    let ruleset = TerrainRuleset::builtin();
    let field = common::field_from_rows(&[
        "..........",
        ".########.",
        ".########.",
        ".###.####.",
        ".########.",
        ".####..##.",
        ".####.###.",
        ".########.",
        ".########.",
        "..........",
    ])?;
    let map = common::generate(&field, &MapGenSettings::default(), 2)?;
    let lake = map.grid.tile(4, 3);
    assert_eq!(ruleset.key_of(lake.terrain), "lake");
    assert_eq!(lake.continent_id, 0);
    // Three-tile body keeps a depth type.
    assert_ne!(ruleset.key_of(map.grid.terrain_at(5, 5)), "lake");
    assert!(ruleset.is_water(map.grid.terrain_at(5, 5)));
    assert_eq!(map.report.continents.lake_bodies, 1);
    assert_eq!(map.report.continents.continent_count(), 1);
    Ok(())
}

#[test]
fn lone_speck_is_sunk() -> anyhow::Result<()> {
    let ruleset = TerrainRuleset::builtin();
    let field = common::field_from_rows(&[
        ".........",
        ".........",
        ".........",
        ".........",
        "....#....",
        ".........",
        ".........",
        ".........",
        ".........",
    ])?;
    let map = common::generate(&field, &MapGenSettings::default(), 6)?;
    let speck = map.grid.tile(4, 4);
    assert!(ruleset.is_water(speck.terrain));
    assert_eq!(speck.continent_id, 0);
    assert_eq!(map.report.continents.removed_islands, 1);
    assert_eq!(map.report.continents.continent_sizes, vec![0]);
    Ok(())
}

#[test]
fn ocean_deepens_away_from_land() -> anyhow::Result<()> {
    let map = common::generate(&common::island_field(40)?, &MapGenSettings::default(), 12)?;
    let ocean = &map.report.ocean;
    let means: Vec<f64> = ocean
        .mean_depth_by_distance
        .iter()
        .zip(&ocean.tiles_by_distance)
        .take(OCEAN_DIST_MAX as usize)
        .filter(|(_, count)| **count > 0)
        .map(|(mean, _)| *mean)
        .collect();
    assert!(means.len() >= 2);
    assert!(means.windows(2).all(|pair| pair[0] <= pair[1]), "{means:?}");
    Ok(())
}
