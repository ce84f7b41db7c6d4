use map_runtime::TerrainRuleset;
use rayon::prelude::*;

use crate::grid::{neighbors8, TemperatureZone, TileGrid, MAX_COLATITUDE, MAX_LEVEL};

/// Tiles below this wetness count as dry.
pub const DRY_WETNESS_LEVEL: u8 = 35;
const DRY_BAND_PENALTY: i32 = 40;

/// Zone thresholds on the temperature scale derived from the temperature knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimateLevels {
    pub cold_level: i32,
    pub tropical_level: i32,
    pub ice_base_level: i32,
}

impl ClimateLevels {
    pub fn from_temperature(temperature: u8) -> Self {
        let t = i32::from(temperature);
        let cold_level = (MAX_COLATITUDE * (420 - t * 6) / 700).max(0);
        let tropical_level = (MAX_COLATITUDE * (1001 - t * 10) / 700).min(900);
        Self {
            cold_level,
            tropical_level,
            ice_base_level: cold_level / 3,
        }
    }

    pub fn zone_for(&self, temperature: i32) -> TemperatureZone {
        if temperature >= self.tropical_level {
            TemperatureZone::TROPICAL
        } else if temperature >= self.cold_level {
            TemperatureZone::TEMPERATE
        } else if temperature >= 2 * self.ice_base_level {
            TemperatureZone::COLD
        } else {
            TemperatureZone::FROZEN
        }
    }
}

/// Knobs the climate pass reads.
#[derive(Debug, Clone, Copy)]
pub struct ClimateParams {
    pub shore_level: i32,
    pub steepness: u8,
    pub wetness: u8,
    pub temperature: u8,
}

/// Per-tile climate facts that do not live on [`crate::Tile`].
#[derive(Debug, Clone)]
pub struct ClimateMap {
    pub levels: ClimateLevels,
    low_land: Vec<bool>,
    pub zone_counts: [usize; 4],
    pub dry_tiles: usize,
}

impl ClimateMap {
    pub fn is_low(&self, index: usize) -> bool {
        self.low_land.get(index).copied().unwrap_or(false)
    }

    pub fn summary(&self) -> ClimateSummary {
        ClimateSummary {
            levels: self.levels,
            zone_counts: self.zone_counts,
            dry_tiles: self.dry_tiles,
            low_tiles: self.low_land.iter().filter(|low| **low).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimateSummary {
    pub levels: ClimateLevels,
    /// Frozen, cold, temperate, tropical.
    pub zone_counts: [usize; 4],
    pub dry_tiles: usize,
    pub low_tiles: usize,
}

pub fn colatitude(y: usize, height: usize) -> i32 {
    let rows = height.max(1) as f64;
    let lat = ((2 * y + 1) as f64 / rows - 1.0).abs();
    ((1.0 - lat) * f64::from(MAX_COLATITUDE)).round() as i32
}

/// Elevation share above the shore, in `[0, 1]`; 0 at or below the shore.
pub fn land_ratio(elevation: i32, shore_level: i32) -> f64 {
    let span = MAX_LEVEL - shore_level;
    if span <= 0 {
        return 0.0;
    }
    (f64::from(elevation - shore_level) / f64::from(span)).clamp(0.0, 1.0)
}

/// Writes temperature zone and wetness onto every tile.
///
/// Random-free and per-tile independent; reads only heights and the
/// water/land split from land classification.
pub fn map_climate(grid: &mut TileGrid, ruleset: &TerrainRuleset, params: ClimateParams) -> ClimateMap {
    let w = grid.width();
    let h = grid.height();
    let levels = ClimateLevels::from_temperature(params.temperature);
    let water: Vec<bool> = grid
        .tiles()
        .iter()
        .map(|tile| ruleset.is_water(tile.terrain))
        .collect();
    let t = i32::from(params.temperature);
    let wet = i32::from(params.wetness);
    let dry_min = MAX_COLATITUDE * (7300 - t * 18 - wet * 5) / 10000;
    let dry_max = MAX_COLATITUDE * (7300 + t * 17 - wet * 30) / 10000;
    let low_cutoff = (1.0 - f64::from(params.steepness) / 100.0) / 2.0;

    let tiles = grid.tiles();
    let computed: Vec<(TemperatureZone, u8, bool)> = (0..w * h)
        .into_par_iter()
        .map(|i| {
            let (x, y) = (i % w, i / w);
            let colat = colatitude(y, h);
            let mut ocean = 0;
            let mut total = 0;
            for (nx, ny) in neighbors8(x, y, w, h) {
                total += 1;
                if water[ny * w + nx] {
                    ocean += 1;
                }
            }
            let ocean_pct = if total == 0 { 0 } else { ocean * 100 / total };

            let elevation = tiles[i].elevation;
            let height_factor = -0.3 * f64::from((elevation - params.shore_level).max(0))
                / f64::from((MAX_LEVEL - params.shore_level).max(1));
            let temperate_factor = 0.15
                * (f64::from(t) / 100.0 - f64::from(colat) / f64::from(MAX_COLATITUDE))
                * 2.0
                * f64::from(ocean_pct.min(50))
                / 100.0;
            let temperature =
                (f64::from(colat) * (1.0 + temperate_factor) * (1.0 + height_factor)) as i32;
            let zone = levels.zone_for(temperature);

            let penalty = if colat > dry_min && colat <= dry_max {
                DRY_BAND_PENALTY
            } else {
                0
            };
            let wetness = (wet + ocean_pct / 2 - penalty).clamp(0, 100) as u8;

            let low = !water[i] && land_ratio(elevation, params.shore_level) < low_cutoff;
            (zone, wetness, low)
        })
        .collect();

    let mut zone_counts = [0usize; 4];
    let mut dry_tiles = 0usize;
    let mut low_land = Vec::with_capacity(computed.len());
    for (tile, (zone, wetness, low)) in grid.tiles_mut().iter_mut().zip(computed) {
        tile.temperature = zone;
        tile.wetness = wetness;
        low_land.push(low);
        if let Some(slot) = zone.ordinal().checked_sub(1) {
            zone_counts[slot as usize] += 1;
        }
        if wetness < DRY_WETNESS_LEVEL {
            dry_tiles += 1;
        }
    }

    tracing::info!(
        target: "mapgen::climate",
        cold_level = levels.cold_level,
        tropical_level = levels.tropical_level,
        frozen = zone_counts[0],
        cold = zone_counts[1],
        temperate = zone_counts[2],
        tropical = zone_counts[3],
        dry = dry_tiles,
        "mapgen.climate.mapped"
    );

    ClimateMap {
        levels,
        low_land,
        zone_counts,
        dry_tiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{land::classify_land, placement::PlacementMap};

    #[test]
    fn levels_for_default_temperature() {
        let levels = ClimateLevels::from_temperature(50);
        assert_eq!(levels.cold_level, 171);
        assert_eq!(levels.tropical_level, 715);
        assert_eq!(levels.ice_base_level, 57);
        assert_eq!(levels.zone_for(800), TemperatureZone::TROPICAL);
        assert_eq!(levels.zone_for(400), TemperatureZone::TEMPERATE);
        assert_eq!(levels.zone_for(120), TemperatureZone::COLD);
        assert_eq!(levels.zone_for(20), TemperatureZone::FROZEN);
    }

    #[test]
    fn hot_worlds_lose_the_cold_band() {
        let levels = ClimateLevels::from_temperature(100);
        assert_eq!(levels.cold_level, 0);
        assert_eq!(levels.zone_for(0), TemperatureZone::TEMPERATE);
    }

    #[test]
    fn colatitude_peaks_at_equator() {
        assert_eq!(colatitude(0, 1), MAX_COLATITUDE);
        let rows: Vec<i32> = (0..10).map(|y| colatitude(y, 10)).collect();
        assert_eq!(rows[0], rows[9]);
        assert!(rows[0] < 150);
        assert_eq!(rows[4], MAX_COLATITUDE - 100);
        assert!(rows.windows(2).take(4).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn poles_freeze_and_equator_is_warm() {
        let ruleset = TerrainRuleset::builtin();
        let (w, h) = (8usize, 20usize);
        let levels = vec![800; w * h];
        let mut grid = TileGrid::new(w, h);
        let mut placement = PlacementMap::new(w, h);
        let classified = classify_land(&mut grid, &levels, 30, &ruleset, &mut placement);
        let climate = map_climate(
            &mut grid,
            &ruleset,
            ClimateParams {
                shore_level: classified.shore_level,
                steepness: 30,
                wetness: 50,
                temperature: 50,
            },
        );
        assert_eq!(grid.tile(3, 0).temperature, TemperatureZone::FROZEN);
        assert!(TemperatureZone::HOT.intersects(grid.tile(3, h / 2).temperature));
        assert_eq!(climate.zone_counts.iter().sum::<usize>(), w * h);
        // All land with no coast: wetness is the knob or the knob minus the band penalty.
        assert!(grid
            .tiles()
            .iter()
            .all(|tile| tile.wetness == 50 || tile.wetness == 10));
    }

    #[test]
    fn low_land_sits_near_the_shore() {
        let ruleset = TerrainRuleset::builtin();
        let levels = vec![0, 720, 990, 0];
        let mut grid = TileGrid::new(4, 1);
        let mut placement = PlacementMap::new(4, 1);
        classify_land(&mut grid, &levels, 30, &ruleset, &mut placement);
        let climate = map_climate(
            &mut grid,
            &ruleset,
            ClimateParams {
                shore_level: 700,
                steepness: 30,
                wetness: 50,
                temperature: 50,
            },
        );
        assert!(!climate.is_low(0));
        assert!(climate.is_low(1));
        assert!(!climate.is_low(2));
        assert!(!climate.is_low(7));
    }
}
