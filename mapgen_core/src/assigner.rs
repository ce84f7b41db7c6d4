use map_runtime::{TerrainId, TerrainRuleset};

use crate::{
    climate::{ClimateLevels, ClimateMap, DRY_WETNESS_LEVEL},
    grid::{neighbors4, TemperatureZone, TileGrid, HEIGHT_UNIT, MAX_COLATITUDE},
    placement::PlacementMap,
    random::{pick_index, RandomSource},
    selector::{SelectionRequest, TerrainSelector},
};

use map_runtime::TerrainProperty as P;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiomeCategory {
    Forest,
    Jungle,
    Swamp,
    Desert,
    AltDesert,
    Plains,
}

pub const CATEGORY_COUNT: usize = 6;

impl BiomeCategory {
    /// Fixed priority order of the placement loop.
    pub const ALL: [BiomeCategory; CATEGORY_COUNT] = [
        BiomeCategory::Forest,
        BiomeCategory::Jungle,
        BiomeCategory::Swamp,
        BiomeCategory::Desert,
        BiomeCategory::AltDesert,
        BiomeCategory::Plains,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            BiomeCategory::Forest => "forest",
            BiomeCategory::Jungle => "jungle",
            BiomeCategory::Swamp => "swamp",
            BiomeCategory::Desert => "desert",
            BiomeCategory::AltDesert => "alt_desert",
            BiomeCategory::Plains => "plains",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WetnessCondition {
    All,
    NotDry,
    Dry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationCondition {
    Any,
    Low,
    NotLow,
}

#[derive(Debug, Clone, Copy)]
struct CategoryRule {
    category: BiomeCategory,
    wetness: WetnessCondition,
    temperature: TemperatureZone,
    elevation: ElevationCondition,
    /// `None` selects by the tile's own zone.
    request: Option<SelectionRequest>,
    fold: Option<BiomeCategory>,
    cluster_weight: i32,
}

const CATEGORY_RULES: [CategoryRule; CATEGORY_COUNT] = [
    CategoryRule {
        category: BiomeCategory::Forest,
        wetness: WetnessCondition::All,
        temperature: TemperatureZone::NOT_FROZEN,
        elevation: ElevationCondition::Any,
        request: Some(SelectionRequest::new(
            Some(P::Foliage),
            Some(P::Temperate),
            Some(P::Tropical),
        )),
        fold: Some(BiomeCategory::Plains),
        cluster_weight: 60,
    },
    CategoryRule {
        category: BiomeCategory::Jungle,
        wetness: WetnessCondition::All,
        temperature: TemperatureZone::TROPICAL,
        elevation: ElevationCondition::Any,
        request: Some(SelectionRequest::new(
            Some(P::Foliage),
            Some(P::Tropical),
            Some(P::Cold),
        )),
        fold: Some(BiomeCategory::Forest),
        cluster_weight: 50,
    },
    CategoryRule {
        category: BiomeCategory::Swamp,
        wetness: WetnessCondition::NotDry,
        temperature: TemperatureZone::HOT,
        elevation: ElevationCondition::Low,
        request: Some(SelectionRequest::new(Some(P::Wet), None, Some(P::Foliage))),
        fold: Some(BiomeCategory::Forest),
        cluster_weight: 50,
    },
    CategoryRule {
        category: BiomeCategory::Desert,
        wetness: WetnessCondition::Dry,
        temperature: TemperatureZone::NOT_FROZEN,
        elevation: ElevationCondition::NotLow,
        request: Some(SelectionRequest::new(
            Some(P::Dry),
            Some(P::Tropical),
            Some(P::Cold),
        )),
        fold: Some(BiomeCategory::AltDesert),
        cluster_weight: 80,
    },
    CategoryRule {
        category: BiomeCategory::AltDesert,
        wetness: WetnessCondition::All,
        temperature: TemperatureZone::NOT_FROZEN,
        elevation: ElevationCondition::NotLow,
        request: Some(SelectionRequest::new(
            Some(P::Dry),
            Some(P::Tropical),
            Some(P::Wet),
        )),
        fold: Some(BiomeCategory::Plains),
        cluster_weight: 40,
    },
    CategoryRule {
        category: BiomeCategory::Plains,
        wetness: WetnessCondition::All,
        temperature: TemperatureZone::NOT_FROZEN,
        elevation: ElevationCondition::Any,
        request: None,
        fold: None,
        cluster_weight: 0,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct BiomeParams {
    pub landpercent: u8,
    pub steepness: u8,
    pub wetness: u8,
    pub temperature: u8,
}

/// Category shares in percent of the non-mountain land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeShares {
    pub mountain_pct: f64,
    pub forest_pct: f64,
    pub jungle_pct: f64,
    pub swamp_pct: f64,
    pub desert_pct: f64,
}

impl BiomeShares {
    pub fn compute(params: BiomeParams, levels: &ClimateLevels) -> Self {
        let landpercent = i32::from(params.landpercent);
        let steepness = f64::from(params.steepness);
        let wetness = i32::from(params.wetness);
        let temperature = i32::from(params.temperature);

        let polar = f64::from(2 * levels.ice_base_level * landpercent / MAX_COLATITUDE);
        let mount_factor = (100.0 - polar - 30.0 * 0.8) / 10000.0;
        let factor = (100.0 - polar - steepness * 0.8) / 10000.0;

        let mountain_pct = mount_factor * steepness * 90.0;
        let mut forest_pct = factor * f64::from(wetness * 40 + 700);
        let jungle_pct = forest_pct * f64::from(MAX_COLATITUDE - levels.tropical_level)
            / f64::from(MAX_COLATITUDE * 2);
        forest_pct -= jungle_pct;
        let swamp_pct = factor * f64::from((wetness * 12 - 150 + temperature * 10).max(0));
        let desert_pct =
            factor * f64::from((temperature * 15 - 250 + (100 - wetness) * 10).max(0));

        Self {
            mountain_pct,
            forest_pct,
            jungle_pct,
            swamp_pct,
            desert_pct,
        }
    }

    /// Target tile counts indexed by [`BiomeCategory::index`].
    ///
    /// Alt-desert starts empty and plains take whatever the others leave.
    pub fn target_counts(&self, unplaced_land: usize) -> [usize; CATEGORY_COUNT] {
        let denominator = (100.0 - self.mountain_pct).max(1.0);
        let count = |pct: f64| (unplaced_land as f64 * pct.max(0.0) / denominator).floor() as usize;
        let mut counts = [0usize; CATEGORY_COUNT];
        counts[BiomeCategory::Forest.index()] = count(self.forest_pct);
        counts[BiomeCategory::Jungle.index()] = count(self.jungle_pct);
        counts[BiomeCategory::Swamp.index()] = count(self.swamp_pct);
        counts[BiomeCategory::Desert.index()] = count(self.desert_pct);
        let assigned: usize = counts.iter().sum();
        counts[BiomeCategory::Plains.index()] = unplaced_land.saturating_sub(assigned);
        counts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFold {
    pub from: BiomeCategory,
    pub to: Option<BiomeCategory>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentReport {
    pub unplaced_land: usize,
    pub targets: [usize; CATEGORY_COUNT],
    pub placed: [usize; CATEGORY_COUNT],
    pub folds: Vec<CategoryFold>,
    /// Land left after the loop and given a zone-based plain terrain.
    pub filled: usize,
}

struct Placer<'a> {
    grid: &'a mut TileGrid,
    placement: &'a mut PlacementMap,
    climate: &'a ClimateMap,
    selector: &'a TerrainSelector<'a>,
}

impl Placer<'_> {
    fn ruleset(&self) -> &TerrainRuleset {
        self.selector.ruleset()
    }

    fn eligible(&self, rule: &CategoryRule, x: usize, y: usize) -> bool {
        if !self.placement.not_placed(x, y) {
            return false;
        }
        let tile = self.grid.tile(x, y);
        if !self.ruleset().is_land(tile.terrain) || !tile.temperature.intersects(rule.temperature)
        {
            return false;
        }
        let dry = tile.wetness < DRY_WETNESS_LEVEL;
        let wet_ok = match rule.wetness {
            WetnessCondition::All => true,
            WetnessCondition::NotDry => !dry,
            WetnessCondition::Dry => dry,
        };
        let low = self.climate.is_low(self.grid.index(x, y));
        let elevation_ok = match rule.elevation {
            ElevationCondition::Any => true,
            ElevationCondition::Low => low,
            ElevationCondition::NotLow => !low,
        };
        wet_ok && elevation_ok
    }

    fn candidates(&self, rule: &CategoryRule) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                if self.eligible(rule, x, y) {
                    found.push((x, y));
                }
            }
        }
        found
    }

    fn place(&mut self, x: usize, y: usize, terrain: TerrainId) {
        self.grid.set_terrain(x, y, terrain);
        self.placement.set_placed(x, y);
    }

    /// Places `terrain` and spreads it over matching cardinal neighbours
    /// while `weight` covers the height step and the counter lasts.
    fn spread(
        &mut self,
        x: usize,
        y: usize,
        weight: i32,
        terrain: TerrainId,
        rule: &CategoryRule,
        remaining: &mut usize,
        rng: &mut dyn RandomSource,
    ) {
        if *remaining == 0 {
            return;
        }
        self.place(x, y, terrain);
        *remaining -= 1;

        let (w, h) = (self.grid.width(), self.grid.height());
        let elevation = self.grid.tile(x, y).elevation;
        for (nx, ny) in neighbors4(x, y, w, h) {
            let delta = (self.grid.tile(nx, ny).elevation - elevation).abs() / HEIGHT_UNIT;
            if *remaining > 0
                && self.eligible(rule, nx, ny)
                && delta < weight
                && rng.next_unit() >= 0.5
            {
                self.spread(nx, ny, weight - 1 - delta, terrain, rule, remaining, rng);
            }
        }
    }

    fn make_plain(&mut self, x: usize, y: usize, rng: &mut dyn RandomSource) {
        let request = plain_request(self.grid.tile(x, y).temperature);
        let terrain = self.selector.pick(request, rng);
        self.place(x, y, terrain);
    }
}

fn plain_request(zone: TemperatureZone) -> SelectionRequest {
    if zone.contains(TemperatureZone::FROZEN) {
        SelectionRequest::new(Some(P::Frozen), None, Some(P::Mountainous))
    } else if zone.contains(TemperatureZone::COLD) {
        SelectionRequest::new(Some(P::Cold), None, Some(P::Mountainous))
    } else {
        SelectionRequest::new(Some(P::Temperate), Some(P::Green), Some(P::Mountainous))
    }
}

/// Distributes biome terrain over the land relief left unplaced.
///
/// Categories run in [`BiomeCategory::ALL`] order until every counter is
/// spent; a category with no eligible tile folds its counter into its
/// fallback. Whatever land remains afterwards gets a zone-based plain.
pub fn assign_terrain(
    grid: &mut TileGrid,
    placement: &mut PlacementMap,
    selector: &TerrainSelector<'_>,
    climate: &ClimateMap,
    params: BiomeParams,
    rng: &mut dyn RandomSource,
) -> AssignmentReport {
    let mut placer = Placer {
        grid,
        placement,
        climate,
        selector,
    };
    let ruleset = selector.ruleset();
    let unplaced_land = placer
        .grid
        .tiles()
        .iter()
        .filter(|tile| {
            ruleset.is_land(tile.terrain)
                && placer
                    .placement
                    .not_placed(tile.x as usize, tile.y as usize)
        })
        .count();
    let shares = BiomeShares::compute(params, &climate.levels);
    let mut counts = shares.target_counts(unplaced_land);
    let mut report = AssignmentReport {
        unplaced_land,
        targets: counts,
        ..Default::default()
    };

    while counts.iter().any(|count| *count > 0) {
        for rule in &CATEGORY_RULES {
            let slot = rule.category.index();
            if counts[slot] == 0 {
                continue;
            }
            let candidates = placer.candidates(rule);
            if candidates.is_empty() {
                let remaining = std::mem::take(&mut counts[slot]);
                if let Some(fold) = rule.fold {
                    counts[fold.index()] += remaining;
                }
                tracing::debug!(
                    target: "mapgen::assigner",
                    from = rule.category.label(),
                    to = rule.fold.map(BiomeCategory::label).unwrap_or("none"),
                    remaining,
                    "mapgen.assigner.folded"
                );
                report.folds.push(CategoryFold {
                    from: rule.category,
                    to: rule.fold,
                    count: remaining,
                });
                continue;
            }
            let (x, y) = candidates[pick_index(rng, candidates.len())];
            match rule.request {
                Some(request) => {
                    let terrain = selector.pick(request, rng);
                    let before = counts[slot];
                    placer.spread(
                        x,
                        y,
                        rule.cluster_weight,
                        terrain,
                        rule,
                        &mut counts[slot],
                        rng,
                    );
                    report.placed[slot] += before - counts[slot];
                }
                None => {
                    placer.make_plain(x, y, rng);
                    counts[slot] -= 1;
                    report.placed[slot] += 1;
                }
            }
        }
    }

    let (w, h) = (placer.grid.width(), placer.grid.height());
    for y in 0..h {
        for x in 0..w {
            if placer.placement.not_placed(x, y) && ruleset.is_land(placer.grid.terrain_at(x, y)) {
                placer.make_plain(x, y, rng);
                report.filled += 1;
            }
        }
    }

    tracing::info!(
        target: "mapgen::assigner",
        unplaced_land,
        mountain_pct = shares.mountain_pct,
        forest = report.placed[BiomeCategory::Forest.index()],
        jungle = report.placed[BiomeCategory::Jungle.index()],
        swamp = report.placed[BiomeCategory::Swamp.index()],
        desert = report.placed[BiomeCategory::Desert.index()]
            + report.placed[BiomeCategory::AltDesert.index()],
        plains = report.placed[BiomeCategory::Plains.index()],
        filled = report.filled,
        folds = report.folds.len(),
        "mapgen.assigner.assigned"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        climate::{map_climate, ClimateParams},
        land::classify_land,
        random::MapRng,
    };

    fn defaults() -> BiomeParams {
        BiomeParams {
            landpercent: 30,
            steepness: 30,
            wetness: 50,
            temperature: 50,
        }
    }

    #[test]
    fn shares_for_default_knobs() {
        let shares = BiomeShares::compute(defaults(), &ClimateLevels::from_temperature(50));
        assert!((shares.mountain_pct - 19.71).abs() < 1e-9);
        assert!((shares.forest_pct - 16.901325).abs() < 1e-9);
        assert!((shares.jungle_pct - 2.808675).abs() < 1e-9);
        assert!((shares.swamp_pct - 6.935).abs() < 1e-9);
        assert!((shares.desert_pct - 7.3).abs() < 1e-9);
        assert_eq!(shares.target_counts(1000), [210, 34, 86, 90, 0, 580]);
    }

    #[test]
    fn steep_frozen_worlds_clamp_negative_shares() {
        let params = BiomeParams {
            landpercent: 100,
            steepness: 100,
            wetness: 0,
            temperature: 0,
        };
        let shares = BiomeShares::compute(params, &ClimateLevels::from_temperature(0));
        let counts = shares.target_counts(500);
        assert_eq!(counts.iter().sum::<usize>(), 500);
    }

    struct Prepared {
        grid: TileGrid,
        placement: PlacementMap,
        climate: ClimateMap,
    }

    fn prepare(w: usize, h: usize, params: BiomeParams) -> Prepared {
        let ruleset = TerrainRuleset::builtin();
        // Water border, land rising towards the middle column.
        let mut levels = vec![0; w * h];
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let centre = (w / 2) as i32;
                levels[y * w + x] = 1000 - 20 * (x as i32 - centre).abs();
            }
        }
        let mut grid = TileGrid::new(w, h);
        let mut placement = PlacementMap::new(w, h);
        let classified = classify_land(&mut grid, &levels, params.landpercent, &ruleset, &mut placement);
        let climate = map_climate(
            &mut grid,
            &ruleset,
            ClimateParams {
                shore_level: classified.shore_level,
                steepness: params.steepness,
                wetness: params.wetness,
                temperature: params.temperature,
            },
        );
        Prepared {
            grid,
            placement,
            climate,
        }
    }

    #[test]
    fn every_land_tile_gets_a_biome() {
        let ruleset = TerrainRuleset::builtin();
        let selector = TerrainSelector::new(&ruleset);
        let mut prepared = prepare(24, 30, defaults());
        let water_before: Vec<_> = prepared
            .grid
            .tiles()
            .iter()
            .filter(|tile| ruleset.is_water(tile.terrain))
            .map(|tile| (tile.x, tile.y, tile.terrain))
            .collect();
        let mut rng = MapRng::seed_from_u64(11);
        let report = assign_terrain(
            &mut prepared.grid,
            &mut prepared.placement,
            &selector,
            &prepared.climate,
            defaults(),
            &mut rng,
        );

        assert!(report.unplaced_land > 0);
        assert_eq!(prepared.placement.placed_count(), prepared.grid.len());
        for tile in prepared.grid.tiles() {
            assert!(!tile.terrain.is_placeholder());
            let key = ruleset.key_of(tile.terrain);
            assert!(key != "hills" && key != "mountains", "{key}");
        }
        for (x, y, terrain) in water_before {
            assert_eq!(prepared.grid.terrain_at(x as usize, y as usize), terrain);
        }
        let placed: usize = report.placed.iter().sum();
        assert_eq!(placed + report.filled, report.unplaced_land);
    }

    #[test]
    fn missing_dry_land_folds_desert() {
        let ruleset = TerrainRuleset::builtin();
        let selector = TerrainSelector::new(&ruleset);
        let params = BiomeParams {
            wetness: 100,
            ..defaults()
        };
        let mut prepared = prepare(16, 16, params);
        assert_eq!(prepared.climate.dry_tiles, 0);
        let mut rng = MapRng::seed_from_u64(3);
        let report = assign_terrain(
            &mut prepared.grid,
            &mut prepared.placement,
            &selector,
            &prepared.climate,
            params,
            &mut rng,
        );
        assert!(report.folds.iter().any(|fold| fold.from == BiomeCategory::Desert
            && fold.to == Some(BiomeCategory::AltDesert)));
        assert_eq!(report.placed[BiomeCategory::Desert.index()], 0);
    }

    #[test]
    fn plain_requests_follow_zone() {
        let ruleset = TerrainRuleset::builtin();
        let selector = TerrainSelector::new(&ruleset);
        let mut rng = MapRng::seed_from_u64(0);
        let pick = |zone, rng: &mut MapRng| ruleset.key_of(selector.pick(plain_request(zone), rng)).to_string();
        assert_eq!(pick(TemperatureZone::FROZEN, &mut rng), "glacier");
        assert_eq!(pick(TemperatureZone::COLD, &mut rng), "tundra");
        let temperate = pick(TemperatureZone::TEMPERATE, &mut rng);
        assert!(temperate == "grassland" || temperate == "plains");
    }
}
