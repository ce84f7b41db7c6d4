use bevy::{math::UVec2, prelude::*};
use map_runtime::MapSnapshot;

use crate::{
    generator::{GenerationReport, MapGenSettings},
    grid::TileGrid,
    heightfield::HeightNoiseOptions,
    map_preset::MapPresets,
};

const FALLBACK_GRID_SIZE: UVec2 = UVec2::new(80, 50);

/// Which map the startup system generates.
///
/// Unset overrides fall through to the selected preset.
#[derive(Resource, Debug, Clone)]
pub struct MapGenConfig {
    pub map_preset_id: String,
    pub map_seed: Option<u64>,
    pub grid_size: Option<UVec2>,
    pub settings: Option<MapGenSettings>,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            map_preset_id: "earthlike".to_string(),
            map_seed: None,
            grid_size: None,
            settings: None,
        }
    }
}

/// Fully resolved inputs for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    pub preset_id: String,
    pub seed: u64,
    pub grid_size: UVec2,
    pub settings: MapGenSettings,
    pub height: HeightNoiseOptions,
}

impl MapGenConfig {
    /// Merges overrides over the named preset, or the first preset when the
    /// name is unknown.
    pub fn resolve(&self, presets: &MapPresets) -> MapRequest {
        let preset = match presets.get(&self.map_preset_id) {
            Some(preset) => Some(preset),
            None => {
                tracing::warn!(
                    target: "mapgen::config",
                    preset = %self.map_preset_id,
                    "map_preset.unknown"
                );
                presets.first()
            }
        };

        let preset_id = preset
            .map(|preset| preset.id.clone())
            .unwrap_or_else(|| self.map_preset_id.clone());
        let preset_size = preset
            .map(|preset| UVec2::new(preset.dimensions.width, preset.dimensions.height))
            .unwrap_or(FALLBACK_GRID_SIZE);
        MapRequest {
            preset_id,
            seed: self
                .map_seed
                .or_else(|| preset.map(|preset| preset.seed))
                .unwrap_or_default(),
            grid_size: self.grid_size.unwrap_or(preset_size),
            settings: self
                .settings
                .or_else(|| preset.map(|preset| preset.settings()))
                .unwrap_or_default(),
            height: preset
                .map(|preset| preset.height.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldGenSeed(pub u64);

/// Output of the startup generation run.
#[derive(Resource, Debug, Clone)]
pub struct WorldMap {
    pub preset_id: String,
    pub grid: TileGrid,
    pub report: GenerationReport,
    pub snapshot: MapSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_preset() {
        let presets = MapPresets::builtin();
        let config = MapGenConfig {
            map_preset_id: "archipelago".to_string(),
            map_seed: Some(77),
            grid_size: Some(UVec2::new(20, 10)),
            settings: None,
        };
        let request = config.resolve(&presets);
        let preset = presets.get("archipelago").expect("archipelago");
        assert_eq!(request.preset_id, "archipelago");
        assert_eq!(request.seed, 77);
        assert_eq!(request.grid_size, UVec2::new(20, 10));
        assert_eq!(request.settings, preset.settings());
        assert_eq!(request.height, preset.height);
    }

    #[test]
    fn unknown_preset_uses_first() {
        let presets = MapPresets::builtin();
        let config = MapGenConfig {
            map_preset_id: "no_such_world".to_string(),
            ..Default::default()
        };
        let request = config.resolve(&presets);
        let first = presets.first().expect("first");
        assert_eq!(request.preset_id, first.id);
        assert_eq!(request.seed, first.seed);
    }
}
