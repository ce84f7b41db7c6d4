use std::{
    collections::HashSet,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    error::MapGenError,
    generator::MapGenSettings,
    heightfield::HeightNoiseOptions,
    relief::GeneratorMode,
};

pub const BUILTIN_MAP_PRESETS: &str = include_str!("data/map_presets.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPresetDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dimensions: MapPresetDimensions,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_landpercent")]
    pub landpercent: u8,
    #[serde(default = "default_steepness")]
    pub steepness: u8,
    #[serde(default = "default_wetness")]
    pub wetness: u8,
    #[serde(default = "default_temperature")]
    pub temperature: u8,
    #[serde(default)]
    pub generator: GeneratorMode,
    #[serde(default)]
    pub height: HeightNoiseOptions,
}

const fn default_landpercent() -> u8 {
    30
}

const fn default_steepness() -> u8 {
    30
}

const fn default_wetness() -> u8 {
    50
}

const fn default_temperature() -> u8 {
    50
}

impl MapPreset {
    pub fn settings(&self) -> MapGenSettings {
        MapGenSettings {
            landpercent: self.landpercent,
            steepness: self.steepness,
            wetness: self.wetness,
            temperature: self.temperature,
            generator: self.generator,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapPresetsFile {
    pub presets: Vec<MapPreset>,
}

/// Presets in file order; ids are unique.
#[derive(Debug, Clone)]
pub struct MapPresets {
    presets: Vec<MapPreset>,
}

impl MapPresets {
    pub fn builtin() -> Arc<Self> {
        let parsed =
            Self::from_json_str(BUILTIN_MAP_PRESETS).expect("builtin map presets should parse");
        Arc::new(parsed)
    }

    pub fn from_json_str(json: &str) -> Result<Self, MapPresetsError> {
        let parsed: MapPresetsFile = serde_json::from_str(json)?;
        Self::from_file_contents(parsed)
    }

    pub fn from_file(path: &Path) -> Result<Self, MapPresetsError> {
        let contents = fs::read_to_string(path).map_err(|source| MapPresetsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = MapPresets::from_json_str(&contents)?;
        Ok(config)
    }

    fn from_file_contents(file: MapPresetsFile) -> Result<Self, MapPresetsError> {
        if file.presets.is_empty() {
            return Err(MapPresetsError::Empty);
        }
        let mut seen = HashSet::new();
        for preset in &file.presets {
            if !seen.insert(preset.id.as_str()) {
                return Err(MapPresetsError::DuplicateId(preset.id.clone()));
            }
            let MapPresetDimensions { width, height } = preset.dimensions;
            if width == 0 || height == 0 {
                return Err(MapPresetsError::InvalidPreset {
                    id: preset.id.clone(),
                    source: MapGenError::InvalidDimensions {
                        width,
                        height,
                        values: 0,
                    },
                });
            }
            preset
                .settings()
                .validate()
                .map_err(|source| MapPresetsError::InvalidPreset {
                    id: preset.id.clone(),
                    source,
                })?;
        }
        Ok(Self {
            presets: file.presets,
        })
    }

    pub fn get(&self, id: &str) -> Option<&MapPreset> {
        self.presets.iter().find(|preset| preset.id == id)
    }

    pub fn first(&self) -> Option<&MapPreset> {
        self.presets.first()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|preset| preset.id.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MapPresetsError {
    #[error("failed to parse map presets: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read map presets from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("map presets file lists no presets")]
    Empty,
    #[error("duplicate map preset id '{0}'")]
    DuplicateId(String),
    #[error("map preset '{id}' is invalid: {source}")]
    InvalidPreset {
        id: String,
        #[source]
        source: MapGenError,
    },
}

#[derive(Resource, Debug, Clone)]
pub struct MapPresetsHandle(Arc<MapPresets>);

impl MapPresetsHandle {
    pub fn new(presets: Arc<MapPresets>) -> Self {
        Self(presets)
    }

    pub fn get(&self) -> Arc<MapPresets> {
        self.0.clone()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct MapPresetsMetadata {
    path: Option<PathBuf>,
}

impl MapPresetsMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Loads presets from `MAP_PRESETS_PATH`, or the builtin set when the
/// variable is unset or the file is unusable.
pub fn load_map_presets_from_env() -> (Arc<MapPresets>, MapPresetsMetadata) {
    if let Some(path) = env::var("MAP_PRESETS_PATH").ok().map(PathBuf::from) {
        match MapPresets::from_file(&path) {
            Ok(presets) => {
                tracing::info!(
                    target: "mapgen::config",
                    path = %path.display(),
                    presets = presets.len(),
                    "map_presets.loaded=file"
                );
                return (Arc::new(presets), MapPresetsMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "mapgen::config",
                    path = %path.display(),
                    error = %err,
                    "map_presets.load_failed"
                );
            }
        }
    }

    let presets = MapPresets::builtin();
    tracing::info!(target: "mapgen::config", "map_presets.loaded=builtin");
    (presets, MapPresetsMetadata::new(None))
}
