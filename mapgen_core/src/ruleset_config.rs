//! Terrain ruleset loading for the app and CLI.
//!
//! The ruleset is read from `TERRAIN_RULESET_PATH` when set and valid,
//! otherwise the builtin table embedded in `map_runtime` is used.

use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::Resource;
use map_runtime::TerrainRuleset;

#[derive(Resource, Debug, Clone)]
pub struct TerrainRulesetHandle(Arc<TerrainRuleset>);

impl TerrainRulesetHandle {
    pub fn new(ruleset: Arc<TerrainRuleset>) -> Self {
        Self(ruleset)
    }

    pub fn get(&self) -> Arc<TerrainRuleset> {
        self.0.clone()
    }
}

#[derive(Resource, Debug, Clone)]
pub struct TerrainRulesetMetadata {
    path: Option<PathBuf>,
}

impl TerrainRulesetMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

pub fn load_terrain_ruleset_from_env() -> (Arc<TerrainRuleset>, TerrainRulesetMetadata) {
    load_terrain_ruleset(env::var("TERRAIN_RULESET_PATH").ok().map(PathBuf::from))
}

fn load_terrain_ruleset(
    override_path: Option<PathBuf>,
) -> (Arc<TerrainRuleset>, TerrainRulesetMetadata) {
    if let Some(path) = override_path {
        match TerrainRuleset::from_file(&path) {
            Ok(ruleset) => {
                tracing::info!(
                    target: "mapgen::config",
                    path = %path.display(),
                    name = ruleset.name(),
                    terrains = ruleset.len(),
                    "terrain_ruleset.loaded=file"
                );
                return (Arc::new(ruleset), TerrainRulesetMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "mapgen::config",
                    path = %path.display(),
                    error = %err,
                    "terrain_ruleset.load_failed"
                );
            }
        }
    }

    let ruleset = TerrainRuleset::builtin();
    tracing::info!(target: "mapgen::config", "terrain_ruleset.loaded=builtin");
    (ruleset, TerrainRulesetMetadata::new(None))
}
