//! Shared runtime contracts for the map generator.
//!
//! This crate re-exports the wire types from `map_schema` and owns the terrain
//! ruleset: its file format, JSON schema, and load-time validation. It does
//! not depend on the Bevy runtime in `mapgen_core`.

pub use map_schema::*;

mod ruleset;

pub use ruleset::{
    ruleset_schema, PropertyWeights, RulesetError, TerrainClass, TerrainDefinition, TerrainEntry,
    TerrainId, TerrainProperty, TerrainRuleset, TerrainRulesetFile, BUILTIN_TERRAIN_RULESET,
    PROPERTY_COUNT,
};
