//! Terrain ruleset contract and load-time validation.
//!
//! The file form ([`TerrainRulesetFile`]) is what data authors write; the
//! validated form ([`TerrainRuleset`]) is what generation reads. Anything that
//! could make terrain selection fail is rejected here, before a map run starts.

use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BUILTIN_TERRAIN_RULESET: &str = include_str!("data/terrain_ruleset.json");

/// Named suitability attributes a terrain can carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TerrainProperty {
    Mountainous,
    Green,
    Foliage,
    Tropical,
    Temperate,
    Cold,
    Frozen,
    Wet,
    Dry,
    OceanDepth,
}

pub const PROPERTY_COUNT: usize = 10;

impl TerrainProperty {
    pub const ALL: [TerrainProperty; PROPERTY_COUNT] = [
        TerrainProperty::Mountainous,
        TerrainProperty::Green,
        TerrainProperty::Foliage,
        TerrainProperty::Tropical,
        TerrainProperty::Temperate,
        TerrainProperty::Cold,
        TerrainProperty::Frozen,
        TerrainProperty::Wet,
        TerrainProperty::Dry,
        TerrainProperty::OceanDepth,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TerrainProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TerrainProperty::Mountainous => "mountainous",
            TerrainProperty::Green => "green",
            TerrainProperty::Foliage => "foliage",
            TerrainProperty::Tropical => "tropical",
            TerrainProperty::Temperate => "temperate",
            TerrainProperty::Cold => "cold",
            TerrainProperty::Frozen => "frozen",
            TerrainProperty::Wet => "wet",
            TerrainProperty::Dry => "dry",
            TerrainProperty::OceanDepth => "ocean_depth",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Land,
    Water,
}

/// Fixed-size attribute weights, indexed by [`TerrainProperty::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PropertyWeights([u16; PROPERTY_COUNT]);

impl PropertyWeights {
    #[inline]
    pub fn get(&self, property: TerrainProperty) -> u16 {
        self.0[property.index()]
    }

    pub fn set(&mut self, property: TerrainProperty, weight: u16) {
        self.0[property.index()] = weight;
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|weight| *weight == 0)
    }
}

/// Index of a terrain inside its [`TerrainRuleset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TerrainId(pub u16);

impl TerrainId {
    /// Placeholder every tile starts a generation run with.
    pub const UNKNOWN: TerrainId = TerrainId(u16::MAX);
    /// Generic land marker written by land classification, replaced later.
    pub const LAND_FILL: TerrainId = TerrainId(u16::MAX - 1);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_placeholder(self) -> bool {
        self == TerrainId::UNKNOWN || self == TerrainId::LAND_FILL
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TerrainDefinition {
    pub id: String,
    pub name: String,
    /// Single glyph used by debug renders.
    pub symbol: char,
    pub class: TerrainClass,
    #[serde(default)]
    pub not_generated: bool,
    #[serde(default)]
    pub freshwater: bool,
    #[serde(default)]
    pub properties: BTreeMap<TerrainProperty, u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TerrainRulesetFile {
    #[serde(default)]
    pub name: String,
    pub terrains: Vec<TerrainDefinition>,
}

#[derive(Debug, Clone)]
pub struct TerrainEntry {
    pub id: TerrainId,
    pub key: String,
    pub name: String,
    pub symbol: char,
    pub class: TerrainClass,
    pub not_generated: bool,
    pub freshwater: bool,
    pub weights: PropertyWeights,
    pub transform_to: Option<TerrainId>,
}

impl TerrainEntry {
    #[inline]
    pub fn weight(&self, property: TerrainProperty) -> u16 {
        self.weights.get(property)
    }

    pub fn is_water(&self) -> bool {
        self.class == TerrainClass::Water
    }

    pub fn is_generated(&self) -> bool {
        !self.not_generated
    }
}

#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("failed to parse terrain ruleset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read terrain ruleset from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("terrain ruleset defines no terrains")]
    Empty,
    #[error("terrain ruleset defines {0} terrains, more than ids can address")]
    TooManyTerrains(usize),
    #[error("terrain id must not be empty (entry {0})")]
    EmptyId(usize),
    #[error("terrain '{0}' is defined more than once")]
    DuplicateId(String),
    #[error("terrain '{terrain}' transforms into undefined terrain '{target}'")]
    UnknownTransformTarget { terrain: String, target: String },
    #[error("terrain '{0}' is marked freshwater but is not a water terrain")]
    FreshwaterLand(String),
    #[error("no generated land terrain: selection cannot succeed even with every constraint relaxed")]
    NoGeneratedLand,
    #[error("no generated water terrain: ocean depth cannot be typed")]
    NoGeneratedWater,
    #[error("no freshwater water terrain to convert small water bodies into")]
    MissingLakeTerrain,
}

/// Validated, immutable terrain table.
#[derive(Debug, Clone)]
pub struct TerrainRuleset {
    name: String,
    entries: Vec<TerrainEntry>,
    by_key: HashMap<String, TerrainId>,
    lake: TerrainId,
    shallowest_water: TerrainId,
    deepest_water: TerrainId,
}

impl TerrainRuleset {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            Self::from_json_str(BUILTIN_TERRAIN_RULESET)
                .expect("builtin terrain ruleset should validate"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, RulesetError> {
        let file: TerrainRulesetFile = serde_json::from_str(json)?;
        Self::from_definitions(file)
    }

    pub fn from_file(path: &Path) -> Result<Self, RulesetError> {
        let contents = fs::read_to_string(path).map_err(|source| RulesetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_definitions(file: TerrainRulesetFile) -> Result<Self, RulesetError> {
        if file.terrains.is_empty() {
            return Err(RulesetError::Empty);
        }
        if file.terrains.len() >= TerrainId::LAND_FILL.index() {
            return Err(RulesetError::TooManyTerrains(file.terrains.len()));
        }

        let mut by_key = HashMap::with_capacity(file.terrains.len());
        for (index, def) in file.terrains.iter().enumerate() {
            if def.id.trim().is_empty() {
                return Err(RulesetError::EmptyId(index));
            }
            if by_key
                .insert(def.id.clone(), TerrainId(index as u16))
                .is_some()
            {
                return Err(RulesetError::DuplicateId(def.id.clone()));
            }
        }

        let mut entries = Vec::with_capacity(file.terrains.len());
        for (index, def) in file.terrains.into_iter().enumerate() {
            let transform_to = match def.transform_to {
                Some(target) => match by_key.get(&target) {
                    Some(id) => Some(*id),
                    None => {
                        return Err(RulesetError::UnknownTransformTarget {
                            terrain: def.id,
                            target,
                        })
                    }
                },
                None => None,
            };
            if def.freshwater && def.class != TerrainClass::Water {
                return Err(RulesetError::FreshwaterLand(def.id));
            }
            let mut weights = PropertyWeights::default();
            for (property, weight) in &def.properties {
                weights.set(*property, *weight);
            }
            entries.push(TerrainEntry {
                id: TerrainId(index as u16),
                key: def.id,
                name: def.name,
                symbol: def.symbol,
                class: def.class,
                not_generated: def.not_generated,
                freshwater: def.freshwater,
                weights,
                transform_to,
            });
        }

        if !entries
            .iter()
            .any(|entry| !entry.is_water() && entry.is_generated())
        {
            return Err(RulesetError::NoGeneratedLand);
        }

        let water = || {
            entries
                .iter()
                .filter(|entry| entry.is_water() && entry.is_generated())
        };
        // min_by_key/max_by_key keep the first/last tie respectively; both
        // are stable with respect to ruleset order.
        let shallowest_water = water()
            .min_by_key(|entry| entry.weight(TerrainProperty::OceanDepth))
            .map(|entry| entry.id)
            .ok_or(RulesetError::NoGeneratedWater)?;
        let deepest_water = water()
            .max_by_key(|entry| entry.weight(TerrainProperty::OceanDepth))
            .map(|entry| entry.id)
            .ok_or(RulesetError::NoGeneratedWater)?;

        let lake = entries
            .iter()
            .find(|entry| entry.is_water() && entry.freshwater)
            .map(|entry| entry.id)
            .ok_or(RulesetError::MissingLakeTerrain)?;

        Ok(Self {
            name: file.name,
            entries,
            by_key,
            lake,
            shallowest_water,
            deepest_water,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TerrainEntry] {
        &self.entries
    }

    pub fn get(&self, id: TerrainId) -> Option<&TerrainEntry> {
        self.entries.get(id.index())
    }

    pub fn id_of(&self, key: &str) -> Option<TerrainId> {
        self.by_key.get(key).copied()
    }

    pub fn key_of(&self, id: TerrainId) -> &str {
        self.get(id).map(|entry| entry.key.as_str()).unwrap_or("unknown")
    }

    pub fn weights(&self, id: TerrainId) -> PropertyWeights {
        self.get(id).map(|entry| entry.weights).unwrap_or_default()
    }

    /// Placeholders are neither land nor water.
    pub fn is_water(&self, id: TerrainId) -> bool {
        self.get(id).map(TerrainEntry::is_water).unwrap_or(false)
    }

    pub fn is_land(&self, id: TerrainId) -> bool {
        id == TerrainId::LAND_FILL || self.get(id).map(|e| !e.is_water()).unwrap_or(false)
    }

    /// Land terrains open to random selection, in ruleset order.
    pub fn generated_land(&self) -> impl Iterator<Item = &TerrainEntry> {
        self.entries
            .iter()
            .filter(|entry| !entry.is_water() && entry.is_generated())
    }

    /// Water terrains open to depth typing, in ruleset order.
    pub fn generated_water(&self) -> impl Iterator<Item = &TerrainEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.is_water() && entry.is_generated())
    }

    pub fn lake(&self) -> TerrainId {
        self.lake
    }

    pub fn shallowest_water(&self) -> TerrainId {
        self.shallowest_water
    }

    pub fn deepest_water(&self) -> TerrainId {
        self.deepest_water
    }

    pub fn terrain_names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key.clone()).collect()
    }
}

pub fn ruleset_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(TerrainRulesetFile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(id: &str, class: TerrainClass) -> TerrainDefinition {
        TerrainDefinition {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id.chars().next().unwrap_or('?'),
            class,
            not_generated: false,
            freshwater: false,
            properties: BTreeMap::new(),
            transform_to: None,
        }
    }

    fn minimal() -> Vec<TerrainDefinition> {
        let mut lake = definition("lake", TerrainClass::Water);
        lake.freshwater = true;
        lake.not_generated = true;
        let mut ocean = definition("ocean", TerrainClass::Water);
        ocean.properties.insert(TerrainProperty::OceanDepth, 40);
        vec![lake, ocean, definition("plains", TerrainClass::Land)]
    }

    fn file(terrains: Vec<TerrainDefinition>) -> TerrainRulesetFile {
        TerrainRulesetFile {
            name: "test".to_string(),
            terrains,
        }
    }

    #[test]
    fn builtin_ruleset_validates() {
        let ruleset = TerrainRuleset::builtin();
        assert_eq!(ruleset.key_of(ruleset.lake()), "lake");
        assert_eq!(ruleset.key_of(ruleset.shallowest_water()), "coast");
        assert_eq!(ruleset.key_of(ruleset.deepest_water()), "deep_ocean");
        let mountains = ruleset.id_of("mountains").expect("mountains defined");
        assert_eq!(
            ruleset.weights(mountains).get(TerrainProperty::Mountainous),
            70
        );
        assert!(ruleset.generated_land().all(|entry| !entry.is_water()));
        assert!(ruleset.generated_water().all(|entry| !entry.freshwater));
    }

    #[test]
    fn minimal_ruleset_validates() {
        let ruleset = TerrainRuleset::from_definitions(file(minimal())).expect("valid");
        assert_eq!(ruleset.len(), 3);
        assert_eq!(ruleset.shallowest_water(), ruleset.deepest_water());
        assert!(ruleset.is_land(TerrainId::LAND_FILL));
        assert!(!ruleset.is_water(TerrainId::UNKNOWN));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut terrains = minimal();
        terrains.push(definition("plains", TerrainClass::Land));
        let err = TerrainRuleset::from_definitions(file(terrains)).unwrap_err();
        assert!(matches!(err, RulesetError::DuplicateId(id) if id == "plains"));
    }

    #[test]
    fn rejects_unknown_transform_target() {
        let mut terrains = minimal();
        terrains[2].transform_to = Some("volcano".to_string());
        let err = TerrainRuleset::from_definitions(file(terrains)).unwrap_err();
        assert!(matches!(
            err,
            RulesetError::UnknownTransformTarget { ref target, .. } if target == "volcano"
        ));
    }

    #[test]
    fn rejects_ruleset_without_generated_land() {
        let mut terrains = minimal();
        terrains[2].not_generated = true;
        let err = TerrainRuleset::from_definitions(file(terrains)).unwrap_err();
        assert!(matches!(err, RulesetError::NoGeneratedLand));
    }

    #[test]
    fn rejects_ruleset_without_generated_water() {
        let mut terrains = minimal();
        terrains.remove(1);
        let err = TerrainRuleset::from_definitions(file(terrains)).unwrap_err();
        assert!(matches!(err, RulesetError::NoGeneratedWater));
    }

    #[test]
    fn rejects_ruleset_without_lake() {
        let mut terrains = minimal();
        terrains[0].freshwater = false;
        let err = TerrainRuleset::from_definitions(file(terrains)).unwrap_err();
        assert!(matches!(err, RulesetError::MissingLakeTerrain));
    }

    #[test]
    fn rejects_freshwater_land() {
        let mut terrains = minimal();
        terrains[2].freshwater = true;
        let err = TerrainRuleset::from_definitions(file(terrains)).unwrap_err();
        assert!(matches!(err, RulesetError::FreshwaterLand(id) if id == "plains"));
    }

    #[test]
    fn unknown_property_name_fails_to_parse() {
        let json = r#"{"terrains":[{"id":"x","name":"X","symbol":"x","class":"land","properties":{"volcanic":5}}]}"#;
        let err = TerrainRuleset::from_json_str(json).unwrap_err();
        assert!(matches!(err, RulesetError::Parse(_)));
    }

    #[test]
    fn schema_names_terrain_fields() {
        let schema = serde_json::to_value(ruleset_schema()).expect("schema serializes");
        let text = schema.to_string();
        assert!(text.contains("transform_to"));
        assert!(text.contains("ocean_depth"));
    }
}
