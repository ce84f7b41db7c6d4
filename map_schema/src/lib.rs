//! Wire contracts for a generated map.
//!
//! Everything a collaborator needs after generation (network transmission to
//! clients, river generation, start placement) is expressed here as plain
//! serde types so the engine crate can stay out of their dependency graph.

use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::hash::{BuildHasher, Hasher};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub tile_count: u32,
    pub continent_count: u32,
    pub hash: u64,
}

impl SnapshotHeader {
    pub fn new(width: u32, height: u32, seed: u64, continent_count: usize) -> Self {
        Self {
            width,
            height,
            seed,
            tile_count: width * height,
            continent_count: continent_count as u32,
            hash: 0,
        }
    }
}

/// Per-tile state sent to clients.
///
/// `terrain` indexes [`MapSnapshot::terrain_names`]; `river_mask` is owned by
/// river generation and travels through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileState {
    pub x: u32,
    pub y: u32,
    pub terrain: u16,
    pub elevation: i32,
    pub continent: u32,
    pub temperature: u8,
    pub wetness: u8,
    pub river_mask: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapSnapshot {
    pub header: SnapshotHeader,
    pub terrain_names: Vec<String>,
    pub tiles: Vec<TileState>,
}

impl MapSnapshot {
    pub fn finalize(mut self) -> Self {
        let hash = hash_snapshot(&self);
        self.header.hash = hash;
        self
    }

    pub fn tile(&self, x: u32, y: u32) -> Option<&TileState> {
        if x >= self.header.width || y >= self.header.height {
            return None;
        }
        self.tiles.get((y * self.header.width + x) as usize)
    }

    pub fn terrain_name(&self, tile: &TileState) -> Option<&str> {
        self.terrain_names
            .get(tile.terrain as usize)
            .map(String::as_str)
    }
}

/// Stable hash over the bincode encoding with the stored hash zeroed.
///
/// Fixed ahash seeds keep the value identical across processes, which is
/// what clients compare to confirm they agree on the world.
pub fn hash_snapshot(snapshot: &MapSnapshot) -> u64 {
    let mut clone = snapshot.clone();
    clone.header.hash = 0;
    let encoded = bincode::serialize(&clone).expect("snapshot serialization for hashing");
    let mut hasher = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
    hasher.write(&encoded);
    hasher.finish()
}

pub fn encode_snapshot(snapshot: &MapSnapshot) -> bincode::Result<Vec<u8>> {
    bincode::serialize(snapshot)
}

pub fn decode_snapshot(data: &[u8]) -> bincode::Result<MapSnapshot> {
    bincode::deserialize(data)
}

pub fn encode_snapshot_json(snapshot: &MapSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}

pub fn decode_snapshot_json(data: &str) -> serde_json::Result<MapSnapshot> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MapSnapshot {
        let tiles = (0..6)
            .map(|i| TileState {
                x: i % 3,
                y: i / 3,
                terrain: (i % 2) as u16,
                elevation: (i * 100) as i32,
                continent: if i % 2 == 0 { 0 } else { 1 },
                temperature: 4,
                wetness: 50,
                river_mask: 0,
            })
            .collect();
        MapSnapshot {
            header: SnapshotHeader::new(3, 2, 7, 1),
            terrain_names: vec!["ocean".to_string(), "grassland".to_string()],
            tiles,
        }
    }

    #[test]
    fn finalize_hash_ignores_previous_hash() {
        let a = sample().finalize();
        let mut b = sample();
        b.header.hash = 12345;
        let b = b.finalize();
        assert_ne!(a.header.hash, 0);
        assert_eq!(a.header.hash, b.header.hash);
    }

    #[test]
    fn hash_changes_with_terrain() {
        let a = sample().finalize();
        let mut b = sample();
        b.tiles[0].terrain = 1;
        let b = b.finalize();
        assert_ne!(a.header.hash, b.header.hash);
    }

    #[test]
    fn binary_encoding_restores_snapshot() {
        let snapshot = sample().finalize();
        let bytes = encode_snapshot(&snapshot).expect("encode");
        let decoded = decode_snapshot(&bytes).expect("decode");
        assert_eq!(snapshot, decoded);
        assert_eq!(hash_snapshot(&decoded), decoded.header.hash);
    }

    #[test]
    fn tile_lookup_is_row_major() {
        let snapshot = sample();
        let tile = snapshot.tile(1, 1).expect("in bounds");
        assert_eq!(tile.x, 1);
        assert_eq!(tile.y, 1);
        assert_eq!(snapshot.terrain_name(tile), Some("ocean"));
        assert!(snapshot.tile(3, 0).is_none());
    }
}
