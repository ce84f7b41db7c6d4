use bitflags::bitflags;
use map_runtime::{PropertyWeights, TerrainId, TerrainRuleset};
use serde::{Deserialize, Serialize};

/// Top of the normalised height scale.
pub const MAX_LEVEL: i32 = 1000;
/// Colatitude of the equator row; the poles sit at 0.
pub const MAX_COLATITUDE: i32 = 1000;
/// Height difference treated as one step by terrain clustering.
pub const HEIGHT_UNIT: i32 = 100;

bitflags! {
    /// Climate zone of a tile, combined into unions for placement conditions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TemperatureZone: u8 {
        const FROZEN = 0x01;
        const COLD = 0x02;
        const TEMPERATE = 0x04;
        const TROPICAL = 0x08;
        const NOT_FROZEN = Self::COLD.bits() | Self::TEMPERATE.bits() | Self::TROPICAL.bits();
        const HOT = Self::TEMPERATE.bits() | Self::TROPICAL.bits();
        const ALL = Self::FROZEN.bits() | Self::NOT_FROZEN.bits();
    }
}

impl TemperatureZone {
    /// Wire ordinal: 0 unset, 1 frozen .. 4 tropical.
    pub fn ordinal(self) -> u8 {
        if self.contains(Self::TROPICAL) {
            4
        } else if self.contains(Self::TEMPERATE) {
            3
        } else if self.contains(Self::COLD) {
            2
        } else if self.contains(Self::FROZEN) {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub terrain: TerrainId,
    /// Normalised height in `0..=MAX_LEVEL`.
    pub elevation: i32,
    pub temperature: TemperatureZone,
    pub wetness: u8,
    /// 0 for water and lakes.
    pub continent_id: u32,
    pub river_mask: u8,
    pub properties: PropertyWeights,
}

impl Tile {
    fn placeholder(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            terrain: TerrainId::UNKNOWN,
            elevation: 0,
            temperature: TemperatureZone::empty(),
            wetness: 0,
            continent_id: 0,
            river_mask: 0,
            properties: PropertyWeights::default(),
        }
    }
}

/// Row-major tile storage, indexed `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        let mut tiles = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::placeholder(x as u32, y as u32));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn tile(&self, x: usize, y: usize) -> &Tile {
        &self.tiles[self.index(x, y)]
    }

    #[inline]
    pub fn tile_mut(&mut self, x: usize, y: usize) -> &mut Tile {
        let idx = self.index(x, y);
        &mut self.tiles[idx]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    pub fn terrain_at(&self, x: usize, y: usize) -> TerrainId {
        self.tile(x, y).terrain
    }

    pub fn set_terrain(&mut self, x: usize, y: usize, terrain: TerrainId) {
        self.tile_mut(x, y).terrain = terrain;
    }

    /// Terrain ids in row-major order.
    pub fn terrain_ids(&self) -> Vec<TerrainId> {
        self.tiles.iter().map(|tile| tile.terrain).collect()
    }

    pub fn continent_ids(&self) -> Vec<u32> {
        self.tiles.iter().map(|tile| tile.continent_id).collect()
    }

    /// One glyph per tile from the ruleset symbols, one line per row.
    ///
    /// Placeholders render as `?` (unknown) and `#` (unassigned land).
    pub fn render_ascii(&self, ruleset: &TerrainRuleset) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.tiles.chunks(self.width.max(1)) {
            for tile in row {
                let glyph = match tile.terrain {
                    TerrainId::UNKNOWN => '?',
                    TerrainId::LAND_FILL => '#',
                    id => ruleset.get(id).map(|entry| entry.symbol).unwrap_or('?'),
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

pub(crate) fn neighbors4(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let mut v = Vec::with_capacity(4);
    if x > 0 {
        v.push((x - 1, y));
    }
    if x + 1 < w {
        v.push((x + 1, y));
    }
    if y > 0 {
        v.push((x, y - 1));
    }
    if y + 1 < h {
        v.push((x, y + 1));
    }
    v.into_iter()
}

/// In-bounds tiles within Chebyshev `radius`, excluding the centre, row-major.
pub(crate) fn square_around(
    x: usize,
    y: usize,
    radius: usize,
    w: usize,
    h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let x0 = x.saturating_sub(radius);
    let y0 = y.saturating_sub(radius);
    let x1 = (x + radius).min(w.saturating_sub(1));
    let y1 = (y + radius).min(h.saturating_sub(1));
    (y0..=y1)
        .flat_map(move |ny| (x0..=x1).map(move |nx| (nx, ny)))
        .filter(move |&(nx, ny)| nx != x || ny != y)
}

pub(crate) fn neighbors8(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> impl Iterator<Item = (usize, usize)> {
    square_around(x, y, 1, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_starts_with_placeholders() {
        let grid = TileGrid::new(3, 2);
        assert_eq!(grid.len(), 6);
        assert!(grid
            .tiles()
            .iter()
            .all(|tile| tile.terrain == TerrainId::UNKNOWN && tile.continent_id == 0));
        let tile = grid.tile(2, 1);
        assert_eq!((tile.x, tile.y), (2, 1));
        assert_eq!(grid.index(2, 1), 5);
    }

    #[test]
    fn neighbours_skip_out_of_range() {
        assert_eq!(neighbors8(0, 0, 4, 4).count(), 3);
        assert_eq!(neighbors8(1, 1, 4, 4).count(), 8);
        assert_eq!(neighbors8(3, 1, 4, 4).count(), 5);
        assert_eq!(neighbors4(0, 3, 4, 4).count(), 2);
        assert_eq!(square_around(0, 0, 2, 4, 4).count(), 8);
        assert_eq!(square_around(2, 2, 2, 5, 5).count(), 24);
    }

    #[test]
    fn neighbours8_are_row_major() {
        let order: Vec<_> = neighbors8(1, 1, 3, 3).collect();
        assert_eq!(
            order,
            vec![
                (0, 0),
                (1, 0),
                (2, 0),
                (0, 1),
                (2, 1),
                (0, 2),
                (1, 2),
                (2, 2)
            ]
        );
    }

    #[test]
    fn zone_unions() {
        assert!(TemperatureZone::NOT_FROZEN.intersects(TemperatureZone::COLD));
        assert!(!TemperatureZone::NOT_FROZEN.intersects(TemperatureZone::FROZEN));
        assert!(TemperatureZone::HOT.intersects(TemperatureZone::TROPICAL));
        assert!(!TemperatureZone::HOT.intersects(TemperatureZone::COLD));
        assert_eq!(TemperatureZone::ALL, TemperatureZone::all());
        assert_eq!(TemperatureZone::TEMPERATE.ordinal(), 3);
        assert_eq!(TemperatureZone::empty().ordinal(), 0);
    }

    #[test]
    fn ascii_render_of_hand_built_grid() {
        let ruleset = TerrainRuleset::builtin();
        let id = |key: &str| ruleset.id_of(key).expect("builtin terrain");
        let rows = [
            ["deep_ocean", "ocean", "coast", "coast", "ocean"],
            ["ocean", "coast", "grassland", "hills", "coast"],
            ["coast", "forest", "mountains", "plains", "lake"],
            ["coast", "swamp", "jungle", "desert", "coast"],
        ];
        let mut grid = TileGrid::new(5, 4);
        for (y, row) in rows.iter().enumerate() {
            for (x, key) in row.iter().enumerate() {
                grid.set_terrain(x, y, id(key));
            }
        }
        grid.set_terrain(4, 3, TerrainId::LAND_FILL);
        grid.set_terrain(0, 3, TerrainId::UNKNOWN);
        insta::assert_snapshot!(grid.render_ascii(&ruleset).trim_end(), @r###"
        ~.::.
        .:gh:
        :fmp+
        ?sjd#
        "###);
    }
}
