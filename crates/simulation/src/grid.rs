use serde::{Deserialize, Serialize};

use crate::tiles;

/// Per-tile flag bits. Packed into bits 10..16 of a tile's persisted `u16`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileFlags(pub u8);

impl TileFlags {
    pub const NONE: TileFlags = TileFlags(0);
    /// Center tile of a zone footprint.
    pub const ZONE: TileFlags = TileFlags(1 << 0);
    /// Renderer animation cycling; the engine only passes it through.
    pub const ANIM: TileFlags = TileFlags(1 << 1);
    pub const BULLDOZABLE: TileFlags = TileFlags(1 << 2);
    pub const BURNABLE: TileFlags = TileFlags(1 << 3);
    pub const CONDUCTIVE: TileFlags = TileFlags(1 << 4);
    pub const POWERED: TileFlags = TileFlags(1 << 5);

    pub const BUILDING: TileFlags =
        TileFlags(Self::BULLDOZABLE.0 | Self::BURNABLE.0 | Self::CONDUCTIVE.0);

    #[inline]
    pub fn contains(self, other: TileFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: TileFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: TileFlags) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn set(&mut self, other: TileFlags, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub fn union(self, other: TileFlags) -> TileFlags {
        TileFlags(self.0 | other.0)
    }
}

/// Low bits of a packed tile that hold the id.
pub const ID_MASK: u16 = 0x03FF;
const FLAG_SHIFT: u16 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: u16,
    pub flags: TileFlags,
}

impl Tile {
    pub const DIRT: Tile = Tile {
        id: tiles::DIRT,
        flags: TileFlags::NONE,
    };

    /// A tile with the default flags for its id.
    pub fn natural(id: u16) -> Self {
        if !tiles::is_valid(id) {
            return Self::DIRT;
        }
        Self {
            id,
            flags: tiles::default_flags(id),
        }
    }

    pub fn with_flags(id: u16, flags: TileFlags) -> Self {
        Self { id, flags }
    }

    /// Decode the persisted 16-bit form. Ids outside the tile table decode as dirt.
    pub fn from_packed(raw: u16) -> Self {
        let id = raw & ID_MASK;
        if !tiles::is_valid(id) {
            return Self::DIRT;
        }
        Self {
            id,
            flags: TileFlags((raw >> FLAG_SHIFT) as u8),
        }
    }

    pub fn to_packed(self) -> u16 {
        (self.id & ID_MASK) | ((self.flags.0 as u16) << FLAG_SHIFT)
    }

    #[inline]
    pub fn is_zone_center(self) -> bool {
        self.flags.contains(TileFlags::ZONE)
    }

    #[inline]
    pub fn is_powered(self) -> bool {
        self.flags.contains(TileFlags::POWERED)
    }

    #[inline]
    pub fn is_conductive(self) -> bool {
        self.flags.contains(TileFlags::CONDUCTIVE)
    }

    #[inline]
    pub fn is_burnable(self) -> bool {
        self.flags.contains(TileFlags::BURNABLE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn from_index(index: usize) -> Direction {
        Self::ALL[index & 3]
    }
}

/// The authoritative world state: a fixed-size, always fully populated tile array,
/// indexed row-major (`y * width + x`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub tiles: Vec<Tile>,
    pub width: usize,
    pub height: usize,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            tiles: vec![Tile::DIRT; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        if self.in_bounds(x, y) {
            Some(self.tiles[self.index(x as usize, y as usize)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        if self.in_bounds(x, y) {
            let idx = self.index(x as usize, y as usize);
            Some(&mut self.tiles[idx])
        } else {
            None
        }
    }

    /// Overwrite one tile. Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        match self.get_mut(x, y) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> Tile {
        self.tiles[self.index(x, y)]
    }

    /// Returns up to 4 cardinal neighbors and the count of valid entries.
    /// Use `&result[..count]` to iterate over valid neighbors.
    pub fn neighbors4(&self, x: usize, y: usize) -> ([(usize, usize); 4], usize) {
        let mut result = [(0, 0); 4];
        let mut count = 0;
        if y > 0 {
            result[count] = (x, y - 1);
            count += 1;
        }
        if x + 1 < self.width {
            result[count] = (x + 1, y);
            count += 1;
        }
        if y + 1 < self.height {
            result[count] = (x, y + 1);
            count += 1;
        }
        if x > 0 {
            result[count] = (x - 1, y);
            count += 1;
        }
        (result, count)
    }

    pub fn count_where(&self, pred: impl Fn(Tile) -> bool) -> usize {
        self.tiles.iter().filter(|t| pred(**t)).count()
    }

    pub fn clear_flag(&mut self, flag: TileFlags) {
        for tile in &mut self.tiles {
            tile.flags.remove(flag);
        }
    }

    /// Packed values in the grid's own row-major order.
    pub fn to_packed(&self) -> Vec<u16> {
        self.tiles.iter().map(|t| t.to_packed()).collect()
    }

    /// Rebuild a grid from row-major packed values. Missing values read as dirt.
    pub fn from_packed(width: usize, height: usize, packed: &[u16]) -> Self {
        let mut grid = Self::new(width, height);
        for (slot, raw) in grid.tiles.iter_mut().zip(packed.iter()) {
            *slot = Tile::from_packed(*raw);
        }
        grid
    }
}
