//! Tile-id tables.
//!
//! Ids are a dense enumeration below [`TILE_COUNT`]. Every building kind owns a
//! contiguous run of ids laid out as row-major footprint blocks, so any footprint
//! tile's id encodes its offset inside the block and therefore where its center is.
//! Growable categories (residential, commercial, industrial) own one block per
//! `(stage, variant)` pair.

use serde::{Deserialize, Serialize};

use crate::grid::TileFlags;

pub const DIRT: u16 = 0;

pub const RIVER: u16 = 2;
pub const WATER_LOW: u16 = 2;
pub const WATER_HIGH: u16 = 20;

pub const WOODS_LOW: u16 = 21;
pub const WOODS_HIGH: u16 = 39;

pub const RUBBLE: u16 = 44;
pub const LAST_RUBBLE: u16 = 47;
pub const RADIATION: u16 = 52;
pub const FIRE_BASE: u16 = 56;
pub const LAST_FIRE: u16 = 63;

pub const ROAD_BASE: u16 = 64;
pub const LAST_ROAD: u16 = 207;
pub const ROAD_SHAPES: u16 = 16;
pub const LIGHT_TRAFFIC_LAYER: u16 = 1;
pub const HEAVY_TRAFFIC_LAYER: u16 = 5;

pub const SHAPE_HBRIDGE: u16 = 0;
pub const SHAPE_VBRIDGE: u16 = 1;
pub const SHAPE_HROAD: u16 = 2;
pub const SHAPE_VROAD: u16 = 3;
pub const SHAPE_HROAD_POWER: u16 = 13;
pub const SHAPE_VROAD_POWER: u16 = 14;
pub const SHAPE_RAIL_CROSSING: u16 = 15;

pub const POWER_BASE: u16 = 208;
pub const LAST_POWER: u16 = 222;
pub const RAIL_BASE: u16 = 224;
pub const LAST_RAIL: u16 = 238;

pub const RES_BASE: u16 = 240;
pub const HOSPITAL_BASE: u16 = 405;
pub const CHURCH_BASE: u16 = 414;
pub const COM_BASE: u16 = 423;
pub const IND_BASE: u16 = 612;
pub const PORT_BASE: u16 = 702;
pub const AIRPORT_BASE: u16 = 718;
pub const COAL_BASE: u16 = 754;
pub const FIRE_STATION_BASE: u16 = 770;
pub const POLICE_STATION_BASE: u16 = 779;
pub const STADIUM_BASE: u16 = 788;
pub const FULL_STADIUM_BASE: u16 = 804;
pub const NUCLEAR_BASE: u16 = 820;
pub const LAST_ZONE: u16 = 835;

pub const TILE_COUNT: u16 = 960;

/// Decorative variants per growable `(category, stage)` block.
pub const BLOCK_VARIANTS: u16 = 2;

pub fn is_valid(id: u16) -> bool {
    id < TILE_COUNT
}

pub fn is_water(id: u16) -> bool {
    (WATER_LOW..=WATER_HIGH).contains(&id)
}

pub fn is_woods(id: u16) -> bool {
    (WOODS_LOW..=WOODS_HIGH).contains(&id)
}

/// Natural terrain that raises nearby land value.
pub fn is_terrain(id: u16) -> bool {
    id != DIRT && id < RUBBLE
}

pub fn is_rubble(id: u16) -> bool {
    (RUBBLE..=LAST_RUBBLE).contains(&id)
}

pub fn is_fire(id: u16) -> bool {
    (FIRE_BASE..=LAST_FIRE).contains(&id)
}

pub fn is_road(id: u16) -> bool {
    (ROAD_BASE..=LAST_ROAD).contains(&id)
}

pub fn is_rail(id: u16) -> bool {
    (RAIL_BASE..=LAST_RAIL).contains(&id)
}

pub fn is_power_line(id: u16) -> bool {
    (POWER_BASE..=LAST_POWER).contains(&id)
}

/// Tiles a vehicle can drive along.
pub fn is_traversable(id: u16) -> bool {
    is_road(id) || is_rail(id)
}

/// Road-or-higher tiles count as developed land.
pub fn is_developed(id: u16) -> bool {
    id >= ROAD_BASE
}

pub fn road_shape(id: u16) -> u16 {
    (id - ROAD_BASE) % ROAD_SHAPES
}

pub fn road_layer(id: u16) -> u16 {
    (id - ROAD_BASE) / ROAD_SHAPES
}

pub fn road_tile(layer: u16, shape: u16) -> u16 {
    ROAD_BASE + layer * ROAD_SHAPES + (shape % ROAD_SHAPES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Residential,
    Commercial,
    Industrial,
    Civic,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Residential,
    Commercial,
    Industrial,
    Hospital,
    Church,
    Seaport,
    Airport,
    CoalPlant,
    FireStation,
    PoliceStation,
    Stadium,
    NuclearPlant,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 12] = [
        ZoneKind::Residential,
        ZoneKind::Commercial,
        ZoneKind::Industrial,
        ZoneKind::Hospital,
        ZoneKind::Church,
        ZoneKind::Seaport,
        ZoneKind::Airport,
        ZoneKind::CoalPlant,
        ZoneKind::FireStation,
        ZoneKind::PoliceStation,
        ZoneKind::Stadium,
        ZoneKind::NuclearPlant,
    ];

    pub fn category(self) -> Category {
        match self {
            ZoneKind::Residential => Category::Residential,
            ZoneKind::Commercial => Category::Commercial,
            ZoneKind::Industrial => Category::Industrial,
            ZoneKind::Hospital | ZoneKind::Church => Category::Civic,
            _ => Category::Special,
        }
    }

    /// Edge length of the square footprint.
    pub fn size(self) -> usize {
        match self {
            ZoneKind::Seaport
            | ZoneKind::CoalPlant
            | ZoneKind::Stadium
            | ZoneKind::NuclearPlant => 4,
            ZoneKind::Airport => 6,
            _ => 3,
        }
    }

    pub fn base(self) -> u16 {
        match self {
            ZoneKind::Residential => RES_BASE,
            ZoneKind::Commercial => COM_BASE,
            ZoneKind::Industrial => IND_BASE,
            ZoneKind::Hospital => HOSPITAL_BASE,
            ZoneKind::Church => CHURCH_BASE,
            ZoneKind::Seaport => PORT_BASE,
            ZoneKind::Airport => AIRPORT_BASE,
            ZoneKind::CoalPlant => COAL_BASE,
            ZoneKind::FireStation => FIRE_STATION_BASE,
            ZoneKind::PoliceStation => POLICE_STATION_BASE,
            ZoneKind::Stadium => STADIUM_BASE,
            ZoneKind::NuclearPlant => NUCLEAR_BASE,
        }
    }

    /// Number of density stages. Non-growable kinds have a single stage.
    pub fn stage_count(self) -> u8 {
        match self {
            ZoneKind::Residential | ZoneKind::Commercial => 6,
            ZoneKind::Industrial => 5,
            _ => 1,
        }
    }

    pub fn max_stage(self) -> u8 {
        self.stage_count() - 1
    }

    pub fn is_growable(self) -> bool {
        self.stage_count() > 1
    }

    pub fn is_power_plant(self) -> bool {
        matches!(self, ZoneKind::CoalPlant | ZoneKind::NuclearPlant)
    }

    fn block_len(self) -> u16 {
        (self.size() * self.size()) as u16
    }

    /// Number of blocks this kind owns (stages x variants, or two stadium states).
    fn block_count(self) -> u16 {
        if self.is_growable() {
            self.stage_count() as u16 * BLOCK_VARIANTS
        } else if self == ZoneKind::Stadium {
            2
        } else {
            1
        }
    }

    pub fn last_id(self) -> u16 {
        self.base() + self.block_count() * self.block_len() - 1
    }

    /// Offset of the center inside the row-major block: column 1, row 1.
    pub fn center_offset(self) -> u16 {
        self.size() as u16 + 1
    }

    /// Tile id of the footprint cell at `offset` for the given stage and variant.
    pub fn block_tile(self, stage: u8, variant: u16, offset: u16) -> u16 {
        let block = if self.is_growable() {
            (stage.min(self.max_stage()) as u16) * BLOCK_VARIANTS + variant % BLOCK_VARIANTS
        } else if self == ZoneKind::Stadium {
            variant % 2
        } else {
            0
        };
        self.base() + block * self.block_len() + offset % self.block_len()
    }

    pub fn center_tile(self, stage: u8) -> u16 {
        self.block_tile(stage, 0, self.center_offset())
    }

    /// Top-left corner of the footprint for a center at `(cx, cy)`.
    pub fn footprint_origin(self, cx: i32, cy: i32) -> (i32, i32) {
        (cx - 1, cy - 1)
    }

    /// All footprint coordinates for a center at `(cx, cy)`, row-major.
    pub fn footprint(self, cx: i32, cy: i32) -> impl Iterator<Item = (i32, i32, u16)> {
        let size = self.size() as i32;
        let (ox, oy) = self.footprint_origin(cx, cy);
        (0..size).flat_map(move |dy| {
            (0..size).map(move |dx| (ox + dx, oy + dy, (dy * size + dx) as u16))
        })
    }
}

/// Which building kind owns this id, if any.
pub fn zone_kind(id: u16) -> Option<ZoneKind> {
    ZoneKind::ALL
        .into_iter()
        .find(|kind| (kind.base()..=kind.last_id()).contains(&id))
}

pub fn category(id: u16) -> Option<Category> {
    zone_kind(id).map(ZoneKind::category)
}

/// Density stage encoded in a building tile id (0 for non-growable kinds).
pub fn stage_of(id: u16) -> u8 {
    match zone_kind(id) {
        Some(kind) if kind.is_growable() => {
            (((id - kind.base()) / kind.block_len()) / BLOCK_VARIANTS) as u8
        }
        _ => 0,
    }
}

/// Offset of a building tile inside its footprint block.
pub fn block_offset(id: u16) -> Option<u16> {
    zone_kind(id).map(|kind| (id - kind.base()) % kind.block_len())
}

/// Locate the center of the footprint that the building tile at `(x, y)` belongs to.
pub fn center_of(id: u16, x: i32, y: i32) -> Option<(i32, i32)> {
    let kind = zone_kind(id)?;
    let offset = block_offset(id)? as i32;
    let size = kind.size() as i32;
    let (dx, dy) = (offset % size, offset / size);
    Some((x - dx + 1, y - dy + 1))
}

/// Population a growable zone contributes at a given stage.
pub fn stage_population(stage: u8) -> u32 {
    stage as u32 * 8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    Low,
    Medium,
    High,
}

pub fn population_band(population: u32) -> Band {
    match population {
        0..=16 => Band::Low,
        17..=32 => Band::Medium,
        _ => Band::High,
    }
}

/// Raw pollution emitted by a single tile.
pub fn pollution_value(id: u16) -> u16 {
    if is_road(id) {
        return match road_layer(id) {
            0 => 0,
            layer if layer >= HEAVY_TRAFFIC_LAYER => 75,
            _ => 50,
        };
    }
    if is_fire(id) {
        return 90;
    }
    if id == RADIATION {
        return 255;
    }
    match zone_kind(id) {
        Some(ZoneKind::Industrial) if stage_of(id) > 0 => 50,
        Some(ZoneKind::Seaport | ZoneKind::Airport | ZoneKind::CoalPlant) => 100,
        _ => 0,
    }
}

/// Flags a freshly placed tile of this id carries (never ZONE or POWERED).
pub fn default_flags(id: u16) -> TileFlags {
    if is_woods(id) {
        return TileFlags::BURNABLE.union(TileFlags::BULLDOZABLE);
    }
    if is_rubble(id) || is_rail(id) {
        return TileFlags::BULLDOZABLE;
    }
    if is_fire(id) {
        return TileFlags::ANIM;
    }
    if is_road(id) {
        let mut flags = TileFlags::BULLDOZABLE;
        let shape = road_shape(id);
        if shape == SHAPE_HROAD_POWER || shape == SHAPE_VROAD_POWER {
            flags.insert(TileFlags::CONDUCTIVE);
        }
        if road_layer(id) > 0 {
            flags.insert(TileFlags::ANIM);
        }
        return flags;
    }
    if is_power_line(id) {
        return TileFlags::BULLDOZABLE.union(TileFlags::CONDUCTIVE);
    }
    if zone_kind(id).is_some() {
        return TileFlags::BUILDING;
    }
    TileFlags::NONE
}
