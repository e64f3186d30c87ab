//! Footprint stamping.
//!
//! All writes that touch a whole zone footprint go through here so the
//! one-`ZONE`-tile-per-footprint invariant is kept in a single place.

use std::fmt;

use crate::grid::{Tile, TileFlags, TileGrid};
use crate::sim_rng::SimRng;
use crate::tiles::{self, ZoneKind, BLOCK_VARIANTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Part of the footprint falls outside the grid.
    OutOfBounds { x: i32, y: i32 },
    /// A footprint cell holds something that must be bulldozed first.
    Occupied { x: i32, y: i32 },
    /// Id outside the tile table, or a building id that needs a footprint.
    InvalidTile(u16),
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds { x, y } => {
                write!(f, "footprint cell ({x}, {y}) is outside the map")
            }
            PlacementError::Occupied { x, y } => write!(f, "cell ({x}, {y}) is occupied"),
            PlacementError::InvalidTile(id) => write!(f, "tile id {id} cannot be placed here"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// Land a new building may be placed on without bulldozing.
fn is_clear(id: u16) -> bool {
    id == tiles::DIRT || tiles::is_woods(id) || tiles::is_rubble(id)
}

/// Stamp a fresh stage-0 footprint of `kind` centered on `(cx, cy)`.
pub fn stamp_zone(
    grid: &mut TileGrid,
    kind: ZoneKind,
    cx: i32,
    cy: i32,
) -> Result<(), PlacementError> {
    for (x, y, _) in kind.footprint(cx, cy) {
        let tile = grid
            .get(x, y)
            .ok_or(PlacementError::OutOfBounds { x, y })?;
        if !is_clear(tile.id) {
            return Err(PlacementError::Occupied { x, y });
        }
    }
    write_footprint(grid, kind, cx, cy, 0, |_| 0, TileFlags::NONE);
    Ok(())
}

/// Re-stamp an existing zone at `stage` with a random variant per cell.
/// Refuses when the footprint leaves the grid or overlaps another zone center.
pub fn plop(grid: &mut TileGrid, rng: &mut SimRng, kind: ZoneKind, cx: i32, cy: i32, stage: u8) -> bool {
    if !footprint_is_exclusive(grid, kind, cx, cy) {
        return false;
    }
    let carried = carried_flags(grid, cx, cy);
    write_footprint(
        grid,
        kind,
        cx,
        cy,
        stage,
        |_| rng.below(BLOCK_VARIANTS as u32) as u16,
        carried,
    );
    true
}

/// Replace a zone with another kind of the same size, keeping its power state.
pub fn convert(grid: &mut TileGrid, to: ZoneKind, cx: i32, cy: i32) -> bool {
    if !footprint_is_exclusive(grid, to, cx, cy) {
        return false;
    }
    let carried = carried_flags(grid, cx, cy);
    write_footprint(grid, to, cx, cy, 0, |_| 0, carried);
    true
}

/// Swap only the center tile to the given stage, keeping its flags.
pub fn set_center_stage(grid: &mut TileGrid, kind: ZoneKind, cx: i32, cy: i32, stage: u8) {
    if let Some(tile) = grid.get_mut(cx, cy) {
        tile.id = kind.center_tile(stage);
    }
}

/// Swap a stadium between its empty and full blocks.
pub fn set_stadium_full(grid: &mut TileGrid, cx: i32, cy: i32, full: bool) {
    let carried = carried_flags(grid, cx, cy);
    let variant = u16::from(full);
    write_footprint(grid, ZoneKind::Stadium, cx, cy, 0, |_| variant, carried);
}

/// Turn every footprint cell into rubble.
pub fn to_rubble(grid: &mut TileGrid, rng: &mut SimRng, kind: ZoneKind, cx: i32, cy: i32) {
    for (x, y, _) in kind.footprint(cx, cy) {
        let id = tiles::RUBBLE + rng.below((tiles::LAST_RUBBLE - tiles::RUBBLE + 1) as u32) as u16;
        grid.set(x, y, Tile::natural(id));
    }
}

/// Clear the zone centered on `(cx, cy)` back to dirt.
/// Returns false when there is no zone center there.
pub fn clear_footprint(grid: &mut TileGrid, cx: i32, cy: i32) -> bool {
    let Some(center) = grid.get(cx, cy).filter(|t| t.is_zone_center()) else {
        return false;
    };
    let Some(kind) = tiles::zone_kind(center.id) else {
        return false;
    };
    for (x, y, _) in kind.footprint(cx, cy) {
        let belongs = grid
            .get(x, y)
            .is_some_and(|t| tiles::zone_kind(t.id) == Some(kind));
        if belongs {
            grid.set(x, y, Tile::DIRT);
        }
    }
    true
}

fn footprint_is_exclusive(grid: &TileGrid, kind: ZoneKind, cx: i32, cy: i32) -> bool {
    kind.footprint(cx, cy).all(|(x, y, _)| match grid.get(x, y) {
        Some(tile) => (x, y) == (cx, cy) || !tile.is_zone_center(),
        None => false,
    })
}

fn carried_flags(grid: &TileGrid, cx: i32, cy: i32) -> TileFlags {
    let powered = grid.get(cx, cy).is_some_and(|t| t.is_powered());
    let mut flags = TileFlags::NONE;
    flags.set(TileFlags::POWERED, powered);
    flags
}

fn write_footprint(
    grid: &mut TileGrid,
    kind: ZoneKind,
    cx: i32,
    cy: i32,
    stage: u8,
    mut variant: impl FnMut(u16) -> u16,
    carried: TileFlags,
) {
    for (x, y, offset) in kind.footprint(cx, cy) {
        let id = kind.block_tile(stage, variant(offset), offset);
        let mut flags = tiles::default_flags(id).union(carried);
        if (x, y) == (cx, cy) {
            flags.insert(TileFlags::ZONE);
        }
        grid.set(x, y, Tile::with_flags(id, flags));
    }
}
