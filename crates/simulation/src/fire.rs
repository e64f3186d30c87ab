//! Fire spread and burn-out, run in phase 15.

use crate::config::MAX_FIRES_PER_PHASE;
use crate::density::DensityMaps;
use crate::grid::{Tile, TileGrid};
use crate::notifications::SimEvent;
use crate::sim_rng::SimRng;
use crate::tiles;
use crate::zones::build;

// =============================================================================
// Constants
// =============================================================================

/// Chance denominator for a fire to jump to each burnable neighbor.
const SPREAD_CHANCE: u32 = 8;

/// Burn-out draw ceiling by fire coverage. A fire goes out when a draw in
/// `0..=rate` comes up zero, so better coverage puts fires out faster.
fn burn_out_rate(coverage: u16) -> u32 {
    match coverage {
        0 => 10,
        1..=20 => 3,
        21..=100 => 2,
        _ => 1,
    }
}

// =============================================================================
// Ignition
// =============================================================================

/// What happened when a tile caught fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignition {
    /// Not burnable.
    Nothing,
    /// The tile itself is now burning.
    Burning,
    /// A building went up; its whole footprint is rubble.
    Razed { cx: usize, cy: usize },
}

/// Set fire to the tile at `(x, y)`. Building tiles take their whole
/// footprint down with them.
pub fn ignite(grid: &mut TileGrid, rng: &mut SimRng, x: i32, y: i32) -> Ignition {
    let Some(tile) = grid.get(x, y) else {
        return Ignition::Nothing;
    };
    if !tile.is_burnable() {
        return Ignition::Nothing;
    }
    let building = tiles::zone_kind(tile.id).zip(tiles::center_of(tile.id, x, y));
    if let Some((kind, (cx, cy))) = building {
        let intact = grid
            .get(cx, cy)
            .is_some_and(|c| c.is_zone_center() && tiles::zone_kind(c.id) == Some(kind));
        if intact {
            build::to_rubble(grid, rng, kind, cx, cy);
            return Ignition::Razed {
                cx: cx as usize,
                cy: cy as usize,
            };
        }
    }
    let flame = tiles::FIRE_BASE + rng.below((tiles::LAST_FIRE - tiles::FIRE_BASE + 1) as u32) as u16;
    grid.set(x, y, Tile::natural(flame));
    Ignition::Burning
}

// =============================================================================
// Phase 15
// =============================================================================

/// Spread and burn out up to [`MAX_FIRES_PER_PHASE`] fires, in row-major order.
/// Fires started during this pass wait for the next one. Returns how many
/// fires were processed.
pub fn spread_fires(
    grid: &mut TileGrid,
    maps: &DensityMaps,
    rng: &mut SimRng,
    events: &mut Vec<SimEvent>,
) -> usize {
    let burning: Vec<(usize, usize)> = (0..grid.height)
        .flat_map(|y| (0..grid.width).map(move |x| (x, y)))
        .filter(|&(x, y)| tiles::is_fire(grid.at(x, y).id))
        .take(MAX_FIRES_PER_PHASE)
        .collect();

    for &(x, y) in &burning {
        let (neighbors, count) = grid.neighbors4(x, y);
        for &(nx, ny) in &neighbors[..count] {
            if !rng.one_in(SPREAD_CHANCE) {
                continue;
            }
            if let Ignition::Razed { cx, cy } = ignite(grid, rng, nx as i32, ny as i32) {
                events.push(SimEvent::ZoneBurned { x: cx, y: cy });
            }
        }

        let rate = burn_out_rate(maps.fire_coverage.at_world(x, y));
        if tiles::is_fire(grid.at(x, y).id) && rng.up_to(rate) == 0 {
            let ash = tiles::RUBBLE + rng.below((tiles::LAST_RUBBLE - tiles::RUBBLE + 1) as u32) as u16;
            grid.set(x as i32, y as i32, Tile::natural(ash));
        }
    }
    burning.len()
}
