//! Power distribution.
//!
//! Breadth-first propagation from every plant center across conductive and
//! zone tiles. Plants contribute a fixed capacity each, and tiles are energized
//! in BFS order until the powered count reaches the total capacity. The work
//! queue is bounded; overflow silently truncates propagation.

use std::collections::VecDeque;

use bevy::log::debug;
use serde::{Deserialize, Serialize};

use crate::config::MAX_POWER_QUEUE;
use crate::grid::{TileFlags, TileGrid};
use crate::sim_params::SimParams;
use crate::tiles::{self, ZoneKind};

/// Result of one propagation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerStats {
    pub coal_plants: u32,
    pub nuclear_plants: u32,
    pub capacity: u32,
    /// Tiles reached by propagation, powered or not.
    pub demand: u32,
    pub powered: u32,
    /// The queue bound cut propagation short.
    pub truncated: bool,
}

impl PowerStats {
    pub fn is_brownout(&self) -> bool {
        self.demand > self.capacity
    }
}

/// Energize the grid. Clears every `POWERED` flag first.
pub fn propagate(grid: &mut TileGrid, params: &SimParams) -> PowerStats {
    grid.clear_flag(TileFlags::POWERED);

    let mut stats = PowerStats::default();
    let mut visited = vec![false; grid.width * grid.height];
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

    for y in 0..grid.height {
        for x in 0..grid.width {
            let tile = grid.at(x, y);
            if !tile.is_zone_center() {
                continue;
            }
            match tiles::zone_kind(tile.id) {
                Some(ZoneKind::CoalPlant) => {
                    stats.coal_plants += 1;
                    stats.capacity += params.coal_capacity;
                }
                Some(ZoneKind::NuclearPlant) => {
                    stats.nuclear_plants += 1;
                    stats.capacity += params.nuclear_capacity;
                }
                _ => continue,
            }
            let idx = grid.index(x, y);
            if queue.len() < MAX_POWER_QUEUE {
                visited[idx] = true;
                queue.push_back((x, y));
            } else {
                stats.truncated = true;
            }
        }
    }

    let mut unmet = 0u32;
    while let Some((x, y)) = queue.pop_front() {
        if stats.powered >= stats.capacity {
            unmet += 1;
            continue;
        }
        let idx = grid.index(x, y);
        grid.tiles[idx].flags.insert(TileFlags::POWERED);
        stats.powered += 1;

        let (neighbors, ncount) = grid.neighbors4(x, y);
        for &(nx, ny) in &neighbors[..ncount] {
            let nidx = grid.index(nx, ny);
            if visited[nidx] {
                continue;
            }
            let tile = grid.tiles[nidx];
            if !(tile.is_conductive() || tile.is_zone_center()) {
                continue;
            }
            if queue.len() >= MAX_POWER_QUEUE {
                stats.truncated = true;
                continue;
            }
            visited[nidx] = true;
            queue.push_back((nx, ny));
        }
    }

    stats.demand = stats.powered + unmet;
    if stats.truncated {
        debug!(
            "power: propagation queue hit {} entries, {} tiles powered",
            MAX_POWER_QUEUE, stats.powered
        );
    }
    stats
}
