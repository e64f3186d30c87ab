//! Pollution, terrain and land value.

use crate::density::{DensityMaps, Map};
use crate::grid::TileGrid;
use crate::tiles;

use super::smoothing::smooth;

/// Terrain bonus per natural tile surveyed.
const TERRAIN_WEIGHT: i32 = 15;
/// Crime above this knocks land value down.
const CRIME_PENALTY_THRESHOLD: u8 = 190;
const CRIME_PENALTY: i32 = 20;

pub fn scan(grid: &TileGrid, maps: &mut DensityMaps) {
    let mut pollution = Map::<u8>::covering(grid.width, grid.height, maps.pollution.scale);
    let mut terrain = Map::<u8>::covering(grid.width, grid.height, maps.terrain.scale);
    let mut developed = vec![false; pollution.cells.len()];

    for hy in 0..pollution.height {
        for hx in 0..pollution.width {
            let mut raw = 0i32;
            let mut any_developed = false;
            for wy in hy * 2..(hy * 2 + 2).min(grid.height) {
                for wx in hx * 2..(hx * 2 + 2).min(grid.width) {
                    let id = grid.at(wx, wy).id;
                    if tiles::is_terrain(id) {
                        terrain.add_world(wx, wy, TERRAIN_WEIGHT);
                    }
                    if tiles::is_developed(id) {
                        any_developed = true;
                    }
                    raw += tiles::pollution_value(id) as i32;
                }
            }
            pollution.set(hx, hy, raw.min(255) as u8);
            developed[hy * pollution.width + hx] = any_developed;
        }
    }

    smooth(&mut pollution, 2);
    smooth(&mut terrain, 1);

    let (cx, cy) = maps.stats.centroid;
    let (chx, chy) = (cx / 2, cy / 2);
    let mut land_value = Map::<u8>::covering(grid.width, grid.height, maps.land_value.scale);
    for hy in 0..land_value.height {
        for hx in 0..land_value.width {
            if !developed[hy * land_value.width + hx] {
                continue;
            }
            let dist = (hx.abs_diff(chx) + hy.abs_diff(chy)) as i32;
            let mut value = (34 - dist) * 4;
            value += terrain.get(hx / 2, hy / 2) as i32;
            value -= pollution.get(hx, hy) as i32;
            if maps.crime.get(hx, hy) > CRIME_PENALTY_THRESHOLD {
                value -= CRIME_PENALTY;
            }
            land_value.set(hx, hy, value.clamp(1, 250) as u8);
        }
    }

    let (poll_sum, poll_count) = pollution.sum_where(|v| v > 0);
    let (lv_sum, lv_count) = land_value.sum_where(|v| v > 0);
    let (max_x, max_y, _) = pollution.max_location();

    maps.pollution = pollution;
    maps.terrain = terrain;
    maps.land_value = land_value;
    maps.stats.pollution_average = average(poll_sum, poll_count);
    maps.stats.pollution_max_at = (max_x * 2, max_y * 2);
    maps.stats.land_value_average = average(lv_sum, lv_count);
}

pub(super) fn average(sum: i64, count: usize) -> u32 {
    if count == 0 {
        0
    } else {
        (sum / count as i64) as u32
    }
}
