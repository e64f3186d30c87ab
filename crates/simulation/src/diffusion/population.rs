//! Population density, the population centroid and the commercial rate map.

use crate::density::{DensityMaps, Map};
use crate::grid::TileGrid;
use crate::tiles::{self, Category};

const DENSITY_PASSES: usize = 3;
const DENSITY_CAP: u32 = 254;
/// Commercial and industrial zones weigh this much more than housing.
const JOB_WEIGHT: u32 = 8;
const MAX_COMMERCIAL_DISTANCE: usize = 64;

pub fn scan(grid: &TileGrid, maps: &mut DensityMaps) {
    let mut density = Map::<u8>::covering(grid.width, grid.height, maps.population.scale);
    let (mut wx_sum, mut wy_sum, mut weight_sum) = (0u64, 0u64, 0u64);

    for y in 0..grid.height {
        for x in 0..grid.width {
            let tile = grid.at(x, y);
            if !tile.is_zone_center() {
                continue;
            }
            let pop = tiles::stage_population(tiles::stage_of(tile.id));
            let weight = match tiles::category(tile.id) {
                Some(Category::Residential) => pop,
                Some(Category::Commercial | Category::Industrial) => pop * JOB_WEIGHT,
                _ => 0,
            }
            .min(DENSITY_CAP);
            if weight == 0 {
                continue;
            }
            let current = density.at_world(x, y) as u32;
            density.set(
                x / density.scale,
                y / density.scale,
                (current + weight).min(DENSITY_CAP) as u8,
            );
            wx_sum += x as u64 * weight as u64;
            wy_sum += y as u64 * weight as u64;
            weight_sum += weight as u64;
        }
    }

    super::smoothing::smooth(&mut density, DENSITY_PASSES);
    maps.population = density;

    maps.stats.centroid = if weight_sum > 0 {
        ((wx_sum / weight_sum) as usize, (wy_sum / weight_sum) as usize)
    } else {
        (grid.width / 2, grid.height / 2)
    };

    let (cx, cy) = maps.stats.centroid;
    let rate = &mut maps.commercial_rate;
    for qy in 0..rate.height {
        for qx in 0..rate.width {
            let (wx, wy) = (qx * rate.scale, qy * rate.scale);
            let dist = (wx.abs_diff(cx) + wy.abs_diff(cy)).min(MAX_COMMERCIAL_DISTANCE);
            rate.set(qx, qy, ((MAX_COMMERCIAL_DISTANCE - dist) * 4) as i16);
        }
    }
}
