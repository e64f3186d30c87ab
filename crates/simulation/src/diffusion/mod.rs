//! Low-frequency map scans.
//!
//! Each scan rebuilds one family of overlay maps from the tile grid and then
//! smooths it with 5-point averaging. The scheduler runs them on slower
//! cadences than the zone strips.

pub mod crime;
pub mod land_value;
pub mod population;
pub mod smoothing;

use bevy::log::debug;

use crate::density::DensityMaps;
use crate::grid::TileGrid;

const FIRE_COVERAGE_PASSES: usize = 3;

/// Smooth fire-station stamps into the coverage map.
pub fn analyze_fire_coverage(maps: &mut DensityMaps) {
    let mut coverage = maps.fire_raw.clone();
    smoothing::smooth(&mut coverage, FIRE_COVERAGE_PASSES);
    maps.fire_coverage = coverage;
}

/// Run every scan once, in dependency order. Used after loading a city.
pub fn refresh_all(grid: &TileGrid, maps: &mut DensityMaps) {
    population::scan(grid, maps);
    land_value::scan(grid, maps);
    crime::scan(maps);
    analyze_fire_coverage(maps);
    debug!(
        "diffusion: refreshed maps, land value avg {}, pollution avg {}, crime avg {}",
        maps.stats.land_value_average, maps.stats.pollution_average, maps.stats.crime_average
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::ZoneKind;
    use crate::zones::build;

    #[test]
    fn test_fire_coverage_spreads_from_station_cell() {
        let mut maps = DensityMaps::new(40, 40);
        maps.fire_raw.set(5, 5, 1000);
        analyze_fire_coverage(&mut maps);
        assert!(maps.fire_coverage.get(5, 5) > 0);
        assert!(maps.fire_coverage.get(6, 5) > 0);
        assert_eq!(maps.fire_raw.get(5, 5), 1000, "raw stamps are left alone");
    }

    #[test]
    fn test_refresh_all_on_small_city() {
        let mut grid = TileGrid::new(40, 40);
        build::stamp_zone(&mut grid, ZoneKind::Residential, 10, 10).unwrap();
        build::set_center_stage(&mut grid, ZoneKind::Residential, 10, 10, 3);
        let mut maps = DensityMaps::new(40, 40);
        refresh_all(&grid, &mut maps);
        assert_eq!(maps.stats.centroid, (10, 10));
        assert!(maps.land_value.at_world(10, 10) > 0);
        assert!(maps.population.at_world(10, 10) > 0);
        assert_eq!(maps.crime.at_world(10, 10), 0, "valuable central land is safe");
        assert_eq!(maps.stats.land_value_average, 132);
    }
}
