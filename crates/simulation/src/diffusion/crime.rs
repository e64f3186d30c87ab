use crate::density::DensityMaps;

use super::land_value::average;
use super::smoothing::smooth;

const COVERAGE_PASSES: usize = 3;
const MAX_CRIME: i32 = 250;

/// Smooth police stamps into coverage, then derive crime for every valued cell.
pub fn scan(maps: &mut DensityMaps) {
    let mut coverage = maps.police_raw.clone();
    smooth(&mut coverage, COVERAGE_PASSES);
    maps.police_coverage = coverage;

    for hy in 0..maps.crime.height {
        for hx in 0..maps.crime.width {
            let land_value = maps.land_value.get(hx, hy) as i32;
            if land_value == 0 {
                maps.crime.set(hx, hy, 0);
                continue;
            }
            let pressure = 128 - land_value + maps.population.get(hx, hy) as i32;
            let policed = pressure - maps.police_coverage.get(hx / 2, hy / 2) as i32;
            maps.crime.set(hx, hy, policed.clamp(0, MAX_CRIME) as u8);
        }
    }

    let (sum, count) = maps.crime.sum_where(|v| v > 0);
    let (max_x, max_y, _) = maps.crime.max_location();
    maps.stats.crime_average = average(sum, count);
    maps.stats.crime_max_at = (max_x * 2, max_y * 2);
}
