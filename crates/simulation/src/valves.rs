//! City-wide demand valves.
//!
//! A projected-population model compares where each sector is heading with
//! where it is now, adds a tax penalty, and nudges the three valves. Runs once
//! at world creation and then every year.

use serde::{Deserialize, Serialize};

use crate::census::CensusCounts;
use crate::sim_params::Difficulty;

pub const RES_VALVE_RANGE: i32 = 2000;
pub const COM_VALVE_RANGE: i32 = 1500;
pub const IND_VALVE_RANGE: i32 = 1500;

/// Residential population beyond which growth needs a stadium.
pub const RES_CAP_POPULATION: u32 = 500;
/// Commercial population beyond which growth needs an airport.
pub const COM_CAP_POPULATION: u32 = 100;
/// Industrial population beyond which growth needs a seaport.
pub const IND_CAP_POPULATION: u32 = 70;

const MAX_RATIO: f32 = 2.0;

/// Valve adjustment per effective tax level (tax rate plus difficulty).
const TAX_TABLE: [i32; 21] = [
    200, 150, 120, 100, 80, 50, 30, 0, -10, -40, -100, -150, -200, -250, -300, -350, -400, -450,
    -500, -550, -600,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandValves {
    pub residential: i16,
    pub commercial: i16,
    pub industrial: i16,
    /// Growth blocked until a stadium exists.
    pub res_capped: bool,
    /// Growth blocked until an airport exists.
    pub com_capped: bool,
    /// Growth blocked until a seaport exists.
    pub ind_capped: bool,
}

impl DemandValves {
    pub fn update(&mut self, counts: &CensusCounts, tax_rate: u8, difficulty: Difficulty) {
        // Work in zone-stage units so the three sectors are comparable.
        let res = counts.residential_pop as f32 / 8.0;
        let com = counts.commercial_pop as f32 / 8.0;
        let ind = counts.industrial_pop as f32 / 8.0;

        let employment = if res > 0.0 { (com + ind) / res } else { 1.0 };
        let migration = res * (employment - 1.0);
        let births = res * 0.02;
        let projected_res = res + migration + births;

        let labor_base = if com + ind > 0.0 {
            (res / (com + ind)).clamp(0.0, 1.3)
        } else {
            1.0
        };
        let internal_market = (res + com + ind) / 3.7;
        let projected_com = internal_market * labor_base;

        let export_factor = match difficulty {
            Difficulty::Easy => 1.2,
            Difficulty::Medium => 1.1,
            Difficulty::Hard => 0.98,
        };
        let projected_ind = (ind * labor_base * export_factor).max(5.0);

        let res_ratio = if res > 0.0 { projected_res / res } else { 1.3 };
        let com_ratio = if com > 0.0 { projected_com / com } else { projected_com };
        let ind_ratio = if ind > 0.0 { projected_ind / ind } else { projected_ind };

        let tax_level = (tax_rate as usize + difficulty.index()).min(TAX_TABLE.len() - 1);
        let tax_penalty = TAX_TABLE[tax_level];

        let delta = |ratio: f32| ((ratio.min(MAX_RATIO) - 1.0) * 600.0).round() as i32 + tax_penalty;

        self.residential = step(self.residential, delta(res_ratio), RES_VALVE_RANGE);
        self.commercial = step(self.commercial, delta(com_ratio), COM_VALVE_RANGE);
        self.industrial = step(self.industrial, delta(ind_ratio), IND_VALVE_RANGE);

        self.res_capped = counts.residential_pop > RES_CAP_POPULATION && counts.stadiums == 0;
        self.com_capped = counts.commercial_pop > COM_CAP_POPULATION && counts.airports == 0;
        self.ind_capped = counts.industrial_pop > IND_CAP_POPULATION && counts.seaports == 0;

        if self.res_capped {
            self.residential = self.residential.min(0);
        }
        if self.com_capped {
            self.commercial = self.commercial.min(0);
        }
        if self.ind_capped {
            self.industrial = self.industrial.min(0);
        }
    }
}

fn step(valve: i16, delta: i32, range: i32) -> i16 {
    (valve as i32 + delta).clamp(-range, range) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_city_wants_residents_and_industry() {
        let mut valves = DemandValves::default();
        valves.update(&CensusCounts::default(), 7, Difficulty::Medium);
        // res ratio 1.3 -> +180, tax level 8 -> -10
        assert_eq!(valves.residential, 170);
        // projected industry floors at 5 units
        assert!(valves.industrial > 0);
        assert!(valves.commercial < 0);
    }

    #[test]
    fn test_valves_stay_in_range() {
        let mut valves = DemandValves::default();
        let counts = CensusCounts {
            residential_pop: 8,
            commercial_pop: 400,
            industrial_pop: 400,
            stadiums: 1,
            airports: 1,
            seaports: 1,
            ..CensusCounts::default()
        };
        for _ in 0..50 {
            valves.update(&counts, 0, Difficulty::Easy);
        }
        assert_eq!(valves.residential as i32, RES_VALVE_RANGE);
        assert!((valves.commercial as i32).abs() <= COM_VALVE_RANGE);
        assert!((valves.industrial as i32).abs() <= IND_VALVE_RANGE);
    }

    #[test]
    fn test_high_taxes_suppress_demand() {
        let mut low = DemandValves::default();
        let mut high = DemandValves::default();
        let counts = CensusCounts {
            residential_pop: 80,
            commercial_pop: 40,
            industrial_pop: 40,
            ..CensusCounts::default()
        };
        low.update(&counts, 0, Difficulty::Medium);
        high.update(&counts, 20, Difficulty::Medium);
        assert!(low.residential > high.residential);
        assert!(low.commercial > high.commercial);
    }

    #[test]
    fn test_caps_without_landmarks() {
        let mut valves = DemandValves::default();
        let counts = CensusCounts {
            residential_pop: 600,
            commercial_pop: 200,
            industrial_pop: 100,
            ..CensusCounts::default()
        };
        valves.update(&counts, 0, Difficulty::Easy);
        assert!(valves.res_capped && valves.com_capped && valves.ind_capped);
        assert!(valves.residential <= 0);
        assert!(valves.commercial <= 0);
        assert!(valves.industrial <= 0);
    }
}
