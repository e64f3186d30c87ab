//! Compact, typed, serializable snapshot of the city state.
//!
//! `CityObservation` is what an external UI or agent reads between ticks. It
//! is built from a `&City` and never feeds back into the simulation.

use serde::{Deserialize, Serialize};

use crate::budget::Effectiveness;
use crate::census::CityClass;
use crate::city::City;
use crate::evaluation::Problem;

/// Crime or pollution averages above this raise a warning.
const HIGH_AVERAGE: u32 = 120;
/// Unemployment severity above this raises a warning.
const HIGH_UNEMPLOYMENT: u8 = 128;
const CONGESTED_TRAFFIC: u32 = 150;

// ---------------------------------------------------------------------------
// Top-level observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CityObservation {
    // -- Time ---------------------------------------------------------------
    pub steps: u64,
    pub year: u64,
    pub month: u64,
    pub paused: bool,

    // -- Economy ------------------------------------------------------------
    pub treasury: i64,
    pub tax_rate: u8,
    pub last_tax_income: i64,
    pub effectiveness: EffectivenessSnapshot,

    // -- Population ---------------------------------------------------------
    pub population: PopulationSnapshot,

    // -- Zone demand --------------------------------------------------------
    pub demand: DemandSnapshot,

    // -- Power --------------------------------------------------------------
    pub power: PowerSnapshot,

    // -- Evaluation ---------------------------------------------------------
    pub score: u32,
    pub approval: u8,
    pub worst_problem: Option<Problem>,

    // -- Warnings -----------------------------------------------------------
    pub warnings: Vec<CityWarning>,
}

// ---------------------------------------------------------------------------
// Sub-snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PopulationSnapshot {
    pub total: u64,
    pub class: CityClass,
    pub residential: u32,
    pub commercial: u32,
    pub industrial: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DemandSnapshot {
    pub residential: i16,
    pub commercial: i16,
    pub industrial: i16,
    pub needs_stadium: bool,
    pub needs_airport: bool,
    pub needs_seaport: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PowerSnapshot {
    pub capacity: u32,
    pub demand: u32,
    pub powered_zones: u32,
    pub unpowered_zones: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EffectivenessSnapshot {
    pub road: u8,
    pub fire: u8,
    pub police: u8,
}

impl From<Effectiveness> for EffectivenessSnapshot {
    fn from(eff: Effectiveness) -> Self {
        Self {
            road: eff.road,
            fire: eff.fire,
            police: eff.police,
        }
    }
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CityWarning {
    PowerShortage,
    HighCrime,
    HighPollution,
    HighUnemployment,
    EmptyTreasury,
    TrafficCongestion,
}

impl CityObservation {
    pub fn from_city(city: &City) -> Self {
        let totals = &city.census.totals;
        let stats = &city.maps.stats;

        let mut warnings = Vec::new();
        if city.power.is_brownout() || totals.unpowered_zones > 0 {
            warnings.push(CityWarning::PowerShortage);
        }
        if stats.crime_average > HIGH_AVERAGE {
            warnings.push(CityWarning::HighCrime);
        }
        if stats.pollution_average > HIGH_AVERAGE {
            warnings.push(CityWarning::HighPollution);
        }
        if city.evaluation.severity(Problem::Unemployment) > HIGH_UNEMPLOYMENT {
            warnings.push(CityWarning::HighUnemployment);
        }
        if city.budget.treasury == 0 {
            warnings.push(CityWarning::EmptyTreasury);
        }
        if stats.traffic_average > CONGESTED_TRAFFIC {
            warnings.push(CityWarning::TrafficCongestion);
        }

        Self {
            steps: city.clock.steps,
            year: city.calendar.year(),
            month: city.calendar.month(),
            paused: city.clock.speed.divisor().is_none(),
            treasury: city.budget.treasury,
            tax_rate: city.budget.tax_rate,
            last_tax_income: city.budget.last_tax_income,
            effectiveness: city.budget.effectiveness.into(),
            population: PopulationSnapshot {
                total: city.census.city_population,
                class: city.census.city_class,
                residential: totals.residential_pop,
                commercial: totals.commercial_pop,
                industrial: totals.industrial_pop,
            },
            demand: DemandSnapshot {
                residential: city.valves.residential,
                commercial: city.valves.commercial,
                industrial: city.valves.industrial,
                needs_stadium: city.valves.res_capped,
                needs_airport: city.valves.com_capped,
                needs_seaport: city.valves.ind_capped,
            },
            power: PowerSnapshot {
                capacity: city.power.capacity,
                demand: city.power.demand,
                powered_zones: totals.powered_zones,
                unpowered_zones: totals.unpowered_zones,
            },
            score: city.evaluation.score,
            approval: city.evaluation.approval,
            worst_problem: city.evaluation.worst_problem(),
            warnings,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Speed;

    #[test]
    fn observation_default_is_empty() {
        let obs = CityObservation::default();
        assert_eq!(obs.steps, 0);
        assert!(obs.warnings.is_empty());
    }

    #[test]
    fn observation_of_fresh_city() {
        let mut city = City::with_dimensions(20, 20, 1);
        city.set_speed(Speed::Paused);
        let obs = CityObservation::from_city(&city);
        assert_eq!(obs.year, 1900);
        assert!(obs.paused);
        assert_eq!(obs.treasury, city.funds());
        assert_eq!(obs.population.class, CityClass::Village);
        assert!(obs.warnings.is_empty());
    }

    #[test]
    fn observation_flags_trouble() {
        let mut city = City::with_dimensions(20, 20, 1);
        city.charge(i64::MAX);
        city.maps.stats.crime_average = 200;
        city.census.totals.unpowered_zones = 3;
        let obs = CityObservation::from_city(&city);
        assert_eq!(
            obs.warnings,
            vec![
                CityWarning::PowerShortage,
                CityWarning::HighCrime,
                CityWarning::EmptyTreasury
            ]
        );
        let json = obs.to_json().unwrap();
        assert!(json.contains("EmptyTreasury"));
        assert!(json.contains("\"year\":1900"));
    }
}
