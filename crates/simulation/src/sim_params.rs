//! Data-driven simulation parameters.
//!
//! Collects the tunables that the zone engine, budget allocator and traffic
//! router read into a single [`SimParams`] value owned by the city. Defaults
//! reproduce the classic balance; tests and scenario loaders may override
//! individual fields. The struct round-trips through the save extension map.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::Saveable;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Difficulty::Easy,
            2 => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

/// Per-category thresholds a zone must stay within to be allowed to grow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ZoneLimits {
    /// Land value below this forces decline.
    pub land_value_floor: u8,
    /// Pollution above this forces decline.
    pub pollution_ceiling: u8,
    /// Crime above this forces decline.
    pub crime_ceiling: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SimParams {
    pub difficulty: Difficulty,
    /// Road/rail upkeep per tile, indexed by difficulty.
    pub road_maintenance: [f32; 3],
    /// Tax collection efficiency, indexed by difficulty.
    pub tax_efficiency: [f32; 3],
    pub starting_funds: [i64; 3],
    /// Yearly funding required per fire station.
    pub fire_station_cost: i64,
    /// Yearly funding required per police station.
    pub police_station_cost: i64,
    pub coal_capacity: u32,
    pub nuclear_capacity: u32,
    /// Coverage a fully funded, powered station stamps into its quarter cell.
    pub station_effect: u16,
    pub traffic_increment: u8,
    pub traffic_cap: u8,
    pub residential: ZoneLimits,
    pub commercial: ZoneLimits,
    pub industrial: ZoneLimits,
    /// Below this road effectiveness (percent) roads start to crumble.
    pub road_decay_threshold: u8,
    /// Chance denominator for a road tile to crumble on a scan visit.
    pub road_decay_chance: u32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            road_maintenance: [0.7, 0.9, 1.2],
            tax_efficiency: [1.4, 1.2, 0.8],
            starting_funds: [20_000, 10_000, 5_000],
            fire_station_cost: 100,
            police_station_cost: 100,
            coal_capacity: 700,
            nuclear_capacity: 2000,
            station_effect: 1000,
            traffic_increment: 50,
            traffic_cap: 240,
            residential: ZoneLimits {
                land_value_floor: 20,
                pollution_ceiling: 120,
                crime_ceiling: 190,
            },
            commercial: ZoneLimits {
                land_value_floor: 10,
                pollution_ceiling: 180,
                crime_ceiling: 210,
            },
            industrial: ZoneLimits {
                land_value_floor: 0,
                pollution_ceiling: 255,
                crime_ceiling: 230,
            },
            road_decay_threshold: 30,
            road_decay_chance: 512,
        }
    }
}

impl SimParams {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn maintenance_multiplier(&self) -> f32 {
        self.road_maintenance[self.difficulty.index()]
    }

    pub fn tax_multiplier(&self) -> f32 {
        self.tax_efficiency[self.difficulty.index()]
    }

    pub fn initial_funds(&self) -> i64 {
        self.starting_funds[self.difficulty.index()]
    }
}

impl Saveable for SimParams {
    const SAVE_KEY: &'static str = "sim_params";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if *self == Self::default() {
            None
        } else {
            Some(bitcode::encode(self))
        }
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}
