//! Yearly municipal budget.
//!
//! Tax income is credited first, then the road, fire and police services are
//! funded from the treasury in strict priority order. The resulting
//! effectiveness percentages feed back into road upkeep and station coverage.

use serde::{Deserialize, Serialize};

use crate::census::CensusCounts;
use crate::notifications::SimEvent;
use crate::sim_params::SimParams;

pub const DEFAULT_TAX_RATE: u8 = 7;
pub const MAX_TAX_RATE: u8 = 20;

/// Requested share of each service's required funding, `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Funding {
    pub road: f32,
    pub fire: f32,
    pub police: f32,
}

impl Default for Funding {
    fn default() -> Self {
        Self::FULL
    }
}

impl Funding {
    pub const FULL: Funding = Funding {
        road: 1.0,
        fire: 1.0,
        police: 1.0,
    };

    pub fn clamped(self) -> Self {
        Self {
            road: self.road.clamp(0.0, 1.0),
            fire: self.fire.clamp(0.0, 1.0),
            police: self.police.clamp(0.0, 1.0),
        }
    }
}

/// Yearly amounts, one per service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAmounts {
    pub road: i64,
    pub fire: i64,
    pub police: i64,
}

impl ServiceAmounts {
    pub fn total(&self) -> i64 {
        self.road + self.fire + self.police
    }
}

/// Percent of required funding actually spent, `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effectiveness {
    pub road: u8,
    pub fire: u8,
    pub police: u8,
}

impl Default for Effectiveness {
    fn default() -> Self {
        Self {
            road: 100,
            fire: 100,
            police: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub spend: ServiceAmounts,
    pub effectiveness: Effectiveness,
    /// Desired spend that could not be covered.
    pub shortfall: i64,
}

pub fn required_funding(counts: &CensusCounts, params: &SimParams) -> ServiceAmounts {
    let track = (counts.road_tiles + counts.rail_tiles) as f32;
    ServiceAmounts {
        road: (track * params.maintenance_multiplier()).round() as i64,
        fire: counts.fire_stations as i64 * params.fire_station_cost,
        police: counts.police_stations as i64 * params.police_station_cost,
    }
}

/// `(total_pop * average_land_value / 120) * tax_rate * efficiency`.
pub fn tax_income(total_pop: u32, land_value_average: u32, tax_rate: u8, params: &SimParams) -> i64 {
    let base = total_pop as f32 * land_value_average as f32 / 120.0;
    (base * tax_rate as f32 * params.tax_multiplier()).round() as i64
}

fn percent_of(spend: i64, required: i64) -> u8 {
    if required <= 0 {
        100
    } else {
        (spend * 100 / required).clamp(0, 100) as u8
    }
}

/// Fund the three services from `available`.
///
/// When everything desired is affordable it is all granted. Otherwise road,
/// fire and police are funded in that order; the first service that cannot be
/// covered gets whatever is left and the rest get nothing.
pub fn allocate(available: i64, required: ServiceAmounts, funding: Funding) -> Allocation {
    let funding = funding.clamped();
    let desired = ServiceAmounts {
        road: (required.road as f32 * funding.road).round() as i64,
        fire: (required.fire as f32 * funding.fire).round() as i64,
        police: (required.police as f32 * funding.police).round() as i64,
    };

    let spend = if available >= desired.total() {
        desired
    } else {
        let mut remaining = available.max(0);
        let mut grant = |want: i64| {
            let given = want.min(remaining);
            remaining -= given;
            given
        };
        ServiceAmounts {
            road: grant(desired.road),
            fire: grant(desired.fire),
            police: grant(desired.police),
        }
    };

    Allocation {
        spend,
        effectiveness: Effectiveness {
            road: percent_of(spend.road, required.road),
            fire: percent_of(spend.fire, required.fire),
            police: percent_of(spend.police, required.police),
        },
        shortfall: desired.total() - spend.total(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Never negative.
    pub treasury: i64,
    pub tax_rate: u8,
    pub funding: Funding,
    /// Request full funding every year and report shortfalls.
    pub auto_budget: bool,
    pub effectiveness: Effectiveness,
    pub last_tax_income: i64,
    pub last_required: ServiceAmounts,
    pub last_allocation: Allocation,
}

impl Budget {
    pub fn new(treasury: i64) -> Self {
        Self {
            treasury: treasury.max(0),
            tax_rate: DEFAULT_TAX_RATE,
            funding: Funding::FULL,
            auto_budget: true,
            effectiveness: Effectiveness::default(),
            last_tax_income: 0,
            last_required: ServiceAmounts::default(),
            last_allocation: Allocation::default(),
        }
    }

    pub fn set_tax_rate(&mut self, rate: u8) {
        self.tax_rate = rate.min(MAX_TAX_RATE);
    }

    /// Run the yearly cycle. Returns an event when automatic budgeting fell short.
    pub fn run_year(
        &mut self,
        counts: &CensusCounts,
        land_value_average: u32,
        params: &SimParams,
    ) -> Option<SimEvent> {
        let income = tax_income(counts.total_pop(), land_value_average, self.tax_rate, params);
        self.treasury = self.treasury.saturating_add(income);

        let required = required_funding(counts, params);
        let funding = if self.auto_budget {
            Funding::FULL
        } else {
            self.funding
        };
        let allocation = allocate(self.treasury, required, funding);
        self.treasury = (self.treasury - allocation.spend.total()).max(0);

        self.last_tax_income = income;
        self.last_required = required;
        self.last_allocation = allocation;
        self.effectiveness = allocation.effectiveness;

        (self.auto_budget && allocation.shortfall > 0).then_some(SimEvent::InsufficientFunds {
            shortfall: allocation.shortfall,
        })
    }

    /// Spend from the treasury. Overdrafts clamp to zero and report depletion.
    pub fn charge(&mut self, cost: i64) -> Option<SimEvent> {
        let after = self.treasury.saturating_sub(cost);
        if after < 0 {
            self.treasury = 0;
            Some(SimEvent::TreasuryDepleted)
        } else {
            self.treasury = after;
            None
        }
    }
}
