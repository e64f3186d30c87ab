//! Yearly city evaluation: problem severities, score and approval.

use serde::{Deserialize, Serialize};

use crate::budget::Effectiveness;
use crate::census::CensusCounts;
use crate::density::MapStats;
use crate::valves::DemandValves;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Problem {
    Crime,
    Pollution,
    Housing,
    Taxes,
    Traffic,
    Unemployment,
    Fire,
}

impl Problem {
    pub const ALL: [Problem; 7] = [
        Problem::Crime,
        Problem::Pollution,
        Problem::Housing,
        Problem::Taxes,
        Problem::Traffic,
        Problem::Unemployment,
        Problem::Fire,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Problem::Crime => "crime",
            Problem::Pollution => "pollution",
            Problem::Housing => "housing costs",
            Problem::Taxes => "taxes",
            Problem::Traffic => "traffic",
            Problem::Unemployment => "unemployment",
            Problem::Fire => "fires",
        }
    }
}

/// Snapshot of everything the evaluation looks at.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub counts: &'a CensusCounts,
    pub stats: &'a MapStats,
    pub valves: &'a DemandValves,
    pub effectiveness: Effectiveness,
    pub tax_rate: u8,
    pub city_population: u64,
}

const MAX_SCORE: i64 = 1000;
const CAPPED_PENALTY: f64 = 0.85;
const DEPRESSED_VALVE: i16 = -1000;

/// Severity of each problem, `0..=255`, in [`Problem::ALL`] order.
pub fn problem_severities(input: &EvaluationInput<'_>) -> [u8; 7] {
    let clamp = |v: i64| v.clamp(0, 255) as u8;
    let stats = input.stats;
    [
        clamp(stats.crime_average as i64),
        clamp(stats.pollution_average as i64),
        clamp(stats.land_value_average as i64 * 7 / 10),
        clamp(input.tax_rate as i64 * 10),
        clamp(stats.traffic_average as i64),
        unemployment(input.counts),
        clamp(input.counts.fires as i64 * 5),
    ]
}

/// Residents per job, turned into a severity: one resident per job is zero.
fn unemployment(counts: &CensusCounts) -> u8 {
    let jobs = (counts.commercial_pop + counts.industrial_pop) as f64 * 8.0;
    if jobs == 0.0 {
        return 0;
    }
    let ratio = counts.residential_pop as f64 / jobs;
    ((ratio - 1.0) * 255.0).clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Smoothed city score, `0..=1000`.
    pub score: u32,
    /// Change since the previous evaluation.
    pub delta: i32,
    /// Share of residents happy with the mayor, `0..=100`.
    pub approval: u8,
    pub problems: [u8; 7],
    /// Population at the previous evaluation, for the growth factor.
    pub last_population: u64,
}

impl Default for Evaluation {
    fn default() -> Self {
        Self {
            score: 500,
            delta: 0,
            approval: 50,
            problems: [0; 7],
            last_population: 0,
        }
    }
}

impl Evaluation {
    pub fn severity(&self, problem: Problem) -> u8 {
        self.problems[problem as usize]
    }

    /// Most severe non-zero problem.
    pub fn worst_problem(&self) -> Option<Problem> {
        Problem::ALL
            .into_iter()
            .filter(|p| self.severity(*p) > 0)
            .max_by_key(|p| (self.severity(*p), std::cmp::Reverse(*p as usize)))
    }

    pub fn evaluate(&mut self, input: &EvaluationInput<'_>) {
        self.problems = problem_severities(input);
        let target = target_score(input, &self.problems, self.last_population);
        let previous = self.score as i64;
        let score = (previous + target) / 2;
        self.delta = (score - previous) as i32;
        self.score = score as u32;
        self.approval = (score / 10) as u8;
        self.last_population = input.city_population;
    }
}

/// Unsmoothed score for this year.
fn target_score(input: &EvaluationInput<'_>, problems: &[u8; 7], last_population: u64) -> i64 {
    let total: i64 = problems.iter().map(|p| *p as i64).sum();
    let mut z = ((256 - (total / 3).min(256)) * 4).clamp(0, MAX_SCORE) as f64;

    let valves = input.valves;
    for capped in [valves.res_capped, valves.com_capped, valves.ind_capped] {
        if capped {
            z *= CAPPED_PENALTY;
        }
    }

    let eff = input.effectiveness;
    z -= (100 - eff.road.min(100) as i64) as f64 * 32.0 / 100.0;
    z *= 0.9 + eff.police.min(100) as f64 / 1000.0;
    z *= 0.9 + eff.fire.min(100) as f64 / 1000.0;

    for valve in [valves.residential, valves.commercial, valves.industrial] {
        if valve < DEPRESSED_VALVE {
            z *= CAPPED_PENALTY;
        }
    }

    if last_population > 0 {
        let growth = input.city_population as f64 - last_population as f64;
        z *= 1.0 + growth / last_population as f64;
    }

    z -= input.counts.fires as f64;
    z -= input.tax_rate as f64;

    let zones = input.counts.powered_zones + input.counts.unpowered_zones;
    if zones > 0 {
        z *= input.counts.powered_zones as f64 / zones as f64;
    }

    (z.round() as i64).clamp(0, MAX_SCORE)
}
