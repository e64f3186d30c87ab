//! Calendar and speed gating.
//!
//! One accepted step runs one phase. Sixteen phases make a cycle, four cycles a
//! month, twelve months a year. Speed only changes how many host calls it takes
//! to accept a step, never the order phases run in.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{CYCLES_PER_MONTH, CYCLES_PER_YEAR, MONTHS_PER_YEAR, PHASE_COUNT, START_YEAR};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub enum Speed {
    Paused,
    Slow,
    #[default]
    Medium,
    Fast,
}

impl Speed {
    /// Host calls per accepted step. `None` means never.
    pub fn divisor(self) -> Option<u64> {
        match self {
            Speed::Paused => None,
            Speed::Slow => Some(5),
            Speed::Medium => Some(3),
            Speed::Fast => Some(1),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Speed::Paused => 0,
            Speed::Slow => 1,
            Speed::Medium => 2,
            Speed::Fast => 3,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Speed::Paused,
            1 => Speed::Slow,
            3 => Speed::Fast,
            _ => Speed::Medium,
        }
    }
}

/// Simulated date. `city_time` counts completed calendar advances (one per cycle).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub city_time: u64,
}

impl Calendar {
    pub fn year(&self) -> u64 {
        START_YEAR + self.city_time / CYCLES_PER_YEAR
    }

    /// Zero-based month.
    pub fn month(&self) -> u64 {
        (self.city_time / CYCLES_PER_MONTH) % MONTHS_PER_YEAR
    }

    /// Advance one cycle. Returns true when a new year starts.
    pub fn advance(&mut self) -> bool {
        self.city_time += 1;
        self.city_time.is_multiple_of(CYCLES_PER_YEAR)
    }
}

/// Step acceptance and phase position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    pub speed: Speed,
    /// Host calls seen while not paused.
    pub calls: u64,
    /// Accepted steps; the phase is `steps % PHASE_COUNT`.
    pub steps: u64,
    /// Completed 16-phase cycles.
    pub cycle: u64,
}

impl SimClock {
    /// Count one host call and report whether it is accepted as a step.
    pub fn accept(&mut self) -> bool {
        let Some(divisor) = self.speed.divisor() else {
            return false;
        };
        self.calls += 1;
        self.calls.is_multiple_of(divisor)
    }

    pub fn phase(&self) -> u8 {
        (self.steps % PHASE_COUNT as u64) as u8
    }

    /// Move past the phase that just ran.
    pub fn finish_phase(&mut self) {
        if self.phase() == PHASE_COUNT - 1 {
            self.cycle += 1;
        }
        self.steps += 1;
    }
}
