// ---------------------------------------------------------------------------
// Fixed-layout city snapshot
// ---------------------------------------------------------------------------
//
// Layout (all values big-endian):
//   history   6 series x (120 short + 120 long) i16, newest first
//   misc      MISC_LEN i32 scalars, indexed by the `misc` constants
//   grid      WORLD_W x WORLD_H packed u16 tiles, column-major (x outer, y inner)
//   ext       extension map of Saveable blobs (may be absent)
//
// Everything derived from the grid (power, census, overlay maps) is rebuilt
// on load rather than stored.

use bevy::log::warn;

use simulation::budget::Funding;
use simulation::census::{History, HistorySeries};
use simulation::clock::Speed;
use simulation::config::{HISTORY_LENGTH, PHASE_COUNT, WORLD_H, WORLD_W};
use simulation::grid::{TileGrid, ID_MASK};
use simulation::sim_params::{Difficulty, SimParams};
use simulation::sim_rng::{SimRng, DEFAULT_SEED};
use simulation::tiles;
use simulation::City;

use crate::extensions::ExtensionMap;
use crate::save_error::SaveError;

pub const SERIES: usize = HistorySeries::ALL.len();
pub const HISTORY_BYTES: usize = SERIES * HISTORY_LENGTH * 2 * 2;
pub const MISC_LEN: usize = 120;
pub const MISC_BYTES: usize = MISC_LEN * 4;
pub const GRID_BYTES: usize = WORLD_W * WORLD_H * 2;
/// Smallest valid snapshot: everything but the extension map.
pub const FIXED_BYTES: usize = HISTORY_BYTES + MISC_BYTES + GRID_BYTES;

/// Slots of the misc record. Unlisted slots are written as zero.
pub mod misc {
    pub const CITY_TIME: usize = 0;
    pub const TREASURY_HI: usize = 1;
    pub const TREASURY_LO: usize = 2;
    pub const TAX_RATE: usize = 3;
    pub const DIFFICULTY: usize = 4;
    pub const SPEED: usize = 5;
    pub const RES_VALVE: usize = 6;
    pub const COM_VALVE: usize = 7;
    pub const IND_VALVE: usize = 8;
    /// Funding fractions are stored scaled by [`FUNDING_SCALE`].
    pub const ROAD_FUNDING: usize = 9;
    pub const FIRE_FUNDING: usize = 10;
    pub const POLICE_FUNDING: usize = 11;
    pub const AUTO_BUDGET: usize = 12;
    pub const CITY_SCORE: usize = 13;
    pub const SCORE_DELTA: usize = 14;
    pub const APPROVAL: usize = 15;
    pub const ROAD_EFFECT: usize = 16;
    pub const FIRE_EFFECT: usize = 17;
    pub const POLICE_EFFECT: usize = 18;
    pub const STEPS_HI: usize = 19;
    pub const STEPS_LO: usize = 20;
    pub const LAST_TAX_INCOME: usize = 21;

    pub const FUNDING_SCALE: f32 = 65_536.0;
}

// =============================================================================
// Big-endian reader
// =============================================================================

pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], SaveError> {
        let end = self.pos + n;
        if end > self.bytes.len() {
            return Err(SaveError::Truncated {
                needed: end,
                found: self.bytes.len(),
            });
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn u16(&mut self) -> Result<u16, SaveError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn i16(&mut self) -> Result<i16, SaveError> {
        Ok(self.u16()? as i16)
    }

    pub fn u32(&mut self) -> Result<u32, SaveError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i32(&mut self) -> Result<i32, SaveError> {
        Ok(self.u32()? as i32)
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

// =============================================================================
// Write
// =============================================================================

pub fn write_snapshot(city: &City) -> Result<Vec<u8>, SaveError> {
    let grid = city.grid();
    if grid.width != WORLD_W || grid.height != WORLD_H {
        return Err(SaveError::DimensionMismatch {
            width: grid.width,
            height: grid.height,
        });
    }

    let mut out = Vec::with_capacity(FIXED_BYTES + 256);

    let history = &city.census.history;
    for series in HistorySeries::ALL {
        let i = series.index();
        for buffer in [&history.short[i], &history.long[i]] {
            for value in History::padded(buffer) {
                out.extend_from_slice(&value.to_be_bytes());
            }
        }
    }

    for value in misc_record(city) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            out.extend_from_slice(&grid.at(x, y).to_packed().to_be_bytes());
        }
    }

    let mut extensions = ExtensionMap::default();
    extensions.insert(&city.rng);
    extensions.insert(&city.params);
    extensions.write(&mut out);

    Ok(out)
}

fn misc_record(city: &City) -> [i32; MISC_LEN] {
    let mut m = [0i32; MISC_LEN];
    let budget = &city.budget;
    m[misc::CITY_TIME] = clamp_i32(city.calendar.city_time as i64);
    m[misc::TREASURY_HI] = (budget.treasury >> 32) as i32;
    m[misc::TREASURY_LO] = budget.treasury as u32 as i32;
    m[misc::TAX_RATE] = budget.tax_rate as i32;
    m[misc::DIFFICULTY] = city.params.difficulty.index() as i32;
    m[misc::SPEED] = city.clock.speed.index() as i32;
    m[misc::RES_VALVE] = city.valves.residential as i32;
    m[misc::COM_VALVE] = city.valves.commercial as i32;
    m[misc::IND_VALVE] = city.valves.industrial as i32;
    m[misc::ROAD_FUNDING] = (budget.funding.road * misc::FUNDING_SCALE) as i32;
    m[misc::FIRE_FUNDING] = (budget.funding.fire * misc::FUNDING_SCALE) as i32;
    m[misc::POLICE_FUNDING] = (budget.funding.police * misc::FUNDING_SCALE) as i32;
    m[misc::AUTO_BUDGET] = budget.auto_budget as i32;
    m[misc::CITY_SCORE] = city.evaluation.score as i32;
    m[misc::SCORE_DELTA] = city.evaluation.delta;
    m[misc::APPROVAL] = city.evaluation.approval as i32;
    m[misc::ROAD_EFFECT] = budget.effectiveness.road as i32;
    m[misc::FIRE_EFFECT] = budget.effectiveness.fire as i32;
    m[misc::POLICE_EFFECT] = budget.effectiveness.police as i32;
    m[misc::STEPS_HI] = (city.clock.steps >> 32) as i32;
    m[misc::STEPS_LO] = city.clock.steps as u32 as i32;
    m[misc::LAST_TAX_INCOME] = clamp_i32(budget.last_tax_income);
    m
}

// =============================================================================
// Read
// =============================================================================

pub fn read_misc(reader: &mut Reader<'_>) -> Result<[i32; MISC_LEN], SaveError> {
    let mut m = [0i32; MISC_LEN];
    for slot in m.iter_mut() {
        *slot = reader.i32()?;
    }
    Ok(m)
}

pub fn read_snapshot(bytes: &[u8]) -> Result<City, SaveError> {
    let mut reader = Reader::new(bytes);

    let mut history = History::default();
    for series in HistorySeries::ALL {
        let i = series.index();
        for long in [false, true] {
            let mut values = [0i16; HISTORY_LENGTH];
            for slot in values.iter_mut() {
                *slot = reader.i16()?;
            }
            let buffer = History::from_padded(&values);
            if long {
                history.long[i] = buffer;
            } else {
                history.short[i] = buffer;
            }
        }
    }

    let m = read_misc(&mut reader)?;

    let mut packed = vec![0u16; WORLD_W * WORLD_H];
    let mut garbage = 0usize;
    for x in 0..WORLD_W {
        for y in 0..WORLD_H {
            let raw = reader.u16()?;
            if !tiles::is_valid(raw & ID_MASK) {
                garbage += 1;
            }
            packed[y * WORLD_W + x] = raw;
        }
    }
    if garbage > 0 {
        warn!("Replaced {garbage} invalid tile ids with dirt");
    }

    let extensions = ExtensionMap::read(&mut reader)?;

    let mut params = extensions.restore::<SimParams>().unwrap_or_default();
    params.difficulty = Difficulty::from_index(m[misc::DIFFICULTY].clamp(0, 2) as u8);

    let mut city = City::with_params(WORLD_W, WORLD_H, DEFAULT_SEED, params);
    if let Some(rng) = extensions.restore::<SimRng>() {
        city.rng = rng;
    }
    city.grid = TileGrid::from_packed(WORLD_W, WORLD_H, &packed);

    city.calendar.city_time = m[misc::CITY_TIME].max(0) as u64;
    let steps = ((m[misc::STEPS_HI] as u32 as u64) << 32) | m[misc::STEPS_LO] as u32 as u64;
    city.clock.steps = steps;
    city.clock.cycle = steps / PHASE_COUNT as u64;
    city.set_speed(Speed::from_index(m[misc::SPEED].clamp(0, 3) as u8));

    let treasury = ((m[misc::TREASURY_HI] as i64) << 32) | m[misc::TREASURY_LO] as u32 as i64;
    city.budget.treasury = treasury.max(0);
    city.set_tax_rate(m[misc::TAX_RATE].clamp(0, u8::MAX as i32) as u8);
    city.set_funding(Funding {
        road: m[misc::ROAD_FUNDING] as f32 / misc::FUNDING_SCALE,
        fire: m[misc::FIRE_FUNDING] as f32 / misc::FUNDING_SCALE,
        police: m[misc::POLICE_FUNDING] as f32 / misc::FUNDING_SCALE,
    });
    city.set_auto_budget(m[misc::AUTO_BUDGET] != 0);
    let percent = |v: i32| v.clamp(0, 100) as u8;
    city.budget.effectiveness.road = percent(m[misc::ROAD_EFFECT]);
    city.budget.effectiveness.fire = percent(m[misc::FIRE_EFFECT]);
    city.budget.effectiveness.police = percent(m[misc::POLICE_EFFECT]);
    city.budget.last_tax_income = m[misc::LAST_TAX_INCOME] as i64;

    let valve = |v: i32| v.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    city.valves.residential = valve(m[misc::RES_VALVE]);
    city.valves.commercial = valve(m[misc::COM_VALVE]);
    city.valves.industrial = valve(m[misc::IND_VALVE]);

    city.evaluation.score = m[misc::CITY_SCORE].clamp(0, 1000) as u32;
    city.evaluation.delta = m[misc::SCORE_DELTA];
    city.evaluation.approval = percent(m[misc::APPROVAL]);

    city.refresh_derived();
    city.evaluation.last_population = city.census.city_population;
    city.census.history = history;

    Ok(city)
}
