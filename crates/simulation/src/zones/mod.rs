//! Zone growth and decline.
//!
//! Every zone center is visited once per cycle, during the strip scan that
//! covers its column. A visit tallies the zone into the census, sends one
//! trip through the traffic router, scores the zone's desirability and then
//! grows or shrinks it by one stage. Growth points and idle visits live in the
//! [`ZoneLedger`], keyed by the center's grid index.

pub mod build;
mod civic;
mod commercial;
mod industrial;
mod residential;
mod special;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::budget::Effectiveness;
use crate::census::CensusCounts;
use crate::density::DensityMaps;
use crate::grid::TileGrid;
use crate::notifications::SimEvent;
use crate::sim_params::{SimParams, ZoneLimits};
use crate::sim_rng::SimRng;
use crate::tiles::{self, ZoneKind};
use crate::traffic::TrafficRouter;
use crate::valves::DemandValves;

/// Idle visits a vacant, worthless zone survives before it may crumble.
const IDLE_VISITS_BEFORE_DECAY: u8 = 4;
/// Chance denominator for a vacant zone to crumble once idle long enough.
const DECAY_CHANCE: u32 = 4;
/// Chance denominator for re-stamping the whole footprint on a growth step.
const PLOP_CHANCE: u32 = 4;

/// Growth points needed to leave `stage`.
pub fn growth_threshold(stage: u8) -> u32 {
    let next = stage as u32 + 1;
    8 * next * next
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub growth: u32,
    pub idle: u8,
}

/// Per-zone growth bookkeeping. Rebuilt from scratch after a load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneLedger {
    records: BTreeMap<usize, ZoneRecord>,
}

impl ZoneLedger {
    pub fn get(&self, index: usize) -> Option<&ZoneRecord> {
        self.records.get(&index)
    }

    pub fn entry(&mut self, index: usize) -> &mut ZoneRecord {
        self.records.entry(index).or_default()
    }

    pub fn remove(&mut self, index: usize) {
        self.records.remove(&index);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop records whose index no longer holds a zone center.
    pub fn prune(&mut self, grid: &TileGrid) {
        self.records
            .retain(|&index, _| grid.tiles.get(index).is_some_and(|t| t.is_zone_center()));
    }
}

/// Outstanding demand for civic buildings. Positive means more are wanted,
/// negative means there are too many.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CivicNeed {
    pub hospitals: i32,
    pub churches: i32,
}

/// Residents served by one hospital or one church.
const RESIDENTS_PER_CIVIC: u32 = 256;

impl CivicNeed {
    pub fn from_counts(counts: &CensusCounts) -> Self {
        let wanted = (counts.residential_pop / RESIDENTS_PER_CIVIC) as i32;
        Self {
            hospitals: wanted - counts.hospitals as i32,
            churches: wanted - counts.churches as i32,
        }
    }
}

/// Everything a zone visit may read or write, borrowed from the city.
pub struct ZoneContext<'a> {
    pub grid: &'a mut TileGrid,
    pub maps: &'a mut DensityMaps,
    pub rng: &'a mut SimRng,
    pub params: &'a SimParams,
    pub valves: &'a DemandValves,
    pub effectiveness: Effectiveness,
    pub counts: &'a mut CensusCounts,
    pub ledger: &'a mut ZoneLedger,
    pub router: &'a mut TrafficRouter,
    pub civic: &'a mut CivicNeed,
    pub events: &'a mut Vec<SimEvent>,
}

/// Visit the zone centered on `(x, y)`. Tiles that are not zone centers are
/// ignored.
pub fn process_zone(ctx: &mut ZoneContext<'_>, x: usize, y: usize) {
    if x >= ctx.grid.width || y >= ctx.grid.height {
        return;
    }
    let tile = ctx.grid.at(x, y);
    if !tile.is_zone_center() {
        return;
    }
    let Some(kind) = tiles::zone_kind(tile.id) else {
        return;
    };
    match kind {
        ZoneKind::Residential | ZoneKind::Commercial | ZoneKind::Industrial => {
            process_growable(ctx, kind, x, y)
        }
        ZoneKind::Hospital | ZoneKind::Church => civic::process(ctx, kind, x, y),
        _ => special::process(ctx, kind, x, y),
    }
}

fn process_growable(ctx: &mut ZoneContext<'_>, kind: ZoneKind, x: usize, y: usize) {
    let tile = ctx.grid.at(x, y);
    let stage = tiles::stage_of(tile.id);
    let powered = tile.is_powered();
    ctx.counts.count_zone(kind, stage, powered);

    let contribution = if powered {
        tiles::stage_population(stage).max(1)
    } else {
        0
    };
    if contribution > 0 {
        send_trip(ctx, kind, x, y);
    }

    let score = match kind {
        ZoneKind::Residential => residential::desirability(ctx, x, y, powered),
        ZoneKind::Commercial => commercial::desirability(ctx, x, y, powered),
        _ => industrial::desirability(ctx, x, y, powered),
    };
    match score {
        Some(score) if score > 0 => grow(ctx, kind, x, y, stage, contribution),
        Some(0) => {}
        _ => decline(ctx, kind, x, y, stage),
    }
}

fn send_trip(ctx: &mut ZoneContext<'_>, kind: ZoneKind, x: usize, y: usize) {
    let outcome = ctx.router.route(
        ctx.grid,
        &mut ctx.maps.traffic,
        ctx.rng,
        ctx.params,
        kind,
        x as i32,
        y as i32,
    );
    if outcome.is_success() {
        ctx.counts.trips_routed += 1;
        for &(px, py) in &ctx.router.peaks {
            ctx.events.push(SimEvent::TrafficPeak { x: px, y: py });
        }
    } else {
        ctx.counts.trips_failed += 1;
    }
}

/// Shared rejection rules: no power, cheap land, or too much pollution or crime.
fn admissible(ctx: &ZoneContext<'_>, limits: &ZoneLimits, x: usize, y: usize, powered: bool) -> bool {
    powered
        && ctx.maps.land_value.at_world(x, y) >= limits.land_value_floor
        && ctx.maps.pollution.at_world(x, y) <= limits.pollution_ceiling
        && ctx.maps.crime.at_world(x, y) <= limits.crime_ceiling
}

fn grow(ctx: &mut ZoneContext<'_>, kind: ZoneKind, x: usize, y: usize, stage: u8, contribution: u32) {
    let index = ctx.grid.index(x, y);
    let record = ctx.ledger.entry(index);
    record.idle = 0;
    if stage >= kind.max_stage() {
        return;
    }
    record.growth += contribution;
    if record.growth < growth_threshold(stage) {
        return;
    }
    record.growth = 0;

    if kind == ZoneKind::Residential && stage == 0 && residential::try_civic_conversion(ctx, x, y) {
        ctx.ledger.remove(index);
        return;
    }
    restage(ctx, kind, x, y, stage, stage + 1, true);
}

fn decline(ctx: &mut ZoneContext<'_>, kind: ZoneKind, x: usize, y: usize, stage: u8) {
    let index = ctx.grid.index(x, y);
    if stage > 0 {
        let record = ctx.ledger.entry(index);
        record.growth = 0;
        record.idle = 0;
        restage(ctx, kind, x, y, stage, stage - 1, false);
        return;
    }

    let floor = limits_for(ctx.params, kind).land_value_floor;
    if ctx.maps.land_value.at_world(x, y) >= floor {
        return;
    }
    let record = ctx.ledger.entry(index);
    record.idle = record.idle.saturating_add(1);
    if record.idle >= IDLE_VISITS_BEFORE_DECAY && ctx.rng.one_in(DECAY_CHANCE) {
        build::to_rubble(ctx.grid, ctx.rng, kind, x as i32, y as i32);
        ctx.ledger.remove(index);
    }
}

/// Move a zone between stages. A change of population band, or a random draw
/// when `may_plop` is set, re-stamps the whole footprint; otherwise only the
/// center tile changes.
fn restage(ctx: &mut ZoneContext<'_>, kind: ZoneKind, x: usize, y: usize, from: u8, to: u8, may_plop: bool) {
    let band_changed = tiles::population_band(tiles::stage_population(from))
        != tiles::population_band(tiles::stage_population(to));
    let (cx, cy) = (x as i32, y as i32);
    let plopped = (band_changed || (may_plop && ctx.rng.one_in(PLOP_CHANCE)))
        && build::plop(ctx.grid, ctx.rng, kind, cx, cy, to);
    if !plopped {
        build::set_center_stage(ctx.grid, kind, cx, cy, to);
    }
}

fn limits_for(params: &SimParams, kind: ZoneKind) -> &ZoneLimits {
    match kind {
        ZoneKind::Residential => &params.residential,
        ZoneKind::Commercial => &params.commercial,
        _ => &params.industrial,
    }
}
