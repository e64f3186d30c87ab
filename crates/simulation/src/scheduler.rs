//! The 16-phase cycle.
//!
//! | Phase | Work |
//! |-------|------|
//! | 0     | calendar, yearly valve update, power |
//! | 1-8   | one vertical strip of zone visits and road upkeep each (1 also resets accumulators) |
//! | 9     | census totals, history, yearly budget and evaluation |
//! | 10    | traffic decay, headline population |
//! | 11    | power again, collapse and brownout edges, city class |
//! | 12    | land value and pollution scan (every 16th cycle) |
//! | 13    | crime scan (every 4th cycle) |
//! | 14    | population scan and fire coverage (every 16th cycle) |
//! | 15    | fire spread, disasters |

use bevy::log::{debug, info};

use crate::census::{CensusSample, CityClass};
use crate::city::City;
use crate::config::{
    CENSUS_INTERVAL, CRIME_SCAN_INTERVAL, CYCLES_PER_YEAR, DENSITY_SCAN_INTERVAL,
    LONG_CENSUS_INTERVAL, POLLUTION_SCAN_INTERVAL, STRIP_COUNT,
};
use crate::diffusion::{self, crime, land_value, population};
use crate::evaluation::EvaluationInput;
use crate::fire;
use crate::grid::{Tile, TileFlags};
use crate::notifications::SimEvent;
use crate::power;
use crate::tiles;
use crate::traffic;
use crate::zones::{self, CivicNeed, ZoneContext};

pub fn run_phase(city: &mut City, phase: u8) {
    match phase {
        0 => begin_cycle(city),
        1..=8 => {
            if phase == 1 {
                reset_accumulators(city);
            }
            scan_strip(city, (phase - 1) as usize);
        }
        9 => take_census(city),
        10 => {
            city.maps.stats.traffic_average = traffic::decay(&mut city.maps.traffic);
            city.census.city_population = city.census.totals.city_population();
        }
        11 => check_power_and_population(city),
        12 => {
            if city.clock.cycle.is_multiple_of(POLLUTION_SCAN_INTERVAL) {
                land_value::scan(&city.grid, &mut city.maps);
            }
        }
        13 => {
            if city.clock.cycle.is_multiple_of(CRIME_SCAN_INTERVAL) {
                crime::scan(&mut city.maps);
            }
        }
        14 => {
            if city.clock.cycle.is_multiple_of(DENSITY_SCAN_INTERVAL) {
                population::scan(&city.grid, &mut city.maps);
                diffusion::analyze_fire_coverage(&mut city.maps);
            }
        }
        15 => {
            fire::spread_fires(&mut city.grid, &city.maps, &mut city.rng, &mut city.events);
            if let Some(disasters) = city.disasters.as_mut() {
                disasters.dispatch(&mut city.grid, &mut city.rng, &mut city.events);
            }
        }
        _ => {}
    }
}

// =============================================================================
// Phase 0
// =============================================================================

fn begin_cycle(city: &mut City) {
    if city.calendar.advance() {
        city.valves.update(
            &city.census.totals,
            city.budget.tax_rate,
            city.params.difficulty,
        );
        debug!(
            "valves for {}: res {} com {} ind {}",
            city.calendar.year(),
            city.valves.residential,
            city.valves.commercial,
            city.valves.industrial
        );
    }
    city.power = power::propagate(&mut city.grid, &city.params);
}

// =============================================================================
// Phases 1-8
// =============================================================================

fn reset_accumulators(city: &mut City) {
    city.census.current = Default::default();
    city.maps.reset_station_maps();
    city.civic = CivicNeed::from_counts(&city.census.totals);
}

/// Columns covered by `strip`, clipped to the grid.
fn strip_columns(width: usize, strip: usize) -> std::ops::Range<usize> {
    let strip_width = width.div_ceil(STRIP_COUNT);
    let start = (strip * strip_width).min(width);
    start..((strip + 1) * strip_width).min(width)
}

fn scan_strip(city: &mut City, strip: usize) {
    let City {
        grid,
        maps,
        rng,
        params,
        valves,
        budget,
        census,
        ledger,
        router,
        civic,
        events,
        ..
    } = city;
    let effectiveness = budget.effectiveness;
    let mut ctx = ZoneContext {
        grid,
        maps,
        rng,
        params,
        valves,
        effectiveness,
        counts: &mut census.current,
        ledger,
        router,
        civic,
        events,
    };

    for x in strip_columns(ctx.grid.width, strip) {
        for y in 0..ctx.grid.height {
            let tile = ctx.grid.at(x, y);
            if tile.is_zone_center() {
                zones::process_zone(&mut ctx, x, y);
                continue;
            }
            ctx.counts.count_tile(tile.id);
            if tiles::is_road(tile.id) || tiles::is_rail(tile.id) {
                maintain_track(&mut ctx, x, y, tile);
            }
        }
    }
}

/// Re-layer a road to its traffic, and let neglected track crumble.
fn maintain_track(ctx: &mut ZoneContext<'_>, x: usize, y: usize, tile: Tile) {
    let (ix, iy) = (x as i32, y as i32);
    let underfunded = ctx.effectiveness.road < ctx.params.road_decay_threshold;
    if underfunded && !tile.is_conductive() && ctx.rng.one_in(ctx.params.road_decay_chance) {
        let bridge = tiles::is_road(tile.id)
            && matches!(tiles::road_shape(tile.id), tiles::SHAPE_HBRIDGE | tiles::SHAPE_VBRIDGE);
        let ruin = if bridge {
            tiles::RIVER
        } else {
            tiles::RUBBLE + ctx.rng.below((tiles::LAST_RUBBLE - tiles::RUBBLE + 1) as u32) as u16
        };
        ctx.grid.set(ix, iy, Tile::natural(ruin));
        return;
    }

    if !tiles::is_road(tile.id) {
        return;
    }
    let layer = traffic::layer_for_density(ctx.maps.traffic.at_world(x, y));
    if traffic_class(tiles::road_layer(tile.id)) == traffic_class(layer) {
        return;
    }
    let mut flags = tile.flags;
    flags.set(TileFlags::ANIM, layer > 0);
    let id = tiles::road_tile(layer, tiles::road_shape(tile.id));
    ctx.grid.set(ix, iy, Tile::with_flags(id, flags));
}

/// 0 plain, 1 light, 2 heavy.
fn traffic_class(layer: u16) -> u8 {
    match layer {
        0 => 0,
        l if l < tiles::HEAVY_TRAFFIC_LAYER => 1,
        _ => 2,
    }
}

// =============================================================================
// Phase 9
// =============================================================================

fn take_census(city: &mut City) {
    city.census.totals = city.census.current;
    city.ledger.prune(&city.grid);

    let cycle = city.clock.cycle;
    if cycle.is_multiple_of(CENSUS_INTERVAL) {
        let sample = history_sample(city);
        city.census
            .history
            .record(sample, cycle.is_multiple_of(LONG_CENSUS_INTERVAL));
    }

    if cycle > 0 && cycle.is_multiple_of(CYCLES_PER_YEAR) {
        run_year(city);
    }
}

fn history_sample(city: &City) -> CensusSample {
    let clamp = |v: i64| v.clamp(i16::MIN as i64, i16::MAX as i64) as i16;
    let totals = &city.census.totals;
    let stats = &city.maps.stats;
    CensusSample([
        clamp(totals.residential_pop as i64),
        clamp(totals.commercial_pop as i64),
        clamp(totals.industrial_pop as i64),
        clamp(stats.crime_average as i64),
        clamp(stats.pollution_average as i64),
        clamp(city.budget.treasury / 100),
    ])
}

fn run_year(city: &mut City) {
    let totals = city.census.totals;
    if let Some(event) = city.budget.run_year(
        &totals,
        city.maps.stats.land_value_average,
        &city.params,
    ) {
        city.events.push(event);
    }
    let budget = &city.budget;
    info!(
        "year {}: tax income {}, services spent {}, treasury {}, effectiveness road {}% fire {}% police {}%",
        city.calendar.year(),
        budget.last_tax_income,
        budget.last_allocation.spend.total(),
        budget.treasury,
        budget.effectiveness.road,
        budget.effectiveness.fire,
        budget.effectiveness.police
    );

    let input = EvaluationInput {
        counts: &totals,
        stats: &city.maps.stats,
        valves: &city.valves,
        effectiveness: city.budget.effectiveness,
        tax_rate: city.budget.tax_rate,
        city_population: city.census.totals.city_population(),
    };
    city.evaluation.evaluate(&input);
    info!(
        "evaluation: score {} ({:+}), approval {}%, worst problem {}",
        city.evaluation.score,
        city.evaluation.delta,
        city.evaluation.approval,
        city.evaluation.worst_problem().map_or("none", |p| p.label())
    );
}

// =============================================================================
// Phase 11
// =============================================================================

fn check_power_and_population(city: &mut City) {
    city.power = power::propagate(&mut city.grid, &city.params);
    let brownout = city.power.is_brownout();
    if brownout && !city.in_brownout {
        city.events.push(SimEvent::Brownout {
            demand: city.power.demand,
            capacity: city.power.capacity,
        });
    }
    city.in_brownout = brownout;

    let population = city.census.city_population;
    if city.last_population > 0 && population == 0 {
        city.events.push(SimEvent::PopulationCollapse {
            previous: city.last_population,
        });
    }
    city.last_population = population;

    let class = CityClass::from_population(population);
    let previous = city.census.city_class;
    if class != previous {
        city.census.city_class = class;
        if class > previous {
            info!("{} grew into a {}", previous.label(), class.label());
            city.events.push(SimEvent::CityClassChanged {
                from: previous,
                to: class,
            });
        }
    }
}
