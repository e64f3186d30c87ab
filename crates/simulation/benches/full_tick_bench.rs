//! Criterion benchmark: one host call and one full cycle at varying build-out.
//!
//! Each scenario lays an 8x8 road lattice over the top `rows` block rows,
//! zones two 3x3 lots per block, and feeds them from coal plants along the
//! left edge through a power line down the middle of every block row.
//!
//! Run with: cargo bench -p tilecity-sim --bench full_tick_bench --features bench

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use simulation::config::{PHASE_COUNT, WORLD_H, WORLD_W};
use simulation::test_harness::TestCity;
use simulation::tiles::ZoneKind;

const BLOCK: usize = 8;
/// Columns left of the lattice, reserved for plants.
const PLANT_STRIP: usize = 6;

fn build_city(rows: usize) -> TestCity {
    let mut city = TestCity::new();
    let right = WORLD_W - 1;
    let bottom = (rows * BLOCK).min(WORLD_H - 1);

    for row in (0..=bottom).step_by(BLOCK) {
        city = city.with_road(PLANT_STRIP, row, right, row);
    }
    for col in (PLANT_STRIP..=right).step_by(BLOCK) {
        city = city.with_road(col, 0, col, bottom);
    }

    for block in 0..rows {
        let top = block * BLOCK;
        if top + BLOCK > WORLD_H {
            break;
        }
        city = city
            .with_zone(ZoneKind::CoalPlant, 2, top + 3)
            .with_power_line(5, top + 4, right, top + 4);
        for col in (PLANT_STRIP..right.saturating_sub(BLOCK)).step_by(BLOCK) {
            let kind = match (block + col / BLOCK) % 3 {
                0 => ZoneKind::Residential,
                1 => ZoneKind::Commercial,
                _ => ZoneKind::Industrial,
            };
            city = city
                .with_zone(kind, col + 2, top + 2)
                .with_zone(ZoneKind::Residential, col + 6, top + 6);
        }
    }

    // Let growth settle so the scans see a populated map.
    city.tick_cycles(20);
    city
}

// ---------------------------------------------------------------------------
// Benchmark: single host call and full cycle
// ---------------------------------------------------------------------------

fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tick");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for &rows in &[0usize, 3, 6, 12] {
        let mut city = build_city(rows);

        group.bench_with_input(
            BenchmarkId::new("fixed_update", format!("{rows}_block_rows")),
            &rows,
            |b, _| {
                b.iter(|| city.tick(1));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("cycle", format!("{rows}_block_rows")),
            &rows,
            |b, _| {
                b.iter(|| city.tick(PHASE_COUNT as u32));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_full_tick);
criterion_main!(benches);
