//! Integration tests using the `TestCity` harness.
//!
//! These tests spin up a headless Bevy App with `SimulationPlugin` and verify
//! behavior that only shows up when the phases run together.

mod budget_cycle_tests;
mod harness_bootstrap;

use crate::test_harness::TestCity;
use crate::tiles::ZoneKind;

/// A coal plant feeding a residential block near the world center through a
/// power line, with a road leading to an unpowered commercial block.
///
/// ```text
///  x: 39..42   43..58   59..61   62..64   65..67
///     [coal]  ~~~~~~~~  [res]    ====     [com]
/// ```
pub(crate) fn powered_neighborhood() -> TestCity {
    TestCity::new()
        .with_zone(ZoneKind::CoalPlant, 40, 50)
        .with_power_line(43, 50, 58, 50)
        .with_zone(ZoneKind::Residential, RES_CENTER.0, RES_CENTER.1)
        .with_road(62, 50, 64, 50)
        .with_zone(ZoneKind::Commercial, 66, 50)
}

pub(crate) const RES_CENTER: (usize, usize) = (60, 50);
