use super::{admissible, ZoneContext};

const RATE_WEIGHT: i32 = 16;
const RATE_BIAS: i32 = 2000;

/// Commercial lots score on proximity to the population centroid, via the
/// commercial rate map.
pub(super) fn desirability(ctx: &ZoneContext<'_>, x: usize, y: usize, powered: bool) -> Option<i32> {
    if !admissible(ctx, &ctx.params.commercial, x, y, powered) {
        return None;
    }
    let rate = ctx.maps.commercial_rate.at_world(x, y) as i32;
    Some(rate * RATE_WEIGHT - RATE_BIAS + ctx.valves.commercial as i32)
}
