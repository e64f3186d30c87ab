use crate::tiles::ZoneKind;

use super::{admissible, build, ZoneContext};

/// Land value net of pollution is worth this much per point.
const VALUE_WEIGHT: i32 = 32;
const VALUE_CAP: i32 = 6000;
const VALUE_BIAS: i32 = 3000;

pub(super) fn desirability(ctx: &ZoneContext<'_>, x: usize, y: usize, powered: bool) -> Option<i32> {
    if !admissible(ctx, &ctx.params.residential, x, y, powered) {
        return None;
    }
    let land_value = ctx.maps.land_value.at_world(x, y) as i32;
    let pollution = ctx.maps.pollution.at_world(x, y) as i32;
    let local = ((land_value - pollution).max(0) * VALUE_WEIGHT).min(VALUE_CAP) - VALUE_BIAS;
    Some(local + ctx.valves.residential as i32)
}

/// A vacant lot about to grow becomes a hospital or church instead when the
/// city is short of one.
pub(super) fn try_civic_conversion(ctx: &mut ZoneContext<'_>, x: usize, y: usize) -> bool {
    let (cx, cy) = (x as i32, y as i32);
    if ctx.civic.hospitals > 0 {
        if build::convert(ctx.grid, ZoneKind::Hospital, cx, cy) {
            ctx.civic.hospitals -= 1;
            return true;
        }
    } else if ctx.civic.churches > 0 && build::convert(ctx.grid, ZoneKind::Church, cx, cy) {
        ctx.civic.churches -= 1;
        return true;
    }
    false
}
