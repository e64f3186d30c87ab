use super::{admissible, ZoneContext};

/// Industry does not care where it sits; only the valve matters.
pub(super) fn desirability(ctx: &ZoneContext<'_>, x: usize, y: usize, powered: bool) -> Option<i32> {
    if !admissible(ctx, &ctx.params.industrial, x, y, powered) {
        return None;
    }
    Some(ctx.valves.industrial as i32)
}
