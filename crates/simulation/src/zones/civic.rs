use crate::tiles::ZoneKind;

use super::{build, ZoneContext};

/// Hospitals and churches are counted; a surplus one reverts to a vacant
/// residential lot.
pub(super) fn process(ctx: &mut ZoneContext<'_>, kind: ZoneKind, x: usize, y: usize) {
    let powered = ctx.grid.at(x, y).is_powered();
    ctx.counts.count_zone(kind, 0, powered);

    let need = match kind {
        ZoneKind::Hospital => &mut ctx.civic.hospitals,
        _ => &mut ctx.civic.churches,
    };
    if *need < 0 && build::convert(ctx.grid, ZoneKind::Residential, x as i32, y as i32) {
        *need += 1;
        let index = ctx.grid.index(x, y);
        ctx.ledger.remove(index);
    }
}
