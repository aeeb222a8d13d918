//! Stock finalization.
//!
//! Stock slot `i` describes the `i`-th stock played, so the slot of a stock
//! that just ended is `starting_stocks - remaining - 1`. A drop of several
//! stocks across a frame gap finalizes every skipped slot. Each slot is
//! written once.

use tracing::{debug, warn};

use super::FrameContext;
use crate::config::STOCK_COUNT;
use crate::snapshot::{CompetitorInfo, CompetitorSnapshot};
use crate::stats::{Competitor, StockRecord};

pub fn update(ctx: &FrameContext<'_>, info: &CompetitorInfo, me: &mut Competitor) {
    if !ctx.lost_stock() {
        return;
    }

    let prev = ctx.me_prev;
    let newest = ctx.me_cur.stocks.saturating_add(1);
    for remaining in (newest..=prev.stocks).rev() {
        let Some(slot) = info.starting_stocks.checked_sub(remaining).map(usize::from) else {
            warn!(competitor = ctx.index, remaining, "stock count above starting stocks");
            continue;
        };
        // only the stock that was actually in play carries its openings
        let openings = if remaining == prev.stocks { me.flags.openings_this_stock } else { 0 };
        let record = StockRecord {
            frame_start: if remaining == prev.stocks { me.flags.stock_start_frame } else { ctx.frame() },
            frame_end: ctx.frame(),
            percent: prev.percent,
            last_hit_by: prev.last_hit_by,
            last_animation: prev.animation,
            killed_in_openings: openings,
            is_stock_used: true,
            is_stock_lost: true,
        };
        write(ctx.index, me, slot, record);
    }

    me.flags.stock_start_frame = ctx.frame();
    me.flags.openings_this_stock = 0;
    me.flags.frames_without_damage = 0;
}

/// Record the stock still in play when the match ends.
pub fn finalize_live_stock(index: usize, frame: u32, info: &CompetitorInfo, cur: &CompetitorSnapshot, me: &mut Competitor) {
    if cur.stocks == 0 {
        return;
    }
    let Some(slot) = info.starting_stocks.checked_sub(cur.stocks).map(usize::from) else {
        return;
    };
    let record = StockRecord {
        frame_start: me.flags.stock_start_frame,
        frame_end: frame,
        percent: cur.percent,
        last_hit_by: cur.last_hit_by,
        last_animation: cur.animation,
        killed_in_openings: me.flags.openings_this_stock,
        is_stock_used: true,
        is_stock_lost: false,
    };
    write(index, me, slot, record);
}

fn write(index: usize, me: &mut Competitor, slot: usize, record: StockRecord) {
    if slot >= STOCK_COUNT {
        warn!(competitor = index, slot, "stock slot out of range");
        return;
    }
    if me.stats.stocks[slot].is_stock_used {
        return;
    }
    debug!(competitor = index, slot, lost = record.is_stock_lost, frame = record.frame_end, "stock finalized");
    me.stats.stocks[slot] = record;
}
