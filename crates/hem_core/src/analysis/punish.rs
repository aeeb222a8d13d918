//! Punish detection.
//!
//! A punish is a sequence of confirmed hits by one competitor on the other:
//! the opponent's percent went up and the opponent's last-hit-by points at
//! the attacker. The window closes when no confirmed hit lands for more
//! than `punish_reset_frames`, or when either competitor loses a stock. Only
//! the opponent's stock loss makes it a kill.

use tracing::debug;

use super::FrameContext;
use crate::stats::{Competitor, HitWindow, PunishRecord};

/// Whether this frame carries a hit credited to the analysed competitor.
pub fn is_confirmed_hit(ctx: &FrameContext<'_>) -> bool {
    ctx.opponent_damaged() && usize::from(ctx.opp_cur.last_hit_by) == ctx.index
}

pub fn update(ctx: &FrameContext<'_>, me: &mut Competitor) {
    let Some(mut window) = me.flags.punish else {
        if is_confirmed_hit(ctx) && !ctx.lost_stock() && !ctx.opponent_lost_stock() {
            me.flags.punish = Some(HitWindow::open(ctx.frame(), ctx.opp_prev.percent));
        }
        return;
    };

    if ctx.opponent_lost_stock() {
        commit(ctx, me, window, true);
    } else if ctx.lost_stock() {
        commit(ctx, me, window, false);
    } else if is_confirmed_hit(ctx) {
        window.hit();
        me.flags.punish = Some(window);
    } else {
        window.frames_since_hit += ctx.elapsed();
        if window.frames_since_hit > ctx.thresholds.punish_reset_frames {
            commit(ctx, me, window, false);
        } else {
            me.flags.punish = Some(window);
        }
    }
}

/// Close an open window at match end.
pub fn flush(index: usize, frame: u32, opp_percent: f32, me: &mut Competitor) {
    if let Some(window) = me.flags.punish.take() {
        push(index, me, record(window, frame, opp_percent, false));
    }
}

fn commit(ctx: &FrameContext<'_>, me: &mut Competitor, window: HitWindow, is_kill: bool) {
    me.flags.punish = None;
    push(ctx.index, me, record(window, ctx.frame(), ctx.opp_prev.percent, is_kill));
}

fn record(window: HitWindow, frame_end: u32, percent_end: f32, is_kill: bool) -> PunishRecord {
    PunishRecord {
        frame_start: window.start_frame,
        frame_end,
        percent_start: window.start_percent,
        percent_end,
        hit_count: window.hit_count,
        is_kill,
    }
}

fn push(index: usize, me: &mut Competitor, record: PunishRecord) {
    debug!(competitor = index, hits = record.hit_count, kill = record.is_kill, "punish resolved");
    me.stats.punishes.push(record);
}
