//! Recovery detection.
//!
//! A recovery starts when a competitor leaves the stage boundary while not
//! in grounded control. It succeeds once the competitor has been back inside
//! for `recovery_landing_frames` without re-leaving, and fails when the
//! competitor loses a stock first. Frames spent in a damage or capture
//! animation after landing do not count towards confirmation.

use tracing::debug;

use super::FrameContext;
use crate::ids;
use crate::stage::check_off_stage;
use crate::stats::{Competitor, Landing, RecoveryRecord, RecoveryState};

pub fn update(ctx: &FrameContext<'_>, me: &mut Competitor, opp: &mut Competitor) {
    let cur = ctx.me_cur;
    let off_stage = check_off_stage(ctx.stage_id, cur.x, cur.y);

    let RecoveryState::Recovering { start_frame, start_percent, hit_off_stage, landing } = me.flags.recovery else {
        if off_stage && !ctx.lost_stock() && !ids::is_grounded_control(cur.animation) {
            debug!(competitor = ctx.index, frame = ctx.frame(), "recovery started");
            me.flags.recovery = RecoveryState::Recovering {
                start_frame: ctx.frame(),
                start_percent: cur.percent,
                hit_off_stage: ids::is_damaged(cur.animation),
                landing: None,
            };
        }
        return;
    };

    if ctx.lost_stock() {
        let record = RecoveryRecord {
            frame_start: start_frame,
            frame_end: ctx.frame(),
            percent_start: start_percent,
            percent_end: ctx.me_prev.percent,
            is_successful: false,
        };
        commit(ctx, me, opp, record, hit_off_stage);
        return;
    }

    let hit_off_stage = hit_off_stage || (off_stage && ids::is_damaged(cur.animation));

    let landing = match landing {
        _ if off_stage => None,
        None => Some(Landing { frame: ctx.frame(), percent: cur.percent, frames_since_landing: 0 }),
        Some(mut landing) => {
            if !ids::is_damaged(cur.animation) && !ids::is_captured(cur.animation) {
                landing.frames_since_landing += ctx.elapsed();
            }
            if landing.frames_since_landing >= ctx.thresholds.recovery_landing_frames {
                let record = RecoveryRecord {
                    frame_start: start_frame,
                    frame_end: landing.frame,
                    percent_start: start_percent,
                    percent_end: landing.percent,
                    is_successful: true,
                };
                commit(ctx, me, opp, record, hit_off_stage);
                return;
            }
            Some(landing)
        }
    };

    me.flags.recovery = RecoveryState::Recovering { start_frame, start_percent, hit_off_stage, landing };
}

/// Resolve a recovery still waiting for confirmation when the match ends.
/// A competitor already back on stage is credited; one still off stage is
/// discarded.
pub fn flush(index: usize, me: &mut Competitor, opp: &mut Competitor) {
    if let RecoveryState::Recovering { start_frame, start_percent, hit_off_stage, landing: Some(landing) } =
        me.flags.recovery
    {
        let record = RecoveryRecord {
            frame_start: start_frame,
            frame_end: landing.frame,
            percent_start: start_percent,
            percent_end: landing.percent,
            is_successful: true,
        };
        push(index, me, opp, record, hit_off_stage);
    }
    me.flags.recovery = RecoveryState::Neutral;
}

fn commit(ctx: &FrameContext<'_>, me: &mut Competitor, opp: &mut Competitor, record: RecoveryRecord, hit: bool) {
    push(ctx.index, me, opp, record, hit);
    me.flags.recovery = RecoveryState::Neutral;
}

fn push(index: usize, me: &mut Competitor, opp: &mut Competitor, record: RecoveryRecord, hit_off_stage: bool) {
    debug!(
        competitor = index,
        frame_start = record.frame_start,
        frame_end = record.frame_end,
        success = record.is_successful,
        "recovery resolved"
    );
    me.stats.recovery_attempts += 1;
    if record.is_successful {
        me.stats.successful_recoveries += 1;
    }
    if hit_off_stage {
        opp.stats.edgeguard_chances += 1;
        if !record.is_successful {
            opp.stats.edgeguard_conversions += 1;
        }
    }
    me.stats.recoveries.push(record);
}
