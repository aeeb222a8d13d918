//! Combo string detection.
//!
//! A string is a run of damage the analysed competitor deals while the
//! opponent is stuck in a damage or capture animation. Damage taken outside
//! those animations (shield chip, self damage) never counts. The string ends
//! after `combo_string_timeout_frames` without a new hit, or on either
//! competitor's stock loss.

use tracing::debug;

use super::FrameContext;
use crate::ids;
use crate::stats::{ComboStringRecord, Competitor, HitWindow};

pub fn is_string_hit(ctx: &FrameContext<'_>) -> bool {
    let animation = ctx.opp_cur.animation;
    ctx.opponent_damaged() && (ids::is_damaged(animation) || ids::is_captured(animation))
}

pub fn update(ctx: &FrameContext<'_>, me: &mut Competitor, opp: &mut Competitor) {
    let stock_lost = ctx.lost_stock() || ctx.opponent_lost_stock();

    let Some(mut window) = me.flags.combo else {
        if is_string_hit(ctx) && !stock_lost {
            me.flags.combo = Some(HitWindow::open(ctx.frame(), ctx.opp_prev.percent));
        }
        return;
    };

    if stock_lost {
        commit(ctx.index, me, opp, window, ctx.frame(), ctx.opp_prev.percent);
    } else if is_string_hit(ctx) {
        window.hit();
        me.flags.combo = Some(window);
    } else {
        window.frames_since_hit += ctx.elapsed();
        if window.frames_since_hit > ctx.thresholds.combo_string_timeout_frames {
            commit(ctx.index, me, opp, window, ctx.frame(), ctx.opp_prev.percent);
        } else {
            me.flags.combo = Some(window);
        }
    }
}

/// Close an open string at match end.
pub fn flush(index: usize, frame: u32, opp_percent: f32, me: &mut Competitor, opp: &mut Competitor) {
    if let Some(window) = me.flags.combo {
        commit(index, me, opp, window, frame, opp_percent);
    }
}

fn commit(index: usize, me: &mut Competitor, opp: &mut Competitor, window: HitWindow, frame: u32, percent: f32) {
    me.flags.combo = None;
    let record = ComboStringRecord {
        frame_start: window.start_frame,
        frame_end: frame,
        percent_start: window.start_percent,
        percent_end: percent,
        hit_count: window.hit_count,
    };
    debug!(competitor = index, hits = record.hit_count, damage = record.damage(), "string ended");
    me.stats.record_string(&record);
    me.stats.combo_strings.push(record);
    opp.flags.openings_this_stock = opp.flags.openings_this_stock.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{competitor, context};
    use crate::config::ThresholdsConfig;
    use crate::snapshot::CompetitorSnapshot;

    fn hit(percent: f32, stocks: u8) -> CompetitorSnapshot {
        let mut snap = competitor(20.0, 0.0, percent, stocks);
        snap.animation = 0x4B;
        snap
    }

    fn run(
        th: &ThresholdsConfig,
        me: &mut Competitor,
        opp: &mut Competitor,
        frame: u32,
        victim: (CompetitorSnapshot, CompetitorSnapshot),
    ) {
        let attacker = competitor(0.0, 0.0, 0.0, 4);
        let ctx = context(th, frame, 1, 0, (&attacker, &attacker), (&victim.0, &victim.1));
        update(&ctx, me, opp);
    }

    #[test]
    fn test_string_times_out_and_counts_opening() {
        let th = ThresholdsConfig::default();
        let (mut me, mut opp) = (Competitor::default(), Competitor::default());
        let idle = |p| competitor(20.0, 0.0, p, 4);

        run(&th, &mut me, &mut opp, 100, (idle(0.0), hit(8.0, 4)));
        run(&th, &mut me, &mut opp, 110, (hit(8.0, 4), hit(20.0, 4)));
        run(&th, &mut me, &mut opp, 120, (hit(20.0, 4), hit(33.0, 4)));
        for f in 121..=166 {
            run(&th, &mut me, &mut opp, f, (idle(33.0), idle(33.0)));
        }

        let record = me.stats.combo_strings.as_slice()[0];
        assert_eq!(record.frame_start, 100);
        assert_eq!(record.frame_end, 166);
        assert_eq!(record.hit_count, 3);
        assert!((record.damage() - 33.0).abs() < 1e-4);
        assert_eq!(me.stats.number_of_openings, 1);
        assert_eq!(opp.flags.openings_this_stock, 1);
    }

    #[test]
    fn test_damage_outside_hitstun_ignored() {
        let th = ThresholdsConfig::default();
        let (mut me, mut opp) = (Competitor::default(), Competitor::default());
        let mut shielding = competitor(20.0, 0.0, 3.0, 4);
        shielding.animation = 0xB3;
        run(&th, &mut me, &mut opp, 10, (competitor(20.0, 0.0, 0.0, 4), shielding));
        assert!(me.flags.combo.is_none());
    }

    #[test]
    fn test_grab_counts_as_string_hit() {
        let th = ThresholdsConfig::default();
        let (mut me, mut opp) = (Competitor::default(), Competitor::default());
        let mut grabbed = competitor(20.0, 0.0, 3.0, 4);
        grabbed.animation = 0xE0;
        run(&th, &mut me, &mut opp, 10, (competitor(20.0, 0.0, 0.0, 4), grabbed));
        assert_eq!(me.flags.string_count(), 1);
    }

    #[test]
    fn test_stock_loss_ends_string() {
        let th = ThresholdsConfig::default();
        let (mut me, mut opp) = (Competitor::default(), Competitor::default());
        run(&th, &mut me, &mut opp, 10, (competitor(20.0, 0.0, 90.0, 4), hit(110.0, 4)));
        run(&th, &mut me, &mut opp, 30, (hit(110.0, 4), competitor(0.0, 0.0, 0.0, 3)));

        let record = me.stats.combo_strings.as_slice()[0];
        assert_eq!(record.frame_end, 30);
        assert_eq!(record.percent_end, 110.0);
        assert!(me.flags.combo.is_none());
        assert_eq!(opp.flags.openings_this_stock, 1);
    }
}
