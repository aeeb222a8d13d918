//! Duration and edge-triggered counters.
//!
//! Duration counters add the frames elapsed since the last accepted update,
//! so a duplicate frame adds nothing and a gap is credited in full.
//! Edge-triggered counters fire on an animation change into the counted
//! animation.

use super::FrameContext;
use crate::ids::{self, AIR_DODGE, ROLL_BACKWARD, ROLL_FORWARD, SPOT_DODGE};
use crate::input::count_input_actions;
use crate::stats::Competitor;

pub fn update(ctx: &FrameContext<'_>, me: &mut Competitor) {
    let elapsed = ctx.elapsed();
    let cur = ctx.me_cur;
    let prev = ctx.me_prev;
    let stats = &mut me.stats;

    if cur.y > ctx.opp_cur.y {
        stats.frames_above_opponent += elapsed;
    }
    if cur.x.abs() < ctx.opp_cur.x.abs() {
        stats.frames_closest_center += elapsed;
    }
    if ids::is_shielding(cur.animation) {
        stats.frames_in_shield += elapsed;
    }
    if let Some(frames) = stats.internal_character_frames.get_mut(usize::from(cur.internal_character_id)) {
        *frames += elapsed;
    }

    if elapsed > 0 {
        let distance = (cur.x * cur.x + cur.y * cur.y).sqrt();
        stats.distance_samples += elapsed;
        let weight = elapsed as f32 / stats.distance_samples as f32;
        stats.average_distance_from_center += (distance - stats.average_distance_from_center) * weight;
    }

    if cur.percent > prev.percent {
        me.flags.frames_without_damage = 0;
    } else {
        me.flags.frames_without_damage += elapsed;
        stats.most_frames_without_damage = stats.most_frames_without_damage.max(me.flags.frames_without_damage);
    }

    if cur.animation != prev.animation {
        stats.action_count += 1;
        match cur.animation {
            ROLL_FORWARD | ROLL_BACKWARD => stats.roll_count += 1,
            SPOT_DODGE => stats.spot_dodge_count += 1,
            AIR_DODGE => stats.air_dodge_count += 1,
            ids::TECH_MISS_UP | ids::TECH_MISS_DOWN => stats.tech_miss_count += 1,
            ids::TECH_IN_PLACE => stats.tech_in_place_count += 1,
            ids::TECH_ROLL_FORWARD => stats.tech_forward_count += 1,
            ids::TECH_ROLL_BACKWARD => stats.tech_backward_count += 1,
            a if ids::TECH_SURFACE.contains(&a) => stats.tech_surface_count += 1,
            _ => {}
        }
    }

    stats.input_count += count_input_actions(&prev.controller, &cur.controller);
}
