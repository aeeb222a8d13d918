//! Animation, stage and character identifiers reported by the game.
//!
//! Ranges are inclusive on both ends.

use std::ops::RangeInclusive;

pub const DAMAGE: RangeInclusive<u16> = 0x4B..=0x5B;
pub const CAPTURE: RangeInclusive<u16> = 0xDF..=0xE8;
pub const GUARD: RangeInclusive<u16> = 0xB2..=0xB6;
pub const GROUNDED_CONTROL: RangeInclusive<u16> = 0x0E..=0x18;

pub const ROLL_FORWARD: u16 = 0xE9;
pub const ROLL_BACKWARD: u16 = 0xEA;
pub const SPOT_DODGE: u16 = 0xEB;
pub const AIR_DODGE: u16 = 0xEC;
pub const ACTION_WAIT: u16 = 0x0E;
pub const ACTION_KNEE_BEND: u16 = 0x18;
pub const GUARD_ON: u16 = 0xB2;

pub const TECH_MISS_UP: u16 = 0xB7;
pub const TECH_MISS_DOWN: u16 = 0xBF;
pub const TECH_IN_PLACE: u16 = 0xC7;
pub const TECH_ROLL_FORWARD: u16 = 0xC8;
pub const TECH_ROLL_BACKWARD: u16 = 0xC9;
/// Wall tech, wall-jump tech and ceiling tech.
pub const TECH_SURFACE: RangeInclusive<u16> = 0xCA..=0xCC;

pub const INTERNAL_ZELDA: u8 = 0x13;
pub const INTERNAL_SHEIK: u8 = 0x07;
pub const EXTERNAL_ZELDA: u8 = 0x12;
pub const EXTERNAL_SHEIK: u8 = 0x13;

/// Number of internal character ids tracked for usage statistics.
pub const INTERNAL_CHARACTER_COUNT: usize = 33;

#[inline]
pub fn is_damaged(animation: u16) -> bool {
    DAMAGE.contains(&animation)
}

#[inline]
pub fn is_captured(animation: u16) -> bool {
    CAPTURE.contains(&animation)
}

#[inline]
pub fn is_shielding(animation: u16) -> bool {
    GUARD.contains(&animation)
}

#[inline]
pub fn is_grounded_control(animation: u16) -> bool {
    GROUNDED_CONTROL.contains(&animation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_edges() {
        assert!(is_damaged(0x4B));
        assert!(is_damaged(0x5B));
        assert!(!is_damaged(0x5C));
        assert!(is_shielding(GUARD_ON));
        assert!(is_grounded_control(ACTION_WAIT));
        assert!(is_grounded_control(ACTION_KNEE_BEND));
        assert!(!is_grounded_control(AIR_DODGE));
    }
}
