//! Per-frame state of both competitors and the match.

use serde::Serialize;

use crate::config::COMPETITOR_COUNT;

/// Raw controller state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ControllerState {
    pub joystick_x: f32,
    pub joystick_y: f32,
    pub cstick_x: f32,
    pub cstick_y: f32,
    pub trigger: f32,
    /// Logical buttons; special inputs such as Z set several bits
    pub buttons: u32,
    /// What the player is physically holding
    pub physical_buttons: u16,
    pub l_trigger: f32,
    pub r_trigger: f32,
}

/// Decoded state of one competitor for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CompetitorSnapshot {
    pub internal_character_id: u8,
    pub animation: u16,
    pub x: f32,
    pub y: f32,
    pub stocks: u8,
    pub percent: f32,
    pub shield_size: f32,
    pub last_move_hit_id: u8,
    pub combo_count: u8,
    /// Slot index (0 or 1, the order of the frame-update record) of the
    /// competitor who last hit this one; not the controller port
    pub last_hit_by: u8,
    pub controller: ControllerState,
}

/// Static per-competitor information from the match-start record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CompetitorInfo {
    pub port: u8,
    pub character_id: u8,
    pub player_type: u8,
    pub color: u8,
    pub starting_stocks: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MatchSnapshot {
    pub competitors: [CompetitorSnapshot; COMPETITOR_COUNT],
    pub stage_id: u16,
    pub frame_counter: u32,
    pub frames_missed: u32,
    pub random_seed: u32,
    /// Set only once the match has ended
    pub win_condition: Option<u8>,
}

impl MatchSnapshot {
    pub fn competitor(&self, index: usize) -> &CompetitorSnapshot {
        &self.competitors[index]
    }
}

/// Index of the other competitor.
#[inline]
pub fn opponent_of(index: usize) -> usize {
    1 - index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_of() {
        assert_eq!(opponent_of(0), 1);
        assert_eq!(opponent_of(1), 0);
    }

    #[test]
    fn test_default_snapshot_has_no_win_condition() {
        let snap = MatchSnapshot::default();
        assert_eq!(snap.win_condition, None);
        assert_eq!(snap.competitor(1).stocks, 0);
    }
}
