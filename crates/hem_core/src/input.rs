//! Controller input classification.

use serde::Serialize;

use crate::snapshot::ControllerState;

/// Stick deflection needed on an axis to leave the deadzone.
pub const STICK_THRESHOLD: f32 = 0.2875;

/// Analog trigger depression that counts as a press.
pub const TRIGGER_THRESHOLD: f32 = 0.3;

/// Physical buttons that count towards input actions.
pub const PHYSICAL_BUTTON_MASK: u16 = 0x0FFF;

/// One of eight 45° stick sectors, or the deadzone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
pub enum JoystickRegion {
    NE,
    SE,
    SW,
    NW,
    N,
    E,
    S,
    W,
    DeadZone,
}

impl JoystickRegion {
    /// Classify a stick position. Diagonals win over cardinals, cardinals
    /// over the deadzone.
    pub fn classify(x: f32, y: f32) -> Self {
        let right = x >= STICK_THRESHOLD;
        let left = x <= -STICK_THRESHOLD;
        let up = y >= STICK_THRESHOLD;
        let down = y <= -STICK_THRESHOLD;

        if right && up {
            JoystickRegion::NE
        } else if right && down {
            JoystickRegion::SE
        } else if left && down {
            JoystickRegion::SW
        } else if left && up {
            JoystickRegion::NW
        } else if up {
            JoystickRegion::N
        } else if right {
            JoystickRegion::E
        } else if down {
            JoystickRegion::S
        } else if left {
            JoystickRegion::W
        } else {
            JoystickRegion::DeadZone
        }
    }

    pub fn is_deadzone(self) -> bool {
        self == JoystickRegion::DeadZone
    }
}

/// Number of inputs a competitor made between two frames: newly pressed
/// buttons, stick moves into a new non-deadzone region, and analog trigger
/// presses.
pub fn count_input_actions(prev: &ControllerState, cur: &ControllerState) -> u32 {
    let pressed = !prev.physical_buttons & cur.physical_buttons & PHYSICAL_BUTTON_MASK;
    let mut actions = pressed.count_ones();

    let prev_main = JoystickRegion::classify(prev.joystick_x, prev.joystick_y);
    let cur_main = JoystickRegion::classify(cur.joystick_x, cur.joystick_y);
    if prev_main != cur_main && !cur_main.is_deadzone() {
        actions += 1;
    }

    let prev_c = JoystickRegion::classify(prev.cstick_x, prev.cstick_y);
    let cur_c = JoystickRegion::classify(cur.cstick_x, cur.cstick_y);
    if prev_c != cur_c && !cur_c.is_deadzone() {
        actions += 1;
    }

    if prev.l_trigger < TRIGGER_THRESHOLD && cur.l_trigger >= TRIGGER_THRESHOLD {
        actions += 1;
    }
    if prev.r_trigger < TRIGGER_THRESHOLD && cur.r_trigger >= TRIGGER_THRESHOLD {
        actions += 1;
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_diagonals_take_precedence_at_threshold() {
        let t = STICK_THRESHOLD;
        assert_eq!(JoystickRegion::classify(t, t), JoystickRegion::NE);
        assert_eq!(JoystickRegion::classify(t, -t), JoystickRegion::SE);
        assert_eq!(JoystickRegion::classify(-t, -t), JoystickRegion::SW);
        assert_eq!(JoystickRegion::classify(-t, t), JoystickRegion::NW);
    }

    #[test]
    fn test_cardinals_and_deadzone() {
        assert_eq!(JoystickRegion::classify(0.0, 1.0), JoystickRegion::N);
        assert_eq!(JoystickRegion::classify(1.0, 0.2), JoystickRegion::E);
        assert_eq!(JoystickRegion::classify(-0.1, -0.9), JoystickRegion::S);
        assert_eq!(JoystickRegion::classify(-0.5, 0.28), JoystickRegion::W);
        assert_eq!(JoystickRegion::classify(0.28, -0.28), JoystickRegion::DeadZone);
        assert_eq!(JoystickRegion::classify(0.0, 0.0), JoystickRegion::DeadZone);
    }

    #[test]
    fn test_every_region_reachable() {
        let samples = [
            (1.0, 1.0),
            (1.0, -1.0),
            (-1.0, -1.0),
            (-1.0, 1.0),
            (0.0, 1.0),
            (1.0, 0.0),
            (0.0, -1.0),
            (-1.0, 0.0),
            (0.0, 0.0),
        ];
        for region in JoystickRegion::iter() {
            assert!(
                samples.iter().any(|&(x, y)| JoystickRegion::classify(x, y) == region),
                "{:?} unreachable",
                region
            );
        }
    }

    #[test]
    fn test_input_actions_counts_presses_and_regions() {
        let prev = ControllerState::default();
        let cur = ControllerState {
            joystick_x: 1.0,
            physical_buttons: 0b0000_0000_0101,
            l_trigger: 0.5,
            ..ControllerState::default()
        };
        // two buttons, main stick into E, L trigger
        assert_eq!(count_input_actions(&prev, &cur), 4);
        // holding everything counts nothing
        assert_eq!(count_input_actions(&cur, &cur), 0);
    }

    #[test]
    fn test_input_actions_ignores_return_to_deadzone() {
        let prev = ControllerState { cstick_y: -1.0, ..ControllerState::default() };
        let cur = ControllerState::default();
        assert_eq!(count_input_actions(&prev, &cur), 0);
    }

    #[test]
    fn test_input_actions_masks_upper_bits() {
        let prev = ControllerState::default();
        let cur = ControllerState { physical_buttons: 0xF000, ..ControllerState::default() };
        assert_eq!(count_input_actions(&prev, &cur), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn matches(region: JoystickRegion, x: f32, y: f32) -> bool {
            let t = STICK_THRESHOLD;
            let (r, l, u, d) = (x >= t, x <= -t, y >= t, y <= -t);
            match region {
                JoystickRegion::NE => r && u,
                JoystickRegion::SE => r && d,
                JoystickRegion::SW => l && d,
                JoystickRegion::NW => l && u,
                JoystickRegion::N => u && !r && !l,
                JoystickRegion::E => r && !u && !d,
                JoystickRegion::S => d && !r && !l,
                JoystickRegion::W => l && !u && !d,
                JoystickRegion::DeadZone => !r && !l && !u && !d,
            }
        }

        proptest! {
            /// Property: exactly one region describes any stick position
            #[test]
            fn prop_classification_total_and_exclusive(x in -1.0f32..=1.0f32, y in -1.0f32..=1.0f32) {
                let region = JoystickRegion::classify(x, y);
                prop_assert!(matches(region, x, y));
                let hits = JoystickRegion::iter().filter(|r| matches(*r, x, y)).count();
                prop_assert_eq!(hits, 1);
            }
        }
    }
}
