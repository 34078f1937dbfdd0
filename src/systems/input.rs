//! Keyboard polling.
//!
//! [`poll_input`] reads the keyboard from raylib once per window frame and
//! turns it into [`GameEvent`]s for the logic layer.

use raylib::ffi::KeyboardKey;
use smallvec::SmallVec;

use crate::events::gameevent::GameEvent;

/// Radians of aim change per frame while an aim key is held.
pub const AIM_STEP: f64 = 0.02;
/// Power change per frame while a power key is held.
pub const POWER_STEP: f64 = 0.05;

/// Key bindings.
#[derive(Debug, Clone, Copy)]
pub struct KeyBindings {
    pub fire: KeyboardKey,
    pub aim_left: KeyboardKey,
    pub aim_right: KeyboardKey,
    pub power_up: KeyboardKey,
    pub power_down: KeyboardKey,
    pub next_tank: KeyboardKey,
    pub quit: KeyboardKey,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            fire: KeyboardKey::KEY_SPACE,
            aim_left: KeyboardKey::KEY_LEFT,
            aim_right: KeyboardKey::KEY_RIGHT,
            power_up: KeyboardKey::KEY_UP,
            power_down: KeyboardKey::KEY_DOWN,
            next_tank: KeyboardKey::KEY_TAB,
            quit: KeyboardKey::KEY_ESCAPE,
        }
    }
}

/// Which keys are down or were just pressed this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    pub fire_pressed: bool,
    pub aim_left_down: bool,
    pub aim_right_down: bool,
    pub power_up_down: bool,
    pub power_down_down: bool,
    pub next_tank_pressed: bool,
    pub quit_pressed: bool,
}

impl KeySnapshot {
    /// Read the current keyboard state from raylib.
    pub fn read(rl: &raylib::RaylibHandle, keys: &KeyBindings) -> Self {
        Self {
            fire_pressed: rl.is_key_pressed(keys.fire),
            aim_left_down: rl.is_key_down(keys.aim_left),
            aim_right_down: rl.is_key_down(keys.aim_right),
            power_up_down: rl.is_key_down(keys.power_up),
            power_down_down: rl.is_key_down(keys.power_down),
            next_tank_pressed: rl.is_key_pressed(keys.next_tank),
            quit_pressed: rl.is_key_pressed(keys.quit),
        }
    }

    /// Events implied by this keyboard state.
    pub fn events(&self) -> SmallVec<[GameEvent; 4]> {
        let mut events = SmallVec::new();
        if self.quit_pressed {
            events.push(GameEvent::Quit);
            return events;
        }
        // Angles grow counter-clockwise, so "left" raises the angle.
        match (self.aim_left_down, self.aim_right_down) {
            (true, false) => events.push(GameEvent::Aim(AIM_STEP)),
            (false, true) => events.push(GameEvent::Aim(-AIM_STEP)),
            _ => {}
        }
        match (self.power_up_down, self.power_down_down) {
            (true, false) => events.push(GameEvent::Power(POWER_STEP)),
            (false, true) => events.push(GameEvent::Power(-POWER_STEP)),
            _ => {}
        }
        if self.next_tank_pressed {
            events.push(GameEvent::NextTank);
        }
        if self.fire_pressed {
            events.push(GameEvent::Fire);
        }
        events
    }
}

/// Poll raylib for keyboard input and translate it to game events.
pub fn poll_input(rl: &raylib::RaylibHandle, keys: &KeyBindings) -> SmallVec<[GameEvent; 4]> {
    KeySnapshot::read(rl, keys).events()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_no_events() {
        assert!(KeySnapshot::default().events().is_empty());
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let keys = KeySnapshot {
            aim_left_down: true,
            aim_right_down: true,
            power_up_down: true,
            ..Default::default()
        };
        assert_eq!(keys.events().as_slice(), &[GameEvent::Power(POWER_STEP)]);
    }

    #[test]
    fn test_fire_comes_after_aim() {
        let keys = KeySnapshot {
            fire_pressed: true,
            aim_right_down: true,
            ..Default::default()
        };
        assert_eq!(
            keys.events().as_slice(),
            &[GameEvent::Aim(-AIM_STEP), GameEvent::Fire]
        );
    }

    #[test]
    fn test_quit_wins() {
        let keys = KeySnapshot {
            quit_pressed: true,
            fire_pressed: true,
            ..Default::default()
        };
        assert_eq!(keys.events().as_slice(), &[GameEvent::Quit]);
    }
}
