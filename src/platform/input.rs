//! Boolean key-state map
//!
//! The host feeds key codes in as they go up and down; the game only reads
//! the current state (and edge-triggered presses for shortcuts).

use std::collections::HashSet;

use crate::sim::TickInput;

/// Physical keys the game cares about, named by their DOM `code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyC,
    KeyP,
    Space,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    Delete,
    Backspace,
    Escape,
}

impl Key {
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "KeyW" => Key::KeyW,
            "KeyA" => Key::KeyA,
            "KeyS" => Key::KeyS,
            "KeyD" => Key::KeyD,
            "KeyC" => Key::KeyC,
            "KeyP" => Key::KeyP,
            "Space" => Key::Space,
            "ShiftLeft" => Key::ShiftLeft,
            "ShiftRight" => Key::ShiftRight,
            "ControlLeft" => Key::ControlLeft,
            "ControlRight" => Key::ControlRight,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" => Key::Escape,
            _ => return None,
        })
    }

    /// Keys whose browser default (scrolling) must be suppressed
    pub fn is_game_key(self) -> bool {
        matches!(
            self,
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown | Key::Space
        )
    }
}

/// Modifier snapshot passed along with pointer events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
}

#[derive(Debug, Clone, Default)]
pub struct KeyState {
    down: HashSet<Key>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key down; returns true on the transition from up
    pub fn press(&mut self, key: Key) -> bool {
        self.down.insert(key)
    }

    pub fn release(&mut self, key: Key) {
        self.down.remove(&key);
    }

    /// Forget every held key (focus loss, pause)
    pub fn clear(&mut self) {
        self.down.clear();
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    fn any(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_down(*k))
    }

    pub fn shift(&self) -> bool {
        self.any(&[Key::ShiftLeft, Key::ShiftRight])
    }

    pub fn control(&self) -> bool {
        self.any(&[Key::ControlLeft, Key::ControlRight])
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            shift: self.shift(),
            control: self.control(),
        }
    }

    /// Player controls for the next tick: arrows or WASD, space fires,
    /// shift launches a missile
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.any(&[Key::ArrowLeft, Key::KeyA]),
            right: self.any(&[Key::ArrowRight, Key::KeyD]),
            up: self.any(&[Key::ArrowUp, Key::KeyW]),
            down: self.any(&[Key::ArrowDown, Key::KeyS]),
            fire: self.is_down(Key::Space),
            missile: self.shift(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_edge_triggered() {
        let mut keys = KeyState::new();
        assert!(keys.press(Key::KeyC));
        assert!(!keys.press(Key::KeyC));
        keys.release(Key::KeyC);
        assert!(keys.press(Key::KeyC));
    }

    #[test]
    fn test_modifiers_not_swapped() {
        let mut keys = KeyState::new();
        keys.press(Key::ShiftRight);
        assert_eq!(
            keys.modifiers(),
            Modifiers {
                shift: true,
                control: false
            }
        );
        assert!(keys.tick_input().missile);
    }

    #[test]
    fn test_wasd_and_arrows() {
        let mut keys = KeyState::new();
        keys.press(Key::KeyA);
        keys.press(Key::ArrowUp);
        keys.press(Key::Space);
        let input = keys.tick_input();
        assert!(input.left && input.up && input.fire);
        assert!(!input.right && !input.down && !input.missile);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Key::from_code("Delete"), Some(Key::Delete));
        assert_eq!(Key::from_code("KeyZ"), None);
        assert!(Key::Space.is_game_key());
        assert!(!Key::KeyC.is_game_key());
    }
}
