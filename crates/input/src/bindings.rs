use crate::state::Key;
use serde::{Deserialize, Serialize};

/// Keys driving the fly camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Key,
    pub back: Key,
    pub left: Key,
    pub right: Key,
    /// Held to multiply movement speed.
    pub boost: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Key::W,
            back: Key::S,
            left: Key::A,
            right: Key::D,
            boost: Key::LeftShift,
        }
    }
}

impl KeyBindings {
    /// Arrow keys for movement, right shift for boost.
    pub fn arrows() -> Self {
        Self {
            forward: Key::Up,
            back: Key::Down,
            left: Key::Left,
            right: Key::Right,
            boost: Key::RightShift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_wasd_and_left_shift() {
        let b = KeyBindings::default();
        assert_eq!(
            (b.forward, b.back, b.left, b.right, b.boost),
            (Key::W, Key::S, Key::A, Key::D, Key::LeftShift)
        );
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let b: KeyBindings = serde_yaml::from_str("boost: Space\n").unwrap();
        assert_eq!(b.boost, Key::Space);
        assert_eq!(b.forward, Key::W);
    }
}
