use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Logical keys the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Up,
    Down,
    Left,
    Right,
    Space,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    Escape,
}

/// Source of raw per-frame input samples.
pub trait InputSource {
    /// Mouse movement since the previous poll, y-up.
    fn mouse_delta(&self) -> Vec2;
    /// Whether `key` is currently held.
    fn is_key_down(&self, key: Key) -> bool;
}

/// Input sampled for a single frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub mouse_delta: Vec2,
    keys_down: HashSet<Key>,
}

impl FrameInput {
    /// No mouse movement, no keys held.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_mouse_delta(mut self, dx: f32, dy: f32) -> Self {
        self.mouse_delta = Vec2::new(dx, dy);
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.keys_down.insert(key);
        self
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.keys_down.extend(keys);
        self
    }

    /// Keys held this frame.
    pub fn keys_down(&self) -> impl Iterator<Item = Key> + '_ {
        self.keys_down.iter().copied()
    }
}

impl InputSource for FrameInput {
    fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

/// Accumulates platform events between frames.
///
/// Feed key and motion events as they arrive, then call [`poll`](Self::poll)
/// once per frame.
#[derive(Debug)]
pub struct InputState {
    keys_held: HashSet<Key>,
    pending_delta: Vec2,
    focused: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            keys_held: HashSet::new(),
            pending_delta: Vec2::ZERO,
            focused: true,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }
    }

    /// Add mouse motion. `dy` must already be y-up.
    pub fn handle_mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.focused {
            self.pending_delta += Vec2::new(dx, dy);
        }
    }

    /// Focus changes. Losing focus clears held keys so nothing sticks.
    pub fn handle_focus(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            if !self.keys_held.is_empty() {
                tracing::debug!("focus lost, releasing {} held keys", self.keys_held.len());
            }
            self.keys_held.clear();
            self.pending_delta = Vec2::ZERO;
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    /// Snapshot the current state and reset the accumulated mouse delta.
    pub fn poll(&mut self) -> FrameInput {
        FrameInput {
            mouse_delta: std::mem::take(&mut self.pending_delta),
            keys_down: self.keys_held.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_frame_has_nothing() {
        let frame = FrameInput::idle();
        assert_eq!(frame.mouse_delta(), Vec2::ZERO);
        assert!(!frame.is_key_down(Key::W));
        assert_eq!(frame.keys_down().count(), 0);
    }

    #[test]
    fn builder_sets_keys_and_delta() {
        let frame = FrameInput::idle()
            .with_mouse_delta(3.0, -1.0)
            .with_keys([Key::W, Key::LeftShift]);
        assert_eq!(frame.mouse_delta(), Vec2::new(3.0, -1.0));
        assert!(frame.is_key_down(Key::W));
        assert!(frame.is_key_down(Key::LeftShift));
        assert!(!frame.is_key_down(Key::S));
    }

    #[test]
    fn poll_accumulates_and_resets_delta() {
        let mut state = InputState::new();
        state.handle_mouse_motion(1.0, 2.0);
        state.handle_mouse_motion(0.5, -1.0);
        let frame = state.poll();
        assert_eq!(frame.mouse_delta(), Vec2::new(1.5, 1.0));
        assert_eq!(state.poll().mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn held_keys_survive_polls_until_released() {
        let mut state = InputState::new();
        state.handle_key(Key::A, true);
        assert!(state.poll().is_key_down(Key::A));
        assert!(state.poll().is_key_down(Key::A));
        state.handle_key(Key::A, false);
        assert!(!state.poll().is_key_down(Key::A));
    }

    #[test]
    fn focus_loss_clears_keys_and_ignores_motion() {
        let mut state = InputState::new();
        state.handle_key(Key::D, true);
        state.handle_mouse_motion(4.0, 4.0);
        state.handle_focus(false);
        assert!(!state.is_held(Key::D));
        state.handle_mouse_motion(1.0, 1.0);
        assert_eq!(state.poll().mouse_delta(), Vec2::ZERO);

        state.handle_focus(true);
        state.handle_mouse_motion(1.0, 0.0);
        assert_eq!(state.poll().mouse_delta(), Vec2::new(1.0, 0.0));
    }
}
