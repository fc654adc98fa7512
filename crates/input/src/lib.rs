//! Polled input: the keyboard/mouse state a camera controller reads once per frame.
//!
//! # Invariants
//! - Mouse deltas are y-up: moving the mouse away from the user is positive.
//! - A [`FrameInput`] is immutable; [`InputState::poll`] produces a fresh one
//!   per frame and resets the accumulated mouse delta.

mod bindings;
mod state;

pub use bindings::KeyBindings;
pub use state::{FrameInput, InputSource, InputState, Key};

pub fn crate_info() -> &'static str {
    "ember-input v0.1.0"
}
