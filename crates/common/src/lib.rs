//! Shared types for the ember engine.
//!
//! # Conventions
//! - Left-handed axes: forward is local +Z, right is local +X, up is local +Y.
//! - Angles are radians unless a field name says otherwise.

pub mod config;
mod types;

pub use config::{CameraConfig, ConfigError, EngineConfig, WindowConfig};
pub use types::Transform;

pub fn crate_info() -> &'static str {
    "ember-common v0.1.0"
}
