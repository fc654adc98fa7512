//! Engine configuration loaded from YAML.
//!
//! Every field has a default, so a partial file (or none at all) is valid.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shader base path; `<shader>.vert` and `<shader>.frag` are loaded.
    /// `None` selects the built-in shader.
    pub shader: Option<PathBuf>,
    pub camera: CameraConfig,
    pub window: WindowConfig,
}

/// Camera defaults used by the applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second before the boost multiplier.
    pub move_speed: f32,
    /// Degrees of rotation per unit of mouse delta.
    pub mouse_sensitivity: f32,
    pub start_position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 0.01,
            far: 1000.0,
            move_speed: 2.0,
            mouse_sensitivity: 0.15,
            start_position: Vec3::new(0.0, 0.0, -4.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "ember".into(),
            width: 1280,
            height: 720,
        }
    }
}

impl EngineConfig {
    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_str(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Write the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = serde_yaml::to_string(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(config.shader.is_none());
        assert_eq!(config.camera.fov_degrees, 70.0);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: EngineConfig = serde_yaml::from_str(
            "shader: shaders/basic\ncamera:\n  fov_degrees: 90.0\n",
        )
        .unwrap();
        assert_eq!(config.shader, Some(PathBuf::from("shaders/basic")));
        assert_eq!(config.camera.fov_degrees, 90.0);
        assert_eq!(config.camera.far, 1000.0);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut config = EngineConfig::default();
        config.window.title = "test".into();
        config.camera.start_position = Vec3::new(1.0, 2.0, 3.0);
        config.save(tmp.path()).unwrap();

        let loaded = EngineConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_or_default_without_path() {
        assert_eq!(
            EngineConfig::load_or_default(None).unwrap(),
            EngineConfig::default()
        );
    }
}
