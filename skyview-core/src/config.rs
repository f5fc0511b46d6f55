/// Viewer configuration
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```toml
/// skybox_scale = 40.0
///
/// [camera]
/// rotation_step_degrees = 0.5
///
/// [options]
/// reflection_blending = true
/// ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Initial camera pose and how fast the controls move it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub view_dir: [f32; 3],
    pub up: [f32; 3],
    /// Degrees per frame for orbit, pitch and mouse drag steps
    pub rotation_step_degrees: f32,
    /// Units per frame for forward/backward movement
    pub move_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 10.0],
            view_dir: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
            rotation_step_degrees: 1.0,
            move_speed: 0.12,
        }
    }
}

/// Perspective parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [1.0, 1.0, -1.0],
            ambient: [0.5, 0.5, 0.8],
            diffuse: [0.75, 0.75, 0.75],
            specular: [0.2, 0.2, 0.2],
        }
    }
}

/// User toggles, re-read once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Allow environment reflection mapping on meshes that ask for it
    pub reflection_mapping: bool,
    /// Blend reflections with the underlying shading instead of replacing it
    pub reflection_blending: bool,
    /// Slowly spin the whole world
    pub spin: bool,
    /// Mesh scale in percent
    pub scale_percent: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            reflection_mapping: true,
            reflection_blending: false,
            spin: false,
            scale_percent: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub view: ViewConfig,
    pub light: LightConfig,
    pub options: ViewerOptions,
    /// Uniform scale of the unit skybox cube
    pub skybox_scale: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            view: ViewConfig::default(),
            light: LightConfig::default(),
            options: ViewerOptions::default(),
            skybox_scale: 40.0,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a `.toml` file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
