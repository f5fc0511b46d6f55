/// Skyview Core Library - Mesh ingestion, camera and render state
///
/// This library provides the platform-independent core of the skybox viewer:
/// OBJ parsing, normal estimation, the orbiting camera, held-input tracking,
/// the modelview matrix stack and the per-frame draw contract consumed by
/// the terminal and web front ends.

pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod lexer;
pub mod loader;
pub mod math;
pub mod normals;
pub mod obj;
pub mod projection;
pub mod render;
pub mod scene;
pub mod textures;
pub mod transform;

// Re-export commonly used types
pub use camera::CameraState;
pub use config::{ViewerConfig, ViewerOptions};
pub use error::{ConfigError, LoadError, ParseError, ParseErrorKind};
pub use geometry::{Mesh, SkyboxFace, SkyboxGeometry, Triangle, Vertex};
pub use input::{Control, Controls, DragStep, InputState};
pub use loader::{load_mesh, load_skybox, FsSource, SourceFetch};
pub use obj::{parse_obj, ObjData};
pub use projection::Projection;
pub use render::{DrawCall, DrawTarget, RenderContext, RenderTarget, ShaderUniforms};
pub use scene::SceneState;
pub use textures::{SkyboxTextures, TextureSource, SKYBOX_IMAGE_NAMES};
pub use transform::{MatrixStack, ObjectTransform, RotationState};
