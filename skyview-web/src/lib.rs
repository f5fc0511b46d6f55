/// Skyview Web - WASM facade for a WebGL host
///
/// The host page owns the WebGL context, the shaders and the image elements.
/// It hands mesh sources and DOM events to a [`WebViewer`], calls `tick` once
/// per animation frame and then replays the recorded draw calls, reading
/// their matrices and flags through the accessors below.

use log::{info, warn};
use skyview_core::geometry::{Mesh, SkyboxFace, SkyboxGeometry};
use skyview_core::render::{DrawCall, DrawTarget};
use skyview_core::textures::PLACEHOLDER_RGBA;
use skyview_core::{
    load_mesh, load_skybox, InputState, RenderContext, SceneState, SkyboxTextures, SourceFetch,
    ViewerConfig, ViewerOptions, SKYBOX_IMAGE_NAMES,
};
use std::io;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::{KeyboardEvent, MouseEvent};

/// `draw_target` value of the mesh draw; skybox faces use their index 0..5
pub const MESH_TARGET: u32 = 6;

pub const FLAG_SKYBOX: u32 = 1;
pub const FLAG_REFLECTION_MAPPING: u32 = 2;
pub const FLAG_REFLECTION_BLENDING: u32 = 4;

/// Sources the host already fetched, looked up by name
struct InlineSource<'a> {
    files: [(&'a str, &'a str); 2],
}

impl SourceFetch for InlineSource<'_> {
    fn fetch(&self, name: &str) -> io::Result<String> {
        self.files
            .iter()
            .find(|(file, _)| *file == name)
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn face_at(index: usize) -> Option<SkyboxFace> {
    SkyboxFace::ALL.get(index).copied()
}

#[wasm_bindgen]
pub struct WebViewer {
    mesh: Mesh,
    skybox: SkyboxGeometry,
    /// The host holds the actual textures; only their load state lives here
    textures: SkyboxTextures<()>,
    scene: SceneState,
    input: InputState,
    options: ViewerOptions,
    context: RenderContext,
    viewport: (u32, u32),
    frame: Vec<DrawCall>,
}

#[wasm_bindgen]
impl WebViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(
        mesh_name: &str,
        mesh_text: &str,
        skybox_name: &str,
        skybox_text: &str,
        width: u32,
        height: u32,
    ) -> Result<WebViewer, JsValue> {
        let source = InlineSource {
            files: [(mesh_name, mesh_text), (skybox_name, skybox_text)],
        };
        let mesh = load_mesh(&source, mesh_name).map_err(to_js)?;
        let skybox = load_skybox(&source, skybox_name).map_err(to_js)?;
        let config = ViewerConfig::default();
        info!("web viewer ready for {}x{}", width, height);

        Ok(WebViewer {
            mesh,
            skybox,
            textures: SkyboxTextures::new(SKYBOX_IMAGE_NAMES.len()),
            scene: SceneState::new(&config),
            input: InputState::new(),
            options: config.options,
            context: RenderContext::new(&config, width, height),
            viewport: (width, height),
            frame: Vec::new(),
        })
    }

    /// Replace the configuration from TOML text, resetting the camera.
    pub fn configure(&mut self, toml: &str) -> Result<(), JsValue> {
        let config = ViewerConfig::from_toml_str(toml).map_err(to_js)?;
        let (width, height) = self.viewport;
        self.scene = SceneState::new(&config);
        self.options = config.options;
        self.context = RenderContext::new(&config, width, height);
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.context.set_viewport(width, height);
    }

    // Input

    pub fn key_down(&mut self, event: &KeyboardEvent) {
        self.key_down_code(event.key_code());
    }

    pub fn key_up(&mut self, event: &KeyboardEvent) {
        self.key_up_code(event.key_code());
    }

    pub fn key_down_code(&mut self, code: u32) {
        self.input.key_down(code);
    }

    pub fn key_up_code(&mut self, code: u32) {
        self.input.key_up(code);
    }

    pub fn mouse_down(&mut self, event: &MouseEvent) {
        self.input.mouse_down();
        self.mouse_move(event);
    }

    pub fn mouse_up(&mut self) {
        self.input.mouse_up();
    }

    pub fn mouse_move(&mut self, event: &MouseEvent) {
        self.pointer_move(event.client_x() as f32, event.client_y() as f32);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some(step) = self.input.mouse_move(x, y) {
            self.scene.drag_mesh(step);
        }
    }

    pub fn set_options(
        &mut self,
        reflection_mapping: bool,
        reflection_blending: bool,
        spin: bool,
        scale_percent: f32,
    ) {
        self.options = ViewerOptions {
            reflection_mapping,
            reflection_blending,
            spin,
            scale_percent,
        };
    }

    // Skybox images

    pub fn image_name(index: usize) -> Option<String> {
        SKYBOX_IMAGE_NAMES.get(index).map(|name| name.to_string())
    }

    pub fn placeholder_rgba() -> Vec<u8> {
        PLACEHOLDER_RGBA.to_vec()
    }

    pub fn image_loaded(&mut self, index: usize) {
        self.textures.complete(index, ());
    }

    pub fn image_failed(&mut self, index: usize, reason: &str) {
        self.textures.fail(index, reason);
    }

    pub fn is_ready(&self) -> bool {
        self.textures.is_ready()
    }

    // Frame

    /// Advance the scene by `dt_seconds` and record this frame's draw calls.
    /// Returns how many were recorded.
    pub fn tick(&mut self, dt_seconds: f32) -> usize {
        let dt = Duration::from_secs_f32(dt_seconds.max(0.0));
        self.scene.advance(&self.input, self.options, dt);
        self.frame.clear();
        self.context
            .render_frame(&self.scene, self.textures.is_ready(), &mut self.frame)
    }

    pub fn yaw(&self) -> f32 {
        self.scene.camera.yaw
    }

    pub fn draw_target(&self, index: usize) -> Option<u32> {
        self.frame.get(index).map(|call| match call.target {
            DrawTarget::Skybox(face) => face.index() as u32,
            DrawTarget::Mesh => MESH_TARGET,
        })
    }

    pub fn draw_flags(&self, index: usize) -> u32 {
        let Some(call) = self.frame.get(index) else {
            warn!("no draw call {} this frame", index);
            return 0;
        };
        let uniforms = &call.uniforms;
        let mut flags = 0;
        if uniforms.skybox {
            flags |= FLAG_SKYBOX;
        }
        if uniforms.reflection_mapping {
            flags |= FLAG_REFLECTION_MAPPING;
        }
        if uniforms.reflection_blending {
            flags |= FLAG_REFLECTION_BLENDING;
        }
        flags
    }

    /// Column-major 4x4
    pub fn model_view(&self, index: usize) -> Vec<f32> {
        self.uniform(index, |call| call.uniforms.model_view.as_slice().to_vec())
    }

    /// Column-major 4x4
    pub fn projection(&self, index: usize) -> Vec<f32> {
        self.uniform(index, |call| call.uniforms.projection.as_slice().to_vec())
    }

    /// Column-major 3x3
    pub fn normal_matrix(&self, index: usize) -> Vec<f32> {
        self.uniform(index, |call| call.uniforms.normal.as_slice().to_vec())
    }

    /// Column-major 3x3
    pub fn rot_y(&self, index: usize) -> Vec<f32> {
        self.uniform(index, |call| call.uniforms.rot_y.as_slice().to_vec())
    }

    /// Position, ambient, diffuse, specular: 12 floats
    pub fn light(&self, index: usize) -> Vec<f32> {
        self.uniform(index, |call| {
            let light = &call.uniforms.light;
            [light.position, light.ambient, light.diffuse, light.specular]
                .iter()
                .flat_map(|v| v.iter().copied())
                .collect()
        })
    }

    // Geometry buffers

    pub fn mesh_positions(&self) -> Vec<f32> {
        self.mesh.positions().to_vec()
    }

    pub fn mesh_indices(&self) -> Vec<u32> {
        self.mesh.indices().to_vec()
    }

    pub fn mesh_normals(&self) -> Vec<f32> {
        self.mesh.normals().to_vec()
    }

    pub fn skybox_positions(&self, face: usize) -> Vec<f32> {
        face_at(face)
            .map(|face| self.skybox.face(face).positions.data.clone())
            .unwrap_or_default()
    }

    pub fn skybox_indices(&self, face: usize) -> Vec<u32> {
        face_at(face)
            .map(|face| self.skybox.face(face).indices.data.clone())
            .unwrap_or_default()
    }

    pub fn skybox_tex_coords(&self, face: usize) -> Vec<f32> {
        face_at(face)
            .map(|face| self.skybox.face(face).tex_coords.data.clone())
            .unwrap_or_default()
    }
}

impl WebViewer {
    fn uniform<F>(&self, index: usize, read: F) -> Vec<f32>
    where
        F: Fn(&DrawCall) -> Vec<f32>,
    {
        self.frame.get(index).map(read).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKYBOX: &str = include_str!("../../assets/skybox.obj");
    const TRIANGLE: &str = "v 0 0 0\nv 0 1 0\nv 1 0 0\nf 1 2 3\n";

    fn viewer() -> WebViewer {
        WebViewer::new("tri.obj", TRIANGLE, "skybox.obj", SKYBOX, 640, 480)
            .unwrap()
    }

    #[test]
    fn test_waits_for_images() {
        let mut viewer = viewer();
        assert_eq!(viewer.tick(0.016), 0);

        for face in 0..5 {
            viewer.image_loaded(face);
        }
        viewer.image_failed(5, "404");
        assert!(viewer.is_ready());
        assert_eq!(viewer.tick(0.016), 7);

        assert_eq!(viewer.draw_target(0), Some(0));
        assert_eq!(viewer.draw_target(6), Some(MESH_TARGET));
        assert_eq!(viewer.draw_target(7), None);
        assert_eq!(viewer.draw_flags(0), FLAG_SKYBOX);
        assert_eq!(viewer.draw_flags(6), FLAG_REFLECTION_MAPPING);
        assert_eq!(viewer.model_view(6).len(), 16);
        assert_eq!(viewer.normal_matrix(6).len(), 9);
        assert_eq!(viewer.light(6)[..3], [1.0, 1.0, -1.0]);
        assert!(viewer.model_view(9).is_empty());
    }

    #[test]
    fn test_held_keys_and_options() {
        let mut viewer = viewer();
        viewer.key_down_code(39);
        viewer.tick(0.016);
        viewer.tick(0.016);
        viewer.key_up_code(39);
        viewer.tick(0.016);
        assert_eq!(viewer.yaw(), 2.0);

        for face in 0..6 {
            viewer.image_loaded(face);
        }
        viewer.set_options(false, true, false, 50.0);
        viewer.tick(0.016);
        assert_eq!(viewer.draw_flags(6), FLAG_REFLECTION_BLENDING);
    }

    #[test]
    fn test_buffers() {
        let viewer = viewer();
        assert_eq!(viewer.mesh_positions().len(), 12);
        assert_eq!(viewer.mesh_indices(), vec![0, 1, 2]);
        assert_eq!(viewer.mesh_normals()[..3], [0.0, 0.0, 1.0]);
        assert_eq!(viewer.skybox_positions(0).len(), 16);
        assert_eq!(viewer.skybox_indices(5), vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(viewer.skybox_tex_coords(2).len(), 8);
        assert!(viewer.skybox_indices(6).is_empty());
        assert_eq!(WebViewer::image_name(4).as_deref(), Some("pos-z.png"));
        assert_eq!(WebViewer::placeholder_rgba(), vec![0, 0, 255, 255]);
    }
}
