/// Per-frame render state: draw order, matrices and the shader uniform contract
use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::config::{LightConfig, ViewerConfig};
use crate::geometry::{Axis, SkyboxFace};
use crate::projection::Projection;
use crate::scene::SceneState;
use crate::transform::{normal_matrix, y_rotation_correction, MatrixStack, ObjectTransform};

/// Point light parameters handed to the shading stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl From<&LightConfig> for Light {
    fn from(config: &LightConfig) -> Self {
        Self {
            position: Vector3::from(config.position),
            ambient: Vector3::from(config.ambient),
            diffuse: Vector3::from(config.diffuse),
            specular: Vector3::from(config.specular),
        }
    }
}

/// Values bound to the shaders for a single draw
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderUniforms {
    pub model_view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub normal: Matrix3<f32>,
    /// Turns eye-space reflection vectors back by the camera's orbit
    pub rot_y: Matrix3<f32>,
    /// Drawing the skybox (textured, unlit) rather than the mesh
    pub skybox: bool,
    pub reflection_mapping: bool,
    pub reflection_blending: bool,
    pub light: Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTarget {
    Skybox(SkyboxFace),
    Mesh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub target: DrawTarget,
    pub uniforms: ShaderUniforms,
}

/// The rasterization stage that consumes draw calls
pub trait RenderTarget {
    fn draw(&mut self, call: &DrawCall);
}

impl RenderTarget for Vec<DrawCall> {
    fn draw(&mut self, call: &DrawCall) {
        self.push(call.clone());
    }
}

/// Composes the matrices for each frame and hands draw calls to a [`RenderTarget`]
#[derive(Debug, Clone)]
pub struct RenderContext {
    projection: Projection,
    stack: MatrixStack,
    light: Light,
    skybox_scale: f32,
}

impl RenderContext {
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        Self {
            projection: Projection::from_config(&config.view, width, height),
            stack: MatrixStack::new(),
            light: Light::from(&config.light),
            skybox_scale: config.skybox_scale,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.projection.set_viewport(width, height);
    }

    /// Draw the skybox and the mesh for one frame. Returns the number of draw calls.
    ///
    /// Nothing is drawn until `ready` (every skybox image has settled).
    /// Panics if the matrix stack is left unbalanced, which is a bug here.
    pub fn render_frame<R>(&mut self, scene: &SceneState, ready: bool, target: &mut R) -> usize
    where
        R: RenderTarget + ?Sized,
    {
        if !ready {
            return 0;
        }

        let projection = self.projection.matrix();
        self.stack.load(scene.camera.view_matrix());

        let mut draws = 0;
        self.stack.push();
        self.stack.rotate_x(scene.world_spin.x_radians.to_degrees());
        self.stack.rotate_y(scene.world_spin.y_radians.to_degrees());
        draws += self.draw_skybox(scene, &projection, target);
        draws += self.draw_mesh(scene, &projection, &scene.mesh_transform(), true, target);
        self.stack.pop();

        assert_eq!(self.stack.depth(), 0, "unbalanced modelview matrix stack");
        draws
    }

    fn draw_skybox<R>(&mut self, scene: &SceneState, projection: &Matrix4<f32>, target: &mut R) -> usize
    where
        R: RenderTarget + ?Sized,
    {
        self.stack.push();
        if self.skybox_scale != 1.0 {
            self.stack.scale(self.skybox_scale);
        }
        for face in SkyboxFace::ALL {
            self.stack.push();
            let (axis, degrees) = face.texture_rotation();
            match axis {
                Axis::X => self.stack.rotate_x(degrees),
                Axis::Y => self.stack.rotate_y(degrees),
                Axis::Z => self.stack.rotate_z(degrees),
            }
            let uniforms = self.uniforms(scene, projection, true, false);
            target.draw(&DrawCall {
                target: DrawTarget::Skybox(face),
                uniforms,
            });
            self.stack.pop();
        }
        self.stack.pop();
        SkyboxFace::ALL.len()
    }

    /// `reflective` asks for reflection mapping; the user option can still veto it.
    fn draw_mesh<R>(
        &mut self,
        scene: &SceneState,
        projection: &Matrix4<f32>,
        object: &ObjectTransform,
        reflective: bool,
        target: &mut R,
    ) -> usize
    where
        R: RenderTarget + ?Sized,
    {
        self.stack.push();
        self.stack.apply(object);
        let reflection = reflective && scene.options.reflection_mapping;
        let uniforms = self.uniforms(scene, projection, false, reflection);
        target.draw(&DrawCall {
            target: DrawTarget::Mesh,
            uniforms,
        });
        self.stack.pop();
        1
    }

    fn uniforms(
        &self,
        scene: &SceneState,
        projection: &Matrix4<f32>,
        skybox: bool,
        reflection_mapping: bool,
    ) -> ShaderUniforms {
        let model_view = *self.stack.current();
        ShaderUniforms {
            model_view,
            projection: *projection,
            normal: normal_matrix(&model_view),
            rot_y: y_rotation_correction(scene.camera.yaw),
            skybox,
            reflection_mapping,
            reflection_blending: scene.options.reflection_blending,
            light: self.light,
        }
    }
}
