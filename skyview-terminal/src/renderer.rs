/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Vector3, Vector4};
use skyview_core::geometry::{Mesh, SkyboxFace, SkyboxGeometry};
use skyview_core::projection::clip_to_screen;
use skyview_core::render::{DrawCall, DrawTarget, RenderTarget, ShaderUniforms};
use skyview_core::textures::SkyboxTextures;
use std::io::Write;

use crate::skybox::{self, FaceImage};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Smallest clip-space w kept after near-plane clipping
const NEAR_W: f32 = 1e-3;

const SHININESS: f32 = 32.0;

/// Clip-space vertex carrying three interpolated attributes
/// (texture coordinates for the skybox, a lit color for meshes)
#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    clip: Vector4<f32>,
    attr: Vector3<f32>,
}

#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    inv_w: f32,
    attr: Vector3<f32>,
}

/// Terminal frame buffer with per-cell depth, glyph and color
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<[u8; 3]>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![[0, 0, 0]; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill([0, 0, 0]);
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<(char, [u8; 3])> {
        let idx = y * self.width + x;
        (x < self.width && y < self.height).then(|| (self.char_buffer[idx], self.color_buffer[idx]))
    }

    /// Clip a triangle against the near plane, then rasterize what is left.
    /// `shade` turns the interpolated attribute into an RGB color.
    fn draw_triangle<F>(&mut self, vertices: [ClipVertex; 3], shade: F)
    where
        F: Fn(&Vector3<f32>) -> [u8; 3],
    {
        let polygon = clip_near(&vertices);
        if polygon.len() < 3 {
            return;
        }

        let mut screen = Vec::with_capacity(polygon.len());
        for vertex in &polygon {
            match clip_to_screen(&vertex.clip, self.width as u32, self.height as u32) {
                Some((x, y, depth)) => screen.push(ScreenVertex {
                    x,
                    y,
                    depth,
                    inv_w: 1.0 / vertex.clip.w,
                    attr: vertex.attr,
                }),
                None => return,
            }
        }

        // Triangle fan
        for i in 1..screen.len() - 1 {
            self.rasterize_triangle(&[screen[0], screen[i], screen[i + 1]], &shade);
        }
    }

    fn rasterize_triangle<F>(&mut self, coords: &[ScreenVertex; 3], shade: &F)
    where
        F: Fn(&Vector3<f32>) -> [u8; 3],
    {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    return;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[idx] {
                    continue;
                }

                // Perspective-correct attribute
                let inv_w = w0 * v0.inv_w + w1 * v1.inv_w + w2 * v2.inv_w;
                let attr = (v0.attr * (w0 * v0.inv_w)
                    + v1.attr * (w1 * v1.inv_w)
                    + v2.attr * (w2 * v2.inv_w))
                    / inv_w;
                let color = shade(&attr);

                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = glyph(color);
                self.color_buffer[idx] = color;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            let mut last_color = None;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let [r, g, b] = self.color_buffer[idx];
                if last_color != Some([r, g, b]) {
                    writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                    last_color = Some([r, g, b]);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// The glyph whose ink density matches a color's luminance
fn glyph(color: [u8; 3]) -> char {
    let [r, g, b] = color.map(|c| c as f32 / 255.0);
    let luminance = 0.299 * r + 0.587 * g + 0.114 * b;
    let index = (luminance * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

fn to_rgb(color: &Vector3<f32>) -> [u8; 3] {
    [color.x, color.y, color.z].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn from_rgba(texel: [u8; 4]) -> Vector3<f32> {
    Vector3::new(texel[0], texel[1], texel[2]).map(|c| c as f32 / 255.0)
}

/// Sutherland-Hodgman against `w >= NEAR_W`
fn clip_near(vertices: &[ClipVertex; 3]) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(4);
    for i in 0..3 {
        let current = vertices[i];
        let next = vertices[(i + 1) % 3];
        let current_in = current.clip.w >= NEAR_W;
        let next_in = next.clip.w >= NEAR_W;
        if current_in {
            out.push(current);
        }
        if current_in != next_in {
            let t = (NEAR_W - current.clip.w) / (next.clip.w - current.clip.w);
            out.push(ClipVertex {
                clip: current.clip.lerp(&next.clip, t),
                attr: current.attr.lerp(&next.attr, t),
            });
        }
    }
    out
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Everything one frame's draw calls read from, bound to the frame buffer
pub struct FrameTarget<'a> {
    pub renderer: &'a mut AsciiRenderer,
    pub mesh: &'a Mesh,
    pub skybox: &'a SkyboxGeometry,
    pub textures: &'a SkyboxTextures<FaceImage>,
}

impl FrameTarget<'_> {
    fn draw_skybox_face(&mut self, face: SkyboxFace, uniforms: &ShaderUniforms) {
        let skybox = self.skybox;
        let quad = skybox.face(face);
        let mvp = uniforms.projection * uniforms.model_view;
        let vertex = |i: u32| {
            let i = i as usize;
            let p = &quad.positions.data[4 * i..4 * i + 4];
            let uv = &quad.tex_coords.data[2 * i..2 * i + 2];
            ClipVertex {
                clip: mvp * Vector4::new(p[0], p[1], p[2], p[3]),
                attr: Vector3::new(uv[0], uv[1], 0.0),
            }
        };

        let textures = self.textures;
        let image = face.index();
        for tri in quad.indices.data.chunks_exact(3) {
            self.renderer
                .draw_triangle([vertex(tri[0]), vertex(tri[1]), vertex(tri[2])], |uv| {
                    let [r, g, b, _] = skybox::sample(textures, image, uv.x, uv.y);
                    [r, g, b]
                });
        }
    }

    fn draw_mesh(&mut self, uniforms: &ShaderUniforms) {
        let mesh = self.mesh;
        for triangle in mesh.triangles() {
            let lit = triangle
                .vertices
                .map(|vertex| ClipVertex {
                    clip: uniforms.projection * uniforms.model_view * vertex.position,
                    attr: self.shade_vertex(
                        &uniforms.model_view.transform_point(&vertex.point()).coords,
                        &vertex.normal,
                        uniforms,
                    ),
                });
            self.renderer.draw_triangle(lit, to_rgb);
        }
    }

    /// Per-vertex Phong lighting in eye space, optionally mixed with the
    /// environment seen along the reflected view ray.
    fn shade_vertex(
        &self,
        eye_position: &Vector3<f32>,
        normal: &Vector3<f32>,
        uniforms: &ShaderUniforms,
    ) -> Vector3<f32> {
        let light = &uniforms.light;
        let n = (uniforms.normal * normal)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let to_light = (light.position - eye_position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let to_eye = (-eye_position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);

        let diffuse = n.dot(&to_light).max(0.0);
        let reflected_light = reflect(&-to_light, &n);
        let specular = reflected_light.dot(&to_eye).max(0.0).powf(SHININESS);
        let phong = light.ambient + light.diffuse * diffuse + light.specular * specular;

        if !uniforms.reflection_mapping {
            return phong;
        }
        let view_ray = uniforms.rot_y * reflect(&-to_eye, &n);
        let (image, u, v) = skybox::cube_lookup(&view_ray);
        let environment = from_rgba(skybox::sample(self.textures, image, u, v));
        if uniforms.reflection_blending {
            environment.component_mul(&phong)
        } else {
            environment
        }
    }
}

fn reflect(incident: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(incident))
}

impl RenderTarget for FrameTarget<'_> {
    fn draw(&mut self, call: &DrawCall) {
        match call.target {
            DrawTarget::Skybox(face) => self.draw_skybox_face(face, &call.uniforms),
            DrawTarget::Mesh => self.draw_mesh(&call.uniforms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(x: f32, y: f32, w: f32) -> ClipVertex {
        ClipVertex {
            clip: Vector4::new(x, y, 0.0, w),
            attr: Vector3::new(w, 0.0, 0.0),
        }
    }

    #[test]
    fn test_clip_near() {
        let inside = [vertex(0.0, 0.0, 1.0), vertex(1.0, 0.0, 1.0), vertex(0.0, 1.0, 1.0)];
        assert_eq!(clip_near(&inside).len(), 3);

        let behind = [vertex(0.0, 0.0, -1.0), vertex(1.0, 0.0, -1.0), vertex(0.0, 1.0, -2.0)];
        assert!(clip_near(&behind).is_empty());

        // one vertex behind the eye: the triangle becomes a quad
        let straddling = [vertex(0.0, 0.0, 1.0), vertex(1.0, 0.0, 1.0), vertex(0.0, 1.0, -1.0)];
        let clipped = clip_near(&straddling);
        assert_eq!(clipped.len(), 4);
        for v in &clipped {
            assert!(v.clip.w >= NEAR_W - 1e-6);
        }
        assert_relative_eq!(clipped[2].attr.x, NEAR_W, epsilon = 1e-6);
    }

    #[test]
    fn test_barycentric() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert_relative_eq!(w0, 0.5);
        assert_relative_eq!(w1, 0.25);
        assert_relative_eq!(w2, 0.25);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_glyph_ramp() {
        assert_eq!(glyph([0, 0, 0]), '.');
        assert_eq!(glyph([255, 255, 255]), '@');
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut renderer = AsciiRenderer::new(8, 8);
        let full = |depth: f32| {
            [(-1.0, -1.0), (3.0, -1.0), (-1.0, 3.0)].map(|(x, y)| ClipVertex {
                clip: Vector4::new(x, y, depth, 1.0),
                attr: Vector3::zeros(),
            })
        };
        renderer.draw_triangle(full(0.5), |_| [255, 255, 255]);
        renderer.draw_triangle(full(0.8), |_| [255, 0, 0]);
        assert_eq!(renderer.cell(4, 4), Some(('@', [255, 255, 255])));

        renderer.clear();
        assert_eq!(renderer.cell(4, 4), Some((' ', [0, 0, 0])));
        assert_eq!(renderer.cell(8, 0), None);
    }
}
