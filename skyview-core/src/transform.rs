/// Modelview matrix stack and per-object transforms
use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};

use crate::math::{deg_to_rad, wrap_degrees};

/// Rotation state around three axes (in degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in degrees), keeping each angle inside (-360, 360)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x = wrap_degrees(self.x + dx);
        self.y = wrap_degrees(self.y + dy);
        self.z = wrap_degrees(self.z + dz);
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Uniform scale plus X/Y/Z rotation applied to one drawn object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub scale: f32,
    pub rotation: RotationState,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: RotationState::zero(),
        }
    }
}

/// Hierarchical modelview accumulator.
///
/// `push` saves a copy of the current matrix, `pop` restores the most recently
/// saved one. Popping more often than pushing is a programming error and panics.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Matrix4<f32>,
    saved: Vec<Matrix4<f32>>,
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            current: Matrix4::identity(),
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &Matrix4<f32> {
        &self.current
    }

    /// Number of saved matrices
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Replace the current matrix, e.g. with the frame's view matrix.
    pub fn load(&mut self, matrix: Matrix4<f32>) {
        self.current = matrix;
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    pub fn pop(&mut self) {
        match self.saved.pop() {
            Some(matrix) => self.current = matrix,
            None => panic!("invalid pop: modelview matrix stack is empty"),
        }
    }

    pub fn scale(&mut self, factor: f32) {
        self.current *= Matrix4::new_scaling(factor);
    }

    pub fn rotate_x(&mut self, degrees: f32) {
        self.current *= Matrix4::from_axis_angle(&Vector3::x_axis(), deg_to_rad(degrees));
    }

    pub fn rotate_y(&mut self, degrees: f32) {
        self.current *= Matrix4::from_axis_angle(&Vector3::y_axis(), deg_to_rad(degrees));
    }

    pub fn rotate_z(&mut self, degrees: f32) {
        self.current *= Matrix4::from_axis_angle(&Vector3::z_axis(), deg_to_rad(degrees));
    }

    /// Scale, then rotate about X, Y and Z in that order. Identity steps are skipped.
    pub fn apply(&mut self, object: &ObjectTransform) {
        if object.scale != 1.0 {
            self.scale(object.scale);
        }
        let rotation = &object.rotation;
        if rotation.x != 0.0 {
            self.rotate_x(rotation.x);
        }
        if rotation.y != 0.0 {
            self.rotate_y(rotation.y);
        }
        if rotation.z != 0.0 {
            self.rotate_z(rotation.z);
        }
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Inverse-transpose of the upper 3x3 of a modelview matrix.
///
/// A singular modelview (zero scale) yields the zero matrix.
pub fn normal_matrix(model_view: &Matrix4<f32>) -> Matrix3<f32> {
    let upper: Matrix3<f32> = model_view.fixed_view::<3, 3>(0, 0).into_owned();
    upper
        .try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(Matrix3::zeros)
}

/// Rotation about Y by the camera's cumulative yaw.
///
/// The view matrix turns the world by the opposite angle; reflection vectors
/// computed in eye space are multiplied by this to undo that turn so the
/// environment stays put as the camera orbits.
pub fn y_rotation_correction(yaw_degrees: f32) -> Matrix3<f32> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), deg_to_rad(yaw_degrees)).into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        state.rotate(10.0, 0.0, -20.0);
        assert_eq!(state, RotationState::new(10.0, 0.0, -20.0));

        state.rotate(350.0, 0.0, -340.0);
        assert_relative_eq!(state.x, 0.0);
        assert_relative_eq!(state.z, 0.0);
    }

    #[test]
    fn test_push_pop_restores() {
        let mut stack = MatrixStack::new();
        stack.load(Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0)));
        let base = *stack.current();

        for n in 0..5 {
            for i in 0..n {
                stack.push();
                stack.rotate_y(15.0 * (i + 1) as f32);
                stack.scale(2.0);
            }
            assert_eq!(stack.depth(), n);
            for _ in 0..n {
                stack.pop();
            }
            assert_eq!(*stack.current(), base);
            assert_eq!(stack.depth(), 0);
        }
    }

    #[test]
    #[should_panic(expected = "invalid pop")]
    fn test_pop_empty_panics() {
        let mut stack = MatrixStack::new();
        stack.push();
        stack.pop();
        stack.pop();
    }

    #[test]
    fn test_apply_order() {
        let object = ObjectTransform {
            scale: 2.0,
            rotation: RotationState::new(90.0, 0.0, 90.0),
        };
        let mut stack = MatrixStack::new();
        stack.apply(&object);

        let expected = Matrix4::new_scaling(2.0)
            * Matrix4::from_axis_angle(&Vector3::x_axis(), std::f32::consts::FRAC_PI_2)
            * Matrix4::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(*stack.current(), expected, epsilon = 1e-6);

        // Z applies first: x -> y, then X: y -> z
        let p = stack.current().transform_vector(&Vector3::x());
        assert_relative_eq!(p, Vector3::new(0.0, 0.0, 2.0), epsilon = 1e-6);
    }

    #[test]
    fn test_normal_matrix() {
        let model_view = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&model_view);
        assert_relative_eq!(n, Matrix3::from_diagonal(&Vector3::new(0.5, 1.0, 1.0)));

        let rotation = Matrix4::from_axis_angle(&Vector3::y_axis(), 0.7);
        let n = normal_matrix(&rotation);
        assert_relative_eq!(n, rotation.fixed_view::<3, 3>(0, 0).into_owned(), epsilon = 1e-6);

        assert_eq!(normal_matrix(&Matrix4::zeros()), Matrix3::zeros());
    }

    #[test]
    fn test_y_rotation_correction_layout() {
        let angle = 30.0_f32;
        let m = y_rotation_correction(angle);
        let (s, c) = angle.to_radians().sin_cos();
        // column-major: [cos, 0, -sin, 0, 1, 0, sin, 0, cos]
        let expected = [c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c];
        for (got, want) in m.as_slice().iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-6);
        }
    }
}
