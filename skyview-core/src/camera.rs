/// Orbiting camera driven by held controls
use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};

use crate::config::CameraConfig;
use crate::input::{Control, Controls};
use crate::math::{cross, deg_to_rad, try_normalize, wrap_degrees};

/// Eye position, view direction and up vector, plus the total yaw orbited so far
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub eye: Vector3<f32>,
    pub view_dir: Vector3<f32>,
    pub up: Vector3<f32>,
    /// Cumulative orbit about the world up axis, in degrees, inside (-360, 360)
    pub yaw: f32,
}

impl CameraState {
    pub fn new(eye: Vector3<f32>, view_dir: Vector3<f32>, up: Vector3<f32>) -> Self {
        Self {
            eye,
            view_dir,
            up,
            yaw: 0.0,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(
            Vector3::from(config.eye),
            Vector3::from(config.view_dir),
            Vector3::from(config.up),
        )
    }

    /// Apply one frame of every held control.
    pub fn advance(&mut self, controls: &Controls, step_degrees: f32, speed: f32) {
        for control in Control::ALL {
            if !controls.is_held(control) {
                continue;
            }
            match control {
                Control::OrbitLeft => self.orbit(-step_degrees),
                Control::OrbitRight => self.orbit(step_degrees),
                Control::PitchUp => self.pitch(step_degrees),
                Control::PitchDown => self.pitch(-step_degrees),
                Control::Forward => self.move_along_view(speed),
                Control::Backward => self.move_along_view(-speed),
            }
        }
    }

    /// Orbit the eye about the world up axis through the origin.
    ///
    /// The view direction is re-aimed horizontally at the origin while its
    /// previous vertical component is kept as is, so after pitching the view
    /// direction is no longer unit length.
    pub fn orbit(&mut self, degrees: f32) {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), deg_to_rad(degrees));
        self.eye = rotation * self.eye;

        let old_y = self.view_dir.y;
        // eye directly above or below the origin has no horizontal direction
        if let Some(toward) = try_normalize(&Vector3::new(-self.eye.x, 0.0, -self.eye.z)) {
            self.view_dir = Vector3::new(toward.x, old_y, toward.z);
        }

        self.yaw = wrap_degrees(self.yaw + degrees);
    }

    /// Tilt view direction and up together about their common perpendicular.
    pub fn pitch(&mut self, degrees: f32) {
        let axis = cross(&self.view_dir, &self.up);
        let Some(axis) = Unit::try_new(axis, f32::EPSILON) else {
            return;
        };
        let rotation = UnitQuaternion::from_axis_angle(&axis, deg_to_rad(degrees));
        self.view_dir = rotation * self.view_dir;
        self.up = rotation * self.up;
    }

    pub fn move_along_view(&mut self, distance: f32) {
        self.eye += self.view_dir * distance;
    }

    /// Look-at matrix from the eye toward `eye + view_dir`
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from(self.eye);
        let target = Point3::from(self.eye + self.view_dir);
        Matrix4::look_at_rh(&eye, &target, &self.up)
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}
