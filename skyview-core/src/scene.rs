/// Per-frame scene state: camera, mesh orientation, world spin and options
use std::time::Duration;

use crate::camera::CameraState;
use crate::config::{ViewerConfig, ViewerOptions};
use crate::input::{DragStep, InputState};
use crate::transform::{ObjectTransform, RotationState};

/// Radians per second of the optional world spin, about X and Y
const SPIN_RATE_X: f32 = 1.2;
const SPIN_RATE_Y: f32 = 0.7;

/// Whole-world rotation animated while the spin option is on
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldSpin {
    pub x_radians: f32,
    pub y_radians: f32,
}

impl WorldSpin {
    pub fn advance(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        self.x_radians += SPIN_RATE_X * seconds;
        self.y_radians += SPIN_RATE_Y * seconds;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything the frame-advance step mutates. The render step only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub camera: CameraState,
    /// Mouse-driven mesh rotation; only X and Z are ever changed
    pub mesh_rotation: RotationState,
    pub world_spin: WorldSpin,
    pub options: ViewerOptions,
    step_degrees: f32,
    move_speed: f32,
}

impl SceneState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            camera: CameraState::from_config(&config.camera),
            mesh_rotation: RotationState::zero(),
            world_spin: WorldSpin::default(),
            options: config.options,
            step_degrees: config.camera.rotation_step_degrees,
            move_speed: config.camera.move_speed,
        }
    }

    /// Advance one frame: apply held controls, take the latest option
    /// snapshot and animate the world spin.
    pub fn advance(&mut self, input: &InputState, options: ViewerOptions, dt: Duration) {
        self.camera
            .advance(&input.controls, self.step_degrees, self.move_speed);

        self.options = options;
        if self.options.spin {
            self.world_spin.advance(dt);
        } else {
            self.world_spin.reset();
        }
    }

    /// Roll the mesh about Z and pitch it about X by one step per drag event.
    pub fn drag_mesh(&mut self, step: DragStep) {
        self.mesh_rotation.rotate(
            step.pitch * self.step_degrees,
            0.0,
            step.roll * self.step_degrees,
        );
    }

    /// Scale and rotation for the mesh draw
    pub fn mesh_transform(&self) -> ObjectTransform {
        ObjectTransform {
            scale: self.options.scale_percent / 100.0,
            rotation: RotationState::new(self.mesh_rotation.x, 0.0, self.mesh_rotation.z),
        }
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Control;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_applies_held_controls() {
        let mut scene = SceneState::default();
        let mut input = InputState::new();
        input.controls.press(Control::OrbitRight);

        scene.advance(&input, ViewerOptions::default(), Duration::from_millis(16));
        scene.advance(&input, ViewerOptions::default(), Duration::from_millis(16));
        assert_relative_eq!(scene.camera.yaw, 2.0);

        input.controls.release(Control::OrbitRight);
        scene.advance(&input, ViewerOptions::default(), Duration::from_millis(16));
        assert_relative_eq!(scene.camera.yaw, 2.0);
    }

    #[test]
    fn test_spin_runs_only_while_enabled() {
        let mut scene = SceneState::default();
        let input = InputState::new();
        let spinning = ViewerOptions {
            spin: true,
            ..ViewerOptions::default()
        };

        scene.advance(&input, spinning, Duration::from_secs(2));
        assert_relative_eq!(scene.world_spin.x_radians, 2.4);
        assert_relative_eq!(scene.world_spin.y_radians, 1.4);

        scene.advance(&input, ViewerOptions::default(), Duration::from_secs(2));
        assert_eq!(scene.world_spin, WorldSpin::default());
    }

    #[test]
    fn test_drag_and_mesh_transform() {
        let mut scene = SceneState::default();
        scene.drag_mesh(DragStep {
            roll: 1.0,
            pitch: -1.0,
        });
        scene.drag_mesh(DragStep {
            roll: 1.0,
            pitch: 0.0,
        });
        assert_eq!(scene.mesh_rotation, RotationState::new(-1.0, 0.0, 2.0));

        scene.options.scale_percent = 50.0;
        let transform = scene.mesh_transform();
        assert_relative_eq!(transform.scale, 0.5);
        assert_eq!(transform.rotation, RotationState::new(-1.0, 0.0, 2.0));
    }
}
