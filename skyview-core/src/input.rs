/// Logical controls and held-input tracking
///
/// Key and mouse events update an [`InputState`]; the frame loop reads the
/// held controls once per frame, so holding a key keeps applying its step.

/// Camera controls, level-triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    OrbitLeft,
    OrbitRight,
    PitchUp,
    PitchDown,
    Forward,
    Backward,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::OrbitLeft,
        Control::OrbitRight,
        Control::PitchUp,
        Control::PitchDown,
        Control::Forward,
        Control::Backward,
    ];

    /// Map a DOM `keyCode` to a control.
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            37 | 65 => Some(Control::OrbitLeft),  // Left arrow, A
            39 | 68 => Some(Control::OrbitRight), // Right arrow, D
            87 => Some(Control::PitchUp),         // W
            83 => Some(Control::PitchDown),       // S
            38 => Some(Control::Forward),         // Up arrow
            40 => Some(Control::Backward),        // Down arrow
            _ => None,
        }
    }
}

/// Set of currently held controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    held: [bool; 6],
}

impl Controls {
    pub fn press(&mut self, control: Control) {
        self.held[control as usize] = true;
    }

    pub fn release(&mut self, control: Control) {
        self.held[control as usize] = false;
    }

    pub fn release_all(&mut self) {
        self.held = [false; 6];
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held[control as usize]
    }
}

/// Sign of a mouse drag step along each screen axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStep {
    /// Roll direction from horizontal movement (0, 1 or -1)
    pub roll: f32,
    /// Pitch direction from vertical movement (0, 1 or -1)
    pub pitch: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub controls: Controls,
    mouse_down: bool,
    last_mouse: Option<(f32, f32)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: u32) {
        if let Some(control) = Control::from_key_code(code) {
            self.controls.press(control);
        }
    }

    pub fn key_up(&mut self, code: u32) {
        if let Some(control) = Control::from_key_code(code) {
            self.controls.release(control);
        }
    }

    pub fn mouse_down(&mut self) {
        self.mouse_down = true;
    }

    pub fn mouse_up(&mut self) {
        self.mouse_down = false;
    }

    /// Record a pointer move. While the button is held, returns the drag step:
    /// moving left rolls positive, moving down pitches positive.
    ///
    /// The position is always remembered; the very first move only records it.
    pub fn mouse_move(&mut self, x: f32, y: f32) -> Option<DragStep> {
        let step = match (self.mouse_down, self.last_mouse) {
            (true, Some((last_x, last_y))) => {
                let sign = |delta: f32| if delta == 0.0 { 0.0 } else { delta.signum() };
                Some(DragStep {
                    roll: sign(last_x - x),
                    pitch: sign(y - last_y),
                })
            }
            _ => None,
        };
        self.last_mouse = Some((x, y));
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Control::from_key_code(37), Some(Control::OrbitLeft));
        assert_eq!(Control::from_key_code(65), Some(Control::OrbitLeft));
        assert_eq!(Control::from_key_code(68), Some(Control::OrbitRight));
        assert_eq!(Control::from_key_code(87), Some(Control::PitchUp));
        assert_eq!(Control::from_key_code(83), Some(Control::PitchDown));
        assert_eq!(Control::from_key_code(38), Some(Control::Forward));
        assert_eq!(Control::from_key_code(40), Some(Control::Backward));
        assert_eq!(Control::from_key_code(13), None);
    }

    #[test]
    fn test_held_until_released() {
        let mut input = InputState::new();
        input.key_down(39);
        input.key_down(87);
        assert!(input.controls.is_held(Control::OrbitRight));
        assert!(input.controls.is_held(Control::PitchUp));

        input.key_up(39);
        assert!(!input.controls.is_held(Control::OrbitRight));
        assert_ne!(input.controls, Controls::default());

        input.controls.release_all();
        assert_eq!(input.controls, Controls::default());
    }

    #[test]
    fn test_mouse_drag() {
        let mut input = InputState::new();
        input.mouse_down();
        // first move only records the position
        assert_eq!(input.mouse_move(100.0, 100.0), None);

        let step = input.mouse_move(90.0, 100.0).unwrap();
        assert_eq!(step, DragStep { roll: 1.0, pitch: 0.0 });

        let step = input.mouse_move(95.0, 80.0).unwrap();
        assert_eq!(step, DragStep { roll: -1.0, pitch: -1.0 });

        input.mouse_up();
        assert_eq!(input.mouse_move(0.0, 0.0), None);
        assert_eq!(input.mouse_move(10.0, 10.0), None);
    }
}
