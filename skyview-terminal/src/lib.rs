/// Terminal front end: image loading, event translation and the frame loop
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{debug, info};
use skyview_core::geometry::{Mesh, SkyboxGeometry};
use skyview_core::{
    InputState, RenderContext, SceneState, SkyboxTextures, ViewerConfig, ViewerOptions,
    SKYBOX_IMAGE_NAMES,
};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

pub mod renderer;
pub mod skybox;

pub use renderer::{AsciiRenderer, FrameTarget};
use skybox::{FaceImage, ImageEvent};

const MIN_SCALE_PERCENT: f32 = 10.0;
const MAX_SCALE_PERCENT: f32 = 300.0;
const SCALE_STEP_PERCENT: f32 = 10.0;

/// Geometry produced by the load phase
pub struct Assets {
    pub mesh: Mesh,
    pub skybox: SkyboxGeometry,
}

/// DOM `keyCode` for the keys bound to camera controls
pub fn dom_key_code(code: KeyCode) -> Option<u32> {
    match code {
        KeyCode::Left => Some(37),
        KeyCode::Up => Some(38),
        KeyCode::Right => Some(39),
        KeyCode::Down => Some(40),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Some(65),
            'd' => Some(68),
            's' => Some(83),
            'w' => Some(87),
            _ => None,
        },
        _ => None,
    }
}

/// Apply an option key to the snapshot. Returns false for keys that are not option keys.
pub fn toggle_option(options: &mut ViewerOptions, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('r') => options.reflection_mapping = !options.reflection_mapping,
        KeyCode::Char('b') => options.reflection_blending = !options.reflection_blending,
        KeyCode::Char('p') => options.spin = !options.spin,
        KeyCode::Char('+') | KeyCode::Char('=') => {
            options.scale_percent =
                (options.scale_percent + SCALE_STEP_PERCENT).min(MAX_SCALE_PERCENT)
        }
        KeyCode::Char('-') => {
            options.scale_percent =
                (options.scale_percent - SCALE_STEP_PERCENT).max(MIN_SCALE_PERCENT)
        }
        _ => return false,
    }
    true
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    assets: Assets,
    textures: SkyboxTextures<FaceImage>,
    images: Option<Receiver<ImageEvent>>,
    scene: SceneState,
    input: InputState,
    options: ViewerOptions,
    context: RenderContext,
    renderer: AsciiRenderer,
    /// Whether the terminal reports key releases; otherwise keys count as
    /// held for the frame their (repeated) press arrives in
    key_releases: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(assets: Assets, config: &ViewerConfig, image_dir: PathBuf) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            assets,
            textures: SkyboxTextures::new(SKYBOX_IMAGE_NAMES.len()),
            images: Some(skybox::spawn_loader(image_dir)),
            scene: SceneState::new(config),
            input: InputState::new(),
            options: config.options,
            context: RenderContext::new(config, width as u32, 2 * height as u32),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            key_releases: false,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;
        self.key_releases = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.key_releases {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        info!("key release events supported: {}", self.key_releases);

        let result = self.main_loop();

        // Cleanup
        if self.key_releases {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        let mut previous = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Update
            self.poll_images();
            self.update(frame_start - previous);
            previous = frame_start;

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                debug!("terminal resized to {}x{}", width, height);
                self.renderer.resize(width as usize, height as usize);
                self.context.set_viewport(width as u32, 2 * height as u32);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            if let Some(code) = dom_key_code(code) {
                self.input.key_up(code);
            }
            return;
        }

        if let Some(dom) = dom_key_code(code) {
            self.input.key_down(dom);
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            _ => {
                // option keys act once per press, not on auto-repeat
                if kind == KeyEventKind::Press && toggle_option(&mut self.options, code) {
                    debug!("options now {:?}", self.options);
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column as f32, mouse.row as f32);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.input.mouse_down();
                self.input.mouse_move(x, y);
            }
            MouseEventKind::Up(MouseButton::Left) => self.input.mouse_up(),
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                if let Some(step) = self.input.mouse_move(x, y) {
                    self.scene.drag_mesh(step);
                }
            }
            _ => {}
        }
    }

    fn poll_images(&mut self) {
        if let Some(rx) = &self.images {
            if !skybox::drain(rx, &mut self.textures) {
                self.images = None;
            }
        }
    }

    fn update(&mut self, dt: Duration) {
        self.scene.advance(&self.input, self.options, dt);
        if !self.key_releases {
            self.input.controls.release_all();
        }
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        let ready = self.textures.is_ready();
        let mut target = FrameTarget {
            renderer: &mut self.renderer,
            mesh: &self.assets.mesh,
            skybox: &self.assets.skybox,
            textures: &self.textures,
        };
        self.context.render_frame(&self.scene, ready, &mut target);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        if ready {
            self.renderer.draw(&mut stdout)?;
        } else {
            queue!(stdout, terminal::Clear(ClearType::All))?;
        }

        // Draw UI overlay
        let status = if ready {
            format!(
                "Skyview | FPS: {:.1} | yaw {:.0} | reflect {} blend {} spin {} scale {:.0}% | \
                 A/D orbit W/S pitch Up/Down move R/B/P/+/- options Q quit",
                self.fps,
                self.scene.camera.yaw,
                on_off(self.options.reflection_mapping),
                on_off(self.options.reflection_blending),
                on_off(self.options.spin),
                self.options.scale_percent
            )
        } else {
            format!(
                "Skyview | loading skybox images ({} failed so far)...",
                self.textures.failures().count()
            )
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyview_core::Control;

    #[test]
    fn test_key_translation() {
        let cases = [
            (KeyCode::Left, Control::OrbitLeft),
            (KeyCode::Char('A'), Control::OrbitLeft),
            (KeyCode::Right, Control::OrbitRight),
            (KeyCode::Char('d'), Control::OrbitRight),
            (KeyCode::Char('w'), Control::PitchUp),
            (KeyCode::Char('s'), Control::PitchDown),
            (KeyCode::Up, Control::Forward),
            (KeyCode::Down, Control::Backward),
        ];
        for (key, control) in cases {
            let code = dom_key_code(key).unwrap();
            assert_eq!(Control::from_key_code(code), Some(control), "{:?}", key);
        }
        assert_eq!(dom_key_code(KeyCode::Char('q')), None);
        assert_eq!(dom_key_code(KeyCode::Enter), None);
    }

    #[test]
    fn test_option_keys() {
        let mut options = ViewerOptions::default();
        assert!(toggle_option(&mut options, KeyCode::Char('r')));
        assert!(!options.reflection_mapping);
        assert!(toggle_option(&mut options, KeyCode::Char('b')));
        assert!(options.reflection_blending);
        assert!(toggle_option(&mut options, KeyCode::Char('p')));
        assert!(options.spin);

        assert!(toggle_option(&mut options, KeyCode::Char('+')));
        assert_eq!(options.scale_percent, 110.0);
        for _ in 0..50 {
            toggle_option(&mut options, KeyCode::Char('-'));
        }
        assert_eq!(options.scale_percent, MIN_SCALE_PERCENT);

        assert!(!toggle_option(&mut options, KeyCode::Char('x')));
    }
}
