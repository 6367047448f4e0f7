use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_camera::OrbitCamera;
use crate::config::CameraConfig;

/// Trackpads report pixels; scale them to roughly one wheel notch.
const PIXELS_PER_SCROLL_LINE: f32 = 20.0;

/// Turns mouse input into orbit and zoom motion
///
/// Left-drag orbits around the target, the wheel zooms. The first cursor
/// motion after a press only anchors the cursor so the view does not jump.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    is_mouse_pressed: bool,
    first_motion: bool,
    last_cursor: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            is_mouse_pressed: false,
            first_motion: true,
            last_cursor: None,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.rotate_speed, config.zoom_speed)
    }

    /// Returns true if the event moved the camera
    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.process_mouse_button(*state == ElementState::Pressed);
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.process_cursor(position.x, position.y, camera)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / PIXELS_PER_SCROLL_LINE
                    }
                };
                self.process_scroll(lines, camera);
                true
            }
            _ => false,
        }
    }

    pub fn process_mouse_button(&mut self, pressed: bool) {
        self.is_mouse_pressed = pressed;
        self.first_motion = true;
    }

    /// Cursor position in window pixels. Returns true if the camera moved.
    pub fn process_cursor(&mut self, x: f64, y: f64, camera: &mut OrbitCamera) -> bool {
        let previous = self.last_cursor.replace((x, y));

        if !self.is_mouse_pressed {
            return false;
        }

        if self.first_motion {
            self.first_motion = false;
            return false;
        }

        let Some((last_x, last_y)) = previous else {
            return false;
        };

        let x_offset = (last_x - x) as f32;
        let y_offset = (y - last_y) as f32;

        camera.add_yaw(x_offset * self.rotate_speed);
        camera.add_pitch(y_offset * self.rotate_speed);
        true
    }

    /// Positive `lines` zoom in.
    pub fn process_scroll(&mut self, lines: f32, camera: &mut OrbitCamera) {
        camera.add_distance(-lines * self.zoom_speed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CameraController, OrbitCamera) {
        let config = CameraConfig::default();
        (
            CameraController::from_config(&config),
            OrbitCamera::from_config(&config, 1.0),
        )
    }

    #[test]
    fn motion_without_press_does_not_rotate() {
        let (mut controller, mut camera) = setup();
        assert!(!controller.process_cursor(10.0, 10.0, &mut camera));
        assert!(!controller.process_cursor(50.0, 80.0, &mut camera));
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);
    }

    #[test]
    fn first_motion_after_press_only_anchors() {
        let (mut controller, mut camera) = setup();
        controller.process_cursor(100.0, 100.0, &mut camera);
        controller.process_mouse_button(true);
        assert!(!controller.process_cursor(300.0, 300.0, &mut camera));
        assert_eq!(camera.yaw, 0.0);
    }

    #[test]
    fn drag_orbits_with_rotate_speed() {
        let (mut controller, mut camera) = setup();
        controller.process_mouse_button(true);
        controller.process_cursor(100.0, 100.0, &mut camera);
        assert!(controller.process_cursor(90.0, 120.0, &mut camera));

        // Dragging left increases yaw, dragging down increases pitch.
        assert!((camera.yaw - 10.0 * 0.005).abs() < 1e-6);
        assert!((camera.pitch - 20.0 * 0.005).abs() < 1e-6);
    }

    #[test]
    fn release_stops_rotation() {
        let (mut controller, mut camera) = setup();
        controller.process_mouse_button(true);
        controller.process_cursor(0.0, 0.0, &mut camera);
        controller.process_cursor(10.0, 0.0, &mut camera);
        let yaw = camera.yaw;
        controller.process_mouse_button(false);
        controller.process_cursor(200.0, 0.0, &mut camera);
        assert_eq!(camera.yaw, yaw);
        assert!(!controller.is_mouse_pressed);
    }

    #[test]
    fn scroll_zooms_linearly_and_clamps() {
        let (mut controller, mut camera) = setup();
        controller.process_scroll(1.0, &mut camera);
        assert!((camera.distance - 2.5).abs() < 1e-6);
        controller.process_scroll(-2.0, &mut camera);
        assert!((camera.distance - 3.5).abs() < 1e-6);
        controller.process_scroll(100.0, &mut camera);
        assert_eq!(camera.distance, 0.5);
    }
}
