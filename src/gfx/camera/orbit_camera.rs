use cgmath::*;

use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Keeps the camera from flipping over the poles.
const PITCH_MARGIN: f32 = 0.1;

/// Camera orbiting a target point on a sphere of radius `distance`
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
    home: OrbitPose,
}

/// Pose restored by [`OrbitCamera::reset_to_default`]
#[derive(Debug, Clone, Copy)]
struct OrbitPose {
    distance: f32,
    pitch: f32,
    yaw: f32,
    target: Vector3<f32>,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculted in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::FRAC_PI_4),
            znear: 0.1,
            zfar: 100.0,
            uniform: CameraUniform::default(),
            home: OrbitPose {
                distance,
                pitch,
                yaw,
                target,
            },
        };
        camera.update();
        camera
    }

    /// Builds the camera described by the viewer config, looking at the origin
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(
            config.distance,
            config.pitch,
            config.yaw,
            Vector3::zero(),
            aspect,
        );
        camera.fovy = Deg(config.fov_degrees).into();
        camera.znear = config.znear;
        camera.zfar = config.zfar;
        camera.bounds.min_distance = Some(config.min_distance);
        camera.bounds.max_distance = Some(config.max_distance);
        camera.set_distance(config.distance);
        camera.home.distance = camera.distance;
        camera
    }

    pub fn reset_to_default(&mut self) {
        self.distance = self.home.distance;
        self.pitch = self.home.pitch;
        self.yaw = self.home.yaw;
        self.target = self.home.target;
        self.update();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.set_distance(self.distance + delta);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    /// Updates the aspect ratio. Zero sizes from minimised windows are ignored.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(0.5),
            max_distance: Some(100.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + PITCH_MARGIN,
            max_pitch: std::f32::consts::FRAC_PI_2 - PITCH_MARGIN,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    let horizontal = distance * pitch.cos();
    Vector3::new(
        horizontal * yaw.sin(),
        distance * pitch.sin(),
        horizontal * yaw.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn default_pose_looks_down_negative_z() {
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        assert!(approx(camera.eye.x, 0.0));
        assert!(approx(camera.eye.y, 0.0));
        assert!(approx(camera.eye.z, 3.0));
    }

    #[test]
    fn eye_follows_spherical_coordinates() {
        let mut camera = OrbitCamera::new(2.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.set_yaw(std::f32::consts::FRAC_PI_2);
        assert!(approx(camera.eye.x, 2.0));
        assert!(approx(camera.eye.z, 0.0));

        camera.set_yaw(0.0);
        camera.set_pitch(0.5);
        assert!(approx(camera.eye.y, 2.0 * 0.5f32.sin()));
        assert!(approx(camera.eye.z, 2.0 * 0.5f32.cos()));
    }

    #[test]
    fn pitch_is_clamped_short_of_the_poles() {
        let mut camera = OrbitCamera::new(3.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.add_pitch(10.0);
        assert!(approx(camera.pitch, std::f32::consts::FRAC_PI_2 - PITCH_MARGIN));
        camera.add_pitch(-20.0);
        assert!(approx(camera.pitch, -std::f32::consts::FRAC_PI_2 + PITCH_MARGIN));
    }

    #[test]
    fn distance_is_clamped_to_bounds() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        camera.add_distance(-10.0);
        assert_eq!(camera.distance, 0.5);
        camera.add_distance(500.0);
        assert_eq!(camera.distance, 100.0);
    }

    #[test]
    fn reset_restores_initial_pose() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        camera.add_yaw(1.2);
        camera.add_pitch(0.4);
        camera.add_distance(5.0);
        camera.reset_to_default();
        assert_eq!(camera.distance, 3.0);
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);
        assert!(approx(camera.eye.z, 3.0));
    }

    #[test]
    fn zero_sized_resize_keeps_aspect() {
        let mut camera = OrbitCamera::new(3.0, 0.0, 0.0, Vector3::zero(), 1.5);
        camera.resize_projection(640, 0);
        assert_eq!(camera.aspect, 1.5);
        camera.resize_projection(0, 600);
        assert_eq!(camera.aspect, 1.5);
        camera.update_view_proj();
        assert!(camera.uniform.view_proj.iter().flatten().all(|v| v.is_finite()));

        camera.resize_projection(800, 400);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn uniform_carries_eye_position() {
        let mut camera = OrbitCamera::new(4.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.update_view_proj();
        assert_eq!(camera.uniform.view_position, [0.0, 0.0, 4.0, 1.0]);
        assert_ne!(camera.uniform.view_proj, CameraUniform::default().view_proj);
    }
}
