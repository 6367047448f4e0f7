use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3};
use image::RgbaImage;
use wgpu::Device;

use super::object::Object;
use crate::{
    config::ViewerConfig,
    error::{report, Result, ViewerError},
    gfx::{
        camera::camera_utils::CameraManager,
        geometry::generate_cube,
        model::{DrawModel, Mesh, MeshData, Model},
        resources::{SceneLayouts, TextureResource},
    },
};

#[rustfmt::skip]
pub const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [ 0.0,  0.0,   0.0],
    [ 2.0,  5.0, -15.0],
    [-1.5, -2.2,  -2.5],
    [-3.8, -2.0, -12.3],
    [ 2.4, -0.4,  -3.5],
    [-1.7,  3.0,  -7.5],
    [ 1.3, -2.0,  -2.5],
    [ 1.5,  2.0,  -2.5],
    [ 1.5,  0.2,  -1.5],
    [-1.3,  1.0,  -1.5],
];

/// Axis every placeholder cube spins around (normalised before use)
pub const CUBE_ROTATION_AXIS: [f32; 3] = [1.0, 0.3, 0.5];

/// World transform of placeholder cube `index` after `time` seconds
///
/// Cube `i` spins at `20 * (i + 1) / 2` degrees per second.
pub fn cube_transform(index: usize, time: f32) -> Matrix4<f32> {
    let position = CUBE_POSITIONS[index % CUBE_POSITIONS.len()];
    let angle = Deg(20.0 * (index + 1) as f32 * time / 2.0);
    let axis = Vector3::from(CUBE_ROTATION_AXIS).normalize();
    Matrix4::from_translation(position.into()) * Matrix4::from_axis_angle(axis, angle)
}

/// The placeholder scene: one textured cube drawn at ten positions
pub struct CubeField {
    mesh: Mesh,
    objects: Vec<Object>,
}

impl CubeField {
    pub fn new(
        config: &ViewerConfig,
        device: &Device,
        queue: &wgpu::Queue,
        layouts: &SceneLayouts,
    ) -> Self {
        let texture = match load_cube_texture(config) {
            Ok(image) => TextureResource::from_image(device, queue, &image, "Cube Texture"),
            Err(err) => {
                log::warn!("Failed to load texture: {}", report(&err));
                TextureResource::white(device, queue)
            }
        };

        let geometry = generate_cube();
        let data = MeshData {
            name: "Cube".to_string(),
            vertices: geometry.to_vertices(),
            indices: geometry.indices,
            textures: Vec::new(),
        };
        let mesh = Mesh::upload(device, &data, &layouts.material, &texture, &texture);

        let objects = (0..CUBE_POSITIONS.len())
            .map(|i| Object::new(device, &layouts.object, cube_transform(i, 0.0)))
            .collect();

        Self { mesh, objects }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, time: f32) {
        for (i, object) in self.objects.iter_mut().enumerate() {
            object.transform = cube_transform(i, time);
            object.update_transform(queue);
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for object in &self.objects {
            render_pass.set_bind_group(1, object.transform_bind_group(), &[]);
            render_pass.draw_mesh(&self.mesh);
        }
    }
}

/// Image files store rows top-down; the cube's UVs expect them bottom-up.
fn load_cube_texture(config: &ViewerConfig) -> Result<RgbaImage> {
    let path = &config.cube_texture;
    let image = image::open(path).map_err(|source| ViewerError::Image {
        path: path.clone(),
        source,
    })?;
    Ok(image.flipv().to_rgba8())
}

/// What the viewer is showing
pub enum SceneContent {
    Model { model: Model, object: Object },
    Cubes(CubeField),
}

impl SceneContent {
    /// Loads the configured model, falling back to the cube field when there
    /// is none or it cannot be loaded.
    pub fn load(
        config: &ViewerConfig,
        device: &Device,
        queue: &wgpu::Queue,
        layouts: &SceneLayouts,
    ) -> Self {
        match &config.model {
            Some(path) => {
                log::info!("Loading model @ {}", path.display());
                match Model::load(path, device, queue, layouts) {
                    Ok(model) => {
                        log::info!("Model loaded successfully ({} meshes)", model.meshes.len());
                        let object = Object::new(device, &layouts.object, Matrix4::identity());
                        return SceneContent::Model { model, object };
                    }
                    Err(err) => {
                        log::error!("Failed to load model: {}", report(&err));
                        log::warn!("Falling back to default cube.");
                    }
                }
            }
            None => log::info!("No model given, loading default cube..."),
        }

        SceneContent::Cubes(CubeField::new(config, device, queue, layouts))
    }
}

/// Main scene: the camera and whatever content is being shown
pub struct Scene {
    pub camera_manager: CameraManager,
    pub content: Option<SceneContent>,
}

impl Scene {
    /// Creates a new scene with the given camera manager. Content is loaded
    /// once the GPU exists, see [`Scene::load_content`].
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            content: None,
        }
    }

    pub fn load_content(
        &mut self,
        config: &ViewerConfig,
        device: &Device,
        queue: &wgpu::Queue,
        layouts: &SceneLayouts,
    ) {
        self.content = Some(SceneContent::load(config, device, queue, layouts));
    }

    /// Updates the scene (camera matrices, cube animation)
    pub fn update(&mut self, queue: &wgpu::Queue, time: f32) {
        self.camera_manager.camera.update_view_proj();

        if let Some(SceneContent::Cubes(cubes)) = &mut self.content {
            cubes.update(queue, time);
        }
    }

    /// Draws the content. Expects bind group 0 and the pipeline to be set.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        match &self.content {
            Some(SceneContent::Model { model, object }) => {
                render_pass.set_bind_group(1, object.transform_bind_group(), &[]);
                model.draw(render_pass);
            }
            Some(SceneContent::Cubes(cubes)) => cubes.draw(render_pass),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Transform, Point3};

    use super::*;

    fn approx_eq(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
        let a: &[f32; 16] = a.as_ref();
        let b: &[f32; 16] = b.as_ref();
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn cubes_start_unrotated_at_their_positions() {
        for (i, position) in CUBE_POSITIONS.iter().enumerate() {
            let expected = Matrix4::from_translation(Vector3::from(*position));
            assert!(approx_eq(cube_transform(i, 0.0), expected));
        }
    }

    #[test]
    fn rotation_speed_grows_with_index() {
        // After 2 seconds cube 0 has turned 20 degrees and cube 2 has turned 60.
        let axis = Vector3::from(CUBE_ROTATION_AXIS).normalize();
        let expected = Matrix4::from_translation(Vector3::from(CUBE_POSITIONS[2]))
            * Matrix4::from_axis_angle(axis, Deg(60.0));
        assert!(approx_eq(cube_transform(2, 2.0), expected));

        let first = Matrix4::from_axis_angle(axis, Deg(20.0));
        assert!(approx_eq(cube_transform(0, 2.0), first));
    }

    #[test]
    fn rotation_keeps_the_cube_centre_in_place() {
        let transform = cube_transform(5, 13.7);
        let centre = transform.transform_point(Point3::new(0.0, 0.0, 0.0));
        let expected = CUBE_POSITIONS[5];
        assert!((centre.x - expected[0]).abs() < 1e-5);
        assert!((centre.y - expected[1]).abs() < 1e-5);
        assert!((centre.z - expected[2]).abs() < 1e-5);
    }

    #[test]
    fn missing_cube_texture_is_an_image_error() {
        let config = ViewerConfig {
            cube_texture: "/definitely/missing/dirt.jpg".into(),
            ..Default::default()
        };
        assert!(matches!(
            load_cube_texture(&config),
            Err(ViewerError::Image { .. })
        ));
    }
}
