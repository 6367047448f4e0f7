//! WGPU-based rendering engine for the model viewer
//!
//! Owns the surface, device and queue, the depth buffer, the global uniforms
//! and the scene pipeline, and records one render pass per frame.

use std::sync::Arc;

use crate::{
    config::{LightConfig, ViewerConfig},
    error::{Result, ViewerError},
    gfx::{
        camera::camera_utils::CameraUniform,
        resources::{
            update_global_ubo, GlobalBindings, GlobalUBO, GlobalUBOContent, SceneLayouts,
            TextureResource,
        },
        scene::Scene,
    },
};

use super::{
    pipeline_manager::{PipelineConfig, PipelineManager},
    shader::{build_scene_pipeline, install_error_hook},
};

/// Name of the pipeline every mesh is drawn with
pub const SCENE_PIPELINE: &str = "Phong";
/// Shader module slot used by [`SCENE_PIPELINE`]
pub const SCENE_SHADER: &str = "scene";

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    layouts: SceneLayouts,
    light_config: LightConfig,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Fails if no adapter or device is available or the built-in shader
    /// cannot be compiled. A broken shader override only produces a warning.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        viewer_config: &ViewerConfig,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Using adapter {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.device_type,
            adapter_info.backend
        );

        let wireframe = viewer_config.render.wireframe
            && if adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE) {
                true
            } else {
                log::warn!("Adapter does not support wireframe rendering, using filled polygons");
                false
            };

        let required_features = if wireframe {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features,
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        install_error_hook(&device);

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(ViewerError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(viewer_config.window.vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new_with_data(
            &device,
            &GlobalUBOContent::new(&CameraUniform::default(), &viewer_config.light),
        );
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let layouts = SceneLayouts::new(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        let pipeline = PipelineConfig::default_with_shader(SCENE_SHADER)
            .with_label(SCENE_PIPELINE)
            .with_bind_group_layouts(vec![
                global_bindings.bind_group_layout().clone(),
                layouts.object.bind_group_layout().clone(),
                layouts.material.bind_group_layout().clone(),
            ])
            .with_cull_mode(if viewer_config.render.cull_back_faces {
                Some(wgpu::Face::Back)
            } else {
                None
            })
            .with_polygon_mode(if wireframe {
                wgpu::PolygonMode::Line
            } else {
                wgpu::PolygonMode::Fill
            })
            .with_depth_format(TextureResource::DEPTH_FORMAT)
            .with_color_format(format);

        let shader = build_scene_pipeline(
            &mut pipeline_manager,
            SCENE_PIPELINE,
            pipeline,
            viewer_config.render.shader.as_deref(),
        )?;
        log::debug!("Scene pipeline built from {}", shader.name());

        let [r, g, b, a] = viewer_config.render.clear_color;

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            pipeline_manager,
            global_ubo,
            global_bindings,
            layouts,
            light_config: viewer_config.light,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Renders one frame of `scene`
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped, as
    /// is a timed out one. Running out of memory is fatal.
    pub fn render_frame(&mut self, scene: &Scene) -> Result<()> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(ViewerError::SurfaceOutOfMemory),
            Err(other) => {
                log::warn!("Surface error {other}, skipping frame");
                return Ok(());
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(SCENE_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                scene.draw(&mut render_pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Uploads the camera and light for the next frame
    pub fn update(&mut self, camera_uniform: &CameraUniform) {
        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            camera_uniform,
            &self.light_config,
        );
    }

    /// Resizes the surface and recreates the depth buffer. Zero sizes, as
    /// reported for minimised windows, are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;

        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Bind group layouts meshes and objects are created against
    pub fn layouts(&self) -> &SceneLayouts {
        &self.layouts
    }
}

/// Present mode for the vsync setting. `AutoNoVsync` falls back to `Fifo`.
pub fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_selects_present_mode() {
        assert_eq!(present_mode(true), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }
}
