use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::ViewerConfig,
    error::{report, Result, ViewerError},
    gfx::{
        camera::{
            camera_controller::CameraController, camera_utils::CameraManager,
            orbit_camera::OrbitCamera,
        },
        rendering::render_engine::RenderEngine,
        scene::Scene,
    },
};

/// The viewer application: owns the event loop until [`ViewerApp::run`]
pub struct ViewerApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    start_time: Instant,
    /// First fatal error; stops the event loop and is returned from `run`
    fatal: Option<ViewerError>,
}

impl ViewerApp {
    /// Creates the event loop and the camera. The window and GPU resources are
    /// created once the event loop resumes.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        let event_loop = EventLoop::new()?;

        let aspect = config.window.width as f32 / config.window.height as f32;
        let camera = OrbitCamera::from_config(&config.camera, aspect);
        let controller = CameraController::from_config(&config.camera);
        let scene = Scene::new(CameraManager::new(camera, controller));

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                scene,
                start_time: Instant::now(),
                fatal: None,
            },
        })
    }

    /// Runs the application until the window closes or a fatal error occurs
    pub fn run(mut self) -> Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop.run_app(&mut self.app_state)?;

        match self.app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        log::error!("{}", report(&err));
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let config = &self.config;
        let renderer = pollster::block_on(async move {
            RenderEngine::new(window, width, height, config).await
        })?;

        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);
        self.scene.load_content(
            &self.config,
            renderer.device(),
            renderer.queue(),
            renderer.layouts(),
        );

        self.render_engine = Some(renderer);
        self.start_time = Instant::now();
        Ok(())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::KeyR => self.scene.camera_manager.camera.reset_to_default(),
                _ => {}
            },
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                render_engine.resize(width, height);
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let time = self.start_time.elapsed().as_secs_f32();
                self.scene.update(render_engine.queue(), time);
                render_engine.update(&self.scene.camera_manager.camera.uniform);

                if let Err(err) = render_engine.render_frame(&self.scene) {
                    self.fail(event_loop, err);
                }
            }
            other => {
                self.scene.camera_manager.process_event(&other);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
