use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::{
    config::SceneConfig,
    error::SceneError,
    gfx::{
        camera::{CameraController, KeyboardState},
        frame::{FrameState, FrameTransforms, InputEvent, RunState},
        rendering::render_engine::surface_size,
        rendering::RenderEngine,
    },
};

pub struct BlockSceneApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    frame: FrameState,
    keys: KeyboardState,
    controller: CameraController,
    run_state: RunState,
    started: Instant,
    // first fatal error, reported once the event loop returns
    error: Option<SceneError>,
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SceneError) {
        log::error!("{}", error);
        self.error.get_or_insert(error);
        self.close(event_loop);
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        self.run_state.request_close();
        event_loop.exit();
    }
}

impl BlockSceneApp {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        let event_loop = EventLoop::new().map_err(SceneError::init)?;

        let frame = FrameState::new(&config);
        let controller = CameraController::new(config.camera_speed);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                frame,
                keys: KeyboardState::new(),
                controller,
                run_state: RunState::Running,
                started: Instant::now(),
                error: None,
            },
        })
    }

    /// Runs the frame loop until the window closes or ESC is pressed
    pub fn run(mut self) -> Result<(), SceneError> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| SceneError::init("event loop already consumed"))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .map_err(SceneError::init)?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = &self.config.window;
        let attributes = WindowAttributes::default()
            .with_title(window.title.clone())
            .with_inner_size(LogicalSize::new(window.width, window.height))
            .with_resizable(false);

        let window_handle = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, SceneError::init(e)),
        };
        self.window = Some(window_handle.clone());

        let (width, height) = surface_size(window_handle.inner_size());
        match pollster::block_on(RenderEngine::new(window_handle, width, height, &self.config)) {
            Ok(renderer) => {
                self.render_engine = Some(renderer);
                self.started = Instant::now();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if !self.run_state.is_running() {
            return;
        }

        if let Some(input) = InputEvent::from_window_event(&event) {
            input.apply(&mut self.run_state, &mut self.keys);
            if !self.run_state.is_running() {
                event_loop.exit();
            }
            return;
        }

        if let WindowEvent::RedrawRequested = event {
            let Some(render_engine) = self.render_engine.as_mut() else {
                return;
            };

            let elapsed = self.started.elapsed().as_secs_f32();
            self.frame.advance(elapsed, &self.keys, &self.controller);
            let transforms = FrameTransforms::compute(&self.frame, &self.config);

            render_engine.update(&self.frame, &transforms);
            if let Err(e) = render_engine.render_frame() {
                self.fail(event_loop, e);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.run_state.is_running() {
            return;
        }
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
