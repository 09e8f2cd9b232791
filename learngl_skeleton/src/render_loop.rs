use crate::config::LoopConfig;
use crate::device::{Device, Teardown};
use crate::error::ContextError;
use crate::graphics::Graphics;
use crate::image::ImageDecoder;
use crate::pipeline::{Pipeline, PipelineDesc};
use crate::window::{Backend, SurfaceEvent, Window};

/// The loop only ever moves forward through these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Terminated,
}

pub struct RenderLoop<W: Window, G: Graphics> {
    window: W,
    device: Device<G>,
    config: LoopConfig,
    pipeline: Option<Pipeline>,
    state: LoopState,
    frames: u64,
}

impl<W: Window, G: Graphics> RenderLoop<W, G> {
    pub fn new(window: W, graphics: G, config: LoopConfig) -> Self {
        Self {
            window,
            device: Device::new(graphics),
            config,
            pipeline: None,
            state: LoopState::Uninitialized,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState { self.state }

    pub fn frames(&self) -> u64 { self.frames }

    pub fn window(&self) -> &W { &self.window }

    /// Uploads the payload, if there is one. Shader and texture failures are logged by the
    /// pipeline and don't stop the loop from starting.
    pub fn initialize<D: ImageDecoder + ?Sized>(&mut self, payload: Option<&PipelineDesc>, decoder: &D) {
        if self.state != LoopState::Uninitialized {
            warn!("render loop is already {:?}, not initializing again", self.state);
            return;
        }

        let device = &mut self.device;
        self.pipeline = payload.map(|desc| Pipeline::build(device, desc, decoder));
        self.state = LoopState::Running;
        info!(
            "render loop running ({}), press {} to close",
            if self.pipeline.is_some() { "drawing" } else { "clear only" },
            self.config.close_key
        );
    }

    /// One iteration: input, clear, draw, present, events.
    pub fn frame(&mut self) {
        if self.state != LoopState::Running {
            warn!("frame requested while {:?}", self.state);
            return;
        }

        self.process_input();

        self.device.clear(self.config.clear_color);
        if let Some(pipeline) = &self.pipeline {
            pipeline.draw(&mut self.device, self.window.time());
        }

        if let Err(e) = self.window.swap_buffers() {
            error!("{}", e);
        }

        for event in self.window.poll_events() {
            self.handle(event);
        }

        self.frames += 1;
    }

    // Only sets the flag; the current frame still gets drawn and presented.
    fn process_input(&mut self) {
        if self.window.get_key(self.config.close_key).is_pressed() {
            debug!("{} pressed, closing after this frame", self.config.close_key);
            self.window.set_should_close(true);
        }
    }

    fn handle(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Resized { width, height } => {
                debug!("surface resized to {}x{}", width, height);
                self.device.viewport(width, height);
            }
            SurfaceEvent::CloseRequested => self.window.set_should_close(true),
        }
    }

    /// Releases everything the payload created. Calling this again is a no-op.
    pub fn terminate(&mut self) -> Teardown {
        if self.state == LoopState::Terminated {
            return Teardown::default();
        }

        if let Some(pipeline) = self.pipeline.take() {
            pipeline.release(&mut self.device);
        }
        self.state = LoopState::Terminated;

        let teardown = self.device.audit();
        info!(
            "render loop terminated after {} frames, released {} of {} objects",
            self.frames, teardown.released, teardown.created
        );
        teardown
    }

    /// Draws frames until the close condition is set, then tears down. The window, and with it the
    /// context, goes last.
    pub fn run(mut self) -> Teardown {
        while self.state == LoopState::Running && !self.window.should_close() {
            self.frame();
        }

        let teardown = self.terminate();
        drop(self);
        teardown
    }
}

/// Creates the context and runs the loop to completion. Failing to get a context is the only
/// error that reaches the caller.
pub fn launch<B: Backend, D: ImageDecoder + ?Sized>(
    backend: &mut B,
    config: LoopConfig,
    payload: Option<&PipelineDesc>,
    decoder: &D,
) -> Result<Teardown, ContextError> {
    let (window, graphics) = backend.create_context(&config.context)?;
    info!(
        "created {}x{} OpenGL {}.{} context \"{}\"",
        config.context.width,
        config.context.height,
        config.context.version.0,
        config.context.version.1,
        config.context.title
    );

    let mut render_loop = RenderLoop::new(window, graphics, config);
    render_loop.initialize(payload, decoder);
    Ok(render_loop.run())
}
