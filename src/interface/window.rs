use std::collections::HashSet;
use std::ffi::c_void;
use std::time::Instant;

use glutin::dpi::LogicalSize;
use glutin::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use glutin::event_loop::{ControlFlow, EventLoop};
use glutin::platform::desktop::EventLoopExtDesktop;
use glutin::window::WindowBuilder;
use glutin::{Api, ContextBuilder, GlProfile, GlRequest, PossiblyCurrent, WindowedContext};

use skeleton::config::Profile;
use skeleton::{Backend, ContextConfig, ContextError, Key, KeyState, PresentError, SurfaceEvent, Window};

use crate::graphics::opengl::GlGraphics;

fn virtual_key(key: Key) -> VirtualKeyCode {
    match key {
        Key::Num0 => VirtualKeyCode::Key0,
        Key::Num1 => VirtualKeyCode::Key1,
        Key::Num2 => VirtualKeyCode::Key2,
        Key::Num3 => VirtualKeyCode::Key3,
        Key::Num4 => VirtualKeyCode::Key4,
        Key::Num5 => VirtualKeyCode::Key5,
        Key::Num6 => VirtualKeyCode::Key6,
        Key::Num7 => VirtualKeyCode::Key7,
        Key::Num8 => VirtualKeyCode::Key8,
        Key::Num9 => VirtualKeyCode::Key9,
        Key::Q => VirtualKeyCode::Q,
        Key::W => VirtualKeyCode::W,
        Key::A => VirtualKeyCode::A,
        Key::S => VirtualKeyCode::S,
        Key::D => VirtualKeyCode::D,
        Key::X => VirtualKeyCode::X,
        Key::Escape => VirtualKeyCode::Escape,
        Key::Space => VirtualKeyCode::Space,
        Key::Enter => VirtualKeyCode::Return,
    }
}

/// A window with a current OpenGL context. The event loop is pumped once per frame with
/// `run_return` instead of handing control to `EventLoop::run`, so the render loop stays in
/// charge.
pub struct GlutinWindow {
    // Declared first so the context is dropped before the event loop it was built on.
    context: WindowedContext<PossiblyCurrent>,
    events: EventLoop<()>,
    pressed: HashSet<VirtualKeyCode>,
    should_close: bool,
    started: Instant,
}

impl GlutinWindow {
    pub fn create(config: &ContextConfig) -> Result<(Self, GlGraphics), ContextError> {
        let events = EventLoop::new();
        let window = WindowBuilder::new()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64));

        let profile = match config.profile {
            Profile::Core => GlProfile::Core,
            Profile::Compatibility => GlProfile::Compatibility,
        };

        let context = ContextBuilder::new()
            .with_gl(GlRequest::Specific(Api::OpenGl, config.version))
            .with_gl_profile(profile)
            .with_vsync(config.vsync)
            .build_windowed(window, &events)
            .map_err(|e| ContextError::WindowCreation(e.to_string()))?;

        let context = unsafe { context.make_current() }
            .map_err(|(_, e)| ContextError::MakeCurrent(e.to_string()))?;

        gl::load_with(|s| context.get_proc_address(s) as *const c_void);
        if !gl::Viewport::is_loaded() || !gl::CreateShader::is_loaded() {
            return Err(ContextError::Loader);
        }

        let window = Self {
            context,
            events,
            pressed: HashSet::new(),
            should_close: false,
            started: Instant::now(),
        };

        // Safe: the pointers were just loaded and the context is current on this thread.
        let graphics = unsafe { GlGraphics::assume_current() };

        Ok((window, graphics))
    }
}

impl Window for GlutinWindow {
    fn get_key(&self, key: Key) -> KeyState {
        if self.pressed.contains(&virtual_key(key)) {
            KeyState::Pressed
        } else {
            KeyState::Released
        }
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    fn swap_buffers(&mut self) -> Result<(), PresentError> {
        self.context.swap_buffers().map_err(|e| PresentError(e.to_string()))
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        let mut surface_events = Vec::new();
        let pressed = &mut self.pressed;
        let context = &self.context;

        self.events.run_return(|event, _, control_flow| {
            *control_flow = ControlFlow::Poll;

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        context.resize(size);
                        surface_events.push(SurfaceEvent::Resized {
                            width: size.width,
                            height: size.height,
                        });
                    }
                    WindowEvent::CloseRequested => surface_events.push(SurfaceEvent::CloseRequested),
                    WindowEvent::KeyboardInput {
                        input: KeyboardInput { state, virtual_keycode: Some(code), .. },
                        ..
                    } => match state {
                        ElementState::Pressed => { pressed.insert(code); }
                        ElementState::Released => { pressed.remove(&code); }
                    },
                    // Keys released while unfocused never report back.
                    WindowEvent::Focused(false) => pressed.clear(),
                    _ => {}
                },

                // Everything queued so far has been handled; hand control back to the frame.
                Event::MainEventsCleared => *control_flow = ControlFlow::Exit,

                _ => {}
            }
        });

        surface_events
    }

    fn time(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// Creates glutin windows with OpenGL contexts.
pub struct GlutinBackend;

impl Backend for GlutinBackend {
    type Window = GlutinWindow;
    type Graphics = GlGraphics;

    fn create_context(&mut self, config: &ContextConfig) -> Result<(GlutinWindow, GlGraphics), ContextError> {
        GlutinWindow::create(config)
    }
}
