//! Instrumented stand-ins for the collaborators. Every call lands in a shared [`Journal`] so tests
//! can count creates against deletes, draws against presents, and so on.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use std::sync::Once;

use crate::config::ContextConfig;
use crate::error::{ContextError, DecodeError, PresentError};
use crate::graphics::{
    BufferTarget, Graphics, RawName, SamplerParams, ShaderStage, UniformLocation, VertexAttribute,
};
use crate::image::{DecodedImage, ImageDecoder};
use crate::window::{Backend, Key, KeyState, SurfaceEvent, Window};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, RawName),
    CompileShader(RawName),
    DeleteShader(RawName),
    CreateProgram(RawName),
    LinkProgram(RawName, Vec<RawName>),
    UseProgram(RawName),
    Uniform4f(UniformLocation, [f32; 4]),
    Uniform1i(UniformLocation, i32),
    DeleteProgram(RawName),
    CreateBuffer(RawName),
    BindBuffer(BufferTarget, RawName),
    BufferData(BufferTarget, usize),
    DeleteBuffer(RawName),
    CreateVertexArray(RawName),
    BindVertexArray(RawName),
    VertexAttribute(VertexAttribute, usize),
    DeleteVertexArray(RawName),
    CreateTexture(RawName),
    ActiveTexture(u32),
    BindTexture(RawName),
    TextureParameters(SamplerParams),
    TextureImage { width: u32, height: u32, channels: u8 },
    GenerateMipmap,
    DeleteTexture(RawName),
    Viewport(i32, i32, i32, i32),
    Clear([f32; 4]),
    DrawArrays(i32, i32),
    DrawElements(i32),
    Present,
    ContextReleased,
}

impl Call {
    pub fn created(&self) -> Option<RawName> {
        match *self {
            Call::CreateShader(_, name)
            | Call::CreateProgram(name)
            | Call::CreateBuffer(name)
            | Call::CreateVertexArray(name)
            | Call::CreateTexture(name) => Some(name),
            _ => None,
        }
    }

    pub fn deleted(&self) -> Option<RawName> {
        match *self {
            Call::DeleteShader(name)
            | Call::DeleteProgram(name)
            | Call::DeleteBuffer(name)
            | Call::DeleteVertexArray(name)
            | Call::DeleteTexture(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Call::DrawArrays(..) | Call::DrawElements(_))
    }
}

/// Shared, cloneable call log.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn record(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.0.borrow().iter().filter(|call| predicate(call)).count()
    }

    pub fn created(&self) -> Vec<RawName> {
        self.0.borrow().iter().filter_map(Call::created).collect()
    }

    pub fn deleted(&self) -> Vec<RawName> {
        self.0.borrow().iter().filter_map(Call::deleted).collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub struct FakeGraphics {
    journal: Journal,
    next_name: RawName,
    stages: HashMap<RawName, ShaderStage>,
    failing_stages: HashSet<ShaderStage>,
    fail_link: bool,
    uniforms: HashMap<String, UniformLocation>,
}

impl FakeGraphics {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            next_name: 1,
            stages: HashMap::new(),
            failing_stages: HashSet::new(),
            fail_link: false,
            uniforms: HashMap::new(),
        }
    }

    pub fn failing_stage(mut self, stage: ShaderStage) -> Self {
        self.failing_stages.insert(stage);
        self
    }

    pub fn failing_link(mut self) -> Self {
        self.fail_link = true;
        self
    }

    fn name(&mut self) -> RawName {
        let name = self.next_name;
        self.next_name += 1;
        name
    }
}

impl Graphics for FakeGraphics {
    fn create_shader(&mut self, stage: ShaderStage) -> RawName {
        let name = self.name();
        self.stages.insert(name, stage);
        self.journal.record(Call::CreateShader(stage, name));
        name
    }

    fn compile_shader(&mut self, shader: RawName, source: &str) -> Result<(), String> {
        self.journal.record(Call::CompileShader(shader));
        let stage = self.stages.get(&shader).copied();

        if source.trim().is_empty() {
            Err(String::from("0:1(1): error: empty source"))
        } else if stage.map_or(false, |stage| self.failing_stages.contains(&stage)) {
            Err(String::from("0:3(5): error: syntax error, unexpected IDENTIFIER"))
        } else {
            Ok(())
        }
    }

    fn delete_shader(&mut self, shader: RawName) {
        self.journal.record(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> RawName {
        let name = self.name();
        self.journal.record(Call::CreateProgram(name));
        name
    }

    fn link_program(&mut self, program: RawName, shaders: &[RawName]) -> Result<(), String> {
        self.journal.record(Call::LinkProgram(program, shaders.to_vec()));
        if self.fail_link {
            Err(String::from("error: vertex shader output `ourColor' not written"))
        } else {
            Ok(())
        }
    }

    fn use_program(&mut self, program: RawName) {
        self.journal.record(Call::UseProgram(program));
    }

    fn uniform_location(&mut self, _program: RawName, name: &str) -> Option<UniformLocation> {
        if self.fail_link {
            return None;
        }
        let next = self.uniforms.len() as UniformLocation;
        Some(*self.uniforms.entry(name.to_string()).or_insert(next))
    }

    fn set_uniform_4f(&mut self, location: UniformLocation, value: [f32; 4]) {
        self.journal.record(Call::Uniform4f(location, value));
    }

    fn set_uniform_1i(&mut self, location: UniformLocation, value: i32) {
        self.journal.record(Call::Uniform1i(location, value));
    }

    fn delete_program(&mut self, program: RawName) {
        self.journal.record(Call::DeleteProgram(program));
    }

    fn create_buffer(&mut self) -> RawName {
        let name = self.name();
        self.journal.record(Call::CreateBuffer(name));
        name
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: RawName) {
        self.journal.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        self.journal.record(Call::BufferData(target, data.len()));
    }

    fn delete_buffer(&mut self, buffer: RawName) {
        self.journal.record(Call::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&mut self) -> RawName {
        let name = self.name();
        self.journal.record(Call::CreateVertexArray(name));
        name
    }

    fn bind_vertex_array(&mut self, vertex_array: RawName) {
        self.journal.record(Call::BindVertexArray(vertex_array));
    }

    fn vertex_attribute(&mut self, attribute: &VertexAttribute, stride: usize) {
        self.journal.record(Call::VertexAttribute(*attribute, stride));
    }

    fn delete_vertex_array(&mut self, vertex_array: RawName) {
        self.journal.record(Call::DeleteVertexArray(vertex_array));
    }

    fn create_texture(&mut self) -> RawName {
        let name = self.name();
        self.journal.record(Call::CreateTexture(name));
        name
    }

    fn active_texture(&mut self, unit: u32) {
        self.journal.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&mut self, texture: RawName) {
        self.journal.record(Call::BindTexture(texture));
    }

    fn texture_parameters(&mut self, params: &SamplerParams) {
        self.journal.record(Call::TextureParameters(*params));
    }

    fn texture_image(&mut self, image: &DecodedImage) {
        self.journal.record(Call::TextureImage {
            width: image.width,
            height: image.height,
            channels: image.channels,
        });
    }

    fn generate_mipmap(&mut self) {
        self.journal.record(Call::GenerateMipmap);
    }

    fn delete_texture(&mut self, texture: RawName) {
        self.journal.record(Call::DeleteTexture(texture));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.journal.record(Call::Viewport(x, y, width, height));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.journal.record(Call::Clear(color));
    }

    fn draw_arrays(&mut self, first: i32, count: i32) {
        self.journal.record(Call::DrawArrays(first, count));
    }

    fn draw_elements(&mut self, count: i32) {
        self.journal.record(Call::DrawElements(count));
    }
}

/// Scripted window. Frames are counted by `poll_events` calls, so "frame 0" is everything up to
/// and including the first poll.
pub struct FakeWindow {
    journal: Journal,
    frame: u32,
    should_close: bool,
    presses: HashSet<(u32, Key)>,
    events: HashMap<u32, Vec<SurfaceEvent>>,
    fail_present: bool,
    frame_limit: u32,
}

impl FakeWindow {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            frame: 0,
            should_close: false,
            presses: HashSet::new(),
            events: HashMap::new(),
            fail_present: false,
            frame_limit: 1_000,
        }
    }

    /// `key` reads as pressed for the whole of frame `frame`.
    pub fn press(mut self, frame: u32, key: Key) -> Self {
        self.presses.insert((frame, key));
        self
    }

    /// `event` is delivered by the poll at the end of frame `frame`.
    pub fn event(mut self, frame: u32, event: SurfaceEvent) -> Self {
        self.events.entry(frame).or_insert_with(Vec::new).push(event);
        self
    }

    pub fn failing_present(mut self) -> Self {
        self.fail_present = true;
        self
    }
}

impl Window for FakeWindow {
    fn get_key(&self, key: Key) -> KeyState {
        if self.presses.contains(&(self.frame, key)) {
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
        self.journal.record(Call::Present);
        if self.fail_present {
            Err(PresentError(String::from("surface lost")))
        } else {
            Ok(())
        }
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        let events = self.events.remove(&self.frame).unwrap_or_default();
        self.frame += 1;
        // Keeps a broken close path from hanging the test run.
        if self.frame >= self.frame_limit {
            self.should_close = true;
        }
        events
    }

    fn time(&self) -> f64 {
        self.frame as f64 * 0.25
    }
}

impl Drop for FakeWindow {
    fn drop(&mut self) {
        self.journal.record(Call::ContextReleased);
    }
}

pub struct FakeBackend {
    window: Option<FakeWindow>,
    graphics: Option<FakeGraphics>,
    fail: bool,
    pub requested: Option<ContextConfig>,
}

impl FakeBackend {
    pub fn new(window: FakeWindow, graphics: FakeGraphics) -> Self {
        Self {
            window: Some(window),
            graphics: Some(graphics),
            fail: false,
            requested: None,
        }
    }

    pub fn failing() -> Self {
        Self { window: None, graphics: None, fail: true, requested: None }
    }
}

impl Backend for FakeBackend {
    type Window = FakeWindow;
    type Graphics = FakeGraphics;

    fn create_context(&mut self, config: &ContextConfig) -> Result<(FakeWindow, FakeGraphics), ContextError> {
        self.requested = Some(config.clone());
        if self.fail {
            return Err(ContextError::WindowCreation(String::from("no display")));
        }
        match (self.window.take(), self.graphics.take()) {
            (Some(window), Some(graphics)) => Ok((window, graphics)),
            _ => Err(ContextError::WindowCreation(String::from("context already created"))),
        }
    }
}

/// Decoder that either always succeeds with a fixed image or always fails.
pub struct FakeDecoder {
    image: Option<DecodedImage>,
}

impl FakeDecoder {
    pub fn with_image(width: u32, height: u32, channels: u8) -> Self {
        let len = (width * height) as usize * channels as usize;
        Self {
            image: Some(DecodedImage { pixels: vec![0x7f; len], width, height, channels }),
        }
    }

    pub fn failing() -> Self {
        Self { image: None }
    }
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        self.image.clone().ok_or_else(|| DecodeError::Io {
            path: path.to_path_buf(),
            reason: String::from("No such file or directory (os error 2)"),
        })
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<(log::Level, String)>> = RefCell::new(Vec::new());
}

/// Routes log records into a per-thread buffer. Each test runs on its own thread, so captures
/// don't bleed into each other.
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let line = record.args().to_string();
        CAPTURED.with(|captured| captured.borrow_mut().push((record.level(), line)));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

pub struct LogCapture;

impl LogCapture {
    pub fn errors(&self) -> Vec<String> {
        CAPTURED.with(|captured| {
            captured
                .borrow()
                .iter()
                .filter(|(level, _)| *level == log::Level::Error)
                .map(|(_, line)| line.clone())
                .collect()
        })
    }
}

/// Starts capturing this thread's log output, dropping anything captured before.
pub fn capture_logs() -> LogCapture {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
    CAPTURED.with(|captured| captured.borrow_mut().clear());
    LogCapture
}
