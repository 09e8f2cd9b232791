//! A safe-ish layer over [`Graphics`] that replaces OpenGL's ambient binding state with an
//! explicit context object.
//!
//! OpenGL works like a big global state machine: you bind an object to a binding point and every
//! call after that operates on whatever happens to be bound there, until something else gets
//! bound. That makes it very easy to upload data into the wrong buffer or draw with the wrong
//! program. [`Device`] keeps a record of what's bound, and the only way to operate on a bound
//! object is through the guard returned by the bind call. Dropping the guard puts back whatever
//! was bound before.
//!
//! Objects are represented by move-only handles ([`Shader`], [`Program`], [`Buffer`],
//! [`VertexArray`], [`Texture`]). Deleting one consumes it, so a handle can't be used after it's
//! released or released twice, and the device keeps a ledger of live handles so leaks show up
//! when the loop shuts down.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::ShaderError;
use crate::graphics::{
    BufferTarget, Graphics, RawName, SamplerParams, ShaderStage, VertexAttribute,
};
use crate::image::DecodedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Shader,
    Program,
    Buffer,
    VertexArray,
    Texture,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Shader => write!(f, "shader"),
            HandleKind::Program => write!(f, "program"),
            HandleKind::Buffer => write!(f, "buffer"),
            HandleKind::VertexArray => write!(f, "vertex array"),
            HandleKind::Texture => write!(f, "texture"),
        }
    }
}

/// A compiled (or failed) shader stage.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Shader {
    name: RawName,
    stage: ShaderStage,
}

impl Shader {
    pub fn name(&self) -> RawName { self.name }
}

/// A linked (or failed) set of shader stages.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Program {
    name: RawName,
}

impl Program {
    pub fn name(&self) -> RawName { self.name }
}

/// A buffer of vertex attribute data.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Buffer {
    name: RawName,
}

impl Buffer {
    pub fn name(&self) -> RawName { self.name }
}

/// A buffer of `u32` vertex indices. It can only be bound by attaching it to a vertex array.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct IndexBuffer {
    name: RawName,
}

impl IndexBuffer {
    pub fn name(&self) -> RawName { self.name }
}

/// Vertex array object, which remembers attribute layouts and the attached index buffer.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct VertexArray {
    name: RawName,
}

impl VertexArray {
    pub fn name(&self) -> RawName { self.name }
}

#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Texture {
    name: RawName,
}

impl Texture {
    pub fn name(&self) -> RawName { self.name }
}

/// What the device believes is currently bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    pub program: Option<RawName>,
    pub array_buffer: Option<RawName>,
    pub vertex_array: Option<RawName>,
    pub active_unit: u32,
    pub textures: HashMap<u32, RawName>,
}

/// Ledger summary taken at shutdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Teardown {
    pub created: usize,
    pub released: usize,
    pub leaked: Vec<(HandleKind, RawName)>,
}

impl Teardown {
    pub fn is_clean(&self) -> bool {
        self.leaked.is_empty() && self.created == self.released
    }
}

pub struct Device<G: Graphics> {
    gl: G,
    bindings: Bindings,
    live: HashSet<(HandleKind, RawName)>,
    created: usize,
    released: usize,
}

impl<G: Graphics> Device<G> {
    pub fn new(gl: G) -> Self {
        Self {
            gl,
            bindings: Bindings::default(),
            live: HashSet::new(),
            created: 0,
            released: 0,
        }
    }

    pub fn bindings(&self) -> &Bindings { &self.bindings }

    pub fn live_handles(&self) -> usize { self.live.len() }

    fn register(&mut self, kind: HandleKind, name: RawName) {
        trace!("created {} {}", kind, name);
        self.live.insert((kind, name));
        self.created += 1;
    }

    fn unregister(&mut self, kind: HandleKind, name: RawName) {
        trace!("released {} {}", kind, name);
        if self.live.remove(&(kind, name)) {
            self.released += 1;
        } else {
            // Only reachable if two devices share a graphics collaborator.
            warn!("released {} {} that this device never created", kind, name);
        }
    }

    pub fn create_shader(&mut self, stage: ShaderStage) -> Shader {
        let name = self.gl.create_shader(stage);
        self.register(HandleKind::Shader, name);
        Shader { name, stage }
    }

    pub fn compile_shader(&mut self, shader: &Shader, source: &str) -> Result<(), ShaderError> {
        self.gl
            .compile_shader(shader.name, source)
            .map_err(|log| ShaderError::Compile { stage: shader.stage, log })
    }

    pub fn delete_shader(&mut self, shader: Shader) {
        self.gl.delete_shader(shader.name);
        self.unregister(HandleKind::Shader, shader.name);
    }

    pub fn create_program(&mut self) -> Program {
        let name = self.gl.create_program();
        self.register(HandleKind::Program, name);
        Program { name }
    }

    pub fn link_program(&mut self, program: &Program, shaders: &[&Shader]) -> Result<(), ShaderError> {
        let names: Vec<RawName> = shaders.iter().map(|shader| shader.name).collect();
        self.gl
            .link_program(program.name, &names)
            .map_err(|log| ShaderError::Link { log })
    }

    /// Makes `program` current until the returned guard is dropped.
    pub fn use_program(&mut self, program: &Program) -> ProgramBinding<'_, G> {
        let previous = self.bindings.program.replace(program.name);
        self.gl.use_program(program.name);
        ProgramBinding { device: self, program: program.name, previous }
    }

    pub fn delete_program(&mut self, program: Program) {
        if self.bindings.program == Some(program.name) {
            self.gl.use_program(0);
            self.bindings.program = None;
        }
        self.gl.delete_program(program.name);
        self.unregister(HandleKind::Program, program.name);
    }

    pub fn create_buffer(&mut self) -> Buffer {
        let name = self.gl.create_buffer();
        self.register(HandleKind::Buffer, name);
        Buffer { name }
    }

    /// Binds `buffer` as the array buffer until the guard is dropped.
    pub fn bind_buffer(&mut self, buffer: &Buffer) -> BufferBinding<'_, G> {
        let previous = self.bindings.array_buffer.replace(buffer.name);
        self.gl.bind_buffer(BufferTarget::Array, buffer.name);
        BufferBinding { device: self, previous }
    }

    pub fn delete_buffer(&mut self, buffer: Buffer) {
        if self.bindings.array_buffer == Some(buffer.name) {
            self.bindings.array_buffer = None;
        }
        self.gl.delete_buffer(buffer.name);
        self.unregister(HandleKind::Buffer, buffer.name);
    }

    /// Index buffers have no guard of their own. Unbinding the element target while a vertex
    /// array is bound would detach the indices from it, so they are only ever bound through
    /// [`VertexArrayBinding::attach_index_buffer`].
    pub fn create_index_buffer(&mut self) -> IndexBuffer {
        let name = self.gl.create_buffer();
        self.register(HandleKind::Buffer, name);
        IndexBuffer { name }
    }

    pub fn delete_index_buffer(&mut self, buffer: IndexBuffer) {
        self.gl.delete_buffer(buffer.name);
        self.unregister(HandleKind::Buffer, buffer.name);
    }

    pub fn create_vertex_array(&mut self) -> VertexArray {
        let name = self.gl.create_vertex_array();
        self.register(HandleKind::VertexArray, name);
        VertexArray { name }
    }

    pub fn bind_vertex_array(&mut self, vertex_array: &VertexArray) -> VertexArrayBinding<'_, G> {
        let previous = self.bindings.vertex_array.replace(vertex_array.name);
        self.gl.bind_vertex_array(vertex_array.name);
        VertexArrayBinding { device: self, previous }
    }

    pub fn delete_vertex_array(&mut self, vertex_array: VertexArray) {
        if self.bindings.vertex_array == Some(vertex_array.name) {
            self.gl.bind_vertex_array(0);
            self.bindings.vertex_array = None;
        }
        self.gl.delete_vertex_array(vertex_array.name);
        self.unregister(HandleKind::VertexArray, vertex_array.name);
    }

    pub fn create_texture(&mut self) -> Texture {
        let name = self.gl.create_texture();
        self.register(HandleKind::Texture, name);
        Texture { name }
    }

    /// Binds `texture` to texture unit `unit` until the guard is dropped.
    pub fn bind_texture(&mut self, unit: u32, texture: &Texture) -> TextureBinding<'_, G> {
        self.select_unit(unit);
        let previous = self.bindings.textures.insert(unit, texture.name);
        self.gl.bind_texture(texture.name);
        TextureBinding { device: self, unit, previous }
    }

    pub fn delete_texture(&mut self, texture: Texture) {
        self.bindings.textures.retain(|_, name| *name != texture.name);
        self.gl.delete_texture(texture.name);
        self.unregister(HandleKind::Texture, texture.name);
    }

    fn select_unit(&mut self, unit: u32) {
        self.bindings.active_unit = unit;
        self.gl.active_texture(unit);
    }

    pub fn viewport(&mut self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    pub fn clear(&mut self, color: [f32; 4]) {
        self.gl.clear(color);
    }

    /// Tallies the ledger at shutdown. Anything still live at this point is a leak and gets a warning.
    pub fn audit(&self) -> Teardown {
        let mut leaked: Vec<(HandleKind, RawName)> = self.live.iter().copied().collect();
        leaked.sort_by_key(|(_, name)| *name);
        for (kind, name) in &leaked {
            warn!("{} {} was never released", kind, name);
        }

        Teardown { created: self.created, released: self.released, leaked }
    }
}

pub struct ProgramBinding<'d, G: Graphics> {
    device: &'d mut Device<G>,
    program: RawName,
    previous: Option<RawName>,
}

impl<'d, G: Graphics> ProgramBinding<'d, G> {
    /// Sets a `vec4` uniform by name. Returns `false` if the program has no such uniform, which is
    /// also what a program that failed to link reports.
    pub fn set_uniform_4f(&mut self, name: &str, value: [f32; 4]) -> bool {
        match self.device.gl.uniform_location(self.program, name) {
            Some(location) => {
                self.device.gl.set_uniform_4f(location, value);
                true
            }
            None => false,
        }
    }

    pub fn set_uniform_1i(&mut self, name: &str, value: i32) -> bool {
        match self.device.gl.uniform_location(self.program, name) {
            Some(location) => {
                self.device.gl.set_uniform_1i(location, value);
                true
            }
            None => false,
        }
    }
}

impl<'d, G: Graphics> Deref for ProgramBinding<'d, G> {
    type Target = Device<G>;

    fn deref(&self) -> &Self::Target { self.device }
}

impl<'d, G: Graphics> DerefMut for ProgramBinding<'d, G> {
    fn deref_mut(&mut self) -> &mut Self::Target { self.device }
}

impl<'d, G: Graphics> Drop for ProgramBinding<'d, G> {
    fn drop(&mut self) {
        self.device.gl.use_program(self.previous.unwrap_or(0));
        self.device.bindings.program = self.previous;
    }
}

pub struct BufferBinding<'d, G: Graphics> {
    device: &'d mut Device<G>,
    previous: Option<RawName>,
}

impl<'d, G: Graphics> BufferBinding<'d, G> {
    /// Replaces the buffer's contents.
    pub fn upload(&mut self, data: &[u8]) {
        self.device.gl.buffer_data(BufferTarget::Array, data);
    }
}

impl<'d, G: Graphics> Deref for BufferBinding<'d, G> {
    type Target = Device<G>;

    fn deref(&self) -> &Self::Target { self.device }
}

impl<'d, G: Graphics> DerefMut for BufferBinding<'d, G> {
    fn deref_mut(&mut self) -> &mut Self::Target { self.device }
}

impl<'d, G: Graphics> Drop for BufferBinding<'d, G> {
    fn drop(&mut self) {
        self.device.gl.bind_buffer(BufferTarget::Array, self.previous.unwrap_or(0));
        self.device.bindings.array_buffer = self.previous;
    }
}

pub struct VertexArrayBinding<'d, G: Graphics> {
    device: &'d mut Device<G>,
    previous: Option<RawName>,
}

impl<'d, G: Graphics> VertexArrayBinding<'d, G> {
    /// Describes how the interleaved floats in `buffer` map onto shader inputs. `stride` is the
    /// number of floats per vertex. The buffer is only bound for the duration of the call; the
    /// vertex array keeps the association.
    pub fn attach_vertex_buffer(&mut self, buffer: &Buffer, attributes: &[VertexAttribute], stride: usize) {
        let bound = self.device.bind_buffer(buffer);
        for attribute in attributes {
            bound.device.gl.vertex_attribute(attribute, stride);
        }
    }

    /// Binds `buffer` as this vertex array's index buffer and fills it with `indices`.
    pub fn attach_index_buffer(&mut self, buffer: &IndexBuffer, indices: &[u32]) {
        self.device.gl.bind_buffer(BufferTarget::Element, buffer.name);
        self.device.gl.buffer_data(BufferTarget::Element, bytemuck::cast_slice(indices));
    }

    pub fn draw_arrays(&mut self, first: i32, count: i32) {
        self.device.gl.draw_arrays(first, count);
    }

    pub fn draw_elements(&mut self, count: i32) {
        self.device.gl.draw_elements(count);
    }
}

impl<'d, G: Graphics> Deref for VertexArrayBinding<'d, G> {
    type Target = Device<G>;

    fn deref(&self) -> &Self::Target { self.device }
}

impl<'d, G: Graphics> DerefMut for VertexArrayBinding<'d, G> {
    fn deref_mut(&mut self) -> &mut Self::Target { self.device }
}

impl<'d, G: Graphics> Drop for VertexArrayBinding<'d, G> {
    fn drop(&mut self) {
        self.device.gl.bind_vertex_array(self.previous.unwrap_or(0));
        self.device.bindings.vertex_array = self.previous;
    }
}

pub struct TextureBinding<'d, G: Graphics> {
    device: &'d mut Device<G>,
    unit: u32,
    previous: Option<RawName>,
}

impl<'d, G: Graphics> TextureBinding<'d, G> {
    pub fn parameters(&mut self, params: &SamplerParams) {
        self.reselect();
        self.device.gl.texture_parameters(params);
    }

    pub fn upload(&mut self, image: &DecodedImage) {
        self.reselect();
        self.device.gl.texture_image(image);
    }

    pub fn generate_mipmap(&mut self) {
        self.reselect();
        self.device.gl.generate_mipmap();
    }

    // Something bound through the deref may have switched units in the meantime.
    fn reselect(&mut self) {
        if self.device.bindings.active_unit != self.unit {
            self.device.select_unit(self.unit);
        }
    }
}

impl<'d, G: Graphics> Deref for TextureBinding<'d, G> {
    type Target = Device<G>;

    fn deref(&self) -> &Self::Target { self.device }
}

impl<'d, G: Graphics> DerefMut for TextureBinding<'d, G> {
    fn deref_mut(&mut self) -> &mut Self::Target { self.device }
}

impl<'d, G: Graphics> Drop for TextureBinding<'d, G> {
    fn drop(&mut self) {
        self.reselect();
        self.device.gl.bind_texture(self.previous.unwrap_or(0));
        match self.previous {
            Some(name) => self.device.bindings.textures.insert(self.unit, name),
            None => self.device.bindings.textures.remove(&self.unit),
        };
    }
}
