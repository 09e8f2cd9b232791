//! The graphics API as the render loop sees it. The method set follows the OpenGL object
//! lifecycle (create, bind, upload, compile, link, query, delete) closely enough that the real
//! implementation is a thin layer of `gl::*` calls, while the fakes in the tests can count every
//! call.
//!
//! Names handed out by `create_*` are raw object names, the same `GLuint`s OpenGL would return.
//! Nothing outside of [`Device`](crate::device::Device) should hold onto them; the device wraps
//! them in move-only handles and keeps track of what is bound.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

use crate::image::DecodedImage;

/// Raw object name, zero meaning "no object".
pub type RawName = u32;

/// Uniform location as reported by the program. Lookups that find nothing return `None`.
pub type UniformLocation = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Buffer binding points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Vertex indices. This binding is part of the vertex array state.
    Element,
}

/// One float attribute in interleaved vertex data. `components` is how many floats the attribute
/// spans and `offset` is where it starts, counted in floats from the start of the vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: i32,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

impl FromStr for Wrap {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "repeat" => Ok(Wrap::Repeat),
            "mirrored-repeat" | "mirror" => Ok(Wrap::MirroredRepeat),
            "clamp-to-edge" | "clamp" => Ok(Wrap::ClampToEdge),
            _ => Err(ConfigError::InvalidValue { name: "wrap mode", value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Nearest,
    Linear,
}

impl FromStr for Filter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nearest" => Ok(Filter::Nearest),
            "linear" => Ok(Filter::Linear),
            _ => Err(ConfigError::InvalidValue { name: "filter", value: s.to_string() }),
        }
    }
}

/// Wrap and filter settings applied to a texture when it is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub min_filter: Filter,
    pub mag_filter: Filter,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
            min_filter: Filter::Linear,
            mag_filter: Filter::Linear,
        }
    }
}

pub trait Graphics {
    fn create_shader(&mut self, stage: ShaderStage) -> RawName;

    /// Uploads the source and compiles it. On failure the error is the shader's info log.
    fn compile_shader(&mut self, shader: RawName, source: &str) -> Result<(), String>;

    fn delete_shader(&mut self, shader: RawName);

    fn create_program(&mut self) -> RawName;

    /// Attaches the shaders and links. On failure the error is the program's info log.
    fn link_program(&mut self, program: RawName, shaders: &[RawName]) -> Result<(), String>;

    fn use_program(&mut self, program: RawName);

    fn uniform_location(&mut self, program: RawName, name: &str) -> Option<UniformLocation>;

    /// Sets a `vec4` uniform on the program currently in use.
    fn set_uniform_4f(&mut self, location: UniformLocation, value: [f32; 4]);

    /// Sets an `int` (or sampler) uniform on the program currently in use.
    fn set_uniform_1i(&mut self, location: UniformLocation, value: i32);

    fn delete_program(&mut self, program: RawName);

    fn create_buffer(&mut self) -> RawName;

    fn bind_buffer(&mut self, target: BufferTarget, buffer: RawName);

    /// Replaces the data store of the buffer bound to `target`, with static-draw usage.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);

    fn delete_buffer(&mut self, buffer: RawName);

    fn create_vertex_array(&mut self) -> RawName;

    fn bind_vertex_array(&mut self, vertex_array: RawName);

    /// Describes and enables one float attribute of the bound array buffer. `stride` is in floats.
    fn vertex_attribute(&mut self, attribute: &VertexAttribute, stride: usize);

    fn delete_vertex_array(&mut self, vertex_array: RawName);

    fn create_texture(&mut self) -> RawName;

    fn active_texture(&mut self, unit: u32);

    fn bind_texture(&mut self, texture: RawName);

    fn texture_parameters(&mut self, params: &SamplerParams);

    /// Uploads mip level 0 of the bound 2D texture.
    fn texture_image(&mut self, image: &DecodedImage);

    fn generate_mipmap(&mut self);

    fn delete_texture(&mut self, texture: RawName);

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    fn clear(&mut self, color: [f32; 4]);

    fn draw_arrays(&mut self, first: i32, count: i32);

    /// Draws triangles from the bound element buffer, which holds `u32` indices.
    fn draw_elements(&mut self, count: i32);
}
