//! Everything a lesson uploads once and then draws every frame: a program, a vertex buffer with
//! its layout, and optionally an index buffer and a texture.

use std::fs;
use std::path::PathBuf;

use crate::device::{Buffer, Device, IndexBuffer, Program, Shader, Texture, VertexArray};
use crate::error::ShaderError;
use crate::graphics::{Graphics, SamplerParams, ShaderStage, VertexAttribute};
use crate::image::ImageDecoder;

/// Where a shader stage's text comes from. The text is passed through to the compiler untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource {
    Inline(String),
    File(PathBuf),
}

impl ShaderSource {
    /// An unreadable file is reported and compiled as an empty source, which then fails to compile
    /// like any other broken shader.
    fn load(&self, stage: ShaderStage) -> String {
        match self {
            ShaderSource::Inline(text) => text.clone(),
            ShaderSource::File(path) => fs::read_to_string(path).unwrap_or_else(|e| {
                let error = ShaderError::Source { stage, path: path.clone(), reason: e.to_string() };
                error!("{}", error);
                String::new()
            }),
        }
    }
}

/// Layout of one interleaved vertex, all attributes being `f32`s.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        self.attributes.iter().map(|attribute| attribute.components as usize).sum()
    }

    pub fn vertex_count(&self, floats: usize) -> usize {
        match self.stride() {
            0 => 0,
            stride => floats / stride,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub path: PathBuf,
    /// Sampler uniform the texture is bound to, on unit 0.
    pub sampler: String,
    pub params: SamplerParams,
}

/// Uniforms that change every frame.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformAnimation {
    /// A green that pulses with time, written to a `vec4` uniform.
    Pulse { uniform: String },
}

impl UniformAnimation {
    pub fn value(&self, time: f64) -> [f32; 4] {
        match self {
            UniformAnimation::Pulse { .. } => {
                let green = (time.sin() / 2.0 + 0.5) as f32;
                [0.0, green, 0.0, 1.0]
            }
        }
    }

    fn uniform(&self) -> &str {
        match self {
            UniformAnimation::Pulse { uniform } => uniform,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDesc {
    pub vertex_shader: ShaderSource,
    pub fragment_shader: ShaderSource,
    pub vertices: Vec<f32>,
    pub layout: VertexLayout,
    pub indices: Option<Vec<u32>>,
    pub texture: Option<TextureDesc>,
    pub animation: Option<UniformAnimation>,
}

enum DrawCall {
    Arrays { count: i32 },
    Elements { count: i32 },
}

/// The uploaded state. Owns every handle it created; [`Pipeline::release`] gives them all back.
pub struct Pipeline {
    program: Program,
    vertex_buffer: Buffer,
    vertex_array: VertexArray,
    index_buffer: Option<IndexBuffer>,
    texture: Option<Texture>,
    animation: Option<UniformAnimation>,
    draw: DrawCall,
}

impl Pipeline {
    /// Compiles, links and uploads everything in `desc`. Shader and texture problems are logged
    /// and leave a pipeline that draws garbage or nothing, never an error.
    pub fn build<G: Graphics, D: ImageDecoder + ?Sized>(
        device: &mut Device<G>,
        desc: &PipelineDesc,
        decoder: &D,
    ) -> Self {
        let program = build_program(device, &desc.vertex_shader, &desc.fragment_shader);

        let vertex_buffer = device.create_buffer();
        device.bind_buffer(&vertex_buffer).upload(bytemuck::cast_slice(&desc.vertices));

        let vertex_array = device.create_vertex_array();
        let index_buffer = {
            let mut bound = device.bind_vertex_array(&vertex_array);
            bound.attach_vertex_buffer(&vertex_buffer, &desc.layout.attributes, desc.layout.stride());

            desc.indices.as_ref().map(|indices| {
                let buffer = bound.create_index_buffer();
                bound.attach_index_buffer(&buffer, indices);
                buffer
            })
        };

        let texture = desc.texture.as_ref().map(|texture| {
            let handle = load_texture(device, texture, decoder);
            if !device.use_program(&program).set_uniform_1i(&texture.sampler, 0) {
                debug!("program has no active sampler named {}", texture.sampler);
            }
            handle
        });

        let draw = match &desc.indices {
            Some(indices) => DrawCall::Elements { count: indices.len() as i32 },
            None => DrawCall::Arrays { count: desc.layout.vertex_count(desc.vertices.len()) as i32 },
        };

        Self {
            program,
            vertex_buffer,
            vertex_array,
            index_buffer,
            texture,
            animation: desc.animation.clone(),
            draw,
        }
    }

    /// Issues this pipeline's one draw call.
    pub fn draw<G: Graphics>(&self, device: &mut Device<G>, time: f64) {
        let mut program = device.use_program(&self.program);

        if let Some(animation) = &self.animation {
            program.set_uniform_4f(animation.uniform(), animation.value(time));
        }

        match &self.texture {
            Some(texture) => {
                let mut bound = program.bind_texture(0, texture);
                self.submit(&mut *bound);
            }
            None => self.submit(&mut *program),
        }
    }

    fn submit<G: Graphics>(&self, device: &mut Device<G>) {
        let mut bound = device.bind_vertex_array(&self.vertex_array);
        match self.draw {
            DrawCall::Arrays { count } => bound.draw_arrays(0, count),
            DrawCall::Elements { count } => bound.draw_elements(count),
        }
    }

    /// Deletes every object the pipeline owns. Consuming `self` is what guarantees each one is
    /// deleted exactly once.
    pub fn release<G: Graphics>(self, device: &mut Device<G>) {
        device.delete_vertex_array(self.vertex_array);
        device.delete_buffer(self.vertex_buffer);
        if let Some(buffer) = self.index_buffer {
            device.delete_index_buffer(buffer);
        }
        if let Some(texture) = self.texture {
            device.delete_texture(texture);
        }
        device.delete_program(self.program);
    }
}

fn compile<G: Graphics>(device: &mut Device<G>, stage: ShaderStage, source: &ShaderSource) -> Shader {
    let shader = device.create_shader(stage);
    let text = source.load(stage);
    if let Err(e) = device.compile_shader(&shader, &text) {
        error!("{}", e);
    }
    shader
}

fn build_program<G: Graphics>(
    device: &mut Device<G>,
    vertex: &ShaderSource,
    fragment: &ShaderSource,
) -> Program {
    let vertex = compile(device, ShaderStage::Vertex, vertex);
    let fragment = compile(device, ShaderStage::Fragment, fragment);

    let program = device.create_program();
    if let Err(e) = device.link_program(&program, &[&vertex, &fragment]) {
        error!("{}", e);
    }

    // The linked program keeps what it needs from the stages.
    device.delete_shader(vertex);
    device.delete_shader(fragment);

    program
}

fn load_texture<G: Graphics, D: ImageDecoder + ?Sized>(
    device: &mut Device<G>,
    desc: &TextureDesc,
    decoder: &D,
) -> Texture {
    let texture = device.create_texture();
    let mut bound = device.bind_texture(0, &texture);
    bound.parameters(&desc.params);

    match decoder.decode(&desc.path) {
        Ok(image) => {
            debug!(
                "decoded {} ({}x{}, {} channels)",
                desc.path.display(), image.width, image.height, image.channels
            );
            bound.upload(&image);
            bound.generate_mipmap();
            // The pixels are on the GPU now.
            drop(image);
        }
        Err(e) => error!("Failed to load texture: {}", e),
    }

    drop(bound);
    texture
}
