//! The OpenGL implementation of the render loop's graphics collaborator.
//!
//! Every method is a handful of raw `gl::*` calls. None of this checks what's bound; that's the
//! job of the skeleton's `Device`, which is the only thing that calls into here. If you're
//! following along with [Learn OpenGL](https://learnopengl.com/), the "Getting started" chapters
//! map onto these methods almost call for call.

use std::ffi::{c_void, CString};
use std::marker::PhantomData;
use std::mem::size_of;
use std::ptr::null;

use gl;
use gl::types::*;

use skeleton::graphics::{
    BufferTarget, Filter, Graphics, RawName, SamplerParams, ShaderStage, UniformLocation,
    VertexAttribute, Wrap,
};
use skeleton::DecodedImage;

use super::utils::*;

/// Marker for "the GL function pointers are loaded and a context is current on this thread".
/// It's deliberately neither `Send` nor `Sync`, since a GL context belongs to one thread.
pub struct GlGraphics {
    _current: PhantomData<*const ()>,
}

impl GlGraphics {
    /// # Safety
    ///
    /// `gl::load_with` must have been called and the context must be current on this thread for
    /// as long as the value lives.
    pub unsafe fn assume_current() -> Self {
        Self { _current: PhantomData }
    }
}

fn buffer_target(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::Element => gl::ELEMENT_ARRAY_BUFFER,
    }
}

fn wrap_mode(wrap: Wrap) -> GLint {
    (match wrap {
        Wrap::Repeat => gl::REPEAT,
        Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
        Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
    }) as GLint
}

fn filter_mode(filter: Filter) -> GLint {
    (match filter {
        Filter::Nearest => gl::NEAREST,
        Filter::Linear => gl::LINEAR,
    }) as GLint
}

/// Pixel format for an image with `channels` 8-bit channels.
fn pixel_format(channels: u8) -> GLenum {
    match channels {
        1 => gl::RED,
        2 => gl::RG,
        3 => gl::RGB,
        _ => gl::RGBA,
    }
}

impl Graphics for GlGraphics {
    fn create_shader(&mut self, stage: ShaderStage) -> RawName {
        let kind = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        unsafe { gl::CreateShader(kind) }
    }

    fn compile_shader(&mut self, shader: RawName, source: &str) -> Result<(), String> {
        compile_shader_source(shader, &source_to_cstring(source))
    }

    fn delete_shader(&mut self, shader: RawName) {
        unsafe { gl::DeleteShader(shader); }
    }

    fn create_program(&mut self) -> RawName {
        unsafe { gl::CreateProgram() }
    }

    fn link_program(&mut self, program: RawName, shaders: &[RawName]) -> Result<(), String> {
        link_program_shaders(program, shaders)
    }

    fn use_program(&mut self, program: RawName) {
        unsafe { gl::UseProgram(program); }
    }

    fn uniform_location(&mut self, program: RawName, name: &str) -> Option<UniformLocation> {
        let name = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(program, name.as_ptr()) };
        if location < 0 { None } else { Some(location) }
    }

    fn set_uniform_4f(&mut self, location: UniformLocation, value: [f32; 4]) {
        unsafe { gl::Uniform4f(location, value[0], value[1], value[2], value[3]); }
    }

    fn set_uniform_1i(&mut self, location: UniformLocation, value: i32) {
        unsafe { gl::Uniform1i(location, value); }
    }

    fn delete_program(&mut self, program: RawName) {
        unsafe { gl::DeleteProgram(program); }
    }

    fn create_buffer(&mut self) -> RawName {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer); }
        buffer
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: RawName) {
        unsafe { gl::BindBuffer(buffer_target(target), buffer); }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        unsafe {
            gl::BufferData(
                buffer_target(target),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW
            );
        }
    }

    fn delete_buffer(&mut self, buffer: RawName) {
        unsafe { gl::DeleteBuffers(1, &buffer); }
    }

    fn create_vertex_array(&mut self) -> RawName {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao); }
        vao
    }

    fn bind_vertex_array(&mut self, vertex_array: RawName) {
        unsafe { gl::BindVertexArray(vertex_array); }
    }

    fn vertex_attribute(&mut self, attribute: &VertexAttribute, stride: usize) {
        unsafe {
            gl::VertexAttribPointer(
                attribute.location,
                attribute.components,
                gl::FLOAT,
                gl::FALSE,
                (stride * size_of::<f32>()) as GLsizei,
                (attribute.offset * size_of::<f32>()) as *const c_void
            );
            gl::EnableVertexAttribArray(attribute.location);
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: RawName) {
        unsafe { gl::DeleteVertexArrays(1, &vertex_array); }
    }

    fn create_texture(&mut self) -> RawName {
        let mut texture = 0;
        unsafe { gl::GenTextures(1, &mut texture); }
        texture
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit); }
    }

    fn bind_texture(&mut self, texture: RawName) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, texture); }
    }

    fn texture_parameters(&mut self, params: &SamplerParams) {
        unsafe {
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap_mode(params.wrap_s));
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap_mode(params.wrap_t));
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter_mode(params.min_filter));
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter_mode(params.mag_filter));
        }
    }

    fn texture_image(&mut self, image: &DecodedImage) {
        let format = pixel_format(image.channels);
        unsafe {
            // Rows of 1- and 3-channel images aren't necessarily 4-byte aligned.
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                format as GLint,
                image.width as GLsizei,
                image.height as GLsizei,
                0,
                format,
                gl::UNSIGNED_BYTE,
                image.pixels.as_ptr() as *const c_void
            );
        }
    }

    fn generate_mipmap(&mut self) {
        unsafe { gl::GenerateMipmap(gl::TEXTURE_2D); }
    }

    fn delete_texture(&mut self, texture: RawName) {
        unsafe { gl::DeleteTextures(1, &texture); }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height); }
    }

    fn clear(&mut self, color: [f32; 4]) {
        unsafe {
            gl::ClearColor(color[0], color[1], color[2], color[3]);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    fn draw_arrays(&mut self, first: i32, count: i32) {
        unsafe { gl::DrawArrays(gl::TRIANGLES, first, count); }
    }

    fn draw_elements(&mut self, count: i32) {
        unsafe { gl::DrawElements(gl::TRIANGLES, count, gl::UNSIGNED_INT, null()); }
    }
}
