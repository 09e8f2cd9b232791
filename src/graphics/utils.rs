use std::ffi::{CStr, CString};
use std::ptr::null;

use gl;
use gl::types::*;

/// Uploads `source` to the shader object `id` and compiles it. On failure the error is the
/// shader's info log.
pub fn compile_shader_source(id: GLuint, source: &CStr) -> Result<(), String> {
    let mut success = 1;
    unsafe {
        gl::ShaderSource(id, 1, &source.as_ptr(), null());
        gl::CompileShader(id);
        gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut success);
    }

    if success == 0 {
        let mut len = 0;
        unsafe { gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len); }

        return Err(read_info_log(len, |len, written, buf| unsafe {
            gl::GetShaderInfoLog(id, len, written, buf)
        }));
    }

    Ok(())
}

/// Attaches `shaders` to `program`, links, then detaches them again so they can be deleted
/// independently. On failure the error is the program's info log.
pub fn link_program_shaders(program: GLuint, shaders: &[GLuint]) -> Result<(), String> {
    let mut success = 1;
    unsafe {
        for shader in shaders {
            gl::AttachShader(program, *shader);
        }

        gl::LinkProgram(program);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);

        for shader in shaders {
            gl::DetachShader(program, *shader);
        }
    }

    if success == 0 {
        let mut len = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len); }

        return Err(read_info_log(len, |len, written, buf| unsafe {
            gl::GetProgramInfoLog(program, len, written, buf)
        }));
    }

    Ok(())
}

/// Reads an info log of (at most) `len` bytes, including the terminating NUL, through `fetch`.
pub fn read_info_log<F>(len: GLint, fetch: F) -> String
    where F: FnOnce(GLsizei, *mut GLsizei, *mut GLchar)
{
    let mut buf = create_ws_buffer_with_len(len.max(1) as usize);
    let mut written: GLsizei = 0;
    fetch(buf.len() as GLsizei, &mut written, buf.as_mut_ptr() as *mut GLchar);

    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).trim_end().to_string()
}

/// A buffer of `len` spaces for GL to write a string into.
pub fn create_ws_buffer_with_len(len: usize) -> Vec<u8> {
    let mut buf: Vec<u8> = Vec::with_capacity(len);
    buf.extend([b' '].iter().cycle().take(len));
    buf
}

/// Shader text as GL wants it. Text with an interior NUL can't be passed through, so it's cut
/// at the first NUL, which the compiler then reports on.
pub fn source_to_cstring(source: &str) -> CString {
    match CString::new(source) {
        Ok(s) => s,
        Err(e) => {
            let end = e.nul_position();
            let mut bytes = e.into_vec();
            bytes.truncate(end);
            // Can't fail, everything after the first NUL is gone.
            CString::new(bytes).unwrap_or_default()
        }
    }
}
