//! The payloads of the three getting-started lessons. They all run on the same render loop; the
//! only thing that changes between them is what gets uploaded and drawn.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::graphics::{SamplerParams, VertexAttribute};
use crate::pipeline::{PipelineDesc, ShaderSource, TextureDesc, UniformAnimation, VertexLayout};

const UNIFORM_VERT: &str = include_str!("shaders/uniform.vert");
const UNIFORM_FRAG: &str = include_str!("shaders/uniform.frag");
const TEXTURE_VERT: &str = include_str!("shaders/texture.vert");
const TEXTURE_FRAG: &str = include_str!("shaders/texture.frag");

pub const DEFAULT_TEXTURE: &str = "resources/textures/container.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lesson {
    /// Opens a window and clears it. Nothing is drawn.
    Clear,
    /// One triangle whose colour comes from a uniform updated every frame.
    Uniform,
    /// An indexed, textured quad.
    Texture,
}

impl Lesson {
    pub const ALL: [Lesson; 3] = [Lesson::Clear, Lesson::Uniform, Lesson::Texture];

    pub fn name(self) -> &'static str {
        match self {
            Lesson::Clear => "clear",
            Lesson::Uniform => "uniform",
            Lesson::Texture => "texture",
        }
    }

    /// What to upload. `None` means the lesson only clears the screen.
    pub fn payload(self, options: &LessonOptions) -> Option<PipelineDesc> {
        match self {
            Lesson::Clear => None,
            Lesson::Uniform => Some(uniform_triangle(options)),
            Lesson::Texture => Some(textured_quad(options)),
        }
    }
}

impl FromStr for Lesson {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear" | "hello_window_clear" => Ok(Lesson::Clear),
            "uniform" | "shaders_uniform" => Ok(Lesson::Uniform),
            "texture" | "textures" => Ok(Lesson::Texture),
            _ => Err(ConfigError::UnknownLesson(s.to_string())),
        }
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Overrides for the bundled assets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonOptions {
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
    pub texture: Option<PathBuf>,
    pub sampler: SamplerParams,
}

fn shader(path: &Option<PathBuf>, bundled: &str) -> ShaderSource {
    match path {
        Some(path) => ShaderSource::File(path.clone()),
        None => ShaderSource::Inline(bundled.to_string()),
    }
}

fn uniform_triangle(options: &LessonOptions) -> PipelineDesc {
    PipelineDesc {
        vertex_shader: shader(&options.vertex_shader, UNIFORM_VERT),
        fragment_shader: shader(&options.fragment_shader, UNIFORM_FRAG),
        vertices: vec![
            -0.5, -0.5, 0.0,
            0.5,  -0.5, 0.0,
            0.0,  0.5,  0.0,
        ],
        layout: VertexLayout::new(vec![
            VertexAttribute { location: 0, components: 3, offset: 0 },
        ]),
        indices: None,
        texture: None,
        animation: Some(UniformAnimation::Pulse { uniform: String::from("ourColor") }),
    }
}

fn textured_quad(options: &LessonOptions) -> PipelineDesc {
    PipelineDesc {
        vertex_shader: shader(&options.vertex_shader, TEXTURE_VERT),
        fragment_shader: shader(&options.fragment_shader, TEXTURE_FRAG),
        vertices: vec![
            // Position         Colour            UV
            0.5,  0.5,  0.0,    1.0, 0.0, 0.0,    1.0, 1.0, // top right
            0.5,  -0.5, 0.0,    0.0, 1.0, 0.0,    1.0, 0.0, // bottom right
            -0.5, -0.5, 0.0,    0.0, 0.0, 1.0,    0.0, 0.0, // bottom left
            -0.5, 0.5,  0.0,    1.0, 1.0, 0.0,    0.0, 1.0, // top left
        ],
        layout: VertexLayout::new(vec![
            VertexAttribute { location: 0, components: 3, offset: 0 },
            VertexAttribute { location: 1, components: 3, offset: 3 },
            VertexAttribute { location: 2, components: 2, offset: 6 },
        ]),
        indices: Some(vec![
            0, 1, 3,
            1, 2, 3,
        ]),
        texture: Some(TextureDesc {
            path: options.texture.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_TEXTURE)),
            sampler: String::from("texture1"),
            params: options.sampler,
        }),
        animation: None,
    }
}
