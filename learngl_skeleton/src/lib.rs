#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;

pub mod config;
pub mod device;
pub mod error;
pub mod graphics;
pub mod image;
pub mod lessons;
pub mod pipeline;
pub mod render_loop;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::config::{ContextConfig, LoopConfig};
pub use crate::device::Device;
pub use crate::error::{ConfigError, ContextError, DecodeError, PresentError, ShaderError};
pub use crate::graphics::Graphics;
pub use crate::image::{DecodedImage, ImageDecoder};
pub use crate::lessons::{Lesson, LessonOptions};
pub use crate::render_loop::{launch, LoopState, RenderLoop};
pub use crate::window::{Backend, Key, KeyState, SurfaceEvent, Window};
