pub mod decoder;
pub mod opengl;
pub mod utils;
