use std::path::PathBuf;

use thiserror::Error;

use crate::graphics::ShaderStage;

/// Raised while acquiring the window and its graphics context. There is no fallback context, so
/// this is the one failure that stops the program before the render loop starts.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Failed to create window: {0}")]
    WindowCreation(String),
    #[error("Failed to make context current: {0}")]
    MakeCurrent(String),
    #[error("Failed to load OpenGL function pointers")]
    Loader,
}

#[derive(Error, Debug)]
#[error("Failed to present frame: {0}")]
pub struct PresentError(pub String);

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read image {path}: {reason}")]
    Io { path: PathBuf, reason: String },
    #[error("Failed to decode image {path}: {reason}")]
    Format { path: PathBuf, reason: String },
    #[error("Image {path} has an empty dimension ({width}x{height})")]
    Empty { path: PathBuf, width: u32, height: u32 },
}

/// Shader failures are logged and never propagated: a broken program still gets bound and drawn
/// with, it just renders nothing.
#[derive(Error, Debug)]
pub enum ShaderError {
    #[error("Failed to read {stage} shader source {path}: {reason}")]
    Source { stage: ShaderStage, path: PathBuf, reason: String },
    #[error("Failed to compile {stage} shader:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("Failed to link shader program:\n{log}")]
    Link { log: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Unknown key name: {0}")]
    UnknownKey(String),
    #[error("Unknown lesson: {0}")]
    UnknownLesson(String),
    #[error("Invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
