use std::str::FromStr;

use crate::error::ConfigError;
use crate::window::Key;

/// OpenGL profile requested from the windowing system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Profile {
    Core,
    Compatibility,
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "core" => Ok(Profile::Core),
            "compat" | "compatibility" => Ok(Profile::Compatibility),
            _ => Err(ConfigError::InvalidValue { name: "profile", value: s.to_string() }),
        }
    }
}

/// What the windowing collaborator is asked for when the context is created.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub version: (u8, u8),
    pub profile: Profile,
    pub vsync: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: String::from("LearnOpenGL"),
            version: (3, 3),
            profile: Profile::Core,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub context: ContextConfig,
    pub clear_color: [f32; 4],
    /// Pressing this key sets the close condition, which is checked at the top of the next frame.
    pub close_key: Key,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            context: ContextConfig::default(),
            clear_color: [0.2, 0.3, 0.3, 1.0],
            close_key: Key::Num0,
        }
    }
}
