//! The windowing side of the render loop: context creation, keyboard state, presentation and
//! window-system events. The skeleton only ever talks to these traits, so the real glutin window
//! and the test fakes are interchangeable.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::ContextConfig;
use crate::error::{ConfigError, ContextError, PresentError};
use crate::graphics::Graphics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Q,
    W,
    A,
    S,
    D,
    X,
    Escape,
    Space,
    Enter,
}

lazy_static! {
    static ref KEY_NAMES: HashMap<&'static str, Key> = {
        let mut names = HashMap::new();
        names.insert("0", Key::Num0);
        names.insert("1", Key::Num1);
        names.insert("2", Key::Num2);
        names.insert("3", Key::Num3);
        names.insert("4", Key::Num4);
        names.insert("5", Key::Num5);
        names.insert("6", Key::Num6);
        names.insert("7", Key::Num7);
        names.insert("8", Key::Num8);
        names.insert("9", Key::Num9);
        names.insert("q", Key::Q);
        names.insert("w", Key::W);
        names.insert("a", Key::A);
        names.insert("s", Key::S);
        names.insert("d", Key::D);
        names.insert("x", Key::X);
        names.insert("escape", Key::Escape);
        names.insert("esc", Key::Escape);
        names.insert("space", Key::Space);
        names.insert("enter", Key::Enter);
        names.insert("return", Key::Enter);
        names
    };
}

impl FromStr for Key {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KEY_NAMES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

impl KeyState {
    pub fn is_pressed(self) -> bool {
        self == KeyState::Pressed
    }
}

/// Window-system events the render loop reacts to. Keyboard input isn't here because the loop
/// polls key state instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    Resized { width: u32, height: u32 },
    CloseRequested,
}

pub trait Window {
    fn get_key(&self, key: Key) -> KeyState;

    fn should_close(&self) -> bool;

    fn set_should_close(&mut self, value: bool);

    /// Presents the back buffer. With vsync on this is where the loop waits for the display.
    fn swap_buffers(&mut self) -> Result<(), PresentError>;

    /// Processes pending window-system events and hands back the ones the loop cares about.
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;

    /// Seconds since the context was created.
    fn time(&self) -> f64;
}

/// Creates the window and the graphics collaborator bound to its context, in one step, since
/// neither is usable without the other.
pub trait Backend {
    type Window: Window;
    type Graphics: Graphics;

    fn create_context(
        &mut self,
        config: &ContextConfig,
    ) -> Result<(Self::Window, Self::Graphics), ContextError>;
}
