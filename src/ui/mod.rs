//! Interactive terminal UI: the trigger screen and its keyboard source.

pub mod keyboard;
pub mod screen;

pub use keyboard::KeyboardSource;
pub use screen::TriggerScreen;
