pub mod controller;
pub mod input;
pub mod render;
pub mod runner;

pub use controller::SessionController;
pub use input::{ControlInput, ToggleDebouncer, TOGGLE_DEBOUNCE};
pub use render::{format_elapsed, progress_percent, DotRender, RenderModel};
pub use runner::{SessionRunner, TICK_INTERVAL};
