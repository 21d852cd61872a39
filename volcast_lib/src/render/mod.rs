mod cast;
mod renderer;
pub mod shading;

pub use renderer::{RenderConfig, RenderMode, Renderer};
