/*!
 * Render Module
 * Read-only render cycle feeding timeline frames to an external renderer
 */

pub mod frame;
pub mod task;

pub use frame::{Frame, Row};
pub use task::{RenderCommand, RenderTask};
