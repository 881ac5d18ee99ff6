//! UI primitives shared by the face renderer.

pub mod core;

pub use core::{DirtyRegion, Drawable, TouchEvent, TouchPoint};

/// Display width in pixels.
pub const DISPLAY_WIDTH_PX: u16 = 240;
/// Display height in pixels.
pub const DISPLAY_HEIGHT_PX: u16 = 240;
