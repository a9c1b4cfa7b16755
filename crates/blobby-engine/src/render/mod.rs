//! Renderer-facing handles.
//!
//! Renderers receive a [`RenderCtx`] for resource creation and uploads, and a
//! [`RenderTarget`] when the frame has a surface to draw into.

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
