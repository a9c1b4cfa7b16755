//! BlobbySpheres engine crate.
//!
//! Platform and GPU runtime (window, device, input, timing, logging) plus the
//! rendering core: resource wrappers, render-target assembly, the shader
//! program manager, camera and scene state, and the per-pixel list pipeline
//! that renders blended implicit spheres.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;

pub mod gpu;
pub mod framebuffer;
pub mod shader;
pub mod camera;
pub mod scene;
pub mod pipeline;
