//! Owning wrappers around wgpu resources.
//!
//! Each wrapper owns exactly one GPU handle which is released when the wrapper
//! drops. Binding is expressed through [`BindTable`], which hands out scoped
//! guards.

mod bind;
mod buffer;
mod error;
mod mesh;
mod texture;

pub use bind::{BindError, BindGuard, BindResource, BindTable};
pub use buffer::Buffer;
pub use error::ResourceError;
pub use mesh::{Mesh, QuadVertex, QUAD_INDICES, QUAD_VERTICES, SCREEN_VERTICES};
pub use texture::{Texture, TextureInfo, TextureKind};
