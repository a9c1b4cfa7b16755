//! Scene store: sphere primitives in insertion order, their optional motion
//! state, and packing into the arrays the GPU mirrors.

mod entity;
mod store;

pub use entity::{EntityId, Physics, Sphere, World};
pub use store::{Scene, SceneConfig};
