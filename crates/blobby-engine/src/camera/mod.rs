//! Camera state.
//!
//! [`Camera`] owns the projection and view matrices plus their inverses and
//! combined products. It is owned by the driver and passed by reference to
//! whoever needs it.

mod orbit;
mod state;

pub use orbit::OrbitControls;
pub use state::{Camera, ProjectionParams, ScreenDisk, ViewParams, CAMERA_DISTANCE};
