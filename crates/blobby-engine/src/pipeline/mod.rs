//! Per-pixel list renderer.
//!
//! Frame order: clear cursors → prepass (nearest hit, position/normal/depth)
//! → list build (atomic append into fixed-capacity per-pixel buckets) →
//! resolve (blended distance field over each pixel's list). Each pass boundary
//! is an explicit step in the [`FramePlan`].
//!
//! The host-side pieces (layout, the list model, occupancy estimate, frame
//! plan) need no GPU and are tested on their own.

mod config;
mod cpu;
mod error;
mod layout;
mod list;
mod occupancy;
mod plan;
mod resources;
mod uniforms;

pub use config::{PipelineConfig, Tunables, ViewMode, SHADER_DIR_ENV};
pub use cpu::{Append, PixelLists};
pub use error::PipelineError;
pub use layout::{ListEntry, ListLayout, ENTRY_SIZE};
pub use list::{
    program_specs, ListPipeline, LIST_PROGRAM, SPHERE_INSTANCE_LAYOUT, SPHERE_PROGRAM,
    SURFACE_PROGRAM,
};
pub use occupancy::{estimate, Occupancy};
pub use plan::{Barrier, FramePlan, ProgramState, ProgramStates, ReloadPolicy, Skip, Step};
pub use resources::{ScreenResources, DEPTH_FORMAT, FAR_DEPTH, NORMAL_FORMAT, POSITION_FORMAT};
pub use uniforms::{FrameInputs, FrameUniforms};
