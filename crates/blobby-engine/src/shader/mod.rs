//! WGSL programs: source assembly, compile-time defines, naga validation and
//! reflection, cross-stage linking and hot reload.

mod compile;
mod defines;
mod error;
mod library;
mod link;
mod loader;
mod program;
mod source;
mod stage;

pub use compile::{compile_stage, BindingKind, CompiledStage, ReflectedBinding};
pub use defines::{DefineValue, Defines};
pub use error::ShaderError;
pub use library::{ReloadReport, ShaderLibrary};
pub use link::{link_stages, LinkedStages, Location};
pub use loader::{FsLoader, MemoryLoader, SourceLoader};
pub use program::{GpuProgram, LinkConfig, Program, ProgramSpec, ProgramStatus};
pub use source::assemble_source;
pub use stage::{StageKind, StageSource};
