//! Time subsystem.
//!
//! Frame timing, frame rate and host-side section timings, none of which
//! depend on the runtime.

mod fps;
mod frame_clock;
mod profiler;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
pub use profiler::Profiler;
