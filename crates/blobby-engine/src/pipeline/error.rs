use crate::framebuffer::Incomplete;
use crate::gpu::ResourceError;

/// Fatal pipeline construction errors. Shader failures are not among them:
/// they mark a program invalid and make frames skip.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(
        "per-pixel lists for {width}x{height} at capacity {capacity} need {bytes} bytes, device allows {limit}"
    )]
    ListTooLarge {
        width: u32,
        height: u32,
        capacity: u32,
        bytes: u64,
        limit: u64,
    },

    #[error("prepass target is incomplete: {0}")]
    Incomplete(#[from] Incomplete),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}
