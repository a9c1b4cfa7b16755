/// Failures raised by the resource wrappers.
///
/// These are host-side configuration errors. The pipeline treats every one of
/// them as fatal for the frame (or for startup when raised during construction).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("`{label}`: refusing to create a zero-sized resource")]
    ZeroSized { label: String },

    #[error("`{label}` holds {expected} bytes but the update carries {actual}")]
    SizeMismatch {
        label: String,
        expected: u64,
        actual: u64,
    },
}
