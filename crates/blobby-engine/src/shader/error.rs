use std::path::PathBuf;

use super::stage::StageKind;

/// Errors raised while building or using a shader program.
///
/// Compile and link failures are recoverable: the affected program is marked
/// invalid and its last good pipeline (if any) is kept.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("define `{name}`: {reason}")]
    InvalidDefine { name: String, reason: String },

    #[error("`{}` failed to parse:\n{log}", path.display())]
    Parse { path: PathBuf, log: String },

    #[error("`{}` failed validation:\n{log}", path.display())]
    Validation { path: PathBuf, log: String },

    #[error("`{}` has no {stage:?} entry point named `{entry}`", path.display())]
    MissingEntryPoint {
        path: PathBuf,
        stage: StageKind,
        entry: String,
    },

    #[error("`{}`: global `{name}` uses an unsupported binding ({reason})", path.display())]
    UnsupportedBinding {
        path: PathBuf,
        name: String,
        reason: String,
    },

    #[error("program `{program}` failed to link: {reason}")]
    Link { program: String, reason: String },

    #[error("program `{program}` rejected by the device: {message}")]
    Device { program: String, message: String },

    #[error("program `{program}`: nothing bound to `{name}`")]
    Unbound { program: String, name: String },

    #[error("program `{program}` has never linked successfully")]
    NotLinked { program: String },

    #[error("no program named `{0}`")]
    UnknownProgram(String),
}
