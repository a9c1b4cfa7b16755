use std::path::PathBuf;

/// Pipeline stage a source file provides.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub(crate) fn naga(self) -> naga::ShaderStage {
        match self {
            StageKind::Vertex => naga::ShaderStage::Vertex,
            StageKind::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub fn visibility(self) -> wgpu::ShaderStages {
        match self {
            StageKind::Vertex => wgpu::ShaderStages::VERTEX,
            StageKind::Fragment => wgpu::ShaderStages::FRAGMENT,
        }
    }

    pub fn default_entry(self) -> &'static str {
        match self {
            StageKind::Vertex => "vs_main",
            StageKind::Fragment => "fs_main",
        }
    }
}

/// One stage of a program: which file, which entry point.
///
/// Paths are relative to the loader's root.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StageSource {
    pub kind: StageKind,
    pub path: PathBuf,
    pub entry_point: String,
}

impl StageSource {
    pub fn vertex(path: impl Into<PathBuf>) -> Self {
        Self::new(StageKind::Vertex, path)
    }

    pub fn fragment(path: impl Into<PathBuf>) -> Self {
        Self::new(StageKind::Fragment, path)
    }

    pub fn new(kind: StageKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            entry_point: kind.default_entry().to_string(),
        }
    }

    pub fn entry(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }
}
