use std::path::PathBuf;

use super::plan::ReloadPolicy;

/// Environment variable overriding [`PipelineConfig::shader_root`].
pub const SHADER_DIR_ENV: &str = "BLOBBY_SHADER_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Fixed number of list entries each pixel can hold.
    pub capacity_per_pixel: u32,
    /// Directory WGSL stage sources are read from.
    pub shader_root: PathBuf,
    /// Linear RGB shown where no primitive covers a pixel.
    pub background: [f32; 3],
    pub reload_policy: ReloadPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity_per_pixel: 8,
            shader_root: default_shader_root(),
            background: [0.2, 0.3, 0.3],
            reload_policy: ReloadPolicy::default(),
        }
    }
}

fn default_shader_root() -> PathBuf {
    std::env::var_os(SHADER_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")))
}

/// What the resolve pass writes to the screen.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum ViewMode {
    #[default]
    Surface,
    Positions,
    Normals,
    ListCount,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Surface => ViewMode::Positions,
            ViewMode::Positions => ViewMode::Normals,
            ViewMode::Normals => ViewMode::ListCount,
            ViewMode::ListCount => ViewMode::Surface,
        }
    }

    pub(crate) fn code(self) -> u32 {
        match self {
            ViewMode::Surface => 0,
            ViewMode::Positions => 1,
            ViewMode::Normals => 2,
            ViewMode::ListCount => 3,
        }
    }
}

/// Scalars the driver may change between frames. Values are read when a
/// frame is encoded, so a change applies from the next frame on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tunables {
    radius_scale: f32,
    smoothing: f32,
    interpolation: f32,
    speed: f32,
    pub animate: bool,
    pub view_mode: ViewMode,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            radius_scale: 1.5,
            smoothing: 0.5,
            interpolation: 0.0,
            speed: 1.0,
            animate: true,
            view_mode: ViewMode::Surface,
        }
    }
}

impl Tunables {
    pub const RADIUS_SCALE: (f32, f32) = (0.0, 10.0);
    pub const SMOOTHING: (f32, f32) = (0.0, 4.0);
    pub const INTERPOLATION: (f32, f32) = (0.0, 1.0);
    pub const SPEED: (f32, f32) = (0.1, 10.0);

    /// Outer radius multiplier used by the list-build pass.
    pub fn radius_scale(&self) -> f32 {
        self.radius_scale
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn interpolation(&self) -> f32 {
        self.interpolation
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_radius_scale(&mut self, v: f32) {
        self.radius_scale = clamp(v, Self::RADIUS_SCALE);
    }

    pub fn set_smoothing(&mut self, v: f32) {
        self.smoothing = clamp(v, Self::SMOOTHING);
    }

    pub fn set_interpolation(&mut self, v: f32) {
        self.interpolation = clamp(v, Self::INTERPOLATION);
    }

    pub fn set_speed(&mut self, v: f32) {
        self.speed = clamp(v, Self::SPEED);
    }
}

fn clamp(v: f32, (lo, hi): (f32, f32)) -> f32 {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}
