//! BlobbySpheres viewer.
//!
//! Opens one window and renders the sphere field through the per-pixel list
//! pipeline. Drag to orbit, wheel to zoom, F5 to reload shaders.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use blobby_engine::device::GpuInit;
use blobby_engine::logging::{init_logging, LoggingConfig};
use blobby_engine::pipeline::{program_specs, PipelineConfig, ReloadPolicy};
use blobby_engine::scene::{Scene, SceneConfig};
use blobby_engine::shader::{FsLoader, ProgramStatus, ShaderLibrary};
use blobby_engine::window::{Runtime, RuntimeConfig};

mod controls;
mod viewer;

use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(name = "blobby-studio")]
#[command(about = "Render blended implicit spheres with per-pixel lists", long_about = None)]
struct Cli {
    /// Number of spheres in the scene
    #[arg(long, default_value_t = 100)]
    primitives: u32,

    /// Seed for a reproducible scene; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// List entries each pixel can hold
    #[arg(long, default_value_t = 8)]
    capacity: u32,

    /// Directory holding the WGSL stage sources
    #[arg(long)]
    shader_dir: Option<PathBuf>,

    /// Keep drawing with the last good pipeline when a shader reload fails
    #[arg(long)]
    keep_last_good: bool,

    /// Log filter, env_logger syntax (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,

    /// Compile and link-check every program, then exit
    #[arg(long)]
    check_shaders: bool,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig {
            capacity_per_pixel: self.capacity.max(1),
            reload_policy: if self.keep_last_good {
                ReloadPolicy::KeepLastGood
            } else {
                ReloadPolicy::SkipInvalid
            },
            ..PipelineConfig::default()
        };
        if let Some(dir) = &self.shader_dir {
            config.shader_root = dir.clone();
        }
        config
    }

    fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            primitive_count: self.primitives,
            seed: self.seed,
            ..SceneConfig::default()
        }
    }
}

fn check_shaders(config: &PipelineConfig) -> Result<()> {
    let root = config.shader_root.clone();
    anyhow::ensure!(root.is_dir(), "shader directory {} does not exist", root.display());

    let mut library = ShaderLibrary::new(FsLoader::new(root));
    // Any color format works for a headless link check.
    for (name, spec) in program_specs(config.capacity_per_pixel, wgpu::TextureFormat::Bgra8UnormSrgb) {
        library.compile(name, spec, None);
    }

    let mut failed = 0;
    for name in library.names() {
        let Some(program) = library.get(name) else {
            continue;
        };
        match program.status() {
            ProgramStatus::Valid => println!("ok      {name}"),
            ProgramStatus::Invalid { error } => {
                failed += 1;
                println!("FAILED  {name}\n{error}");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} program(s) failed to compile or link");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let pipeline_config = cli.pipeline_config();
    if cli.check_shaders {
        return check_shaders(&pipeline_config);
    }

    let scene = Scene::from_config(&cli.scene_config());
    log::info!(
        "scene: {} spheres, capacity {} per pixel, shaders from {}, {:?} on failed reload",
        scene.len(),
        pipeline_config.capacity_per_pixel,
        pipeline_config.shader_root.display(),
        pipeline_config.reload_policy
    );

    Runtime::run(
        RuntimeConfig::default(),
        GpuInit::default(),
        Viewer::new(pipeline_config, scene),
    )
    .context("blobby runtime error")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(match &cli.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("blobby-studio: {e:#}");
            ExitCode::FAILURE
        }
    }
}
