use std::time::Duration;

use glam::{UVec2, Vec2};

use blobby_engine::camera::{Camera, OrbitControls, ProjectionParams, ViewParams};
use blobby_engine::core::{App, AppControl, FrameCtx};
use blobby_engine::input::MouseButton;
use blobby_engine::pipeline::{estimate, ListPipeline, PipelineConfig, Tunables};
use blobby_engine::scene::Scene;
use blobby_engine::time::{FpsCounter, Profiler};

use crate::controls::{self, Action};

/// Projected radius, in pixels, above which a primitive gets surface detail.
const LOD_THRESHOLD_PX: f32 = 24.0;

/// Every n-th pixel is sampled by the overflow estimate.
const OCCUPANCY_STEP: u32 = 4;

/// Driver state: everything a frame reads, owned in one place.
pub struct Viewer {
    config: PipelineConfig,
    camera: Camera,
    orbit: OrbitControls,
    tunables: Tunables,
    scene: Scene,
    pipeline: Option<ListPipeline>,
    pending_resize: Option<(u32, u32)>,
    fps: FpsCounter,
    profiler: Profiler,
    overflow_reported: bool,
}

impl Viewer {
    pub fn new(config: PipelineConfig, scene: Scene) -> Self {
        Self {
            config,
            camera: Camera::new(ProjectionParams::default(), ViewParams::default()),
            orbit: OrbitControls::default(),
            tunables: Tunables::default(),
            scene,
            pipeline: None,
            pending_resize: None,
            fps: FpsCounter::default(),
            profiler: Profiler::new(),
            overflow_reported: false,
        }
    }

    fn handle_input(&mut self, ctx: &FrameCtx<'_, '_>) -> Vec<Action> {
        if ctx.input.button_down(MouseButton::Left) {
            let (dx, dy) = ctx.input_frame.pointer_delta;
            let mut view = self.camera.view_params();
            if self.orbit.drag(&mut view, Vec2::new(dx, dy)) {
                self.camera.set_view(view);
            }
        }
        if ctx.input_frame.wheel_lines != 0.0 {
            let mut view = self.camera.view_params();
            if self.orbit.scroll(&mut view, ctx.input_frame.wheel_lines) {
                self.camera.set_view(view);
            }
        }

        let actions = controls::actions(ctx.input_frame, ctx.input);
        for &action in &actions {
            if controls::apply(&mut self.tunables, action) {
                log::info!("{action:?} -> {:?}", self.tunables);
            }
        }
        actions
    }

    fn report_occupancy(&mut self, screen: UVec2) {
        let occupancy = estimate(
            &self.scene,
            &self.camera,
            &self.tunables,
            screen,
            self.config.capacity_per_pixel,
            OCCUPANCY_STEP,
        );
        match (occupancy.overflows(), self.overflow_reported) {
            (true, false) => log::warn!(
                "per-pixel lists overflow: {} of {} sampled pixels exceed capacity {} (max {} candidates)",
                occupancy.overflowing,
                occupancy.sampled,
                self.config.capacity_per_pixel,
                occupancy.max_candidates
            ),
            (false, true) => log::info!("per-pixel lists fit again"),
            _ => {}
        }
        self.overflow_reported = occupancy.overflows();
    }
}

/// Resizes the screen resources. A size the device cannot hold lists for is
/// logged and the previous resources stay in use.
fn apply_resize(pipeline: &mut ListPipeline, device: &wgpu::Device, (width, height): (u32, u32)) -> bool {
    match pipeline.resize(device, width, height) {
        Ok(()) => true,
        Err(e) => {
            let kept = pipeline.screen_layout();
            log::error!(
                "cannot resize screen resources: {e}; keeping {}x{}",
                kept.width,
                kept.height
            );
            false
        }
    }
}

impl App for Viewer {
    fn on_resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        self.pending_resize = Some((width, height));
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let actions = self.handle_input(ctx);
        if actions.contains(&Action::Exit) {
            return AppControl::Exit;
        }

        let pipeline = match self.pipeline.as_mut() {
            Some(p) => p,
            None => {
                let created = ListPipeline::new(&ctx.render_ctx(), self.config.clone(), &self.scene);
                match created {
                    Ok(p) => {
                        self.pending_resize = None;
                        self.pipeline.insert(p)
                    }
                    Err(e) => {
                        log::error!("cannot build the list pipeline: {e}");
                        return AppControl::Exit;
                    }
                }
            }
        };

        if let Some(size) = self.pending_resize.take() {
            apply_resize(pipeline, ctx.gpu.device(), size);
        }

        if actions.contains(&Action::ReloadShaders) {
            let report = pipeline.reload_shaders(ctx.gpu.device());
            log::info!(
                "shaders reloaded: {} ok, {} failed",
                report.reloaded.len(),
                report.failed.len()
            );
        }

        let dt = ctx.time.dt;
        let (w, h) = ctx.window.physical_size();
        let screen = UVec2::new(w.max(1), h.max(1));

        let camera = &self.camera;
        let tunables = &self.tunables;
        let scene = &mut self.scene;
        let profiler = &mut self.profiler;

        if tunables.animate {
            profiler.measure("animate", || scene.animate(dt, tunables.speed()));
        }
        scene.update_lod(camera, screen, LOD_THRESHOLD_PX);

        let synced = profiler.measure("upload", || {
            pipeline.sync_scene(ctx.gpu.device(), ctx.gpu.queue(), scene)
        });
        if let Err(e) = synced {
            log::error!("scene upload failed: {e}");
            return AppControl::Exit;
        }

        let time = ctx.time.elapsed;
        let control = profiler.measure("encode", || {
            if pipeline.plan().presents() {
                ctx.render(|rctx, target| {
                    pipeline.encode(
                        rctx,
                        target.encoder,
                        Some(target.color_view),
                        camera,
                        tunables,
                        time,
                    );
                })
            } else {
                // Dropped frame: the passes that can run still run, nothing presents.
                ctx.render_offscreen(|rctx, encoder| {
                    pipeline.encode(rctx, encoder, None, camera, tunables, time);
                });
                AppControl::Continue
            }
        });

        if let Some(fps) = self.fps.tick(Duration::from_secs_f32(dt)) {
            let title = format!(
                "BlobbySpheres, fps: {}, Profiling: {}",
                fps.round() as u32,
                self.profiler.summary()
            );
            ctx.window.set_title(&title);
            self.profiler.reset();
            self.report_occupancy(screen);
        }

        control
    }
}
