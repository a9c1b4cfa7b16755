use glam::Vec4;

use crate::camera::Camera;
use crate::gpu::{BindResource, BindTable, Buffer, Mesh, QuadVertex, QUAD_INDICES, QUAD_VERTICES, SCREEN_VERTICES};
use crate::render::RenderCtx;
use crate::scene::Scene;
use crate::shader::{
    Defines, FsLoader, GpuProgram, LinkConfig, Program, ProgramSpec, ReloadReport, ShaderLibrary,
    SourceLoader, StageSource,
};

use super::config::{PipelineConfig, Tunables};
use super::error::PipelineError;
use super::layout::ListLayout;
use super::plan::{Barrier, FramePlan, ProgramState, ProgramStates, ReloadPolicy, Skip, Step};
use super::resources::{prepass_targets, ScreenResources, DEPTH_FORMAT, FAR_DEPTH, PREPASS_CLEAR};
use super::uniforms::{FrameInputs, FrameUniforms};

pub const SPHERE_PROGRAM: &str = "sphere";
pub const LIST_PROGRAM: &str = "list";
pub const SURFACE_PROGRAM: &str = "surface";

const INSTANCE_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];

/// Per-instance `(center, radius)` read straight from the mirror buffer.
pub const SPHERE_INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vec4>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &INSTANCE_ATTRS,
};

/// Program specs of the three passes, keyed by program name.
///
/// `surface_format` only affects the pipeline state of the resolve pass.
pub fn program_specs(capacity: u32, surface_format: wgpu::TextureFormat) -> Vec<(&'static str, ProgramSpec)> {
    let billboard_buffers = vec![QuadVertex::layout(), SPHERE_INSTANCE_LAYOUT];
    let base = LinkConfig::default();

    let sphere = ProgramSpec {
        stages: vec![
            StageSource::vertex("billboard.wgsl"),
            StageSource::fragment("prepass.wgsl"),
        ],
        defines: Defines::new().with("OUTER_RADIUS", false),
        link: LinkConfig {
            vertex_buffers: billboard_buffers.clone(),
            targets: prepass_targets(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            ..base.clone()
        },
    };

    // Not depth tested: membership is decided by the outer radius alone. The
    // depth attachment is only there because a pass needs one attachment.
    let list = ProgramSpec {
        stages: vec![
            StageSource::vertex("billboard.wgsl"),
            StageSource::fragment("list.wgsl"),
        ],
        defines: Defines::new()
            .with("OUTER_RADIUS", true)
            .with("CAPACITY", capacity),
        link: LinkConfig {
            vertex_buffers: billboard_buffers,
            targets: Vec::new(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            ..base.clone()
        },
    };

    let surface = ProgramSpec {
        stages: vec![
            StageSource::vertex("screen.wgsl"),
            StageSource::fragment("surface.wgsl"),
        ],
        defines: Defines::new()
            .with("CAPACITY", capacity)
            .with("FAR_DEPTH", FAR_DEPTH),
        link: LinkConfig {
            vertex_buffers: vec![QuadVertex::layout()],
            targets: vec![Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            ..base
        },
    };

    vec![(SPHERE_PROGRAM, sphere), (LIST_PROGRAM, list), (SURFACE_PROGRAM, surface)]
}

/// Mirror of the scene on the GPU. Buffers hold at least one element so an
/// empty scene still binds.
struct SceneBuffers {
    spheres: Buffer<Vec4>,
    detail: Buffer<u32>,
    count: u32,
}

impl SceneBuffers {
    fn new(device: &wgpu::Device, scene: &Scene) -> Result<Self, PipelineError> {
        let mut mirror = scene.pack_mirror();
        let mut detail = scene.pack_detail();
        let count = mirror.len() as u32;
        if mirror.is_empty() {
            mirror.push(Vec4::ZERO);
            detail.push(0);
        }

        Ok(Self {
            spheres: Buffer::with_contents(
                device,
                "blobby spheres",
                &mirror,
                wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            )?,
            detail: Buffer::with_contents(
                device,
                "blobby detail",
                &detail,
                wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            )?,
            count,
        })
    }
}

/// The three-pass per-pixel list renderer.
///
/// Owns every screen-sized resource and the scene mirror. Per frame:
/// clear the cursors, rasterize the prepass, build the lists, resolve to the
/// output view. Passes whose program is unusable are skipped together with
/// everything after them.
pub struct ListPipeline<L: SourceLoader = FsLoader> {
    config: PipelineConfig,
    library: ShaderLibrary<L>,
    max_binding_bytes: u64,

    quad: Mesh<QuadVertex>,
    screen_quad: Mesh<QuadVertex>,
    uniforms: Buffer<FrameUniforms>,
    scene: SceneBuffers,
    screen: ScreenResources,

    last_skip: Option<Skip>,
}

impl ListPipeline<FsLoader> {
    /// Reads stage sources from `config.shader_root`.
    pub fn new(
        ctx: &RenderCtx<'_>,
        config: PipelineConfig,
        scene: &Scene,
    ) -> Result<Self, PipelineError> {
        let loader = FsLoader::new(config.shader_root.clone());
        Self::with_loader(ctx, loader, config, scene)
    }
}

impl<L: SourceLoader> ListPipeline<L> {
    pub fn with_loader(
        ctx: &RenderCtx<'_>,
        loader: L,
        config: PipelineConfig,
        scene: &Scene,
    ) -> Result<Self, PipelineError> {
        let device = ctx.device;
        let limits = device.limits();
        let max_binding_bytes =
            u64::from(limits.max_storage_buffer_binding_size).min(limits.max_buffer_size);

        let (width, height) = ctx.size;
        let layout = ListLayout::new(width, height, config.capacity_per_pixel);
        let screen = ScreenResources::new(device, layout, max_binding_bytes)?;

        let mut library = ShaderLibrary::new(loader);
        for (name, spec) in program_specs(config.capacity_per_pixel, ctx.surface_format) {
            let program = library.compile(name, spec, Some(device));
            if !program.valid() {
                log::warn!("program `{name}` is invalid; frames will be skipped until it reloads");
            }
        }

        let quad = Mesh::new(device, "blobby billboard", &QUAD_VERTICES, Some(&QUAD_INDICES[..]))?;
        let screen_quad = Mesh::new(device, "blobby screen", &SCREEN_VERTICES, None)?;
        let uniforms = Buffer::zeroed(
            device,
            "blobby frame uniforms",
            1,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        )?;

        log::info!(
            "list pipeline ready: {}x{}, capacity {}, {} primitives",
            layout.width,
            layout.height,
            layout.capacity,
            scene.len()
        );

        Ok(Self {
            config,
            library,
            max_binding_bytes,
            quad,
            screen_quad,
            uniforms,
            scene: SceneBuffers::new(device, scene)?,
            screen,
            last_skip: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn library(&self) -> &ShaderLibrary<L> {
        &self.library
    }

    pub fn screen_layout(&self) -> ListLayout {
        self.screen.layout()
    }

    /// Reallocates every screen-sized resource when the size changed. On
    /// failure the previous resources stay in place.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> Result<(), PipelineError> {
        let layout = ListLayout::new(width, height, self.config.capacity_per_pixel);
        if layout == self.screen.layout() {
            return Ok(());
        }
        self.screen = ScreenResources::new(device, layout, self.max_binding_bytes)?;
        Ok(())
    }

    /// Uploads the whole scene mirror. Buffers are recreated when the
    /// primitive count changed.
    pub fn sync_scene(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) -> Result<(), PipelineError> {
        if scene.len() as u32 != self.scene.count {
            self.scene = SceneBuffers::new(device, scene)?;
            return Ok(());
        }
        if scene.is_empty() {
            // Only the padding element is allocated.
            return Ok(());
        }
        self.scene.spheres.write_all(queue, &scene.pack_mirror())?;
        self.scene.detail.write_all(queue, &scene.pack_detail())?;
        Ok(())
    }

    /// Recompiles every program from source. Failed programs keep their last
    /// linked pipeline and turn invalid.
    pub fn reload_shaders(&mut self, device: &wgpu::Device) -> ReloadReport {
        let report = self.library.reload_all(Some(device));
        for (name, error) in &report.failed {
            log::warn!("reload of `{name}` failed:\n{error}");
        }
        report
    }

    fn state(&self, name: &str) -> ProgramState {
        self.library.get(name).map_or(ProgramState::MISSING, |p| ProgramState {
            valid: p.valid(),
            has_last_good: p.last_good().is_some(),
        })
    }

    pub fn plan(&self) -> FramePlan {
        FramePlan::build(
            ProgramStates {
                sphere: self.state(SPHERE_PROGRAM),
                list: self.state(LIST_PROGRAM),
                surface: self.state(SURFACE_PROGRAM),
            },
            self.config.reload_policy,
        )
    }

    fn usable(&self, name: &str) -> Option<(&Program, &GpuProgram)> {
        let program = self.library.get(name)?;
        let gpu = match self.config.reload_policy {
            ReloadPolicy::SkipInvalid => program.pipeline(),
            ReloadPolicy::KeepLastGood => program.last_good(),
        }?;
        Some((program, gpu))
    }

    /// Records one frame into `encoder`.
    ///
    /// Tunables and camera are read here, once. `output` is the view the
    /// resolve pass writes; without it the frame stops before the resolve.
    /// Returns the plan that was executed.
    pub fn encode(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        output: Option<&wgpu::TextureView>,
        camera: &Camera,
        tunables: &Tunables,
        time: f32,
    ) -> FramePlan {
        let mut plan = self.plan();
        if output.is_none() && plan.presents() {
            plan.steps.pop();
            if matches!(plan.steps.last(), Some(Step::Barrier(_))) {
                plan.steps.pop();
            }
        }
        self.note_skip(plan.skipped);

        let layout = self.screen.layout();
        let uniforms = FrameUniforms::new(&FrameInputs {
            camera,
            tunables,
            time,
            width: layout.width,
            height: layout.height,
            capacity: layout.capacity,
            primitive_count: self.scene.count,
            background: self.config.background,
        });
        if let Err(e) = self.uniforms.write_all(ctx.queue, &[uniforms]) {
            log::error!("frame uniforms: {e}");
            return plan;
        }

        let (Some(position), Some(normal)) = (self.screen.position(), self.screen.normal()) else {
            log::error!("prepass target lost its color attachments");
            return plan;
        };

        let table = BindTable::new();
        let _frame = table.bind("frame", BindResource::Buffer(self.uniforms.raw()));
        let _spheres = table.bind("spheres", BindResource::Buffer(self.scene.spheres.raw()));
        let _detail = table.bind("detail", BindResource::Buffer(self.scene.detail.raw()));
        let _cursors = table.bind("cursors", BindResource::Buffer(self.screen.cursors.raw()));
        let _lists = table.bind("lists", BindResource::Buffer(self.screen.lists.raw()));
        let _position = table.bind("position_tex", BindResource::View(position.view()));
        let _normal = table.bind("normal_tex", BindResource::View(normal.view()));

        for step in plan.steps.clone() {
            let ok = match step {
                Step::Clear => {
                    encoder.clear_buffer(self.screen.cursors.raw(), 0, None);
                    true
                }
                Step::Barrier(barrier) => {
                    encoder.insert_debug_marker(barrier_label(barrier));
                    true
                }
                Step::Prepass => self.encode_prepass(ctx, encoder, &table),
                Step::ListBuild => self.encode_list_build(ctx, encoder, &table),
                Step::Resolve => match output {
                    Some(view) => self.encode_resolve(ctx, encoder, &table, view),
                    None => false,
                },
            };
            if !ok {
                let at = plan.steps.iter().position(|s| *s == step).unwrap_or(0);
                plan.steps.truncate(at);
                break;
            }
        }
        plan
    }

    fn note_skip(&mut self, skip: Option<Skip>) {
        if skip != self.last_skip {
            match skip {
                Some(s) => log::warn!("frame skipped: {s}"),
                None => log::info!("frames render completely again"),
            }
            self.last_skip = skip;
        }
    }

    fn bind_group(
        &self,
        ctx: &RenderCtx<'_>,
        name: &str,
        table: &BindTable<BindResource<'_>>,
    ) -> Option<(&GpuProgram, wgpu::BindGroup)> {
        let (program, gpu) = self.usable(name)?;
        match program.bind_group(ctx.device, gpu, table) {
            Ok(group) => Some((gpu, group)),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    fn encode_prepass(
        &self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        table: &BindTable<BindResource<'_>>,
    ) -> bool {
        let Some((gpu, group)) = self.bind_group(ctx, SPHERE_PROGRAM, table) else {
            return false;
        };
        let mut pass = self
            .screen
            .prepass
            .begin_pass(encoder, "blobby prepass", &PREPASS_CLEAR, 1.0);
        pass.set_pipeline(&gpu.pipeline);
        pass.set_bind_group(0, &group, &[]);
        pass.set_vertex_buffer(1, self.scene.spheres.slice());
        self.quad.draw(&mut pass, 0, 0..self.scene.count);
        true
    }

    fn encode_list_build(
        &self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        table: &BindTable<BindResource<'_>>,
    ) -> bool {
        let Some((gpu, group)) = self.bind_group(ctx, LIST_PROGRAM, table) else {
            return false;
        };
        let mut pass = self
            .screen
            .prepass
            .begin_depth_read_pass(encoder, "blobby list build");
        pass.set_pipeline(&gpu.pipeline);
        pass.set_bind_group(0, &group, &[]);
        pass.set_vertex_buffer(1, self.scene.spheres.slice());
        self.quad.draw(&mut pass, 0, 0..self.scene.count);
        true
    }

    fn encode_resolve(
        &self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        table: &BindTable<BindResource<'_>>,
        view: &wgpu::TextureView,
    ) -> bool {
        let Some((gpu, group)) = self.bind_group(ctx, SURFACE_PROGRAM, table) else {
            return false;
        };
        let [r, g, b] = self.config.background;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("blobby resolve"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(&gpu.pipeline);
        pass.set_bind_group(0, &group, &[]);
        self.screen_quad.draw(&mut pass, 0, 0..1);
        true
    }
}

fn barrier_label(barrier: Barrier) -> &'static str {
    match barrier {
        Barrier::Storage => "barrier: storage",
        Barrier::TextureFetch => "barrier: texture fetch",
        Barrier::StorageAndTextureFetch => "barrier: storage + texture fetch",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{Location, MemoryLoader};

    fn shipped_sources() -> MemoryLoader {
        let root = PipelineConfig::default().shader_root;
        let mut loader = MemoryLoader::new();
        for file in ["billboard.wgsl", "prepass.wgsl", "list.wgsl", "screen.wgsl", "surface.wgsl"] {
            let source = std::fs::read_to_string(root.join(file)).unwrap();
            loader.insert(file, source);
        }
        loader
    }

    fn library() -> ShaderLibrary<MemoryLoader> {
        let mut library = ShaderLibrary::new(shipped_sources());
        for (name, spec) in program_specs(8, wgpu::TextureFormat::Bgra8UnormSrgb) {
            library.compile(name, spec, None);
        }
        library
    }

    // ── shipped shaders ───────────────────────────────────────────────────

    #[test]
    fn shipped_programs_compile_and_link() {
        let library = library();
        for name in [SPHERE_PROGRAM, LIST_PROGRAM, SURFACE_PROGRAM] {
            let program = library.get(name).unwrap();
            assert!(program.valid(), "{name}: {:?}", program.status());
        }
    }

    #[test]
    fn shipped_bindings_share_one_layout() {
        let library = library();
        let surface = library.get(SURFACE_PROGRAM).unwrap();
        let list = library.get(LIST_PROGRAM).unwrap();
        for (name, binding) in [
            ("frame", 0),
            ("spheres", 1),
            ("detail", 2),
            ("cursors", 3),
            ("lists", 4),
            ("position_tex", 5),
            ("normal_tex", 6),
        ] {
            assert_eq!(surface.location(name), Some(Location { group: 0, binding }), "{name}");
        }
        assert_eq!(list.location("cursors"), Some(Location { group: 0, binding: 3 }));
        assert_eq!(list.location("spheres"), None);
    }

    #[test]
    fn list_program_writes_storage() {
        let library = library();
        let list = library.get(LIST_PROGRAM).unwrap().linked().unwrap();
        let cursors = list.bindings.iter().find(|b| b.name == "cursors").unwrap();
        assert_eq!(cursors.kind, crate::shader::BindingKind::Storage { read_only: false });
        assert_eq!(cursors.visibility, wgpu::ShaderStages::FRAGMENT);
    }

    #[test]
    fn broken_list_shader_skips_frame() {
        let mut library = library();
        library.loader_mut().insert("list.wgsl", "@fragment fn fs_main( {");
        let report = library.reload_all(None);
        assert_eq!(report.failed.len(), 1);

        let list = library.get(LIST_PROGRAM).unwrap();
        assert!(!list.valid());
        assert!(list.has_live());

        let state = |name| {
            let p = library.get(name).unwrap();
            ProgramState { valid: p.valid(), has_last_good: p.has_live() }
        };
        let plan = FramePlan::build(
            ProgramStates {
                sphere: state(SPHERE_PROGRAM),
                list: state(LIST_PROGRAM),
                surface: state(SURFACE_PROGRAM),
            },
            ReloadPolicy::SkipInvalid,
        );
        assert!(!plan.presents());
        assert!(plan.runs(Step::Prepass));
    }

    // ── device ────────────────────────────────────────────────────────────

    fn device() -> (wgpu::Device, wgpu::Queue) {
        wgpu::Device::noop(&wgpu::DeviceDescriptor::default())
    }

    fn pipeline(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        loader: MemoryLoader,
        scene: &Scene,
    ) -> ListPipeline<MemoryLoader> {
        let ctx = RenderCtx::new(device, queue, wgpu::TextureFormat::Bgra8UnormSrgb, (64, 64));
        ListPipeline::with_loader(&ctx, loader, PipelineConfig::default(), scene).unwrap()
    }

    fn small_scene() -> Scene {
        Scene::from_config(&crate::scene::SceneConfig {
            primitive_count: 5,
            seed: Some(3),
            ..Default::default()
        })
    }

    fn encode_headless(pipeline: &mut ListPipeline<MemoryLoader>, device: &wgpu::Device, queue: &wgpu::Queue) -> FramePlan {
        let ctx = RenderCtx::new(device, queue, wgpu::TextureFormat::Bgra8UnormSrgb, (64, 64));
        let camera = Camera::new(Default::default(), Default::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        let plan = pipeline.encode(&ctx, &mut encoder, None, &camera, &Tunables::default(), 0.0);
        queue.submit([encoder.finish()]);
        plan
    }

    #[test]
    fn resize_allocates_per_pixel_storage() {
        let (device, queue) = device();
        let mut p = pipeline(&device, &queue, shipped_sources(), &small_scene());
        assert_eq!(p.screen_layout(), ListLayout::new(64, 64, 8));

        p.resize(&device, 100, 50).unwrap();
        assert_eq!(p.screen_layout(), ListLayout::new(100, 50, 8));
        assert_eq!(p.screen.cursors.len(), 5000);
        assert_eq!(p.screen.lists.len(), 40000);
    }

    #[test]
    fn oversized_resize_keeps_previous_resources() {
        let (device, queue) = device();
        let mut p = pipeline(&device, &queue, shipped_sources(), &small_scene());
        let err = p.resize(&device, 16384, 16384).unwrap_err();
        assert!(matches!(err, PipelineError::ListTooLarge { .. }), "{err}");
        assert_eq!(p.screen_layout(), ListLayout::new(64, 64, 8));
        assert_eq!(p.screen.cursors.len(), 64 * 64);
    }

    #[test]
    fn offscreen_frame_stops_after_list_build() {
        let (device, queue) = device();
        let mut p = pipeline(&device, &queue, shipped_sources(), &small_scene());
        assert!(p.plan().presents());

        let plan = encode_headless(&mut p, &device, &queue);
        assert_eq!(plan.steps.last(), Some(&Step::ListBuild));
        assert!(plan.runs(Step::Prepass));
        assert_eq!(plan.skipped, None);
    }

    #[test]
    fn broken_list_shader_truncates_encoded_frame() {
        let (device, queue) = device();
        let mut sources = shipped_sources();
        sources.insert("list.wgsl", "@fragment fn fs_main( {");
        let mut p = pipeline(&device, &queue, sources, &small_scene());

        let plan = encode_headless(&mut p, &device, &queue);
        assert_eq!(plan.steps.last(), Some(&Step::Prepass));
        assert_eq!(plan.skipped.map(|s| s.at), Some(Step::ListBuild));
        assert_eq!(p.last_skip, plan.skipped);

        let shipped = shipped_sources().load(std::path::Path::new("list.wgsl")).unwrap();
        p.library.loader_mut().insert("list.wgsl", shipped);
        let report = p.reload_shaders(&device);
        assert!(report.failed.is_empty());
        assert!(p.plan().presents());
    }

    #[test]
    fn last_good_policy_keeps_running_failed_reload() {
        let (device, queue) = device();
        let ctx = RenderCtx::new(&device, &queue, wgpu::TextureFormat::Bgra8UnormSrgb, (64, 64));
        let config = PipelineConfig {
            reload_policy: ReloadPolicy::KeepLastGood,
            ..PipelineConfig::default()
        };
        let mut p = ListPipeline::with_loader(&ctx, shipped_sources(), config, &small_scene()).unwrap();

        p.library.loader_mut().insert("list.wgsl", "@fragment fn fs_main( {");
        let report = p.reload_shaders(&device);
        assert_eq!(report.failed.len(), 1);

        let plan = encode_headless(&mut p, &device, &queue);
        assert_eq!(plan.steps.last(), Some(&Step::ListBuild));
        assert_eq!(plan.skipped, None);
    }

    #[test]
    fn empty_scene_encodes_without_reallocating() {
        let (device, queue) = device();
        let scene = Scene::default();
        let mut p = pipeline(&device, &queue, shipped_sources(), &scene);
        assert_eq!(p.scene.count, 0);
        assert_eq!(p.scene.spheres.len(), 1);

        let spheres = p.scene.spheres.raw().clone();
        for _ in 0..3 {
            p.sync_scene(&device, &queue, &scene).unwrap();
        }
        assert_eq!(p.scene.spheres.raw(), &spheres);

        let plan = encode_headless(&mut p, &device, &queue);
        assert_eq!(plan.steps.last(), Some(&Step::ListBuild));
    }

    #[test]
    fn growing_scene_reallocates_mirror() {
        let (device, queue) = device();
        let mut p = pipeline(&device, &queue, shipped_sources(), &Scene::default());
        let scene = small_scene();
        p.sync_scene(&device, &queue, &scene).unwrap();
        assert_eq!(p.scene.count, 5);
        assert_eq!(p.scene.spheres.len(), 5);
        p.sync_scene(&device, &queue, &scene).unwrap();
    }

    #[test]
    fn instance_layout_feeds_location_one() {
        assert_eq!(SPHERE_INSTANCE_LAYOUT.attributes[0].shader_location, 1);
        assert_eq!(SPHERE_INSTANCE_LAYOUT.array_stride, 16);
        assert_eq!(SPHERE_INSTANCE_LAYOUT.step_mode, wgpu::VertexStepMode::Instance);
    }
}
