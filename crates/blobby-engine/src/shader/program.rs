use std::cell::RefCell;
use std::collections::HashMap;

use crate::gpu::{BindResource, BindTable};

use super::compile::{compile_stage, CompiledStage};
use super::defines::Defines;
use super::error::ShaderError;
use super::link::{link_stages, LinkedStages, Location};
use super::loader::SourceLoader;
use super::stage::StageSource;

/// Fixed-function state the pipeline is created with.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub vertex_buffers: Vec<wgpu::VertexBufferLayout<'static>>,
    pub targets: Vec<Option<wgpu::ColorTargetState>>,
    pub depth_stencil: Option<wgpu::DepthStencilState>,
    pub primitive: wgpu::PrimitiveState,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            vertex_buffers: Vec::new(),
            targets: Vec::new(),
            depth_stencil: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
        }
    }
}

/// Everything needed to (re)build a program. Kept for the program's lifetime
/// so reloads reuse the same stages and defines.
#[derive(Debug, Clone)]
pub struct ProgramSpec {
    pub stages: Vec<StageSource>,
    pub defines: Defines,
    pub link: LinkConfig,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProgramStatus {
    Valid,
    Invalid { error: String },
}

/// Pipeline objects created from a linked program.
pub struct GpuProgram {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

struct Live {
    linked: LinkedStages,
    gpu: Option<GpuProgram>,
}

/// A named, multi-stage program.
///
/// Either the last build succeeded (`Valid`) or it failed (`Invalid`). A failed
/// build never replaces what was live before; the previous pipeline stays
/// available through [`Program::last_good`].
pub struct Program {
    name: String,
    spec: ProgramSpec,
    status: ProgramStatus,
    live: Option<Live>,
    locations: RefCell<HashMap<String, Option<Location>>>,
}

impl Program {
    /// Builds the program. Failures are recorded in the status, not returned,
    /// so an invalid program can still be reloaded later.
    ///
    /// Without a device only the compile and link checks run.
    pub fn build(
        name: impl Into<String>,
        spec: ProgramSpec,
        loader: &dyn SourceLoader,
        device: Option<&wgpu::Device>,
    ) -> Self {
        let mut program = Self {
            name: name.into(),
            spec,
            status: ProgramStatus::Invalid {
                error: "not built".into(),
            },
            live: None,
            locations: RefCell::new(HashMap::new()),
        };
        let _ = program.reload(loader, device);
        program
    }

    /// Recompiles every stage from source and relinks.
    ///
    /// The replacement is built completely before anything is swapped. On
    /// failure the live program is left untouched and the status turns invalid.
    pub fn reload(
        &mut self,
        loader: &dyn SourceLoader,
        device: Option<&wgpu::Device>,
    ) -> Result<(), ShaderError> {
        let built = self.compile_and_link(loader).and_then(|linked| {
            let gpu = device
                .map(|d| instantiate(d, &self.name, &linked, &self.spec.link))
                .transpose()?;
            Ok((linked, gpu))
        });
        match built {
            Ok((linked, gpu)) => {
                self.live = Some(Live { linked, gpu });
                self.status = ProgramStatus::Valid;
                self.locations.borrow_mut().clear();
                log::debug!("program `{}` linked", self.name);
                Ok(())
            }
            Err(err) => {
                log::warn!("program `{}`: {err}", self.name);
                self.status = ProgramStatus::Invalid {
                    error: err.to_string(),
                };
                Err(err)
            }
        }
    }

    fn compile_and_link(&self, loader: &dyn SourceLoader) -> Result<LinkedStages, ShaderError> {
        let stages = self
            .spec
            .stages
            .iter()
            .map(|stage| {
                let raw = loader.load(&stage.path).map_err(|source| ShaderError::Io {
                    path: stage.path.clone(),
                    source,
                })?;
                compile_stage(stage, &raw, &self.spec.defines)
            })
            .collect::<Result<Vec<CompiledStage>, _>>()?;

        link_stages(&self.name, stages)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &ProgramSpec {
        &self.spec
    }

    pub fn status(&self) -> &ProgramStatus {
        &self.status
    }

    /// True when the most recent build succeeded.
    pub fn valid(&self) -> bool {
        self.status == ProgramStatus::Valid
    }

    /// True when some build has ever succeeded.
    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn linked(&self) -> Option<&LinkedStages> {
        self.live.as_ref().map(|l| &l.linked)
    }

    /// Pipeline of the current build; `None` while invalid.
    pub fn pipeline(&self) -> Option<&GpuProgram> {
        if self.valid() { self.last_good() } else { None }
    }

    /// Pipeline of the most recent successful build, even if a later reload failed.
    pub fn last_good(&self) -> Option<&GpuProgram> {
        self.live.as_ref().and_then(|l| l.gpu.as_ref())
    }

    /// Binding location of a named global, cached until the next successful reload.
    pub fn location(&self, name: &str) -> Option<Location> {
        if let Some(hit) = self.locations.borrow().get(name) {
            return *hit;
        }
        let found = self.linked().and_then(|l| l.location(name));
        self.locations.borrow_mut().insert(name.to_string(), found);
        found
    }

    #[cfg(test)]
    fn cached_locations(&self) -> usize {
        self.locations.borrow().len()
    }

    /// Creates bind group 0 from whatever the table holds for this program's globals.
    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        gpu: &GpuProgram,
        table: &BindTable<BindResource<'_>>,
    ) -> Result<wgpu::BindGroup, ShaderError> {
        let Some(linked) = self.linked() else {
            return Err(ShaderError::NotLinked {
                program: self.name.clone(),
            });
        };

        let mut entries = Vec::with_capacity(linked.bindings.len());
        for b in &linked.bindings {
            let resource = table.resolve(&b.name).map_err(|_| ShaderError::Unbound {
                program: self.name.clone(),
                name: b.name.clone(),
            })?;
            entries.push(wgpu::BindGroupEntry {
                binding: b.binding,
                resource: resource.binding_resource(),
            });
        }

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} bind group", self.name)),
            layout: &gpu.bind_group_layout,
            entries: &entries,
        });
        match pollster::block_on(scope.pop()) {
            None => Ok(group),
            Some(err) => Err(device_error(&self.name, err)),
        }
    }
}

fn instantiate(
    device: &wgpu::Device,
    name: &str,
    linked: &LinkedStages,
    config: &LinkConfig,
) -> Result<GpuProgram, ShaderError> {
    // Catches what naga accepts but the device rejects, e.g. an output type
    // that does not fit the target format.
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = linked
        .bindings
        .iter()
        .map(|b| wgpu::BindGroupLayoutEntry {
            binding: b.binding,
            visibility: b.visibility,
            ty: b.kind.binding_type(),
            count: None,
        })
        .collect();

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{name} bgl")),
        entries: &layout_entries,
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{name} pipeline layout")),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&linked.vertex.path.display().to_string()),
        source: wgpu::ShaderSource::Wgsl(linked.vertex.source.as_str().into()),
    });

    let fs = linked.fragment.as_ref().map(|f| {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&f.path.display().to_string()),
            source: wgpu::ShaderSource::Wgsl(f.source.as_str().into()),
        });
        (module, f.entry_point.as_str())
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{name} pipeline")),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vs,
            entry_point: Some(linked.vertex.entry_point.as_str()),
            compilation_options: Default::default(),
            buffers: &config.vertex_buffers,
        },
        fragment: fs.as_ref().map(|(module, entry)| wgpu::FragmentState {
            module,
            entry_point: Some(*entry),
            compilation_options: Default::default(),
            targets: &config.targets,
        }),
        primitive: config.primitive,
        depth_stencil: config.depth_stencil.clone(),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(scope.pop()) {
        return Err(device_error(name, err));
    }
    Ok(GpuProgram {
        pipeline,
        bind_group_layout,
    })
}

fn device_error(program: &str, err: wgpu::Error) -> ShaderError {
    ShaderError::Device {
        program: program.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::loader::MemoryLoader;

    const VERT: &str = "\
struct Frame { mvp: mat4x4<f32>, tint: vec4<f32> }
@group(0) @binding(0) var<uniform> frame: Frame;
@vertex fn vs_main(@location(0) p: vec2<f32>) -> @builtin(position) vec4<f32> {
    return frame.mvp * vec4<f32>(p, 0.0, 1.0);
}
";

    const FRAG: &str = "\
struct Frame { mvp: mat4x4<f32>, tint: vec4<f32> }
@group(0) @binding(0) var<uniform> frame: Frame;
@group(0) @binding(2) var<storage, read> counts: array<u32>;
@fragment fn fs_main(@builtin(position) p: vec4<f32>) -> @location(0) vec4<f32> {
    return frame.tint * f32(min(counts[u32(p.x)], CAPACITY));
}
";

    const BROKEN: &str = "@fragment fn fs_main( -> {";

    fn spec() -> ProgramSpec {
        ProgramSpec {
            stages: vec![StageSource::vertex("screen.wgsl"), StageSource::fragment("surface.wgsl")],
            defines: Defines::new().with("CAPACITY", 8u32),
            link: LinkConfig::default(),
        }
    }

    fn loader() -> MemoryLoader {
        MemoryLoader::new()
            .with("screen.wgsl", VERT)
            .with("surface.wgsl", FRAG)
    }

    // ── build ─────────────────────────────────────────────────────────────

    #[test]
    fn builds_valid_program_headless() {
        let p = Program::build("surface", spec(), &loader(), None);
        assert!(p.valid());
        assert!(p.has_live());
        assert!(p.pipeline().is_none());
        assert_eq!(p.location("counts"), Some(Location { group: 0, binding: 2 }));
    }

    #[test]
    fn missing_source_is_invalid_not_fatal() {
        let p = Program::build("surface", spec(), &MemoryLoader::new(), None);
        assert!(!p.valid());
        assert!(!p.has_live());
        assert!(matches!(p.status(), ProgramStatus::Invalid { error } if error.contains("screen.wgsl")));
    }

    #[test]
    fn missing_define_fails_build() {
        let mut s = spec();
        s.defines = Defines::new();
        let p = Program::build("surface", s, &loader(), None);
        assert!(!p.valid());
    }

    // ── reload ────────────────────────────────────────────────────────────

    #[test]
    fn reload_unmodified_is_idempotent() {
        let l = loader();
        let mut p = Program::build("surface", spec(), &l, None);
        let before = (p.location("frame"), p.location("counts"), p.valid());

        p.reload(&l, None).unwrap();
        let after = (p.location("frame"), p.location("counts"), p.valid());
        assert_eq!(before, after);
    }

    #[test]
    fn failed_reload_keeps_live_program() {
        let mut l = loader();
        let mut p = Program::build("surface", spec(), &l, None);
        assert_eq!(p.location("frame"), Some(Location { group: 0, binding: 0 }));

        l.insert("surface.wgsl", BROKEN);
        assert!(p.reload(&l, None).is_err());

        assert!(!p.valid());
        assert!(p.has_live());
        // Lookups still answer from the program that stayed live.
        assert_eq!(p.location("frame"), Some(Location { group: 0, binding: 0 }));
        assert_eq!(p.linked().unwrap().bindings.len(), 2);
    }

    #[test]
    fn successful_reload_refreshes_locations() {
        let mut l = loader();
        let mut p = Program::build("surface", spec(), &l, None);
        assert_eq!(p.location("counts"), Some(Location { group: 0, binding: 2 }));
        assert_eq!(p.cached_locations(), 1);

        l.insert("surface.wgsl", FRAG.replace("@binding(2)", "@binding(5)"));
        p.reload(&l, None).unwrap();
        assert_eq!(p.cached_locations(), 0);
        assert_eq!(p.location("counts"), Some(Location { group: 0, binding: 5 }));
    }

    #[test]
    fn recovery_after_failed_reload() {
        let mut l = loader();
        let mut p = Program::build("surface", spec(), &l, None);

        l.insert("surface.wgsl", BROKEN);
        let _ = p.reload(&l, None);
        assert!(!p.valid());

        l.insert("surface.wgsl", FRAG);
        p.reload(&l, None).unwrap();
        assert!(p.valid());
    }

    // ── device ────────────────────────────────────────────────────────────

    static POSITION: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn device() -> (wgpu::Device, wgpu::Queue) {
        wgpu::Device::noop(&wgpu::DeviceDescriptor::default())
    }

    fn color_spec() -> ProgramSpec {
        let mut s = spec();
        s.link.vertex_buffers = vec![wgpu::VertexBufferLayout {
            array_stride: 8,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION,
        }];
        s.link.targets = vec![Some(wgpu::ColorTargetState {
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];
        s
    }

    #[test]
    fn builds_pipeline_on_device() {
        let (device, _queue) = device();
        let p = Program::build("surface", color_spec(), &loader(), Some(&device));
        assert!(p.valid(), "{:?}", p.status());
        assert!(p.pipeline().is_some());
    }

    #[test]
    fn device_rejection_keeps_last_good_pipeline() {
        let (device, _queue) = device();
        let mut l = loader();
        let mut p = Program::build("surface", color_spec(), &l, Some(&device));
        assert!(p.pipeline().is_some());

        // Parses and validates on its own, but an integer output cannot be
        // written to a float target.
        l.insert(
            "surface.wgsl",
            FRAG.replace("-> @location(0) vec4<f32>", "-> @location(0) vec4<u32>")
                .replace(
                    "frame.tint * f32(min(counts[u32(p.x)], CAPACITY))",
                    "vec4<u32>(min(counts[u32(p.x)], CAPACITY)) * u32(frame.tint.x)",
                ),
        );
        let err = p.reload(&l, Some(&device)).unwrap_err();
        assert!(matches!(err, ShaderError::Device { .. }), "{err}");
        assert!(!p.valid());
        assert!(p.pipeline().is_none());
        assert!(p.last_good().is_some());

        l.insert("surface.wgsl", FRAG);
        p.reload(&l, Some(&device)).unwrap();
        assert!(p.pipeline().is_some());
    }

    #[test]
    fn bind_group_reports_unbound_globals() {
        let (device, _queue) = device();
        let p = Program::build("surface", color_spec(), &loader(), Some(&device));
        let gpu = p.pipeline().unwrap();
        let table = BindTable::new();
        assert!(matches!(
            p.bind_group(&device, gpu, &table),
            Err(ShaderError::Unbound { .. })
        ));
    }

    // ── location cache ────────────────────────────────────────────────────

    #[test]
    fn unknown_name_is_cached_as_absent() {
        let p = Program::build("surface", spec(), &loader(), None);
        assert_eq!(p.location("nope"), None);
        assert_eq!(p.cached_locations(), 1);
        assert_eq!(p.location("nope"), None);
        assert_eq!(p.cached_locations(), 1);
    }
}
