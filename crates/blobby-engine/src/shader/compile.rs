use std::collections::BTreeMap;
use std::path::PathBuf;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::defines::Defines;
use super::error::ShaderError;
use super::source::assemble_source;
use super::stage::{StageKind, StageSource};

/// Resource class of a reflected global.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindingKind {
    Uniform,
    Storage {
        read_only: bool,
    },
    Texture {
        sample_type: wgpu::TextureSampleType,
        view_dimension: wgpu::TextureViewDimension,
        multisampled: bool,
    },
    Sampler {
        comparison: bool,
    },
}

impl BindingKind {
    /// Layout entry type. Float textures are declared unfilterable so that
    /// 32-bit float targets can be bound; samplers are non-filtering to match.
    pub fn binding_type(&self) -> wgpu::BindingType {
        match *self {
            BindingKind::Uniform => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::Storage { read_only } => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::Texture {
                sample_type,
                view_dimension,
                multisampled,
            } => wgpu::BindingType::Texture {
                sample_type,
                view_dimension,
                multisampled,
            },
            BindingKind::Sampler { comparison } => wgpu::BindingType::Sampler(if comparison {
                wgpu::SamplerBindingType::Comparison
            } else {
                wgpu::SamplerBindingType::NonFiltering
            }),
        }
    }
}

/// A global resource a stage's entry point actually uses.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReflectedBinding {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: BindingKind,
    pub visibility: wgpu::ShaderStages,
}

/// One stage after parsing, validation and reflection.
#[derive(Debug, Clone)]
pub struct CompiledStage {
    pub kind: StageKind,
    pub path: PathBuf,
    pub entry_point: String,
    /// Source text as compiled, defines included.
    pub source: String,
    pub bindings: Vec<ReflectedBinding>,
    /// User-defined inputs of the entry point, by location.
    pub inputs: BTreeMap<u32, naga::TypeInner>,
    /// User-defined outputs of the entry point, by location.
    pub outputs: BTreeMap<u32, naga::TypeInner>,
}

/// Compiles a single stage. Does not touch the GPU.
pub fn compile_stage(
    stage: &StageSource,
    raw: &str,
    defines: &Defines,
) -> Result<CompiledStage, ShaderError> {
    let source = assemble_source(raw, defines)?;

    let module = naga::front::wgsl::parse_str(&source).map_err(|e| ShaderError::Parse {
        path: stage.path.clone(),
        log: e.emit_to_string(&source),
    })?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| ShaderError::Validation {
            path: stage.path.clone(),
            log: e.emit_to_string(&source),
        })?;

    let Some((index, entry)) = module
        .entry_points
        .iter()
        .enumerate()
        .find(|(_, ep)| ep.name == stage.entry_point && ep.stage == stage.kind.naga())
    else {
        return Err(ShaderError::MissingEntryPoint {
            path: stage.path.clone(),
            stage: stage.kind,
            entry: stage.entry_point.clone(),
        });
    };

    let usage = info.get_entry_point(index);

    let mut bindings = Vec::new();
    for (handle, var) in module.global_variables.iter() {
        if usage[handle].is_empty() {
            continue;
        }
        let Some(slot) = &var.binding else { continue };

        let name = var.name.clone().ok_or_else(|| ShaderError::UnsupportedBinding {
            path: stage.path.clone(),
            name: format!("@group({}) @binding({})", slot.group, slot.binding),
            reason: "unnamed global".into(),
        })?;

        let kind = binding_kind(&module, var).map_err(|reason| ShaderError::UnsupportedBinding {
            path: stage.path.clone(),
            name: name.clone(),
            reason,
        })?;

        bindings.push(ReflectedBinding {
            name,
            group: slot.group,
            binding: slot.binding,
            kind,
            visibility: stage.kind.visibility(),
        });
    }
    bindings.sort_by_key(|b| (b.group, b.binding));

    let outputs = entry
        .function
        .result
        .as_ref()
        .map(|r| locations(&module, r.ty, r.binding.as_ref()))
        .unwrap_or_default();

    let mut inputs = BTreeMap::new();
    for arg in &entry.function.arguments {
        inputs.extend(locations(&module, arg.ty, arg.binding.as_ref()));
    }

    Ok(CompiledStage {
        kind: stage.kind,
        path: stage.path.clone(),
        entry_point: stage.entry_point.clone(),
        source,
        bindings,
        inputs,
        outputs,
    })
}

fn locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
) -> BTreeMap<u32, naga::TypeInner> {
    let mut out = BTreeMap::new();
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location, module.types[ty].inner.clone());
        }
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.insert(*location, module.types[member.ty].inner.clone());
                    }
                }
            }
        }
    }
    out
}

fn binding_kind(module: &naga::Module, var: &naga::GlobalVariable) -> Result<BindingKind, String> {
    match var.space {
        naga::AddressSpace::Uniform => Ok(BindingKind::Uniform),
        naga::AddressSpace::Storage { access } => Ok(BindingKind::Storage {
            read_only: !access.contains(naga::StorageAccess::STORE),
        }),
        naga::AddressSpace::Handle => match &module.types[var.ty].inner {
            naga::TypeInner::Image {
                dim,
                arrayed,
                class,
            } => image_kind(*dim, *arrayed, class),
            naga::TypeInner::Sampler { comparison } => Ok(BindingKind::Sampler {
                comparison: *comparison,
            }),
            other => Err(format!("handle of type {other:?}")),
        },
        other => Err(format!("address space {other:?}")),
    }
}

fn image_kind(
    dim: naga::ImageDimension,
    arrayed: bool,
    class: &naga::ImageClass,
) -> Result<BindingKind, String> {
    use naga::ImageDimension as D;
    use wgpu::TextureViewDimension as V;

    let view_dimension = match (dim, arrayed) {
        (D::D1, false) => V::D1,
        (D::D2, false) => V::D2,
        (D::D2, true) => V::D2Array,
        (D::D3, false) => V::D3,
        (D::Cube, false) => V::Cube,
        (D::Cube, true) => V::CubeArray,
        _ => return Err(format!("arrayed {dim:?} image")),
    };

    match class {
        naga::ImageClass::Sampled { kind, multi } => {
            let sample_type = match kind {
                naga::ScalarKind::Float => wgpu::TextureSampleType::Float { filterable: false },
                naga::ScalarKind::Sint => wgpu::TextureSampleType::Sint,
                naga::ScalarKind::Uint => wgpu::TextureSampleType::Uint,
                other => return Err(format!("{other:?} texture")),
            };
            Ok(BindingKind::Texture {
                sample_type,
                view_dimension,
                multisampled: *multi,
            })
        }
        naga::ImageClass::Depth { multi } => Ok(BindingKind::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension,
            multisampled: *multi,
        }),
        other => Err(format!("image class {other:?}")),
    }
}
