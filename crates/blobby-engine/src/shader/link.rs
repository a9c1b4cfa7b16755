use std::collections::BTreeMap;

use super::compile::{CompiledStage, ReflectedBinding};
use super::error::ShaderError;
use super::stage::StageKind;

/// Binding location of a named global.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Location {
    pub group: u32,
    pub binding: u32,
}

/// Stages that passed the cross-stage checks, with their merged interface.
#[derive(Debug, Clone)]
pub struct LinkedStages {
    pub vertex: CompiledStage,
    pub fragment: Option<CompiledStage>,
    /// Union of the stages' bindings, sorted by (group, binding).
    pub bindings: Vec<ReflectedBinding>,
}

impl LinkedStages {
    pub fn location(&self, name: &str) -> Option<Location> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .map(|b| Location {
                group: b.group,
                binding: b.binding,
            })
    }
}

/// Cross-stage checks: exactly one vertex stage, at most one fragment stage,
/// every fragment input fed by a vertex output of the same type, and no two
/// stages disagreeing on what sits at a binding. Only group 0 is supported.
pub fn link_stages(program: &str, stages: Vec<CompiledStage>) -> Result<LinkedStages, ShaderError> {
    let fail = |reason: String| ShaderError::Link {
        program: program.to_string(),
        reason,
    };

    let mut vertex = None;
    let mut fragment = None;
    for stage in stages {
        let slot = match stage.kind {
            StageKind::Vertex => &mut vertex,
            StageKind::Fragment => &mut fragment,
        };
        if slot.is_some() {
            return Err(fail(format!("more than one {:?} stage", stage.kind)));
        }
        *slot = Some(stage);
    }

    let Some(vertex) = vertex else {
        return Err(fail("no vertex stage".into()));
    };

    if let Some(fragment) = &fragment {
        for (location, ty) in &fragment.inputs {
            match vertex.outputs.get(location) {
                None => {
                    return Err(fail(format!(
                        "fragment input @location({location}) has no matching vertex output"
                    )));
                }
                Some(out) if out != ty => {
                    return Err(fail(format!(
                        "@location({location}) is {out:?} in the vertex stage but {ty:?} in the fragment stage"
                    )));
                }
                Some(_) => {}
            }
        }
    }

    let mut merged: BTreeMap<(u32, u32), ReflectedBinding> = BTreeMap::new();
    for b in vertex.bindings.iter().chain(fragment.iter().flat_map(|f| f.bindings.iter())) {
        if b.group != 0 {
            return Err(fail(format!("`{}` uses bind group {}; only group 0 is supported", b.name, b.group)));
        }

        match merged.get_mut(&(b.group, b.binding)) {
            Some(existing) => {
                if existing.name != b.name || existing.kind != b.kind {
                    return Err(fail(format!(
                        "binding {} is `{}` ({:?}) in one stage and `{}` ({:?}) in another",
                        b.binding, existing.name, existing.kind, b.name, b.kind
                    )));
                }
                existing.visibility |= b.visibility;
            }
            None => {
                if let Some(other) = merged.values().find(|m| m.name == b.name) {
                    return Err(fail(format!(
                        "`{}` is bound at both {} and {}",
                        b.name, other.binding, b.binding
                    )));
                }
                merged.insert((b.group, b.binding), b.clone());
            }
        }
    }

    Ok(LinkedStages {
        vertex,
        fragment,
        bindings: merged.into_values().collect(),
    })
}
