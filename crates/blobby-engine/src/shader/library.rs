use std::collections::BTreeMap;

use super::error::ShaderError;
use super::loader::SourceLoader;
use super::program::{Program, ProgramSpec};

/// Outcome of [`ShaderLibrary::reload_all`].
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct ReloadReport {
    pub reloaded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl ReloadReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Named programs sharing one source loader.
pub struct ShaderLibrary<L> {
    loader: L,
    programs: BTreeMap<String, Program>,
}

impl<L: SourceLoader> ShaderLibrary<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            programs: BTreeMap::new(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Builds and registers a program, replacing any program of the same name.
    /// The result may be invalid; check [`Program::valid`].
    pub fn compile(
        &mut self,
        name: &str,
        spec: ProgramSpec,
        device: Option<&wgpu::Device>,
    ) -> &Program {
        let program = Program::build(name, spec, &self.loader, device);
        if program.valid() {
            log::info!("compiled program `{name}`");
        }
        self.programs.insert(name.to_string(), program);
        &self.programs[name]
    }

    pub fn get(&self, name: &str) -> Option<&Program> {
        self.programs.get(name)
    }

    pub fn reload(&mut self, name: &str, device: Option<&wgpu::Device>) -> Result<(), ShaderError> {
        let program = self
            .programs
            .get_mut(name)
            .ok_or_else(|| ShaderError::UnknownProgram(name.to_string()))?;
        program.reload(&self.loader, device)
    }

    /// Reloads every program. A failure in one program does not stop the others.
    pub fn reload_all(&mut self, device: Option<&wgpu::Device>) -> ReloadReport {
        let mut report = ReloadReport::default();
        for (name, program) in &mut self.programs {
            match program.reload(&self.loader, device) {
                Ok(()) => report.reloaded.push(name.clone()),
                Err(e) => report.failed.push((name.clone(), e.to_string())),
            }
        }
        log::info!(
            "shader reload: {} ok, {} failed",
            report.reloaded.len(),
            report.failed.len()
        );
        report
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.programs.keys().map(String::as_str)
    }

    pub fn all_valid(&self) -> bool {
        self.programs.values().all(Program::valid)
    }
}
