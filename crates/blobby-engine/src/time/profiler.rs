use std::fmt::Write as _;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Section {
    name: &'static str,
    total: Duration,
    samples: u32,
}

/// Host-side section timings, averaged until `reset`.
///
/// Sections keep the order they were first recorded in.
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    sections: Vec<Section>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(section) => {
                section.total += elapsed;
                section.samples += 1;
            }
            None => self.sections.push(Section {
                name,
                total: elapsed,
                samples: 1,
            }),
        }
    }

    /// Runs `f` and records its wall time under `name`.
    pub fn measure<T>(&mut self, name: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(name, start.elapsed());
        out
    }

    /// Average milliseconds per sample, by section.
    pub fn averages(&self) -> Vec<(&'static str, f64)> {
        self.sections
            .iter()
            .map(|s| (s.name, s.total.as_secs_f64() * 1e3 / f64::from(s.samples.max(1))))
            .collect()
    }

    /// `{a ms},{b ms},` in section order.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (_, ms) in self.averages() {
            let _ = write!(out, "{{{ms:.3} ms}},");
        }
        out
    }

    pub fn reset(&mut self) {
        self.sections.clear();
    }
}
