use std::fmt;

/// Which programs count as usable when the last reload failed.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum ReloadPolicy {
    /// Only programs whose latest build succeeded run.
    #[default]
    SkipInvalid,
    /// A program that failed to reload keeps running its last linked pipeline.
    KeepLastGood,
}

/// State of one program as the planner sees it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProgramState {
    pub valid: bool,
    pub has_last_good: bool,
}

impl ProgramState {
    pub const VALID: Self = Self { valid: true, has_last_good: true };
    pub const MISSING: Self = Self { valid: false, has_last_good: false };

    pub fn usable(self, policy: ReloadPolicy) -> bool {
        match policy {
            ReloadPolicy::SkipInvalid => self.valid,
            ReloadPolicy::KeepLastGood => self.valid || self.has_last_good,
        }
    }
}

/// Programs the frame depends on, in pass order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProgramStates {
    pub sphere: ProgramState,
    pub list: ProgramState,
    pub surface: ProgramState,
}

/// Resource class made visible across a pass boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Barrier {
    /// Storage-buffer writes visible to later storage access.
    Storage,
    /// Render-target writes visible to texture fetches.
    TextureFetch,
    StorageAndTextureFetch,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Step {
    Clear,
    Barrier(Barrier),
    Prepass,
    ListBuild,
    Resolve,
}

impl Step {
    pub fn program(self) -> Option<&'static str> {
        match self {
            Step::Prepass => Some("sphere"),
            Step::ListBuild => Some("list"),
            Step::Resolve => Some("surface"),
            Step::Clear | Step::Barrier(_) => None,
        }
    }
}

/// Why a frame stopped short of presenting.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Skip {
    pub at: Step,
    pub program: &'static str,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program `{}` is not usable, skipping from {:?}", self.program, self.at)
    }
}

const FULL_FRAME: [Step; 7] = [
    Step::Clear,
    Step::Barrier(Barrier::Storage),
    Step::Prepass,
    Step::Barrier(Barrier::TextureFetch),
    Step::ListBuild,
    Step::Barrier(Barrier::StorageAndTextureFetch),
    Step::Resolve,
];

/// Ordered steps of one frame.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FramePlan {
    pub steps: Vec<Step>,
    pub skipped: Option<Skip>,
}

impl FramePlan {
    /// Full frame, truncated before the first pass whose program is unusable.
    /// Passes after it depend on its output and are dropped too.
    pub fn build(states: ProgramStates, policy: ReloadPolicy) -> Self {
        let mut steps = Vec::with_capacity(FULL_FRAME.len());
        for step in FULL_FRAME {
            let state = match step {
                Step::Prepass => Some(states.sphere),
                Step::ListBuild => Some(states.list),
                Step::Resolve => Some(states.surface),
                _ => None,
            };
            if state.is_some_and(|s| !s.usable(policy)) {
                // Drop a trailing barrier that no longer guards anything.
                if matches!(steps.last(), Some(Step::Barrier(_))) {
                    steps.pop();
                }
                return Self {
                    steps,
                    skipped: Some(Skip {
                        at: step,
                        program: step.program().unwrap_or("?"),
                    }),
                };
            }
            steps.push(step);
        }
        Self { steps, skipped: None }
    }

    /// True when the frame reaches the resolve pass and should be presented.
    pub fn presents(&self) -> bool {
        self.steps.last() == Some(&Step::Resolve)
    }

    pub fn runs(&self, step: Step) -> bool {
        self.steps.contains(&step)
    }
}
