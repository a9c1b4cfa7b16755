use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// A resource that can be bound to a named target.
#[derive(Debug, Copy, Clone)]
pub enum BindResource<'a> {
    Buffer(&'a wgpu::Buffer),
    View(&'a wgpu::TextureView),
    Sampler(&'a wgpu::Sampler),
}

impl<'a> BindResource<'a> {
    pub fn binding_resource(self) -> wgpu::BindingResource<'a> {
        match self {
            BindResource::Buffer(b) => b.as_entire_binding(),
            BindResource::View(v) => wgpu::BindingResource::TextureView(v),
            BindResource::Sampler(s) => wgpu::BindingResource::Sampler(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("nothing is bound to `{0}`")]
    Unbound(String),
}

/// Named binding targets for one frame.
///
/// Binding is scoped: `bind` returns a [`BindGuard`] and the target is released
/// when the guard drops. Binds to the same target are last-wins; an older guard
/// dropping afterwards leaves the newer binding in place. Different targets are
/// independent, so one resource may sit on several targets at once.
pub struct BindTable<R> {
    slots: RefCell<HashMap<String, (u64, R)>>,
    next_token: Cell<u64>,
}

impl<R> Default for BindTable<R> {
    fn default() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
            next_token: Cell::new(0),
        }
    }
}

impl<R: Clone> BindTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `resource` to `target` until the returned guard is dropped.
    #[must_use = "the binding is released as soon as the guard is dropped"]
    pub fn bind(&self, target: &str, resource: R) -> BindGuard<'_, R> {
        let token = self.next_token.get();
        self.next_token.set(token + 1);

        self.slots
            .borrow_mut()
            .insert(target.to_string(), (token, resource));

        BindGuard {
            table: self,
            target: target.to_string(),
            token,
        }
    }

    /// Returns the resource currently bound to `target`.
    pub fn resolve(&self, target: &str) -> Result<R, BindError> {
        self.slots
            .borrow()
            .get(target)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| BindError::Unbound(target.to_string()))
    }

    pub fn is_bound(&self, target: &str) -> bool {
        self.slots.borrow().contains_key(target)
    }

    pub fn bound_count(&self) -> usize {
        self.slots.borrow().len()
    }

    fn release(&self, target: &str, token: u64) {
        let mut slots = self.slots.borrow_mut();
        if slots.get(target).is_some_and(|(t, _)| *t == token) {
            slots.remove(target);
        }
    }
}

/// Scoped binding. Dropping it unbinds the target unless a newer bind replaced it.
///
/// Moving the guard moves the release obligation with it.
pub struct BindGuard<'t, R: Clone> {
    table: &'t BindTable<R>,
    target: String,
    token: u64,
}

impl<R: Clone> BindGuard<'_, R> {
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl<R: Clone> Drop for BindGuard<'_, R> {
    fn drop(&mut self) {
        self.table.release(&self.target, self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── scope ─────────────────────────────────────────────────────────────

    #[test]
    fn guard_unbinds_on_scope_exit() {
        let table = BindTable::new();
        {
            let _g = table.bind("ssbo", 1u32);
            assert_eq!(table.resolve("ssbo"), Ok(1));
        }
        assert_eq!(table.resolve("ssbo"), Err(BindError::Unbound("ssbo".into())));
    }

    #[test]
    fn guard_unbinds_on_early_return() {
        fn bind_and_bail(table: &BindTable<u32>) -> Option<()> {
            let _g = table.bind("ssbo", 7);
            let missing: Option<()> = None;
            missing?;
            Some(())
        }

        let table = BindTable::new();
        assert!(bind_and_bail(&table).is_none());
        assert!(!table.is_bound("ssbo"));
    }

    // ── move ──────────────────────────────────────────────────────────────

    #[test]
    fn moved_guard_releases_exactly_once() {
        let table = BindTable::new();
        let g = table.bind("vbo", 3u32);

        let mut held = Vec::new();
        held.push(g);
        assert!(table.is_bound("vbo"));

        let g = held.pop().unwrap();
        assert!(table.is_bound("vbo"));
        drop(g);
        assert!(!table.is_bound("vbo"));
    }

    // ── targets ───────────────────────────────────────────────────────────

    #[test]
    fn same_resource_on_two_targets() {
        let table = BindTable::new();
        let _a = table.bind("storage", "mirror");
        let _b = table.bind("vertex", "mirror");
        assert_eq!(table.resolve("storage"), Ok("mirror"));
        assert_eq!(table.resolve("vertex"), Ok("mirror"));
        assert_eq!(table.bound_count(), 2);
    }

    #[test]
    fn same_target_is_last_wins() {
        let table = BindTable::new();
        let first = table.bind("ubo", 1u32);
        let second = table.bind("ubo", 2u32);
        assert_eq!(table.resolve("ubo"), Ok(2));

        // The stale guard must not unbind the newer resource.
        drop(first);
        assert_eq!(table.resolve("ubo"), Ok(2));

        drop(second);
        assert!(!table.is_bound("ubo"));
    }

    #[test]
    fn newer_guard_dropped_first_unbinds() {
        let table = BindTable::new();
        let first = table.bind("ubo", 1u32);
        let second = table.bind("ubo", 2u32);
        drop(second);
        // No reference counting: the older resource is not restored.
        assert!(!table.is_bound("ubo"));
        drop(first);
        assert!(!table.is_bound("ubo"));
    }
}
