use glam::Vec2;

use super::state::ViewParams;

/// Maps pointer drags and wheel steps onto [`ViewParams`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitControls {
    /// Radians per pixel of drag.
    pub sensitivity: f32,
    /// Zoom change per wheel line.
    pub zoom_step: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            sensitivity: 0.005,
            zoom_step: 0.01,
        }
    }
}

impl OrbitControls {
    /// Horizontal drag turns yaw, vertical drag turns pitch.
    pub fn drag(&self, view: &mut ViewParams, delta_px: Vec2) -> bool {
        if delta_px == Vec2::ZERO {
            return false;
        }
        view.yaw += delta_px.x * self.sensitivity;
        view.pitch += delta_px.y * self.sensitivity;
        true
    }

    /// Positive lines zoom in. Zoom stays within [0, 1].
    pub fn scroll(&self, view: &mut ViewParams, lines: f32) -> bool {
        let zoom = (view.zoom + lines * self.zoom_step).clamp(0.0, 1.0);
        let changed = zoom != view.zoom;
        view.zoom = zoom;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_turns_yaw_and_pitch() {
        let controls = OrbitControls::default();
        let mut view = ViewParams::default();
        assert!(controls.drag(&mut view, Vec2::new(100.0, -20.0)));
        assert!((view.yaw - 0.5).abs() < 1e-6);
        assert!((view.pitch + 0.1).abs() < 1e-6);
    }

    #[test]
    fn zero_drag_is_noop() {
        let controls = OrbitControls::default();
        let mut view = ViewParams::default();
        assert!(!controls.drag(&mut view, Vec2::ZERO));
        assert_eq!(view, ViewParams::default());
    }

    #[test]
    fn scroll_clamps_zoom() {
        let controls = OrbitControls::default();
        let mut view = ViewParams::default();

        assert!(controls.scroll(&mut view, 10.0));
        assert!((view.zoom - 0.6).abs() < 1e-6);

        controls.scroll(&mut view, 1000.0);
        assert_eq!(view.zoom, 1.0);
        assert!(!controls.scroll(&mut view, 3.0));

        controls.scroll(&mut view, -1000.0);
        assert_eq!(view.zoom, 0.0);
    }
}
