use bytemuck::{Pod, Zeroable};

use crate::camera::Camera;

use super::config::Tunables;

/// Per-frame uniform block shared by every pass. Matches `Frame` in the WGSL
/// sources.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub mvp: [[f32; 4]; 4],
    pub mvp_inv: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub view_inv: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// width, height, 1/width, 1/height
    pub screen: [f32; 4],
    /// time, radius scale, smoothing, interpolation
    pub params: [f32; 4],
    /// capacity, view mode, primitive count, unused
    pub config: [u32; 4],
    /// rgb, unused
    pub background: [f32; 4],
}

const _: () = assert!(std::mem::size_of::<FrameUniforms>() == 384);

/// Inputs gathered by the pipeline when encoding a frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameInputs<'a> {
    pub camera: &'a Camera,
    pub tunables: &'a Tunables,
    pub time: f32,
    pub width: u32,
    pub height: u32,
    pub capacity: u32,
    pub primitive_count: u32,
    pub background: [f32; 3],
}

impl FrameUniforms {
    pub fn new(inputs: &FrameInputs<'_>) -> Self {
        let cam = inputs.camera;
        let t = inputs.tunables;
        let (w, h) = (inputs.width.max(1) as f32, inputs.height.max(1) as f32);
        let [r, g, b] = inputs.background;

        Self {
            mvp: cam.mvp().to_cols_array_2d(),
            mvp_inv: cam.mvp_inverse().to_cols_array_2d(),
            view: cam.view().to_cols_array_2d(),
            view_inv: cam.view_inverse().to_cols_array_2d(),
            projection: cam.projection().to_cols_array_2d(),
            screen: [w, h, 1.0 / w, 1.0 / h],
            params: [inputs.time, t.radius_scale(), t.smoothing(), t.interpolation()],
            config: [inputs.capacity, t.view_mode.code(), inputs.primitive_count, 0],
            background: [r, g, b, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ViewMode;

    #[test]
    fn packs_tunables_and_screen() {
        let camera = Camera::default();
        let mut tunables = Tunables::default();
        tunables.set_smoothing(2.0);
        tunables.view_mode = ViewMode::ListCount;

        let u = FrameUniforms::new(&FrameInputs {
            camera: &camera,
            tunables: &tunables,
            time: 3.0,
            width: 200,
            height: 100,
            capacity: 8,
            primitive_count: 10,
            background: [0.2, 0.3, 0.3],
        });

        assert_eq!(u.screen, [200.0, 100.0, 0.005, 0.01]);
        assert_eq!(u.params, [3.0, 1.5, 2.0, 0.0]);
        assert_eq!(u.config, [8, 3, 10, 0]);
        assert_eq!(u.mvp, camera.mvp().to_cols_array_2d());
        assert_eq!(bytemuck::bytes_of(&u).len(), 384);
    }
}
