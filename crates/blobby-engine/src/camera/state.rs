use glam::{Mat4, Quat, UVec2, Vec2, Vec3, Vec4Swizzles};

/// Distance from the scene origin at zoom 0. Zoom 1 puts the eye at the origin.
pub const CAMERA_DISTANCE: f32 = 2.0;

/// Perspective projection inputs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionParams {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            fov_y: 30f32.to_radians(),
            aspect: 800.0 / 600.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl ProjectionParams {
    /// Same parameters with the aspect ratio of a `width`×`height` surface.
    pub fn for_size(self, width: u32, height: u32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            ..self
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Orbit inputs: Euler angles in radians and a zoom factor in [0, 1].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewParams {
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            zoom: 0.5,
        }
    }
}

impl ViewParams {
    /// Pitch about X applied after yaw about Y, then pulled back along -Z
    /// by a distance interpolated from the zoom.
    pub fn matrix(&self) -> Mat4 {
        let rotation = (Quat::from_axis_angle(Vec3::X, self.pitch)
            * Quat::from_axis_angle(Vec3::Y, self.yaw))
        .normalize();
        let distance = CAMERA_DISTANCE * (1.0 - self.zoom.clamp(0.0, 1.0));
        Mat4::from_translation(Vec3::new(0.0, 0.0, -distance)) * Mat4::from_quat(rotation)
    }
}

/// A sphere's footprint on screen, in pixels (top-left origin).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenDisk {
    pub center: Vec2,
    pub radius: f32,
}

impl ScreenDisk {
    pub fn contains(&self, p: Vec2) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }

    /// Inclusive pixel range overlapped by the disk, clipped to the screen.
    pub fn pixel_bounds(&self, screen: UVec2) -> Option<(UVec2, UVec2)> {
        if screen.x == 0 || screen.y == 0 {
            return None;
        }
        let max_px = (screen - UVec2::ONE).as_vec2();
        let lo = (self.center - Vec2::splat(self.radius)).floor();
        let hi = (self.center + Vec2::splat(self.radius)).ceil();
        if hi.x < 0.0 || hi.y < 0.0 || lo.x > max_px.x || lo.y > max_px.y {
            return None;
        }
        Some((
            lo.clamp(Vec2::ZERO, max_px).as_uvec2(),
            hi.clamp(Vec2::ZERO, max_px).as_uvec2(),
        ))
    }
}

/// Projection and view matrices with every derived product kept current.
///
/// Both setters recompute all derived matrices before returning, so the
/// combined matrices are never built from a stale factor. The model matrix
/// is the identity.
#[derive(Debug, Clone)]
pub struct Camera {
    projection_params: ProjectionParams,
    view_params: ViewParams,
    p: Mat4,
    p_inv: Mat4,
    v: Mat4,
    v_inv: Mat4,
    mvp: Mat4,
    mvp_inv: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(ProjectionParams::default(), ViewParams::default())
    }
}

impl Camera {
    pub fn new(projection: ProjectionParams, view: ViewParams) -> Self {
        let mut camera = Self {
            projection_params: projection,
            view_params: view,
            p: Mat4::IDENTITY,
            p_inv: Mat4::IDENTITY,
            v: Mat4::IDENTITY,
            v_inv: Mat4::IDENTITY,
            mvp: Mat4::IDENTITY,
            mvp_inv: Mat4::IDENTITY,
        };
        camera.set_projection(projection);
        camera.set_view(view);
        camera
    }

    pub fn set_projection(&mut self, params: ProjectionParams) {
        self.projection_params = params;
        self.p = params.matrix();
        self.p_inv = self.p.inverse();
        self.combine();
    }

    pub fn set_view(&mut self, params: ViewParams) {
        self.view_params = params;
        self.v = params.matrix();
        self.v_inv = self.v.inverse();
        self.combine();
    }

    /// Updates the aspect ratio for a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.set_projection(self.projection_params.for_size(width, height));
    }

    fn combine(&mut self) {
        self.mvp = self.p * self.v;
        self.mvp_inv = self.mvp.inverse();
    }

    pub fn projection_params(&self) -> ProjectionParams {
        self.projection_params
    }

    pub fn view_params(&self) -> ViewParams {
        self.view_params
    }

    pub fn projection(&self) -> Mat4 {
        self.p
    }

    pub fn projection_inverse(&self) -> Mat4 {
        self.p_inv
    }

    pub fn view(&self) -> Mat4 {
        self.v
    }

    pub fn view_inverse(&self) -> Mat4 {
        self.v_inv
    }

    pub fn mvp(&self) -> Mat4 {
        self.mvp
    }

    pub fn mvp_inverse(&self) -> Mat4 {
        self.mvp_inv
    }

    /// Eye position in world space.
    pub fn eye(&self) -> Vec3 {
        self.v_inv.w_axis.xyz()
    }

    /// Screen-space footprint of a sphere on a `screen`-sized target.
    ///
    /// A sphere enclosing the eye covers the whole screen. A sphere entirely
    /// behind the near plane has no footprint.
    pub fn project_sphere(&self, center: Vec3, radius: f32, screen: UVec2) -> Option<ScreenDisk> {
        let size = screen.as_vec2();
        let view_pos = self.v.transform_point3(center);
        let depth = -view_pos.z;
        let dist_sq = view_pos.length_squared();

        if dist_sq <= radius * radius {
            return Some(ScreenDisk {
                center: size * 0.5,
                radius: size.length(),
            });
        }
        if depth + radius <= self.projection_params.near {
            return None;
        }

        let clip = self.p * view_pos.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        let center_px = Vec2::new((ndc.x + 1.0) * 0.5 * size.x, (1.0 - ndc.y) * 0.5 * size.y);

        // Tangent-cone extent: r / sqrt(d² - r²) scaled by the focal length in pixels.
        let focal_px = self.p.y_axis.y * size.y * 0.5;
        let extent = radius / (dist_sq - radius * radius).sqrt();
        Some(ScreenDisk {
            center: center_px,
            radius: extent * focal_px,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn projection_times_inverse_is_identity() {
        for (fov, aspect, near, far) in [
            (30f32, 4.0 / 3.0, 0.1, 100.0),
            (90.0, 1.0, 0.01, 10.0),
            (10.0, 0.25, 1.0, 1000.0),
        ] {
            let mut cam = Camera::default();
            cam.set_projection(ProjectionParams {
                fov_y: fov.to_radians(),
                aspect,
                near,
                far,
            });
            assert!(approx(cam.projection() * cam.projection_inverse(), Mat4::IDENTITY));
        }
    }

    #[test]
    fn resize_changes_aspect_only() {
        let mut cam = Camera::default();
        let before = cam.projection_params();
        cam.resize(1920, 1080);
        let after = cam.projection_params();
        assert_eq!(after.fov_y, before.fov_y);
        assert!((after.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn zero_height_does_not_divide_by_zero() {
        let p = ProjectionParams::default().for_size(640, 0);
        assert_eq!(p.aspect, 640.0);
    }

    // ── combined matrices ─────────────────────────────────────────────────

    #[test]
    fn combined_matrices_follow_each_setter() {
        let mut cam = Camera::default();
        cam.set_view(ViewParams { yaw: 0.4, pitch: -0.2, zoom: 0.3 });
        assert!(approx(cam.mvp(), cam.projection() * cam.view()));
        assert!(approx(cam.mvp() * cam.mvp_inverse(), Mat4::IDENTITY));

        cam.resize(300, 900);
        assert!(approx(cam.mvp(), cam.projection() * cam.view()));
        assert!(approx(cam.view() * cam.view_inverse(), Mat4::IDENTITY));
    }

    #[test]
    fn default_eye_sits_on_positive_z() {
        let cam = Camera::default();
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn zoom_interpolates_distance() {
        let mut cam = Camera::default();
        cam.set_view(ViewParams { zoom: 0.0, ..ViewParams::default() });
        assert!((cam.eye().length() - CAMERA_DISTANCE).abs() < 1e-5);
        cam.set_view(ViewParams { zoom: 1.0, ..ViewParams::default() });
        assert!(cam.eye().length() < 1e-5);
    }

    #[test]
    fn yaw_orbits_around_y() {
        let mut cam = Camera::default();
        cam.set_view(ViewParams {
            yaw: std::f32::consts::FRAC_PI_2,
            ..ViewParams::default()
        });
        let eye = cam.eye();
        assert!(eye.y.abs() < 1e-5);
        assert!((eye.length() - 1.0).abs() < 1e-5);
        assert!(eye.z.abs() < 1e-5);
    }

    // ── projected footprint ───────────────────────────────────────────────

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = Camera::default();
        let disk = cam.project_sphere(Vec3::ZERO, 0.1, UVec2::new(800, 600)).unwrap();
        assert!(disk.center.abs_diff_eq(Vec2::new(400.0, 300.0), 1e-3));
        assert!(disk.radius > 0.0);
    }

    #[test]
    fn larger_sphere_has_larger_footprint() {
        let cam = Camera::default();
        let screen = UVec2::new(800, 600);
        let small = cam.project_sphere(Vec3::ZERO, 0.05, screen).unwrap();
        let large = cam.project_sphere(Vec3::ZERO, 0.1, screen).unwrap();
        assert!(large.radius > small.radius);
    }

    #[test]
    fn sphere_behind_eye_has_no_footprint() {
        let cam = Camera::default();
        assert!(cam.project_sphere(Vec3::new(0.0, 0.0, 3.0), 0.1, UVec2::new(800, 600)).is_none());
    }

    #[test]
    fn enclosing_sphere_covers_screen() {
        let cam = Camera::default();
        let disk = cam.project_sphere(Vec3::new(0.0, 0.0, 1.0), 0.5, UVec2::new(800, 600)).unwrap();
        let (lo, hi) = disk.pixel_bounds(UVec2::new(800, 600)).unwrap();
        assert_eq!(lo, UVec2::ZERO);
        assert_eq!(hi, UVec2::new(799, 599));
    }

    #[test]
    fn pixel_bounds_clip_offscreen() {
        let disk = ScreenDisk { center: Vec2::new(-50.0, 10.0), radius: 5.0 };
        assert!(disk.pixel_bounds(UVec2::new(100, 100)).is_none());

        let disk = ScreenDisk { center: Vec2::new(2.0, 2.0), radius: 5.0 };
        assert_eq!(disk.pixel_bounds(UVec2::new(100, 100)), Some((UVec2::ZERO, UVec2::new(7, 7))));
    }
}
