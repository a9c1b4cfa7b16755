use std::ops::Range;

use glam::{Quat, UVec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;

use super::entity::{Physics, Sphere, World};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub primitive_count: u32,
    /// Radius of the ball positions are sampled in.
    pub bounds_radius: f32,
    pub radius_range: Range<f32>,
    /// Give every primitive a tangential velocity.
    pub physics: bool,
    /// `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            primitive_count: 100,
            bounds_radius: 0.3,
            radius_range: 0.01..0.1,
            physics: true,
            seed: None,
        }
    }
}

/// The primitives being rendered.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    world: World,
}

impl Scene {
    pub fn from_config(config: &SceneConfig) -> Self {
        match config.seed {
            Some(seed) => Self::random(config, &mut StdRng::seed_from_u64(seed)),
            None => Self::random(config, &mut rand::thread_rng()),
        }
    }

    /// Samples positions uniformly inside the bounding ball and radii
    /// uniformly inside `radius_range`.
    pub fn random(config: &SceneConfig, rng: &mut impl Rng) -> Self {
        let mut world = World::new();
        for _ in 0..config.primitive_count {
            let position = sample_ball(rng) * config.bounds_radius;
            let radius = if config.radius_range.is_empty() {
                config.radius_range.start
            } else {
                rng.gen_range(config.radius_range.clone())
            };

            let physics = config.physics.then(|| Physics {
                velocity: tangent_velocity(rng, position),
                mass: 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3),
            });

            world.spawn(
                Sphere {
                    position,
                    radius,
                    level_of_detail: 0,
                },
                physics,
            );
        }
        log::debug!("scene: sampled {} primitives", world.len());
        Self { world }
    }

    pub fn from_world(world: World) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn len(&self) -> usize {
        self.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    pub fn spheres(&self) -> &[Sphere] {
        self.world.spheres()
    }

    /// Rotates each moving primitive's position and velocity about the axis
    /// perpendicular to both, by `dt · speed · |v| / |p|` radians.
    ///
    /// Lengths of position and velocity are preserved. Primitives at the
    /// origin or moving parallel to their position are left alone.
    pub fn animate(&mut self, dt: f32, speed: f32) {
        for (sphere, physics) in self.world.moving_mut() {
            let p = sphere.position;
            let v = physics.velocity;
            let axis = p.cross(v);
            let p_len = p.length();
            if p_len <= f32::EPSILON || axis.length_squared() <= f32::EPSILON * f32::EPSILON {
                continue;
            }

            let angle = dt * speed * v.length() / p_len;
            let rotation = Quat::from_axis_angle(axis.normalize(), angle);
            sphere.position = rotation * p;
            physics.velocity = rotation * v;
        }
    }

    /// Sets detail level 1 on primitives whose projected radius exceeds
    /// `threshold_px`, 0 otherwise. Returns how many changed.
    pub fn update_lod(&mut self, camera: &Camera, screen: UVec2, threshold_px: f32) -> usize {
        let mut changed = 0;
        for sphere in self.world.spheres_mut() {
            let lod = match camera.project_sphere(sphere.position, sphere.radius, screen) {
                Some(disk) if disk.radius > threshold_px => 1,
                _ => 0,
            };
            if sphere.level_of_detail != lod {
                sphere.level_of_detail = lod;
                changed += 1;
            }
        }
        changed
    }

    /// `(position, radius)` per primitive, in entity order.
    pub fn pack_mirror(&self) -> Vec<Vec4> {
        self.spheres()
            .iter()
            .map(|s| s.position.extend(s.radius))
            .collect()
    }

    /// Detail level per primitive, parallel to [`Scene::pack_mirror`].
    pub fn pack_detail(&self) -> Vec<u32> {
        self.spheres().iter().map(|s| s.level_of_detail).collect()
    }
}

fn sample_ball(rng: &mut impl Rng) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

fn tangent_velocity(rng: &mut impl Rng, position: Vec3) -> Vec3 {
    let Some(radial) = position.try_normalize() else {
        return Vec3::ZERO;
    };
    let random = sample_ball(rng);
    let tangent = random - radial * random.dot(radial);
    tangent
        .try_normalize()
        .map_or(Vec3::ZERO, |t| t * rng.gen_range(0.05f32..0.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ViewParams;
    use crate::scene::EntityId;

    fn first(scene: &Scene) -> EntityId {
        scene.world().ids().next().unwrap()
    }

    fn seeded(count: u32) -> Scene {
        let config = SceneConfig {
            primitive_count: count,
            seed: Some(7),
            ..SceneConfig::default()
        };
        Scene::from_config(&config)
    }

    fn single(position: Vec3, velocity: Vec3) -> Scene {
        let mut world = World::new();
        world.spawn(
            Sphere { position, radius: 0.05, level_of_detail: 0 },
            Some(Physics { velocity, mass: 1.0 }),
        );
        Scene::from_world(world)
    }

    // ── sampling ──────────────────────────────────────────────────────────

    #[test]
    fn samples_inside_bounds() {
        let config = SceneConfig::default();
        let scene = seeded(500);
        assert_eq!(scene.len(), 500);
        for s in scene.spheres() {
            assert!(s.position.length() <= config.bounds_radius + 1e-6);
            assert!(config.radius_range.contains(&s.radius));
            assert_eq!(s.level_of_detail, 0);
        }
    }

    #[test]
    fn same_seed_same_scene() {
        assert_eq!(seeded(20).pack_mirror(), seeded(20).pack_mirror());
    }

    #[test]
    fn physics_is_optional() {
        let config = SceneConfig {
            primitive_count: 3,
            physics: false,
            seed: Some(1),
            ..SceneConfig::default()
        };
        let scene = Scene::from_config(&config);
        assert!(scene.world().physics(first(&scene)).is_none());
    }

    #[test]
    fn initial_velocity_is_tangential() {
        let scene = seeded(50);
        for id in scene.world().ids() {
            let s = scene.world().sphere(id).unwrap();
            let v = scene.world().physics(id).unwrap().velocity;
            assert!(s.position.normalize_or_zero().dot(v).abs() < 1e-4);
        }
    }

    // ── packing ───────────────────────────────────────────────────────────

    #[test]
    fn mirror_matches_entity_order() {
        let scene = seeded(10);
        let mirror = scene.pack_mirror();
        assert_eq!(mirror.len(), 10);
        for (packed, sphere) in mirror.iter().zip(scene.spheres()) {
            assert_eq!(packed.truncate(), sphere.position);
            assert_eq!(packed.w, sphere.radius);
        }
        assert_eq!(scene.pack_detail(), vec![0; 10]);
    }

    // ── animation ─────────────────────────────────────────────────────────

    #[test]
    fn animation_preserves_lengths() {
        let mut scene = single(Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.0, 0.1, 0.0));
        scene.animate(0.5, 1.0);
        let s = scene.spheres()[0];
        let v = scene.world().physics(first(&scene)).unwrap().velocity;
        assert!((s.position.length() - 0.2).abs() < 1e-5);
        assert!((v.length() - 0.1).abs() < 1e-5);
        assert!(s.position.dot(v).abs() < 1e-5);
    }

    #[test]
    fn animation_angle_scales_with_dt_and_speed() {
        // angle = dt * speed * |v| / |p| = 1 * 2 * 0.1 / 0.2 = 1 rad
        let mut scene = single(Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.0, 0.1, 0.0));
        scene.animate(1.0, 2.0);
        let p = scene.spheres()[0].position;
        assert!((p.x - 0.2 * 1f32.cos()).abs() < 1e-5);
        assert!((p.y - 0.2 * 1f32.sin()).abs() < 1e-5);
    }

    #[test]
    fn degenerate_motion_is_skipped() {
        let mut radial = single(Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.1, 0.0, 0.0));
        radial.animate(1.0, 1.0);
        assert_eq!(radial.spheres()[0].position, Vec3::new(0.2, 0.0, 0.0));

        let mut origin = single(Vec3::ZERO, Vec3::Y);
        origin.animate(1.0, 1.0);
        assert_eq!(origin.spheres()[0].position, Vec3::ZERO);
    }

    #[test]
    fn zero_dt_is_noop() {
        let mut scene = seeded(10);
        let before = scene.pack_mirror();
        scene.animate(0.0, 5.0);
        assert_eq!(scene.pack_mirror(), before);
    }

    // ── level of detail ───────────────────────────────────────────────────

    #[test]
    fn lod_follows_projected_size() {
        let mut world = World::new();
        world.spawn(Sphere { position: Vec3::ZERO, radius: 0.1, level_of_detail: 0 }, None);
        world.spawn(Sphere { position: Vec3::ZERO, radius: 0.001, level_of_detail: 0 }, None);
        let mut scene = Scene::from_world(world);

        let mut camera = Camera::default();
        camera.set_view(ViewParams::default());
        let changed = scene.update_lod(&camera, UVec2::new(800, 600), 20.0);

        assert_eq!(changed, 1);
        assert_eq!(scene.pack_detail(), vec![1, 0]);
        assert_eq!(scene.update_lod(&camera, UVec2::new(800, 600), 20.0), 0);
    }
}
