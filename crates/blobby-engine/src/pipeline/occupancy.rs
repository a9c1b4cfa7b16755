use glam::{UVec2, Vec2};

use crate::camera::Camera;
use crate::scene::Scene;

use super::config::Tunables;
use super::cpu::PixelLists;
use super::layout::{ListEntry, ListLayout};

/// How full the per-pixel lists would be on a sampled grid.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Occupancy {
    pub sampled: u32,
    /// Sampled pixels with at least one candidate.
    pub covered: u32,
    /// Sampled pixels with more candidates than capacity.
    pub overflowing: u32,
    pub max_candidates: u32,
}

impl Occupancy {
    pub fn overflows(&self) -> bool {
        self.overflowing > 0
    }
}

/// Replays list construction on the host for every `step`-th pixel of a
/// `screen`-sized target, using each primitive's outer-radius footprint.
pub fn estimate(
    scene: &Scene,
    camera: &Camera,
    tunables: &Tunables,
    screen: UVec2,
    capacity: u32,
    step: u32,
) -> Occupancy {
    let step = step.max(1);
    let grid = UVec2::new(screen.x.div_ceil(step), screen.y.div_ceil(step));
    let layout = ListLayout::new(grid.x, grid.y, capacity);
    let mut lists = PixelLists::new(layout);

    for (index, sphere) in scene.spheres().iter().enumerate() {
        let outer = sphere.radius * tunables.radius_scale();
        let Some(disk) = camera.project_sphere(sphere.position, outer, screen) else {
            continue;
        };
        let Some((lo, hi)) = disk.pixel_bounds(screen) else {
            continue;
        };

        for gy in lo.y.div_ceil(step)..=hi.y / step {
            for gx in lo.x.div_ceil(step)..=hi.x / step {
                let center = Vec2::new((gx * step) as f32 + 0.5, (gy * step) as f32 + 0.5);
                if disk.contains(center) {
                    let depth = camera.eye().distance(sphere.position) - outer;
                    lists.append(gx, gy, ListEntry { depth, primitive: index as u32 });
                }
            }
        }
    }

    let mut report = Occupancy {
        sampled: grid.x * grid.y,
        ..Occupancy::default()
    };
    for gy in 0..grid.y {
        for gx in 0..grid.x {
            let n = lists.candidates(gx, gy);
            report.max_candidates = report.max_candidates.max(n);
            if n > 0 {
                report.covered += 1;
            }
            if n > capacity {
                report.overflowing += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Sphere, World};
    use glam::Vec3;

    fn stacked(count: u32) -> Scene {
        let mut world = World::new();
        for i in 0..count {
            world.spawn(
                Sphere {
                    position: Vec3::new(0.0, 0.0, i as f32 * 0.01),
                    radius: 0.05,
                    level_of_detail: 0,
                },
                None,
            );
        }
        Scene::from_world(world)
    }

    #[test]
    fn empty_scene_covers_nothing() {
        let report = estimate(&Scene::default(), &Camera::default(), &Tunables::default(), UVec2::new(80, 60), 4, 1);
        assert_eq!(report.sampled, 80 * 60);
        assert_eq!(report.covered, 0);
        assert!(!report.overflows());
    }

    #[test]
    fn stacked_spheres_overflow_center() {
        let report = estimate(&stacked(6), &Camera::default(), &Tunables::default(), UVec2::new(80, 60), 4, 1);
        assert!(report.covered > 0);
        assert_eq!(report.max_candidates, 6);
        assert!(report.overflows());
    }

    #[test]
    fn enough_capacity_never_overflows() {
        let report = estimate(&stacked(6), &Camera::default(), &Tunables::default(), UVec2::new(80, 60), 6, 1);
        assert!(!report.overflows());
    }

    #[test]
    fn coarse_step_samples_fewer_pixels() {
        let fine = estimate(&stacked(3), &Camera::default(), &Tunables::default(), UVec2::new(80, 60), 4, 1);
        let coarse = estimate(&stacked(3), &Camera::default(), &Tunables::default(), UVec2::new(80, 60), 4, 4);
        assert_eq!(coarse.sampled, 20 * 15);
        assert!(coarse.covered < fine.covered);
        assert_eq!(coarse.max_candidates, 3);
    }

    #[test]
    fn zero_radius_scale_covers_nothing() {
        let mut tunables = Tunables::default();
        tunables.set_radius_scale(0.0);
        let report = estimate(&stacked(3), &Camera::default(), &tunables, UVec2::new(80, 60), 4, 1);
        assert_eq!(report.covered, 0);
    }
}
