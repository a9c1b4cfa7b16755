use glam::Vec3;

/// Renderable primitive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub position: Vec3,
    pub radius: f32,
    pub level_of_detail: u32,
}

/// Motion state for the animation step. `mass` is carried for completeness;
/// the rotation model does not read it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Physics {
    pub velocity: Vec3,
    pub mass: f32,
}

/// Stable handle of an entity. Ids are dense and equal to insertion index.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EntityId(u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Insertion-ordered component storage. Entities are never removed, so the
/// `i`-th entity always maps to slot `i` of any packed array built from it.
#[derive(Debug, Default, Clone)]
pub struct World {
    spheres: Vec<Sphere>,
    physics: Vec<Option<Physics>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, sphere: Sphere, physics: Option<Physics>) -> EntityId {
        let id = EntityId(self.spheres.len() as u32);
        self.spheres.push(sphere);
        self.physics.push(physics);
        id
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn sphere(&self, id: EntityId) -> Option<&Sphere> {
        self.spheres.get(id.index())
    }

    pub fn physics(&self, id: EntityId) -> Option<&Physics> {
        self.physics.get(id.index()).and_then(Option::as_ref)
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn spheres_mut(&mut self) -> &mut [Sphere] {
        &mut self.spheres
    }

    /// Entities that have both a sphere and physics, in insertion order.
    pub fn moving_mut(&mut self) -> impl Iterator<Item = (&mut Sphere, &mut Physics)> {
        self.spheres
            .iter_mut()
            .zip(self.physics.iter_mut())
            .filter_map(|(s, p)| p.as_mut().map(|p| (s, p)))
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> {
        (0..self.spheres.len() as u32).map(EntityId)
    }
}
