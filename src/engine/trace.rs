// Line traces against simple collision shapes.
//
// Colliders are axis-aligned (spheres and boxes centred on the entity's
// Transform plus an offset). Each collider answers per trace channel with
// Ignore / Overlap / Block; a single trace stops only at Block.

use bevy_ecs::prelude::*;
use glam::Vec3;

use super::components::Transform;

// ============================================================================
// CHANNELS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceChannel {
    /// Line-of-sight style queries, including the cursor probe.
    Visibility,
    Camera,
}

impl TraceChannel {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        match self {
            TraceChannel::Visibility => 0,
            TraceChannel::Camera => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionResponse {
    #[default]
    Ignore,
    Overlap,
    Block,
}

// ============================================================================
// COLLIDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Shape centre relative to the entity's Transform.
    pub offset: Vec3,
    responses: [CollisionResponse; TraceChannel::COUNT],
}

impl Collider {
    /// New collider that ignores every channel.
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            responses: [CollisionResponse::Ignore; TraceChannel::COUNT],
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(ColliderShape::Sphere { radius })
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(ColliderShape::Box { half_extents })
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_response(mut self, channel: TraceChannel, response: CollisionResponse) -> Self {
        self.set_response_to_channel(channel, response);
        self
    }

    pub fn set_response_to_channel(&mut self, channel: TraceChannel, response: CollisionResponse) {
        self.responses[channel.index()] = response;
    }

    pub fn response_to_channel(&self, channel: TraceChannel) -> CollisionResponse {
        self.responses[channel.index()]
    }

    /// Distance along `ray` to the first surface of this collider placed at
    /// `position`, or None if the ray misses. A ray starting inside the shape
    /// hits at t = 0.
    pub fn intersect(&self, position: Vec3, ray: &Ray) -> Option<f32> {
        let center = position + self.offset;
        match self.shape {
            ColliderShape::Sphere { radius } => ray_sphere(ray, center, radius),
            ColliderShape::Box { half_extents } => {
                ray_aabb(ray, center - half_extents, center + half_extents)
            }
        }
    }
}

// ============================================================================
// RAY + HIT RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray; returns None for a zero-length direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Outcome of a single line trace.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitResult {
    /// True if the trace stopped at a blocking collider.
    pub blocking_hit: bool,
    pub actor: Option<Entity>,
    pub location: Vec3,
    pub distance: f32,
}

impl HitResult {
    pub fn get_actor(&self) -> Option<Entity> {
        self.actor
    }
}

// ============================================================================
// TRACES
// ============================================================================

/// Trace `ray` against every collider and return the nearest one that blocks
/// `channel` within `max_distance`.
pub fn line_trace_single<'a>(
    colliders: impl IntoIterator<Item = (Entity, &'a Transform, &'a Collider)>,
    ray: &Ray,
    channel: TraceChannel,
    max_distance: f32,
) -> HitResult {
    let mut best: Option<(Entity, f32)> = None;

    for (entity, transform, collider) in colliders {
        if collider.response_to_channel(channel) != CollisionResponse::Block {
            continue;
        }
        let Some(t) = collider.intersect(transform.position, ray) else {
            continue;
        };
        if t > max_distance {
            continue;
        }
        if best.is_none_or(|(_, best_t)| t < best_t) {
            best = Some((entity, t));
        }
    }

    match best {
        Some((entity, t)) => HitResult {
            blocking_hit: true,
            actor: Some(entity),
            location: ray.at(t),
            distance: t,
        },
        None => HitResult::default(),
    }
}

fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let disc = b * b - c;
    if disc < 0.0 || b > 0.0 {
        return None;
    }
    Some(-b - disc.sqrt())
}

// Slab test
fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray.direction.recip();
    let t1 = (min - ray.origin) * inv;
    let t2 = (max - ray.origin) * inv;

    let t_near = t1.min(t2).max_element();
    let t_far = t1.max(t2).min_element();

    if t_near > t_far || t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 20.0, z), Vec3::NEG_Y).unwrap()
    }

    #[test]
    fn test_ray_hits_sphere_front_surface() {
        let collider = Collider::sphere(1.0);
        let t = collider.intersect(Vec3::ZERO, &down_ray(0.0, 0.0)).unwrap();
        assert!((t - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_misses_sphere() {
        let collider = Collider::sphere(1.0);
        assert!(collider.intersect(Vec3::ZERO, &down_ray(2.0, 0.0)).is_none());
    }

    #[test]
    fn test_sphere_behind_ray_is_missed() {
        let collider = Collider::sphere(1.0);
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y).unwrap();
        assert!(collider.intersect(Vec3::ZERO, &ray).is_none());
    }

    #[test]
    fn test_ray_hits_box_with_axis_parallel_direction() {
        let collider = Collider::cuboid(Vec3::new(50.0, 0.5, 50.0)).with_offset(Vec3::new(0.0, -0.5, 0.0));
        let t = collider.intersect(Vec3::ZERO, &down_ray(3.0, -7.0)).unwrap();
        assert!((t - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_trace_ignores_non_blocking_and_picks_nearest() {
        let mut world = World::new();
        let ground = world
            .spawn((
                Transform::default(),
                Collider::cuboid(Vec3::new(50.0, 0.5, 50.0))
                    .with_offset(Vec3::new(0.0, -0.5, 0.0))
                    .with_response(TraceChannel::Visibility, CollisionResponse::Block),
            ))
            .id();
        let enemy = world
            .spawn((
                Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
                Collider::sphere(1.0).with_response(TraceChannel::Visibility, CollisionResponse::Block),
            ))
            .id();
        // Overlap-only volume above the enemy never stops the trace
        world.spawn((
            Transform::from_position(Vec3::new(0.0, 5.0, 0.0)),
            Collider::sphere(2.0).with_response(TraceChannel::Visibility, CollisionResponse::Overlap),
        ));

        let mut query = world.query::<(Entity, &Transform, &Collider)>();

        let hit = line_trace_single(query.iter(&world), &down_ray(0.0, 0.0), TraceChannel::Visibility, 100.0);
        assert!(hit.blocking_hit);
        assert_eq!(hit.get_actor(), Some(enemy));
        assert!((hit.location.y - 2.0).abs() < 1e-4);

        let hit = line_trace_single(query.iter(&world), &down_ray(5.0, 5.0), TraceChannel::Visibility, 100.0);
        assert_eq!(hit.get_actor(), Some(ground));

        // Camera channel: nothing blocks it
        let hit = line_trace_single(query.iter(&world), &down_ray(0.0, 0.0), TraceChannel::Camera, 100.0);
        assert_eq!(hit, HitResult::default());
    }

    #[test]
    fn test_trace_respects_max_distance() {
        let mut world = World::new();
        world.spawn((
            Transform::default(),
            Collider::sphere(1.0).with_response(TraceChannel::Visibility, CollisionResponse::Block),
        ));
        let mut query = world.query::<(Entity, &Transform, &Collider)>();
        let hit = line_trace_single(query.iter(&world), &down_ray(0.0, 0.0), TraceChannel::Visibility, 10.0);
        assert!(!hit.blocking_hit);
        assert!(hit.actor.is_none());
    }
}
