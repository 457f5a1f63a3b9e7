// ECS systems for updating game state
// Systems operate on entities with specific component combinations

use bevy_ecs::prelude::*;
use glam::Vec3;
use super::components::*;

/// Seconds elapsed since the previous frame. Written by the host before
/// running the frame schedule.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameTime {
    pub delta_seconds: f32,
}

/// Half extents of the walkable arena on X/Z, centred on the origin.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ArenaBounds {
    pub half_extents: Vec3,
}

/// Turn pending movement input into velocity
/// Input is consumed, so a frame without input stops the pawn
pub fn character_movement_system(mut query: Query<(&mut CharacterMovement, &mut Velocity)>) {
    for (mut movement, mut velocity) in query.iter_mut() {
        let input = movement.consume_input();
        velocity.linear = input * movement.max_walk_speed;
    }
}

/// Update entity positions based on velocity
/// Runs every frame, applies velocity * delta_time to position
pub fn movement_system(time: Res<FrameTime>, mut query: Query<(&mut Transform, &Velocity)>) {
    for (mut transform, velocity) in query.iter_mut() {
        transform.position += velocity.linear * time.delta_seconds;
    }
}

/// Keep moving entities inside the arena on X/Z and above the ground
pub fn bounds_system(bounds: Option<Res<ArenaBounds>>, mut query: Query<&mut Transform, With<Velocity>>) {
    let Some(bounds) = bounds else {
        return;
    };
    let half = bounds.half_extents;

    for mut transform in query.iter_mut() {
        let p = transform.position;
        let clamped = Vec3::new(
            p.x.clamp(-half.x, half.x),
            p.y.max(0.0),
            p.z.clamp(-half.z, half.z),
        );
        if clamped != p {
            transform.position = clamped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems((character_movement_system, movement_system, bounds_system).chain());
        schedule
    }

    #[test]
    fn test_input_moves_pawn_for_one_frame() {
        let mut world = World::new();
        world.insert_resource(FrameTime { delta_seconds: 0.5 });
        let mut movement = CharacterMovement::new(4.0);
        movement.add_movement_input(Vec3::X, 1.0);
        let pawn = world.spawn((Transform::default(), Velocity::default(), movement)).id();

        let mut schedule = movement_schedule();
        schedule.run(&mut world);
        assert_eq!(world.get::<Transform>(pawn).unwrap().position, Vec3::new(2.0, 0.0, 0.0));

        // No new input: pawn stops
        schedule.run(&mut world);
        assert_eq!(world.get::<Transform>(pawn).unwrap().position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_bounds_clamp_position() {
        let mut world = World::new();
        world.insert_resource(FrameTime { delta_seconds: 1.0 });
        world.insert_resource(ArenaBounds { half_extents: Vec3::new(5.0, 0.0, 5.0) });
        let mut movement = CharacterMovement::new(10.0);
        movement.add_movement_input(Vec3::NEG_Z, 1.0);
        let pawn = world.spawn((Transform::default(), Velocity::default(), movement)).id();

        movement_schedule().run(&mut world);
        assert_eq!(world.get::<Transform>(pawn).unwrap().position, Vec3::new(0.0, 0.0, -5.0));
    }
}
