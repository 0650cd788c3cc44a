use bevy::prelude::*;

use crate::{
    camera::MainCamera,
    input::PointerPressed,
    visual::{
        components::{BalloonPopped, BalloonSize, BalloonTap, PopAnimation},
        utils::ease_out_cubic,
    },
};

/// Length of the scale-up before a balloon vanishes, in real seconds
pub const POP_DURATION: f32 = 0.12;

/// Peak scale relative to the balloon's size when it was tapped
pub const POP_SCALE: f32 = 1.15;

/// System: start a pop on the balloon under the pointer
pub fn tap_balloons(
    mut commands: Commands,
    mut presses: MessageReader<PointerPressed>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut balloons: Query<(Entity, &Transform, &BalloonSize, &mut BalloonTap)>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    for press in presses.read() {
        let Some(world_pos) = press.to_world_position(camera, camera_transform) else {
            continue;
        };

        // Nearest unpopped balloon whose ellipse contains the point
        let hit = balloons
            .iter()
            .filter(|(_, _, _, tap)| !tap.is_popped())
            .filter(|(_, transform, size, _)| hits_balloon(world_pos, transform, size))
            .map(|(entity, transform, _, _)| {
                (entity, world_pos.distance(transform.translation.truncate()))
            })
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(entity, _)| entity);

        let Some(entity) = hit else {
            continue;
        };
        let Ok((_, transform, _, mut tap)) = balloons.get_mut(entity) else {
            continue;
        };
        if tap.try_pop() {
            info!("Pointer {} popped balloon {:?}", press.id, entity);
            commands
                .entity(entity)
                .insert(PopAnimation::new(transform.scale));
        }
    }
}

/// Point-in-ellipse test in the balloon's local frame
fn hits_balloon(world_pos: Vec2, transform: &Transform, size: &BalloonSize) -> bool {
    let local = transform
        .compute_affine()
        .inverse()
        .transform_point3(world_pos.extend(transform.translation.z))
        .truncate();
    let half = size.0 * 0.5;
    if half.x <= 0.0 || half.y <= 0.0 {
        return false;
    }
    (local / half).length_squared() <= 1.0
}

/// System: play the pop scale-up, hold the last frame once, then hide and announce
pub fn animate_pops(
    mut commands: Commands,
    time: Res<Time<Real>>,
    mut pops: Query<(Entity, &mut PopAnimation, &mut Transform, &mut Visibility)>,
    mut popped: MessageWriter<BalloonPopped>,
) {
    let dt = time.delta_secs();

    for (entity, mut anim, mut transform, mut visibility) in &mut pops {
        if anim.elapsed >= POP_DURATION {
            if !anim.held_frame {
                anim.held_frame = true;
                continue;
            }
            *visibility = Visibility::Hidden;
            commands.entity(entity).remove::<PopAnimation>();
            popped.write(BalloonPopped { balloon: entity });
            continue;
        }

        anim.elapsed += dt;
        transform.scale = pop_scale(anim.start_scale, anim.elapsed);
    }
}

fn pop_scale(start_scale: Vec3, elapsed: f32) -> Vec3 {
    let t = (elapsed / POP_DURATION).clamp(0.0, 1.0);
    start_scale * (1.0 + (POP_SCALE - 1.0) * ease_out_cubic(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_scale_endpoints() {
        assert_eq!(pop_scale(Vec3::ONE, 0.0), Vec3::ONE);
        assert!((pop_scale(Vec3::ONE, POP_DURATION) - Vec3::splat(POP_SCALE)).length() < 1e-5);
        // Clamped past the end
        assert!((pop_scale(Vec3::ONE, 10.0) - Vec3::splat(POP_SCALE)).length() < 1e-5);
        // Ease-out: more than half-way at the midpoint
        assert!(pop_scale(Vec3::ONE, POP_DURATION * 0.5).x > 1.0 + (POP_SCALE - 1.0) * 0.5);
    }

    #[test]
    fn test_hits_balloon_ellipse() {
        let size = BalloonSize(Vec2::new(100.0, 200.0));
        let transform = Transform::from_xyz(50.0, 50.0, 0.0);

        assert!(hits_balloon(Vec2::new(50.0, 50.0), &transform, &size));
        assert!(hits_balloon(Vec2::new(50.0, 145.0), &transform, &size));
        assert!(!hits_balloon(Vec2::new(105.0, 50.0), &transform, &size));
        // Inside the bounding box, outside the ellipse
        assert!(!hits_balloon(Vec2::new(95.0, 140.0), &transform, &size));
    }
}
