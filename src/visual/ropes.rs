use bevy::prelude::*;

use crate::sim::{BalloonSim, BodySnapshot};
use crate::visual::components::{Anchor, Balloon, Rope};

/// Below this a rope has no direction to draw along
const MIN_ROPE_LENGTH: f32 = 0.001;

/// Transform that stretches a unit-tall quad from `start` to `end`
pub fn rope_transform(start: Vec2, end: Vec2, z: f32) -> Transform {
    let span = end - start;
    let length = span.length().max(MIN_ROPE_LENGTH);
    // Quad's long axis is local +Y
    let angle = span.y.atan2(span.x) - std::f32::consts::FRAC_PI_2;

    Transform {
        translation: ((start + end) * 0.5).extend(z),
        rotation: Quat::from_rotation_z(angle),
        scale: Vec3::new(1.0, length, 1.0),
    }
}

/// Stretch every rope between the anchor and its balloon; hide ropes of popped balloons
pub fn update_ropes(
    sim: Option<Res<BalloonSim>>,
    anchors: Query<&Transform, (With<Anchor>, Without<Rope>)>,
    balloons: Query<&Balloon>,
    mut ropes: Query<(&Rope, &mut Transform, &mut Visibility), Without<Anchor>>,
) {
    let Some(sim) = sim else {
        return;
    };
    let Ok(anchor) = anchors.single() else {
        return;
    };
    let start = sim.anchor_attach(anchor.translation.truncate());
    let poses: Vec<BodySnapshot> = sim.snapshot().collect();

    for (rope, mut transform, mut visibility) in &mut ropes {
        let pose = balloons
            .get(rope.balloon)
            .ok()
            .and_then(|balloon| poses.get(balloon.id.index()));
        let Some(pose) = pose.filter(|pose| pose.active) else {
            *visibility = Visibility::Hidden;
            continue;
        };

        *transform = rope_transform(start, pose.attach_point, transform.translation.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rope_spans_endpoints() {
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(30.0, 40.0);
        let transform = rope_transform(start, end, -1.0);

        assert_eq!(transform.translation, Vec3::new(15.0, 20.0, -1.0));
        assert!((transform.scale.y - 50.0).abs() < 1e-4);

        // Local +Y end of the unit quad lands on `end`
        let tip = transform.transform_point(Vec3::new(0.0, 0.5, 0.0));
        assert!((tip.truncate() - end).length() < 1e-3, "tip at {:?}", tip);
    }

    #[test]
    fn test_vertical_rope_is_unrotated() {
        let transform = rope_transform(Vec2::ZERO, Vec2::new(0.0, 100.0), 0.0);
        assert!(transform.rotation.angle_between(Quat::IDENTITY) < 1e-4);
    }
}
