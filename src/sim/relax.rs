use bevy::math::Vec2;

use super::body::Body;
use super::orientation::orient;
use crate::config::BalloonSimConfig;

/// Floor for every distance used as a divisor
pub const EPSILON: f32 = 0.001;

/// Run the configured number of relax passes: separation, orientation, rope.
///
/// Orientation rides along inside the loop so it sees freshly separated positions.
pub fn relax(
    bodies: &mut [Body],
    anchor_attach: Vec2,
    rotation_target: Vec2,
    config: &BalloonSimConfig,
    dt: f32,
) {
    for _ in 0..config.collision.relax_iterations {
        separate(bodies);
        if config.rotation.enabled {
            orient(bodies, rotation_target, &config.rotation, dt);
        }
        constrain_ropes(bodies, anchor_attach);
    }
}

/// Push overlapping pairs apart, half the penetration each. O(n^2) per call,
/// which is fine for a handful of balloons.
pub fn separate(bodies: &mut [Body]) {
    let count = bodies.len();

    for i in 0..count {
        if !bodies[i].active {
            continue;
        }
        for j in (i + 1)..count {
            if !bodies[j].active {
                continue;
            }

            let d = bodies[j].position - bodies[i].position;
            let length = d.length();
            let min_dist = bodies[i].radius + bodies[j].radius;
            let dist = length.max(EPSILON);

            if dist >= min_dist {
                continue;
            }

            // Coincident centers have no direction; split them along X
            let normal = if length < EPSILON { Vec2::X } else { d / dist };
            let push = (min_dist - dist) * 0.5;

            bodies[i].position -= normal * push;
            bodies[j].position += normal * push;
        }
    }
}

/// Pin each body's attach point to exactly `rope_length` from the anchor.
/// Positional only: velocity is left alone so momentum carries into the next frame.
pub fn constrain_ropes(bodies: &mut [Body], anchor_attach: Vec2) {
    for body in bodies.iter_mut().filter(|body| body.active) {
        let attach = body.attach_point();
        let dir = attach - anchor_attach;
        let length = dir.length();

        // A rope collapsed onto the anchor gets pulled straight up
        let dir_n = if length < EPSILON {
            Vec2::Y
        } else {
            dir / length.max(EPSILON)
        };

        let desired = anchor_attach + dir_n * body.rope_length;
        body.position += desired - attach;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyLayout;

    fn make_body(position: Vec2, size: f32, anchor_attach: Vec2) -> Body {
        let layout = BodyLayout {
            position,
            size: Vec2::splat(size),
        };
        let mut config = BalloonSimConfig::default();
        config.collision.collision_scale = 1.0;
        Body::from_layout(layout, anchor_attach, &config)
    }

    #[test]
    fn test_overlapping_pair_separates_symmetrically() {
        // radius 20 each, 10 apart
        let mut bodies = vec![
            make_body(Vec2::new(0.0, 0.0), 40.0, Vec2::ZERO),
            make_body(Vec2::new(10.0, 0.0), 40.0, Vec2::ZERO),
        ];

        separate(&mut bodies);

        let gap = bodies[0].position.distance(bodies[1].position);
        assert!(gap >= 40.0 - 1e-4, "expected >= 40, got {}", gap);
        assert!((bodies[0].position - Vec2::new(-15.0, 0.0)).length() < 1e-4);
        assert!((bodies[1].position - Vec2::new(25.0, 0.0)).length() < 1e-4);
        // Each moved the same 15 units
        assert!((bodies[0].position.x.abs() - (bodies[1].position.x - 10.0)).abs() < 1e-4);
    }

    #[test]
    fn test_touching_pair_left_alone() {
        let mut bodies = vec![
            make_body(Vec2::new(0.0, 0.0), 40.0, Vec2::ZERO),
            make_body(Vec2::new(45.0, 0.0), 40.0, Vec2::ZERO),
        ];
        let before = bodies.clone();

        separate(&mut bodies);

        assert_eq!(bodies, before);
    }

    #[test]
    fn test_coincident_bodies_split_without_nan() {
        let mut bodies = vec![
            make_body(Vec2::new(5.0, 5.0), 40.0, Vec2::ZERO),
            make_body(Vec2::new(5.0, 5.0), 40.0, Vec2::ZERO),
        ];

        separate(&mut bodies);

        assert!(bodies.iter().all(|b| b.position.is_finite()));
        let gap = bodies[0].position.distance(bodies[1].position);
        assert!(gap >= 40.0 - 1e-2, "got {}", gap);
    }

    #[test]
    fn test_inactive_body_does_not_collide() {
        let mut bodies = vec![
            make_body(Vec2::new(0.0, 0.0), 40.0, Vec2::ZERO),
            make_body(Vec2::new(10.0, 0.0), 40.0, Vec2::ZERO),
        ];
        bodies[1].active = false;
        let before = bodies.clone();

        separate(&mut bodies);

        assert_eq!(bodies, before);
    }

    #[test]
    fn test_rope_pins_attach_point_to_length() {
        let anchor = Vec2::ZERO;
        let mut bodies = vec![make_body(Vec2::new(0.0, 120.0), 40.0, anchor)];
        let rope_length = bodies[0].rope_length;
        assert!((rope_length - 100.0).abs() < 1e-4);

        // Drag it somewhere else and let the rope pull it back onto the circle
        bodies[0].position = Vec2::new(300.0, 420.0);
        bodies[0].velocity = Vec2::new(7.0, -3.0);

        constrain_ropes(&mut bodies, anchor);

        let dist = bodies[0].attach_point().distance(anchor);
        assert!((dist - rope_length).abs() < 1e-3);
        assert_eq!(bodies[0].velocity, Vec2::new(7.0, -3.0));
    }

    #[test]
    fn test_collapsed_rope_points_up() {
        let anchor = Vec2::new(10.0, 10.0);
        let mut bodies = vec![make_body(Vec2::new(10.0, 130.0), 40.0, anchor)];
        // Put the attach point right on the anchor
        bodies[0].position = anchor + Vec2::Y * bodies[0].attach_drop;

        constrain_ropes(&mut bodies, anchor);

        let attach = bodies[0].attach_point();
        assert!((attach - (anchor + Vec2::Y * bodies[0].rope_length)).length() < 1e-3);
    }

    #[test]
    fn test_relax_satisfies_rope_and_separation() {
        let anchor = Vec2::ZERO;
        let mut config = BalloonSimConfig::default();
        config.collision.collision_scale = 1.0;
        config.collision.relax_iterations = 60;

        let mut bodies: Vec<Body> = [-30.0, -10.0, 10.0, 30.0]
            .iter()
            .map(|&x| make_body(Vec2::new(x, 250.0), 40.0, anchor))
            .collect();

        relax(&mut bodies, anchor, anchor, &config, 1.0 / 60.0);

        for body in &bodies {
            let dist = body.attach_point().distance(anchor);
            assert!((dist - body.rope_length).abs() < 1e-2);
        }
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let gap = bodies[i].position.distance(bodies[j].position);
                assert!(gap >= bodies[i].radius + bodies[j].radius - 1.0, "pair {}-{} gap {}", i, j, gap);
            }
        }
    }
}
