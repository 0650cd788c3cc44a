use bevy::math::Vec2;

use super::body::Body;
use crate::config::ForceConfig;

/// Explicit Euler step: up pull + pull toward the anchor, then damping.
///
/// Stability relies on the tuned force and damping constants; there is no
/// adaptive step control. Paused frames (`dt <= 0`) are skipped entirely.
pub fn integrate(bodies: &mut [Body], anchor_attach: Vec2, forces: &ForceConfig, dt: f32) {
    if dt <= 0.0 {
        return;
    }

    // Lerp toward zero, with the factor clamped so large frames can't reverse velocity
    let keep = 1.0 - (dt * forces.damping).clamp(0.0, 1.0);

    for body in bodies.iter_mut().filter(|body| body.active) {
        let force =
            Vec2::Y * forces.up_force + (anchor_attach - body.position) * forces.center_force;

        body.velocity += force * dt;
        body.velocity *= keep;
        body.position += body.velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BalloonSimConfig;
    use crate::sim::body::BodyLayout;

    fn body_at(position: Vec2) -> Body {
        let layout = BodyLayout {
            position,
            size: Vec2::splat(40.0),
        };
        Body::from_layout(layout, Vec2::ZERO, &BalloonSimConfig::default())
    }

    #[test]
    fn test_single_step_matches_formula() {
        let forces = ForceConfig {
            up_force: 100.0,
            center_force: 2.0,
            damping: 5.0,
        };
        let mut bodies = vec![body_at(Vec2::new(10.0, 0.0))];
        let dt = 0.1;

        integrate(&mut bodies, Vec2::ZERO, &forces, dt);

        // force = (0, 100) + (-10, 0) * 2 = (-20, 100); v = force * dt = (-2, 10)
        // damped by (1 - 0.5) -> (-1, 5); position += v * dt
        let body = &bodies[0];
        assert!((body.velocity - Vec2::new(-1.0, 5.0)).length() < 1e-5);
        assert!((body.position - Vec2::new(9.9, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_paused_frame_is_noop() {
        let forces = ForceConfig::default();
        let mut bodies = vec![body_at(Vec2::new(3.0, 4.0))];
        let before = bodies.clone();

        integrate(&mut bodies, Vec2::ZERO, &forces, 0.0);
        integrate(&mut bodies, Vec2::ZERO, &forces, -0.016);

        assert_eq!(bodies, before);
    }

    #[test]
    fn test_inactive_bodies_untouched() {
        let forces = ForceConfig::default();
        let mut bodies = vec![body_at(Vec2::new(0.0, 100.0)), body_at(Vec2::new(50.0, 100.0))];
        bodies[1].active = false;
        let frozen = bodies[1].clone();

        integrate(&mut bodies, Vec2::ZERO, &forces, 1.0 / 60.0);

        assert_eq!(bodies[1], frozen);
        assert_ne!(bodies[0].position, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_huge_damping_stops_instead_of_reversing() {
        let forces = ForceConfig {
            up_force: 0.0,
            center_force: 0.0,
            damping: 1000.0,
        };
        let mut bodies = vec![body_at(Vec2::ZERO)];
        bodies[0].velocity = Vec2::new(50.0, 0.0);

        integrate(&mut bodies, Vec2::ZERO, &forces, 0.1);

        assert_eq!(bodies[0].velocity, Vec2::ZERO);
        assert_eq!(bodies[0].position, Vec2::ZERO);
    }
}
