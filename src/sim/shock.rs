use bevy::math::Vec2;

use super::body::Body;
use super::relax::EPSILON;
use crate::config::ShockConfig;

/// A short-lived radial push spawned where a balloon popped
#[derive(Debug, Clone, PartialEq)]
pub struct Shock {
    /// Frozen at pop time
    pub origin: Vec2,
    pub radius: f32,
    pub strength: f32,
    pub time_remaining: f32,
    /// Total lifetime, kept so decay stays linear even if the config changes
    pub duration: f32,
}

impl Shock {
    pub fn new(origin: Vec2, popped_radius: f32, config: &ShockConfig) -> Self {
        Shock {
            origin,
            radius: (popped_radius * config.radius_multiplier).max(1.0),
            strength: config.strength,
            time_remaining: config.duration,
            duration: config.duration,
        }
    }

    /// Linear 1 -> 0 over the shock's life
    pub fn decay(&self) -> f32 {
        (self.time_remaining / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.time_remaining > 0.0
    }

    /// Nudge positions and add velocity to every active body inside the radius
    fn apply(&self, bodies: &mut [Body], config: &ShockConfig, dt: f32) {
        let decay = self.decay();

        for body in bodies.iter_mut().filter(|body| body.active) {
            let d = body.position - self.origin;
            let dist = d.length().max(EPSILON);
            if dist > self.radius {
                continue;
            }

            let falloff = 1.0 - (dist / self.radius).clamp(0.0, 1.0);
            let dir = (d / dist + Vec2::Y * config.up_bias).normalize_or_zero();

            // Position so the push shows even against the rope, velocity so it lingers
            body.position += dir * (config.position_kick * falloff * decay);
            body.velocity += dir * (self.strength * falloff * decay * dt);
        }
    }
}

/// Every live shock. Effects of overlapping shocks add up.
#[derive(Debug, Clone, Default)]
pub struct ShockField {
    shocks: Vec<Shock>,
}

impl ShockField {
    pub fn spawn(&mut self, origin: Vec2, popped_radius: f32, config: &ShockConfig) {
        self.shocks.push(Shock::new(origin, popped_radius, config));
    }

    /// Apply every shock once, count it down by `dt`, and drop the expired ones.
    /// `dt` is unscaled time so shocks play out even while the game clock is slowed.
    pub fn tick(&mut self, bodies: &mut [Body], config: &ShockConfig, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        self.shocks.retain_mut(|shock| {
            shock.apply(bodies, config, dt);
            shock.time_remaining -= dt;
            shock.is_alive()
        });
    }

    #[cfg(test)]
    pub fn shocks(&self) -> &[Shock] {
        &self.shocks
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.shocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BalloonSimConfig;
    use crate::sim::body::BodyLayout;

    const DT: f32 = 1.0 / 60.0;

    fn body_at(position: Vec2) -> Body {
        let layout = BodyLayout {
            position,
            size: Vec2::splat(20.0),
        };
        Body::from_layout(layout, Vec2::new(0.0, -500.0), &BalloonSimConfig::default())
    }

    fn config() -> ShockConfig {
        ShockConfig {
            enabled: true,
            duration: 0.16,
            position_kick: 18.0,
            radius_multiplier: 2.0,
            strength: 100.0,
            up_bias: 0.0,
        }
    }

    #[test]
    fn test_spawn_radius_and_floor() {
        let shock = Shock::new(Vec2::ZERO, 25.0, &config());
        assert_eq!(shock.radius, 50.0);
        assert_eq!(shock.time_remaining, 0.16);

        let tiny = Shock::new(Vec2::ZERO, 0.1, &config());
        assert_eq!(tiny.radius, 1.0);
    }

    #[test]
    fn test_nearby_body_gets_computable_impulse() {
        let config = config();
        let mut field = ShockField::default();
        field.spawn(Vec2::ZERO, 25.0, &config); // radius 50

        let mut bodies = vec![body_at(Vec2::new(30.0, 0.0)), body_at(Vec2::new(80.0, 0.0))];
        let far_before = bodies[1].clone();

        field.tick(&mut bodies, &config, DT);

        // falloff = 1 - 30/50 = 0.4, decay = 1 on the first tick
        let expected_speed = 100.0 * 0.4 * 1.0 * DT;
        assert!((bodies[0].velocity.length() - expected_speed).abs() < 1e-5);
        assert!((bodies[0].position.x - (30.0 + 18.0 * 0.4)).abs() < 1e-4);

        // Out of range: bit-for-bit unchanged
        assert_eq!(bodies[1], far_before);
    }

    #[test]
    fn test_effect_decreases_then_stops() {
        let config = config();
        let mut field = ShockField::default();
        field.spawn(Vec2::ZERO, 25.0, &config);

        let mut previous_kick = f32::INFINITY;
        let mut ticks = 0;
        while !field.is_empty() {
            let mut bodies = vec![body_at(Vec2::new(10.0, 0.0))];
            field.tick(&mut bodies, &config, DT);
            let kick = bodies[0].position.x - 10.0;
            assert!(kick < previous_kick, "tick {} kick {} !< {}", ticks, kick, previous_kick);
            previous_kick = kick;
            ticks += 1;
        }
        // 0.16s at 60 Hz
        assert_eq!(ticks, 10);

        // Expired: nothing happens any more
        let mut bodies = vec![body_at(Vec2::new(10.0, 0.0))];
        let before = bodies.clone();
        field.tick(&mut bodies, &config, DT);
        assert_eq!(bodies, before);
    }

    #[test]
    fn test_overlapping_shocks_add_up() {
        // No position kick, so the second shock sees the same distance as the first
        let mut config = config();
        config.position_kick = 0.0;
        let mut single = ShockField::default();
        single.spawn(Vec2::ZERO, 25.0, &config);
        let mut double = single.clone();
        double.spawn(Vec2::ZERO, 25.0, &config);

        let mut once = vec![body_at(Vec2::new(20.0, 0.0))];
        let mut twice = once.clone();
        single.tick(&mut once, &config, DT);
        double.tick(&mut twice, &config, DT);

        let expected = once[0].velocity * 2.0;
        assert!((twice[0].velocity - expected).length() < 1e-5);
    }

    #[test]
    fn test_up_bias_tilts_push() {
        let mut config = config();
        config.up_bias = 0.25;
        let mut field = ShockField::default();
        field.spawn(Vec2::ZERO, 25.0, &config);

        let mut bodies = vec![body_at(Vec2::new(20.0, 0.0))];
        field.tick(&mut bodies, &config, DT);

        assert!(bodies[0].velocity.y > 0.0);
        assert!(bodies[0].velocity.x > bodies[0].velocity.y);
    }

    #[test]
    fn test_zero_dt_does_not_consume_shock() {
        let config = config();
        let mut field = ShockField::default();
        field.spawn(Vec2::ZERO, 25.0, &config);

        let mut bodies = vec![body_at(Vec2::new(10.0, 0.0))];
        let before = bodies.clone();
        field.tick(&mut bodies, &config, 0.0);

        assert_eq!(bodies, before);
        assert_eq!(field.shocks()[0].time_remaining, 0.16);
    }

    #[test]
    fn test_inactive_body_ignored() {
        let config = config();
        let mut field = ShockField::default();
        field.spawn(Vec2::ZERO, 25.0, &config);

        let mut bodies = vec![body_at(Vec2::ZERO)];
        bodies[0].active = false;
        let before = bodies.clone();
        field.tick(&mut bodies, &config, DT);

        assert_eq!(bodies, before);
    }
}
