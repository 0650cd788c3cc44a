use bevy::math::Vec2;
use rand::Rng;

use crate::config::AnchorSpringConfig;

/// Jelly response of the anchor: a damped spring around a base position
/// that follows whatever else moves the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSpring {
    pub base_position: Vec2,
    pub velocity: Vec2,
    /// Current squash/stretch (x = width factor, y = height factor)
    pub scale: Vec2,
    /// Anchor position as of the last tick; any difference is someone else's move
    last_written: Vec2,
}

impl AnchorSpring {
    pub fn new(anchor_position: Vec2) -> Self {
        AnchorSpring {
            base_position: anchor_position,
            velocity: Vec2::ZERO,
            scale: Vec2::ONE,
            last_written: anchor_position,
        }
    }

    /// Knock the anchor down (with a little random sideways lean) after a pop
    pub fn kick<R: Rng>(&mut self, config: &AnchorSpringConfig, rng: &mut R) {
        if !config.enabled {
            return;
        }

        let side = if config.side_bias > 0.0 {
            rng.random_range(-config.side_bias..=config.side_bias)
        } else {
            0.0
        };
        let direction = (Vec2::NEG_Y + Vec2::X * side).normalize();

        self.velocity += direction * config.pop_impulse;
        self.base_position += Vec2::NEG_Y * config.pop_recoil;
    }

    /// Advance the spring one tick, moving `anchor` in place
    pub fn tick(&mut self, anchor: &mut Vec2, config: &AnchorSpringConfig, dt: f32) {
        if !config.enabled || dt <= 0.0 {
            return;
        }

        // External motion (e.g. the descent) carries the base along with it
        self.base_position += *anchor - self.last_written;

        // At rest: adopt the anchor outright
        if self.velocity.length() < config.rebase_speed {
            self.base_position = *anchor;
        }

        let spring_force = (self.base_position - *anchor) * config.spring_constant;
        self.velocity += spring_force * dt;
        self.velocity *= (-config.spring_damping * dt).exp();

        let mut position = *anchor + self.velocity * dt;
        let offset = position - self.base_position;
        if offset.length() > config.max_offset {
            position = self.base_position + offset.normalize_or_zero() * config.max_offset;
        }
        *anchor = position;
        self.last_written = position;

        let speed01 = (self.velocity.length() / config.squash_reference_speed).clamp(0.0, 1.0);
        let target_scale = Vec2::new(
            1.0 + speed01 * config.stretch_x,
            1.0 - speed01 * config.squash_y,
        );
        self.scale = self.scale.lerp(target_scale, config.squash_ease);
    }

    #[cfg(test)]
    pub fn offset(&self, anchor: Vec2) -> Vec2 {
        anchor - self.base_position
    }
}
