use bevy::math::Vec2;

use super::body::Body;
use crate::config::RotationConfig;

/// Signed shortest difference `target - current` in degrees, in (-180, 180]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Interpolate between two angles along the shortest arc; `t` is clamped to [0, 1]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    wrap_degrees(from + delta_angle(from, to) * t.clamp(0.0, 1.0))
}

/// Wrap any angle into (-180, 180]
pub fn wrap_degrees(angle: f32) -> f32 {
    delta_angle(0.0, angle)
}

/// Tilt a balloon at `position` should take so its bottom points at `target`.
/// `None` inside the dead zone, where the balloon should hang straight.
pub fn target_tilt(position: Vec2, target: Vec2, config: &RotationConfig) -> Option<f32> {
    let to_target = target - position;
    if to_target.length() < config.tilt_dead_zone {
        return None;
    }

    // Local "down" axis points at the target, hence +90
    let angle = to_target.y.atan2(to_target.x).to_degrees() + 90.0;
    Some(delta_angle(0.0, angle).clamp(-config.max_tilt, config.max_tilt))
}

/// Ease every active body's rotation toward its tilt target
pub fn orient(bodies: &mut [Body], target: Vec2, config: &RotationConfig, dt: f32) {
    let t = dt * config.rotate_speed;

    for body in bodies.iter_mut().filter(|body| body.active) {
        let goal = target_tilt(body.position, target, config).unwrap_or(0.0);
        body.rotation = lerp_angle(body.rotation, goal, t);
    }
}
