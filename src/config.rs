// config.rs

use bevy::prelude::*;
use serde::Deserialize;

use crate::sim::SimError;

const BALLOON_SIM_JSON: &str = include_str!("../assets/balloon_sim.json");

/// Recommended range for relax passes per frame (more = stiffer, costlier)
const RELAX_ITERATIONS_RANGE: std::ops::RangeInclusive<usize> = 2..=5;

/// Every tunable of the balloon simulation
#[derive(Debug, Clone, PartialEq, Deserialize, Resource)]
#[serde(default)]
pub struct BalloonSimConfig {
    /// Master switch: when false both phases leave bodies where they are
    pub simulate: bool,
    pub forces: ForceConfig,
    pub collision: CollisionConfig,
    pub rope: RopeConfig,
    pub rotation: RotationConfig,
    pub shock: ShockConfig,
    pub anchor_spring: AnchorSpringConfig,
    pub descent: DescentConfig,
}

impl Default for BalloonSimConfig {
    fn default() -> Self {
        Self {
            simulate: true,
            forces: ForceConfig::default(),
            collision: CollisionConfig::default(),
            rope: RopeConfig::default(),
            rotation: RotationConfig::default(),
            shock: ShockConfig::default(),
            anchor_spring: AnchorSpringConfig::default(),
            descent: DescentConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Constant upward pull on every balloon
    pub up_force: f32,
    /// Pull toward the anchor attach point, per unit of distance
    pub center_force: f32,
    /// Velocity decay rate (higher = calmer)
    pub damping: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            up_force: 220.0,
            center_force: 35.0,
            damping: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Collision radius as a fraction of half the balloon's smaller side
    pub collision_scale: f32,
    pub relax_iterations: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            collision_scale: 0.75,
            relax_iterations: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RopeConfig {
    /// Offset from the anchor center to where every rope starts
    pub anchor_attach_offset: [f32; 2],
    /// Rope attaches at `height * bottom_offset_multiplier` below the balloon center
    pub bottom_offset_multiplier: f32,
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            anchor_attach_offset: [0.0, 0.0],
            bottom_offset_multiplier: 0.5,
        }
    }
}

impl RopeConfig {
    pub fn anchor_attach_offset(&self) -> Vec2 {
        Vec2::from_array(self.anchor_attach_offset)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub enabled: bool,
    /// Easing rate toward the target tilt, per second
    pub rotate_speed: f32,
    /// Maximum tilt in degrees either side of upright
    pub max_tilt: f32,
    /// Closer than this to the target, balloons ease back upright
    pub tilt_dead_zone: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rotate_speed: 10.0,
            max_tilt: 25.0,
            tilt_dead_zone: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShockConfig {
    pub enabled: bool,
    /// Lifetime of a shock in seconds (unscaled time)
    pub duration: f32,
    /// Immediate position nudge so the shock reads even against a stiff rope
    pub position_kick: f32,
    /// Shock radius in multiples of the popped balloon's collision radius
    pub radius_multiplier: f32,
    /// Velocity impulse magnitude
    pub strength: f32,
    /// Extra upward component of the push direction
    pub up_bias: f32,
}

impl Default for ShockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 0.16,
            position_kick: 18.0,
            radius_multiplier: 2.2,
            strength: 180.0,
            up_bias: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnchorSpringConfig {
    pub enabled: bool,
    /// Velocity added to the anchor on every pop
    pub pop_impulse: f32,
    pub spring_constant: f32,
    pub spring_damping: f32,
    /// Largest allowed distance between the anchor and its base
    pub max_offset: f32,
    /// Lateral jitter of the pop impulse, as a fraction of the down vector
    pub side_bias: f32,
    /// How far the base drops on every pop
    pub pop_recoil: f32,
    /// Below this speed the base re-captures the anchor's current position
    pub rebase_speed: f32,
    /// Speed at which squash/stretch reaches its full amount
    pub squash_reference_speed: f32,
    pub stretch_x: f32,
    pub squash_y: f32,
    /// Fraction of the remaining scale difference closed each tick
    pub squash_ease: f32,
}

impl Default for AnchorSpringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pop_impulse: 22.0,
            spring_constant: 70.0,
            spring_damping: 14.0,
            max_offset: 60.0,
            side_bias: 0.4,
            pop_recoil: 6.0,
            rebase_speed: 0.1,
            squash_reference_speed: 200.0,
            stretch_x: 0.08,
            squash_y: 0.10,
            squash_ease: 0.35,
        }
    }
}

/// Scripted anchor descent driven by pops
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DescentConfig {
    /// Distance the anchor sinks for every popped balloon
    pub per_pop: f32,
    /// Sink speed in units per second
    pub speed: f32,
}

impl Default for DescentConfig {
    fn default() -> Self {
        Self {
            per_pop: 120.0,
            speed: 160.0,
        }
    }
}

impl BalloonSimConfig {
    /// Load the embedded configuration document
    pub fn load() -> Result<Self, SimError> {
        Self::from_json(BALLOON_SIM_JSON)
    }

    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: BalloonSimConfig =
            serde_json::from_str(json).map_err(|e| SimError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the formulas cannot digest
    pub fn validate(&self) -> Result<(), SimError> {
        let non_negative = [
            ("forces.damping", self.forces.damping),
            ("collision.collision_scale", self.collision.collision_scale),
            ("rope.bottom_offset_multiplier", self.rope.bottom_offset_multiplier),
            ("rotation.rotate_speed", self.rotation.rotate_speed),
            ("rotation.max_tilt", self.rotation.max_tilt),
            ("rotation.tilt_dead_zone", self.rotation.tilt_dead_zone),
            ("shock.radius_multiplier", self.shock.radius_multiplier),
            ("anchor_spring.spring_damping", self.anchor_spring.spring_damping),
            ("anchor_spring.max_offset", self.anchor_spring.max_offset),
            ("anchor_spring.side_bias", self.anchor_spring.side_bias),
            ("anchor_spring.rebase_speed", self.anchor_spring.rebase_speed),
            ("descent.per_pop", self.descent.per_pop),
            ("descent.speed", self.descent.speed),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() {
                return Err(SimError::InvalidConfig {
                    field,
                    reason: "must be finite",
                });
            }
            if value < 0.0 {
                return Err(SimError::InvalidConfig {
                    field,
                    reason: "must not be negative",
                });
            }
        }

        let finite = [
            ("forces.up_force", self.forces.up_force),
            ("forces.center_force", self.forces.center_force),
            ("rope.anchor_attach_offset.x", self.rope.anchor_attach_offset[0]),
            ("rope.anchor_attach_offset.y", self.rope.anchor_attach_offset[1]),
            ("shock.position_kick", self.shock.position_kick),
            ("shock.strength", self.shock.strength),
            ("shock.up_bias", self.shock.up_bias),
            ("anchor_spring.pop_impulse", self.anchor_spring.pop_impulse),
            ("anchor_spring.spring_constant", self.anchor_spring.spring_constant),
            ("anchor_spring.pop_recoil", self.anchor_spring.pop_recoil),
            ("anchor_spring.stretch_x", self.anchor_spring.stretch_x),
            ("anchor_spring.squash_y", self.anchor_spring.squash_y),
        ];
        if let Some((field, _)) = finite.into_iter().find(|(_, value)| !value.is_finite()) {
            return Err(SimError::InvalidConfig {
                field,
                reason: "must be finite",
            });
        }

        if !(self.shock.duration.is_finite() && self.shock.duration > 0.0) {
            return Err(SimError::InvalidConfig {
                field: "shock.duration",
                reason: "must be positive",
            });
        }
        let squash_speed = self.anchor_spring.squash_reference_speed;
        if !(squash_speed.is_finite() && squash_speed > 0.0) {
            return Err(SimError::InvalidConfig {
                field: "anchor_spring.squash_reference_speed",
                reason: "must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.anchor_spring.squash_ease) {
            return Err(SimError::InvalidConfig {
                field: "anchor_spring.squash_ease",
                reason: "must be in [0, 1]",
            });
        }
        if self.collision.relax_iterations == 0 {
            return Err(SimError::InvalidConfig {
                field: "collision.relax_iterations",
                reason: "must be at least 1",
            });
        }
        if !RELAX_ITERATIONS_RANGE.contains(&self.collision.relax_iterations) {
            log::warn!(
                "collision.relax_iterations = {} is outside the usual {:?}",
                self.collision.relax_iterations,
                RELAX_ITERATIONS_RANGE
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = BalloonSimConfig::load().unwrap();
        assert_eq!(config, BalloonSimConfig::default());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let json = r#"{ "forces": { "up_force": 100.0 }, "collision": { "relax_iterations": 5 } }"#;
        let config = BalloonSimConfig::from_json(json).unwrap();

        assert_eq!(config.forces.up_force, 100.0);
        assert_eq!(config.forces.center_force, ForceConfig::default().center_force);
        assert_eq!(config.collision.relax_iterations, 5);
        assert_eq!(config.shock, ShockConfig::default());
        assert!(config.simulate);
    }

    #[test]
    fn test_attach_offset_as_vector() {
        let json = r#"{ "rope": { "anchor_attach_offset": [4.0, -12.5] } }"#;
        let config = BalloonSimConfig::from_json(json).unwrap();
        assert_eq!(config.rope.anchor_attach_offset(), Vec2::new(4.0, -12.5));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = BalloonSimConfig::from_json("{ not json");
        assert!(matches!(result, Err(SimError::ConfigParse(_))));
    }

    #[test]
    fn test_rejects_zero_shock_duration() {
        let json = r#"{ "shock": { "duration": 0.0 } }"#;
        assert_eq!(
            BalloonSimConfig::from_json(json),
            Err(SimError::InvalidConfig {
                field: "shock.duration",
                reason: "must be positive",
            })
        );
    }

    #[test]
    fn test_rejects_negative_damping() {
        let mut config = BalloonSimConfig::default();
        config.forces.damping = -1.0;
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig {
                field: "forces.damping",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_relax_iterations() {
        let mut config = BalloonSimConfig::default();
        config.collision.relax_iterations = 0;
        assert!(config.validate().is_err());

        // Out of the usual range is only a warning
        config.collision.relax_iterations = 12;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_finite_force() {
        let mut config = BalloonSimConfig::default();
        config.forces.up_force = f32::NAN;
        assert!(config.validate().is_err());
    }
}
