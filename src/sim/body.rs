use bevy::math::Vec2;
use std::fmt;

use crate::config::BalloonSimConfig;

/// Index of a body in the registry. Stable for the lifetime of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a balloon sits and how big it is, as the scene reports it at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyLayout {
    /// Balloon center
    pub position: Vec2,
    /// Visual width and height
    pub size: Vec2,
}

/// One simulated balloon
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Fixed at creation: distance from the anchor attach point to this body's attach point
    pub rope_length: f32,
    /// Fixed at creation: collision radius
    pub radius: f32,
    /// Distance from the center down to the rope attach point
    pub attach_drop: f32,
    /// Visual tilt in degrees, in (-180, 180]
    pub rotation: f32,
    /// Inactive bodies keep their slot but are skipped by every pass
    pub active: bool,
    pub(crate) popped: bool,
}

impl Body {
    /// Build a body from its scene layout, measuring the rope against `anchor_attach`
    pub fn from_layout(layout: BodyLayout, anchor_attach: Vec2, config: &BalloonSimConfig) -> Self {
        let radius =
            0.5 * layout.size.x.min(layout.size.y) * config.collision.collision_scale;
        let attach_drop = layout.size.y * config.rope.bottom_offset_multiplier;

        let mut body = Body {
            position: layout.position,
            velocity: Vec2::ZERO,
            rope_length: 0.0,
            radius,
            attach_drop,
            rotation: 0.0,
            active: true,
            popped: false,
        };
        body.rope_length = anchor_attach.distance(body.attach_point());
        body
    }

    /// Bottom-middle of the balloon, where its rope is tied
    pub fn attach_point(&self) -> Vec2 {
        self.position - Vec2::Y * self.attach_drop
    }

    #[cfg(test)]
    pub fn is_popped(&self) -> bool {
        self.popped
    }
}

/// Dense store of every body, indexed by `BodyId`
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
}

impl BodyRegistry {
    /// Register every present layout. Missing or degenerate entries are skipped
    /// and logged; the returned vector maps each input slot to its id.
    pub fn bootstrap(
        anchor_attach: Vec2,
        layouts: &[Option<BodyLayout>],
        config: &BalloonSimConfig,
    ) -> (Self, Vec<Option<BodyId>>) {
        let mut bodies = Vec::with_capacity(layouts.len());
        let mut ids = Vec::with_capacity(layouts.len());

        for (slot, layout) in layouts.iter().enumerate() {
            let Some(layout) = layout else {
                log::warn!("Balloon slot {} has no handle, skipping", slot);
                ids.push(None);
                continue;
            };

            let usable = layout.position.is_finite()
                && layout.size.is_finite()
                && layout.size.x > 0.0
                && layout.size.y > 0.0;
            if !usable {
                log::warn!(
                    "Balloon slot {} has unusable layout {:?}, skipping",
                    slot,
                    layout
                );
                ids.push(None);
                continue;
            }

            ids.push(Some(BodyId(bodies.len())));
            bodies.push(Body::from_layout(*layout, anchor_attach, config));
        }

        (BodyRegistry { bodies }, ids)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.index())
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (BodyId(index), body))
    }

    pub fn active_count(&self) -> usize {
        self.bodies.iter().filter(|body| body.active).count()
    }
}
