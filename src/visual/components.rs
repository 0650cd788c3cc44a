use bevy::prelude::*;
use std::collections::HashMap;

use crate::sim::BodyId;

/// Links a balloon entity to its simulated body
#[derive(Component, Debug, Clone, Copy)]
pub struct Balloon {
    pub id: BodyId,
}

/// Which body each balloon entity was registered as, kept so a despawned
/// balloon can still be traced back to its body
#[derive(Resource, Debug, Default)]
pub struct BalloonHandles(pub HashMap<Entity, BodyId>);

/// Unscaled visual width and height of a balloon
#[derive(Component, Debug, Clone, Copy)]
pub struct BalloonSize(pub Vec2);

/// One-shot pop guard. A balloon can only start popping once.
#[derive(Component, Debug, Default)]
pub struct BalloonTap {
    popped: bool,
}

impl BalloonTap {
    /// Returns true the first time only
    pub fn try_pop(&mut self) -> bool {
        if self.popped {
            return false;
        }
        self.popped = true;
        true
    }

    pub fn is_popped(&self) -> bool {
        self.popped
    }
}

/// Scale-up played before a balloon disappears
#[derive(Component, Debug)]
pub struct PopAnimation {
    pub elapsed: f32,
    pub start_scale: Vec3,
    /// The full-size frame has been shown once
    pub held_frame: bool,
}

impl PopAnimation {
    pub fn new(start_scale: Vec3) -> Self {
        Self {
            elapsed: 0.0,
            start_scale,
            held_frame: false,
        }
    }
}

/// The weight every rope hangs from
#[derive(Component, Debug)]
pub struct Anchor;

/// Child sprite of the anchor that carries the squash/stretch
#[derive(Component, Debug)]
pub struct AnchorSprite;

/// Point under the anchor that balloons lean toward
#[derive(Component, Debug)]
pub struct TiltTarget;

/// Rope quad belonging to a balloon
#[derive(Component, Debug)]
pub struct Rope {
    pub balloon: Entity,
}

/// Written once a balloon's pop animation has finished
#[derive(Message, Debug, Clone, Copy)]
pub struct BalloonPopped {
    pub balloon: Entity,
}
