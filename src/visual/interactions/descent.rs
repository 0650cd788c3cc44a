use bevy::prelude::*;

use crate::{
    config::DescentConfig,
    sim::BalloonSim,
    visual::components::{Anchor, BalloonPopped, BalloonTap},
};

/// Downward travel the anchor still owes
#[derive(Resource, Debug, Default)]
pub struct AnchorDescent {
    pub remaining: f32,
    pub landed: bool,
}

impl AnchorDescent {
    /// Distance to cover this frame; consumes it from `remaining`
    pub fn advance(&mut self, config: &DescentConfig, dt: f32) -> f32 {
        if dt <= 0.0 || self.remaining <= 0.0 {
            return 0.0;
        }
        let step = (config.speed * dt).min(self.remaining);
        self.remaining -= step;
        step
    }
}

/// System: every finished pop lowers the anchor a little further
pub fn queue_descent(
    mut popped: MessageReader<BalloonPopped>,
    sim: Option<Res<BalloonSim>>,
    taps: Query<&BalloonTap>,
    mut descent: ResMut<AnchorDescent>,
) {
    let Some(sim) = sim else {
        popped.clear();
        return;
    };

    let count = popped.read().count();
    if count == 0 {
        return;
    }
    descent.remaining += sim.config().descent.per_pop * count as f32;

    if !descent.landed && taps.iter().all(|tap| tap.is_popped()) {
        descent.landed = true;
        info!("All balloons popped");
    }
}

/// System: move the anchor down along the queued travel
pub fn descend_anchor(
    time: Res<Time>,
    sim: Option<Res<BalloonSim>>,
    mut descent: ResMut<AnchorDescent>,
    mut anchors: Query<&mut Transform, With<Anchor>>,
) {
    let Some(sim) = sim else {
        return;
    };
    let step = descent.advance(&sim.config().descent, time.delta_secs());
    if step <= 0.0 {
        return;
    }
    for mut transform in &mut anchors {
        transform.translation.y -= step;
    }
}
