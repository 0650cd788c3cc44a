use bevy::prelude::*;
use bevy::transform::TransformSystems;

use crate::config::BalloonSimConfig;
use crate::sim::BalloonSim;
use crate::visual::components::{BalloonHandles, BalloonPopped};
use crate::visual::interactions::{
    AnchorDescent, animate_pops, descend_anchor, queue_descent, tap_balloons,
};
use crate::visual::physics::{
    SimRng, collect_pops, late_step_simulation, release_removed_balloons, step_simulation,
    sync_anchor_sprite, sync_balloon_transforms,
};
use crate::visual::ropes::update_ropes;
use crate::visual::setup::{init_simulation, setup_scene};

pub struct BalloonPlugin;

impl Plugin for BalloonPlugin {
    fn build(&self, app: &mut App) {
        let config = BalloonSimConfig::load().unwrap_or_else(|err| {
            error!("Falling back to default balloon config: {}", err);
            BalloonSimConfig::default()
        });

        app.insert_resource(config)
            .init_resource::<SimRng>()
            .init_resource::<AnchorDescent>()
            .init_resource::<BalloonHandles>()
            .add_message::<BalloonPopped>()
            .add_systems(Startup, (setup_scene, init_simulation).chain())
            .add_systems(
                Update,
                (
                    toggle_simulation,
                    tap_balloons,
                    animate_pops,
                    queue_descent,
                    // Anchor drivers move first, the early phase reads the result
                    descend_anchor,
                    step_simulation,
                )
                    .chain(),
            )
            .add_systems(
                PostUpdate,
                (
                    release_removed_balloons,
                    collect_pops,
                    late_step_simulation,
                    sync_balloon_transforms,
                    sync_anchor_sprite,
                    update_ropes,
                )
                    .chain()
                    .before(TransformSystems::Propagate),
            );
    }
}

/// Space pauses and resumes the simulation
fn toggle_simulation(keys: Res<ButtonInput<KeyCode>>, sim: Option<ResMut<BalloonSim>>) {
    let Some(mut sim) = sim else {
        return;
    };
    if keys.just_pressed(KeyCode::Space) {
        let simulate = !sim.config().simulate;
        sim.set_simulating(simulate);
        info!("Balloon simulation {}", if simulate { "resumed" } else { "paused" });
    }
}
