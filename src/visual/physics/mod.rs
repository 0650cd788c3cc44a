use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::sim::{BalloonSim, BodySnapshot};
use crate::visual::components::{
    Anchor, AnchorSprite, Balloon, BalloonHandles, BalloonPopped, TiltTarget,
};

/// Random source for the anchor's sideways lean on pops
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        SimRng(StdRng::from_rng(&mut rand::rng()))
    }
}

/// Early phase: integrate and relax on scaled time
pub fn step_simulation(
    time: Res<Time>,
    sim: Option<ResMut<BalloonSim>>,
    anchors: Query<&Transform, With<Anchor>>,
    tilt_targets: Query<&Transform, With<TiltTarget>>,
) {
    let Some(mut sim) = sim else {
        return;
    };
    let Ok(anchor) = anchors.single() else {
        return;
    };
    let anchor = anchor.translation.truncate();

    // Child of the anchor, so its translation is an offset from it
    let tilt_target = tilt_targets
        .single()
        .ok()
        .map(|target| anchor + target.translation.truncate());

    sim.step(time.delta_secs(), anchor, tilt_target);
}

/// Balloons despawned outside the pop flow drop out of the simulation quietly
pub fn release_removed_balloons(
    mut removed: RemovedComponents<Balloon>,
    sim: Option<ResMut<BalloonSim>>,
    mut handles: ResMut<BalloonHandles>,
) {
    let Some(mut sim) = sim else {
        removed.clear();
        return;
    };

    for entity in removed.read() {
        let Some(id) = handles.0.remove(&entity) else {
            continue;
        };
        match sim.deactivate(id) {
            Ok(true) => info!("Balloon {} left the scene, removed from simulation", id),
            Ok(false) => {}
            Err(err) => warn!("Ignoring removed balloon: {}", err),
        }
    }
}

/// Hand finished pops to the simulation
pub fn collect_pops(
    mut popped: MessageReader<BalloonPopped>,
    sim: Option<ResMut<BalloonSim>>,
    balloons: Query<&Balloon>,
) {
    let Some(mut sim) = sim else {
        popped.clear();
        return;
    };

    for event in popped.read() {
        // Balloons the simulation never registered have nothing to notify
        let Ok(balloon) = balloons.get(event.balloon) else {
            continue;
        };
        match sim.notify_popped(balloon.id) {
            Ok(true) => info!("Balloon {} popped, {} left", balloon.id, sim.active_count()),
            Ok(false) => {}
            Err(err) => warn!("Ignoring pop: {}", err),
        }
    }
}

/// Late phase: shocks and anchor spring on real time, after every other anchor writer
pub fn late_step_simulation(
    time: Res<Time<Real>>,
    sim: Option<ResMut<BalloonSim>>,
    mut rng: ResMut<SimRng>,
    mut anchors: Query<&mut Transform, With<Anchor>>,
) {
    let Some(mut sim) = sim else {
        return;
    };
    let Ok(mut anchor) = anchors.single_mut() else {
        return;
    };

    let mut position = anchor.translation.truncate();
    sim.late_step(time.delta_secs(), &mut position, &mut rng.0);

    if position != anchor.translation.truncate() {
        anchor.translation = position.extend(anchor.translation.z);
    }
}

/// Copy simulated poses onto balloon transforms (scale belongs to the pop animation)
pub fn sync_balloon_transforms(
    sim: Option<Res<BalloonSim>>,
    mut balloons: Query<(&Balloon, &mut Transform)>,
) {
    let Some(sim) = sim else {
        return;
    };

    let poses: Vec<BodySnapshot> = sim.snapshot().collect();
    for (balloon, mut transform) in &mut balloons {
        let Some(pose) = poses.get(balloon.id.index()).filter(|pose| pose.active && pose.id == balloon.id)
        else {
            continue;
        };
        transform.translation.x = pose.position.x;
        transform.translation.y = pose.position.y;
        transform.rotation = Quat::from_rotation_z(pose.rotation.to_radians());
    }
}

pub fn sync_anchor_sprite(
    sim: Option<Res<BalloonSim>>,
    mut sprites: Query<&mut Transform, With<AnchorSprite>>,
) {
    let Some(sim) = sim else {
        return;
    };

    let scale = sim.anchor_scale();
    for mut transform in &mut sprites {
        transform.scale = scale.extend(1.0);
    }
}
