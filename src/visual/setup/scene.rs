use bevy::prelude::*;

use crate::{
    camera::GameCamera,
    config::BalloonSimConfig,
    sim::{BalloonSim, BodyLayout},
    visual::components::{
        Anchor, AnchorSprite, Balloon, BalloonHandles, BalloonSize, BalloonTap, Rope, TiltTarget,
    },
};

/// Balloons in the ring around the center one
const RING_COUNT: usize = 6;

/// Distance from the cluster center to each ring balloon
const RING_RADIUS: f32 = 110.0;

/// Height of the cluster center above the anchor
const CLUSTER_HEIGHT: f32 = 520.0;

const BALLOON_SIZE: Vec2 = Vec2::new(150.0, 180.0);
const ANCHOR_SIZE: Vec2 = Vec2::new(140.0, 90.0);
/// Anchor mesh hangs below the squash pivot; the pivot is its top edge
const ANCHOR_MESH_OFFSET: Vec3 = Vec3::new(0.0, -ANCHOR_SIZE.y * 0.5, 0.0);
pub const ROPE_THICKNESS: f32 = 3.0;

/// Ropes sit behind balloons, the anchor in front of both
const ROPE_Z: f32 = -1.0;
const ANCHOR_Z: f32 = 1.0;

const BALLOON_COLORS: [Color; 4] = [
    Color::srgb(0.93, 0.26, 0.32),
    Color::srgb(0.99, 0.76, 0.20),
    Color::srgb(0.32, 0.67, 0.96),
    Color::srgb(0.56, 0.83, 0.38),
];

pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    game_camera: Res<GameCamera>,
) {
    let anchor_position = game_camera.bounds.position_with_padding(0.5, 0.2, 0.05);
    let cluster_center = anchor_position + Vec2::Y * CLUSTER_HEIGHT;

    info!(
        "Scene setup: anchor at {:?}, cluster center at {:?}",
        anchor_position, cluster_center
    );

    let unlit = |color: Color| StandardMaterial {
        base_color: color,
        unlit: true,
        ..default()
    };

    // Anchor: root moves with the simulation, the child sprite squashes
    let anchor_mesh = meshes.add(Rectangle::new(ANCHOR_SIZE.x, ANCHOR_SIZE.y));
    let anchor_material = materials.add(unlit(Color::srgb(0.55, 0.38, 0.24)));
    commands
        .spawn((
            Anchor,
            Transform::from_translation(anchor_position.extend(ANCHOR_Z)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            // Scaled pivot sits on the anchor origin (the top edge, where the
            // ropes meet); the mesh hangs below it
            parent
                .spawn((AnchorSprite, Transform::default(), Visibility::default()))
                .with_children(|sprite| {
                    sprite.spawn((
                        Mesh3d(anchor_mesh),
                        MeshMaterial3d(anchor_material),
                        Transform::from_translation(ANCHOR_MESH_OFFSET),
                    ));
                });
            // Balloons lean toward the middle of the anchor body
            parent.spawn((TiltTarget, Transform::from_translation(ANCHOR_MESH_OFFSET)));
        });

    let balloon_mesh = meshes.add(Ellipse::new(BALLOON_SIZE.x * 0.5, BALLOON_SIZE.y * 0.5));
    let rope_mesh = meshes.add(Rectangle::new(ROPE_THICKNESS, 1.0));
    let rope_material = materials.add(unlit(Color::srgb(0.95, 0.95, 0.95)));
    let balloon_materials: Vec<Handle<StandardMaterial>> = BALLOON_COLORS
        .iter()
        .map(|&color| materials.add(unlit(color)))
        .collect();

    let ring = (0..RING_COUNT).map(|i| {
        let angle = i as f32 / RING_COUNT as f32 * std::f32::consts::TAU;
        cluster_center + Vec2::from_angle(angle) * RING_RADIUS
    });

    for (i, position) in std::iter::once(cluster_center).chain(ring).enumerate() {
        let material = balloon_materials[i % balloon_materials.len()].clone();
        // Spread balloons in depth so overlaps draw in a stable order
        let z = i as f32 * 0.01;

        let balloon = commands
            .spawn((
                BalloonSize(BALLOON_SIZE),
                BalloonTap::default(),
                Mesh3d(balloon_mesh.clone()),
                MeshMaterial3d(material),
                Transform::from_translation(position.extend(z)),
            ))
            .id();

        commands.spawn((
            Rope { balloon },
            Mesh3d(rope_mesh.clone()),
            MeshMaterial3d(rope_material.clone()),
            Transform::from_xyz(position.x, position.y, ROPE_Z),
        ));
    }

    info!("Spawned {} balloons", RING_COUNT + 1);
}

/// Register every balloon with a new simulation. Without an anchor the
/// simulation is never inserted and every system that needs it idles.
pub fn init_simulation(
    mut commands: Commands,
    config: Res<BalloonSimConfig>,
    anchors: Query<&Transform, With<Anchor>>,
    balloons: Query<(Entity, &Transform, &BalloonSize)>,
) {
    let anchor = match anchors.single() {
        Ok(transform) => Some(transform.translation.truncate()),
        Err(err) => {
            warn!("No single anchor in the scene: {}", err);
            None
        }
    };

    let handles: Vec<(Entity, BodyLayout)> = balloons
        .iter()
        .map(|(entity, transform, size)| {
            let layout = BodyLayout {
                position: transform.translation.truncate(),
                size: size.0 * transform.scale.truncate(),
            };
            (entity, layout)
        })
        .collect();
    let layouts: Vec<Option<BodyLayout>> = handles.iter().map(|(_, layout)| Some(*layout)).collect();

    match BalloonSim::new(config.clone(), anchor, &layouts) {
        Ok((sim, ids)) => {
            let mut registered = BalloonHandles::default();
            for ((entity, _), id) in handles.iter().zip(ids) {
                if let Some(id) = id {
                    commands.entity(*entity).insert(Balloon { id });
                    registered.0.insert(*entity, id);
                }
            }
            commands.insert_resource(registered);
            info!("Balloon simulation started with {} bodies", sim.registry().len());
            commands.insert_resource(sim);
        }
        Err(err) => {
            error!("Balloon simulation disabled: {}", err);
        }
    }
}
