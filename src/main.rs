use bevy::prelude::*;

mod camera;
mod config;
mod input;
mod sim;
mod visual;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use input::InputPlugin;

use crate::visual::plugin::BalloonPlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Balloon Rescue".into(),
            resolution: WindowResolution::new(1080, 1920),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(BalloonPlugin);

    app.run();
}
