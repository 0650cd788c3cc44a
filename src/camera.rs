use bevy::camera::ScalingMode;
use bevy::prelude::*;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameCamera>()
            .insert_resource(ClearColor(Color::srgb(0.56, 0.80, 0.95)))
            .add_systems(Startup, setup_camera)
            .add_systems(Update, update_camera_resource);
    }
}

#[derive(Resource)]
pub struct GameCamera {
    /// Visible height in world units
    pub scale: f32,
    pub aspect_ratio: f32,
    pub bounds: CameraBounds,
}

#[derive(Debug, Clone)]
pub struct CameraBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Default for GameCamera {
    fn default() -> Self {
        // Portrait phone layout
        let scale = 1920.0;
        let aspect_ratio = 9.0 / 16.0;

        Self {
            scale,
            aspect_ratio,
            bounds: CameraBounds::from_scale_and_aspect(scale, aspect_ratio),
        }
    }
}

impl CameraBounds {
    pub fn from_scale_and_aspect(scale: f32, aspect_ratio: f32) -> Self {
        let half_height = scale * 0.5;
        let half_width = half_height * aspect_ratio;

        Self {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Point on the XY plane at a fraction of the padded view,
    /// e.g. (0.5, 0.25, 0.05) is centered, a quarter of the way up
    pub fn position_with_padding(
        &self,
        horizontal_percent: f32, // 0.0 = left, 1.0 = right
        vertical_percent: f32,   // 0.0 = bottom, 1.0 = top
        padding_percent: f32,
    ) -> Vec2 {
        let padded_left = self.left + self.width() * padding_percent;
        let padded_right = self.right - self.width() * padding_percent;
        let padded_bottom = self.bottom + self.height() * padding_percent;
        let padded_top = self.top - self.height() * padding_percent;

        let x = padded_left + (padded_right - padded_left) * horizontal_percent;
        let y = padded_bottom + (padded_top - padded_bottom) * vertical_percent;

        Vec2::new(x, y)
    }
}

#[derive(Component)]
pub struct MainCamera;

/// Orthographic camera looking down -Z at the XY plane, +Y up on screen
fn setup_camera(mut commands: Commands, game_camera: Res<GameCamera>) {
    let projection = Projection::Orthographic(OrthographicProjection {
        scaling_mode: ScalingMode::FixedVertical {
            viewport_height: game_camera.scale,
        },
        near: 0.0,
        far: 2000.0,
        ..OrthographicProjection::default_3d()
    });
    commands.spawn((
        Camera3d::default(),
        projection,
        Transform::from_xyz(0.0, 0.0, 1000.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));
}

/// Update camera resource when window is resized
fn update_camera_resource(mut game_camera: ResMut<GameCamera>, windows: Query<&Window>) {
    if let Ok(window) = windows.single() {
        let new_aspect = window.width() / window.height();

        // Only update if aspect ratio changed
        if (new_aspect - game_camera.aspect_ratio).abs() > 0.01 {
            game_camera.aspect_ratio = new_aspect;

            game_camera.bounds =
                CameraBounds::from_scale_and_aspect(game_camera.scale, game_camera.aspect_ratio);

            info!("Camera bounds updated: {:?}", game_camera.bounds);
        }
    }
}
