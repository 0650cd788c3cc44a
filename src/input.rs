use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::CursorMoved;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CursorPos>()
            .add_message::<PointerPressed>()
            .add_systems(Update, (track_cursor_pos, collect_pointer_presses).chain());
    }
}

/// A mouse click or touch start
#[derive(Message, Debug, Clone)]
pub struct PointerPressed {
    /// Window (logical) coordinates
    pub position: Vec2,
    /// 0 = mouse, otherwise the touch id
    pub id: u64,
}

impl PointerPressed {
    /// Project onto the z = 0 plane the scene lives on
    pub fn to_world_position(
        &self,
        camera: &Camera,
        camera_transform: &GlobalTransform,
    ) -> Option<Vec2> {
        let ray = camera
            .viewport_to_world(camera_transform, self.position)
            .ok()?;
        let t = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Z))?;
        Some(ray.get_point(t).truncate())
    }
}

#[derive(Resource, Default, Debug, Clone, Copy)]
struct CursorPos(pub Option<Vec2>);

fn track_cursor_pos(mut ev_cursor: MessageReader<CursorMoved>, mut pos: ResMut<CursorPos>) {
    for e in ev_cursor.read() {
        // last event wins
        pos.0 = Some(e.position);
    }
}

fn collect_pointer_presses(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    cursor: Res<CursorPos>,
    mut touch_events: MessageReader<TouchInput>,
    mut out: MessageWriter<PointerPressed>,
) {
    if let Some(p) = cursor.0
        && mouse_buttons.just_pressed(MouseButton::Left)
    {
        out.write(PointerPressed { position: p, id: 0 });
    }

    for ev in touch_events.read() {
        if ev.phase == TouchPhase::Started {
            out.write(PointerPressed {
                position: ev.position,
                id: ev.id,
            });
        }
    }
}
