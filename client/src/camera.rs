use bevy::prelude::*;

use crate::session::Session;
use crate::world::to_transform;

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(ClearColor(Color::srgb(0.55, 0.72, 0.9)));
    app.add_systems(Startup, add_camera);
    app.add_systems(PostUpdate, place_camera.run_if(resource_exists::<Session>));
}

fn add_camera(mut commands: Commands) {
    commands.spawn((
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_xyz(0.0, 5.0, 15.0).looking_to(Vec3::NEG_Z, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                300.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
    ));
}

/// Put the render camera at the session camera's pose.
fn place_camera(session: Res<Session>, mut camera: Single<&mut Transform, With<Camera3d>>) {
    **camera = to_transform(&session.game().camera().transform());
}
