//! One mesh per actor shape, kept in step with the physics scene.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use golf::rapier3d::parry::transformation::convex_hull;
use golf::{ActorId, Geometry, Rgba, ShapeIndex};
use nalgebra::{Isometry3, Vector3};

use crate::session::Session;

/// Side of the rendered ground quad; the physics plane is infinite.
const GROUND_SIZE: f32 = 200.0;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<SpawnedGeneration>();
    app.add_systems(Startup, add_lights);
    app.add_systems(
        PostUpdate,
        (respawn_visuals, sync_transforms)
            .chain()
            .run_if(resource_exists::<Session>),
    );
}

/// Links a mesh entity to the shape it draws.
#[derive(Component)]
pub struct ShapeVisual {
    pub actor: ActorId,
    pub shape: ShapeIndex,
}

/// Session generation the current meshes were built from.
#[derive(Resource, Default)]
struct SpawnedGeneration(Option<u32>);

fn to_vec3(v: Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_transform(pose: &Isometry3<f32>) -> Transform {
    let q = pose.rotation;
    Transform::from_translation(to_vec3(pose.translation.vector))
        .with_rotation(Quat::from_xyzw(q.i, q.j, q.k, q.w))
}

fn to_color(c: Rgba) -> Color {
    Color::srgba(c.r, c.g, c.b, c.a)
}

fn add_lights(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        brightness: 400.0,
        ..default()
    });
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(30.0, 60.0, 20.0).looking_at(Vec3::new(36.0, 0.0, 0.0), Vec3::Y),
    ));
}

fn hull_mesh(points: &[nalgebra::Point3<f32>]) -> Mesh {
    let (vertices, faces) = convex_hull(points);
    let positions: Vec<[f32; 3]> = vertices.iter().map(|p| [p.x, p.y, p.z]).collect();
    let indices = faces.into_iter().flatten().collect();
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_indices(Indices::U32(indices))
        .with_duplicated_vertices()
        .with_computed_flat_normals()
}

fn mesh_for(geometry: &Geometry) -> Mesh {
    match geometry {
        Geometry::Box { half_extents } => {
            Cuboid::new(half_extents.x * 2.0, half_extents.y * 2.0, half_extents.z * 2.0).into()
        }
        Geometry::Sphere { radius } => Sphere::new(*radius).into(),
        Geometry::Capsule {
            radius,
            half_height,
        } => Capsule3d::new(*radius, half_height * 2.0).into(),
        Geometry::ConvexHull { points } => hull_mesh(points),
        Geometry::ClothSheet {
            half_width,
            half_depth,
            columns,
            rows,
        } => Plane3d::default()
            .mesh()
            .size(half_width * 2.0, half_depth * 2.0)
            .subdivisions((*columns).max(*rows).saturating_sub(1))
            .build(),
        Geometry::Plane => Plane3d::default()
            .mesh()
            .size(GROUND_SIZE, GROUND_SIZE)
            .build(),
    }
}

/// Rebuild every mesh after the course was (re)composed.
fn respawn_visuals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut spawned: ResMut<SpawnedGeneration>,
    session: Res<Session>,
    visuals: Query<Entity, With<ShapeVisual>>,
) {
    if spawned.0 == Some(session.generation()) {
        return;
    }
    for entity in &visuals {
        commands.entity(entity).despawn();
    }

    let mut count = 0;
    for actor in session.game().all_actors() {
        for (index, shape) in actor.shapes().iter().enumerate() {
            // Fully transparent shapes (the goal box) are never drawn.
            if shape.color.a <= 0.0 {
                continue;
            }
            let double_sided = matches!(
                shape.geometry,
                Geometry::ClothSheet { .. } | Geometry::Plane
            );
            let material = StandardMaterial {
                base_color: to_color(shape.color),
                alpha_mode: if shape.color.a < 1.0 {
                    AlphaMode::Blend
                } else {
                    AlphaMode::Opaque
                },
                perceptual_roughness: 1.0,
                metallic: 0.0,
                double_sided,
                cull_mode: if double_sided {
                    None
                } else {
                    Some(bevy::render::render_resource::Face::Back)
                },
                ..default()
            };
            let pose = session
                .game()
                .scene()
                .shape_world_pose(actor.id(), index)
                .unwrap_or(Isometry3::identity());
            commands.spawn((
                ShapeVisual {
                    actor: actor.id(),
                    shape: index,
                },
                Mesh3d(meshes.add(mesh_for(&shape.geometry))),
                MeshMaterial3d(materials.add(material)),
                to_transform(&pose),
            ));
            count += 1;
        }
    }
    debug!("Spawned {count} shape meshes");
    spawned.0 = Some(session.generation());
}

fn sync_transforms(session: Res<Session>, mut visuals: Query<(&ShapeVisual, &mut Transform)>) {
    let scene = session.game().scene();
    for (visual, mut transform) in &mut visuals {
        // Meshes of a torn-down scene linger for one frame until respawned.
        let Ok(pose) = scene.shape_world_pose(visual.actor, visual.shape) else {
            continue;
        };
        *transform = to_transform(&pose);
    }
}
