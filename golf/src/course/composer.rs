use rapier3d::na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use tracing::info;

use super::mechanisms::Assembly;
use super::segments::{SegmentKind, build_segment};
use super::{Course, LAYOUT, palette};
use crate::actor::{ActorId, Geometry, Material};
use crate::bitmask_flags::FlagBitmask;
use crate::error::CourseResult;
use crate::filter::FilterGroup;
use crate::scene::PhysicsScene;
use crate::settings::*;

fn ground(scene: &mut PhysicsScene) -> CourseResult<ActorId> {
    let id = scene.create_static(Isometry3::identity());
    scene.set_name(id, GROUND_NAME)?;
    scene.add_shape(id, Geometry::Plane, Isometry3::identity(), None)?;
    scene.set_color(id, 0, palette::GROUND)?;
    scene.set_filtering(id, FilterGroup::Terrain.mask(), FilterGroup::Player.mask())?;
    Ok(id)
}

fn player(scene: &mut PhysicsScene) -> CourseResult<ActorId> {
    let [x, y, z] = BALL_SPAWN_POSITION;
    let spawn = Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity());
    let id = scene.create_dynamic(spawn, BALL_DENSITY);
    scene.set_name(id, PLAYER_NAME)?;
    scene.add_shape(
        id,
        Geometry::Sphere {
            radius: BALL_RADIUS,
        },
        Isometry3::identity(),
        Some(Material::BALL),
    )?;
    scene.set_color(id, 0, palette::WHITE)?;
    // Fast shots must not tunnel through the thin walls.
    scene.enable_ccd(id, true)?;
    scene.set_angular_damping(id, BALL_ANGULAR_DAMPING)?;
    scene.set_filtering(id, FilterGroup::Player.mask(), FilterGroup::Terrain.mask())?;
    Ok(id)
}

fn hub(x: f32, y: f32, z: f32, axis: Vector3<f32>) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_scaled_axis(axis * 90f32.to_radians()),
    )
}

/// Build the whole course into `scene`.
///
/// Order is fixed: ground, ball, segments in `LAYOUT` order, then mechanisms.
pub fn compose(scene: &mut PhysicsScene) -> CourseResult<Course> {
    let ground = ground(scene)?;
    let player = player(scene)?;

    let mut segments = Vec::with_capacity(LAYOUT.len());
    for placement in LAYOUT {
        let id = build_segment(scene, placement.name, placement.kind, placement.pose())?;
        segments.push((*placement, id));
    }

    let mut assembly = Assembly::default();
    assembly.sweeper(scene)?;
    assembly.windmill(scene, "windmill_flat", hub(16.0, 1.6, -24.0, Vector3::z()))?;
    assembly.push_slider(scene)?;
    assembly.doors(scene)?;
    assembly.windmill(scene, "windmill_tall", hub(32.0, 4.9, 7.35, Vector3::y()))?;
    assembly.dangles(scene)?;
    for (placement, _) in segments.iter().filter(|(p, _)| p.kind == SegmentKind::Trampoline) {
        assembly.trampoline_pad(scene, placement.pose())?;
    }
    assembly.sand_stopper(scene)?;
    let hole = segments
        .iter()
        .find(|(p, _)| p.kind == SegmentKind::Hole)
        .map(|(p, _)| p.position)
        .unwrap_or([72.0, 1.0, -48.0]);
    let (goal, goal_trigger) = assembly.finish(scene, hole)?;
    assembly.twin_spheres(scene)?;

    info!(
        segments = segments.len(),
        mechanisms = assembly.actors.len(),
        constraints = assembly.constraints.len(),
        "course composed"
    );

    Ok(Course {
        player,
        ground,
        goal,
        goal_trigger,
        segments,
        mechanisms: assembly.actors,
        constraints: assembly.constraints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::MotionKind;
    use crate::user_data::unpack_tag;

    #[test]
    fn composes_every_segment_with_unique_names() {
        let mut scene = PhysicsScene::default();
        let course = compose(&mut scene).unwrap();
        assert_eq!(course.segments.len(), LAYOUT.len());

        let mut names: Vec<_> = scene.actors().map(|a| a.name().to_owned()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(course.segment("hole"), scene.find_actor("hole"));
    }

    #[test]
    fn ball_and_ground_react_to_each_other() {
        let mut scene = PhysicsScene::default();
        let course = compose(&mut scene).unwrap();

        let ball = scene.actor(course.player).unwrap();
        assert_eq!(ball.name(), PLAYER_NAME);
        assert_eq!(ball.kind(), MotionKind::Dynamic);
        let ground = scene.actor(course.ground).unwrap();
        assert!(ball.filter().notifies(&ground.filter()));

        // Course geometry stays silent.
        let tee = scene.actor(course.segment("tee").unwrap()).unwrap();
        assert!(!ball.filter().notifies(&tee.filter()));
    }

    #[test]
    fn goal_trigger_belongs_to_the_goal() {
        let mut scene = PhysicsScene::default();
        let course = compose(&mut scene).unwrap();
        assert_eq!(scene.actor_for_collider(course.goal_trigger), Some(course.goal));
        let handle = course.goal_trigger;
        let flags = unpack_tag(scene.colliders.get(handle).unwrap().user_data).flags;
        assert!(flags.is_trigger());
    }

    #[test]
    fn ball_rests_on_the_tee() {
        let mut scene = PhysicsScene::default();
        let course = compose(&mut scene).unwrap();
        for _ in 0..120 {
            let events = scene.step(DEFAULT_TIMESTEP);
            assert!(events.triggers.is_empty());
        }
        let p = scene.actor_pose(course.player).unwrap().translation.vector;
        assert!((p.y - BALL_SPAWN_POSITION[1]).abs() < 0.05, "y = {}", p.y);
    }
}
