mod components;
mod contact;
mod engine;
mod entity;
mod error;
mod resources;
mod rotation;
mod shape;
mod vector;

pub use components::*;
pub use contact::*;
pub use engine::*;
pub use entity::*;
pub use error::BodyError;
pub use resources::*;
pub use rotation::*;
pub use shape::*;
pub use vector::*;

use bevy::prelude::*;

#[derive(Debug, Hash, PartialEq, Eq, Clone, StageLabel)]
struct PhysicsStage;

//--------------------------------------------------------------------------------------------------
#[derive(SystemLabel, Debug, Hash, PartialEq, Eq, Clone)]
enum Step {
    Simulate,
    SyncTransforms,
}

/// Integrates and steps every body in the world once per app update.
fn simulate(mut world: ResMut<PhysicsWorld>) {
    let PhysicsWorld {
        bodies,
        engine,
        dt,
        parallel,
    } = &mut *world;
    engine.update(bodies, *dt, *parallel);
}

/// Copies positions and angles from the physics world to bevy Transforms
fn sync_transforms(world: Res<PhysicsWorld>, mut query: Query<(&BodyHandle, &mut Transform)>) {
    for (handle, mut transform) in query.iter_mut() {
        let body = match world.bodies.get(handle.0) {
            Some(body) => body,
            None => {
                warn!(index = handle.0, "body handle points past the physics world");
                continue;
            }
        };
        transform.translation = body.position().extend(transform.translation.z);
        transform.rotation = Rot::from_radians(body.angle()).into();
    }
}

#[derive(Debug, Default)]
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsWorld>().add_stage_before(
            CoreStage::Update,
            PhysicsStage,
            SystemStage::parallel()
                .with_system(simulate.label(Step::Simulate))
                .with_system(
                    sync_transforms
                        .label(Step::SyncTransforms)
                        .after(Step::Simulate),
                ),
        );
    }
}
