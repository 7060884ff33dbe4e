use bevy::{app::AppExit, core::FixedTimestep, log::LogPlugin, prelude::*};
use ozma_rs::*;
use rand::random;

const RUN_FRAMES: u32 = 600;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugin(LogPlugin)
        .add_plugin(PhysicsPlugin::default())
        .add_startup_system(startup)
        .add_system_set(
            SystemSet::new()
                .with_run_criteria(FixedTimestep::step(1. / 2.))
                .with_system(spawn_boxes),
        )
        .add_system(report)
        .run();
}

fn startup(mut world: ResMut<PhysicsWorld>) {
    world.parallel = true;
    let ground = Material::default().immovable();
    let walls = [
        (Vec2::new(0., -5.), 40., 2.),
        (Vec2::new(-20., 5.), 2., 20.),
        (Vec2::new(20., 5.), 2., 20.),
    ];
    for (position, width, height) in walls {
        match Body::rectangle(position, width, height, 0., &ground) {
            Ok(body) => {
                world.add(body);
            }
            Err(err) => error!(%err, "could not build wall"),
        }
    }
}

fn spawn_boxes(mut commands: Commands, mut world: ResMut<PhysicsWorld>) {
    let material = Material::default().with_restitution(0.2);
    let position = Vec2::new((random::<f32>() - 0.5) * 20., 20.);
    let size = Vec2::new(1. + random::<f32>() * 2., 1. + random::<f32>() * 2.);
    let angle = random::<Rot>().as_radians();
    let body = match Body::rectangle(position, size.x, size.y, angle, &material) {
        Ok(body) => body.with_velocity(Vec2::new(0., -5.)),
        Err(err) => {
            error!(%err, "could not build box");
            return;
        }
    };
    let handle = world.add(body);
    commands
        .spawn()
        .insert(handle)
        .insert(Transform::from_translation(position.extend(0.)));
}

fn report(
    mut frames: Local<u32>,
    world: Res<PhysicsWorld>,
    mut exit: EventWriter<AppExit>,
) {
    *frames += 1;
    if *frames % 60 == 0 {
        let colliding = world.bodies.iter().filter(|b| b.is_colliding()).count();
        info!(
            frame = *frames,
            bodies = world.bodies.len(),
            colliding,
            contacts = world.engine.contacts().len(),
            "box pour"
        );
    }
    if *frames >= RUN_FRAMES {
        exit.send(AppExit);
    }
}
