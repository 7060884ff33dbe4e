use bevy::{app::AppExit, log::LogPlugin, prelude::*};
use ozma_rs::*;

const RUN_FRAMES: u32 = 300;

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugin(LogPlugin)
        .add_plugin(PhysicsPlugin::default())
        .add_startup_system(spawn_balls)
        .add_system(report)
        .run();
}

fn spawn_balls(mut commands: Commands, mut world: ResMut<PhysicsWorld>) {
    let ground = Body::rectangle(Vec2::new(0., -4.), 20., 2., 0., &Material::default().immovable());
    match ground {
        Ok(body) => {
            world.add(body);
        }
        Err(err) => error!(%err, "could not build ground"),
    }

    let radius = 0.5;
    let stacks = 5;
    let material = Material::default().with_restitution(0.);
    for i in 0..10 {
        for j in 0..stacks {
            let pos = Vec2::new(
                (j as f32 - stacks as f32 / 2.) * 2.5 * radius,
                2. * radius * i as f32 - 2.,
            );
            let body = match Body::circle(pos, radius, &material) {
                Ok(body) => body,
                Err(err) => {
                    error!(%err, "could not build ball");
                    continue;
                }
            };
            let handle = world.add(body);
            commands
                .spawn()
                .insert(handle)
                .insert(Transform::from_translation(pos.extend(0.)));
        }
    }
}

fn report(
    mut frames: Local<u32>,
    query: Query<&Transform, With<BodyHandle>>,
    mut exit: EventWriter<AppExit>,
) {
    *frames += 1;
    if *frames % 60 == 0 {
        let lowest = query
            .iter()
            .map(|t| t.translation.y)
            .fold(f32::MAX, f32::min);
        let highest = query
            .iter()
            .map(|t| t.translation.y)
            .fold(f32::MIN, f32::max);
        info!(frame = *frames, lowest, highest, "ball stack");
    }
    if *frames >= RUN_FRAMES {
        exit.send(AppExit);
    }
}
