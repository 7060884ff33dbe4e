//! The simulation step: broad phase, narrow phase, impulse resolution and
//! positional correction, always in that order.
//!
//! Detection only reads bodies, so it may scan rows of the pair matrix on
//! several threads. Everything that writes to a body runs on the calling
//! thread afterwards, because one body can sit in several pairs.

use bevy::prelude::*;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::*;

/// Friction impulses smaller than this are skipped.
const MIN_FRICTION_IMPULSE: f32 = f32::EPSILON;

/// Counts from one call to [`PhysicsEngine::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Pairs whose bounding circles overlapped.
    pub potential_pairs: usize,
    /// Pairs resolved with a positive penetration depth.
    pub contacts: usize,
    /// Whether detection actually ran on the thread pool.
    pub parallel: bool,
}

#[derive(Debug, Default)]
struct RowScan {
    potential_pairs: usize,
    contacts: Vec<BodyContact>,
}

#[derive(Debug, Default)]
pub struct PhysicsEngine {
    config: EngineConfig,
    contacts: Vec<BodyContact>,
}

impl PhysicsEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            contacts: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// Contacts found by the most recent step.
    pub fn contacts(&self) -> &[BodyContact] {
        &self.contacts
    }

    /// Drops pending contacts and the bodies' collision flags. The bodies
    /// themselves are left untouched otherwise.
    pub fn clear(&mut self, bodies: &mut [Body]) {
        debug!(pending = self.contacts.len(), "clearing physics engine state");
        self.contacts.clear();
        for body in bodies.iter_mut() {
            body.colliding = false;
        }
    }

    /// Advances every non-frozen body by `dt` under the configured gravity.
    pub fn integrate(&self, bodies: &mut [Body], dt: f32) {
        for body in bodies.iter_mut() {
            body.integrate(dt, self.config.gravity);
        }
    }

    /// Integration followed by one collision step.
    pub fn update(&mut self, bodies: &mut [Body], dt: f32, parallel: bool) -> StepReport {
        self.integrate(bodies, dt);
        self.step(bodies, parallel)
    }

    /// Runs one broad → narrow → resolve → correct pass over `bodies`.
    pub fn step(&mut self, bodies: &mut [Body], parallel: bool) -> StepReport {
        for body in bodies.iter_mut() {
            body.colliding = false;
        }

        let (potential_pairs, ran_parallel) = self.detect(bodies, parallel);

        for contact in &self.contacts {
            let (a, b) = pair_mut(bodies, contact.index_a, contact.index_b);
            a.colliding = true;
            b.colliding = true;
            resolve_collision(self.config.impulse_model, &contact.manifold, a, b);
        }

        for contact in &self.contacts {
            let (a, b) = pair_mut(bodies, contact.index_a, contact.index_b);
            correct_positions(&self.config, &contact.manifold, a, b);
        }

        let report = StepReport {
            potential_pairs,
            contacts: self.contacts.len(),
            parallel: ran_parallel,
        };
        trace!(
            bodies = bodies.len(),
            potential_pairs = report.potential_pairs,
            contacts = report.contacts,
            parallel = report.parallel,
            "physics step"
        );
        report
    }

    /// Fills `self.contacts` in pair order and returns the broad-phase count.
    fn detect(&mut self, bodies: &[Body], parallel: bool) -> (usize, bool) {
        self.contacts.clear();

        #[cfg(feature = "parallel")]
        if parallel {
            let rows: Vec<RowScan> = (0..bodies.len())
                .into_par_iter()
                .map(|i| scan_row(bodies, i))
                .collect();
            let mut potential_pairs = 0;
            for row in rows {
                potential_pairs += row.potential_pairs;
                self.contacts.extend(row.contacts);
            }
            return (potential_pairs, true);
        }

        #[cfg(not(feature = "parallel"))]
        if parallel {
            debug!("parallel step requested without the `parallel` feature; scanning sequentially");
        }

        let mut potential_pairs = 0;
        for i in 0..bodies.len() {
            let row = scan_row(bodies, i);
            potential_pairs += row.potential_pairs;
            self.contacts.extend(row.contacts);
        }
        (potential_pairs, false)
    }
}

/// Cheap bounding-circle test.
pub fn broad_phase_overlap(a: &Body, b: &Body) -> bool {
    let combined = a.shape().loose_check_radius() + b.shape().loose_check_radius();
    (b.position() - a.position()).length_squared() < combined * combined
}

/// Every penetrating pair `(i, j)` with `j > i`.
fn scan_row(bodies: &[Body], i: usize) -> RowScan {
    let mut row = RowScan::default();
    let a = &bodies[i];
    for (j, b) in bodies.iter().enumerate().skip(i + 1) {
        // Two immovable bodies have nothing to resolve.
        if !a.is_movable() && !b.is_movable() {
            continue;
        }
        if !broad_phase_overlap(a, b) {
            continue;
        }
        row.potential_pairs += 1;

        if !shapes_intersect(a.shape(), b.shape()) {
            continue;
        }
        let manifold = CollisionManifold::new(a, b);
        if !manifold.is_penetrating() {
            continue;
        }
        row.contacts.push(BodyContact {
            index_a: i,
            index_b: j,
            manifold,
        });
    }
    row
}

/// Two distinct bodies borrowed mutably at once.
pub(crate) fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    assert!(i < j, "collision pair ({}, {}) must be ordered and distinct", i, j);
    let (head, tail) = bodies.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Lever arms and normal impulse of one resolved contact point.
#[derive(Debug, Clone, Copy)]
struct ContactImpulse {
    r_a: Vec2,
    r_b: Vec2,
    normal_impulse: f32,
}

/// Applies normal and friction impulses for one manifold.
///
/// Every contact's normal impulse is computed from the velocities the pair
/// had on entry, and only then applied. Friction follows the same pattern on
/// the post-normal velocities, so two contacts never see each other's
/// impulses and a symmetric manifold yields a symmetric response.
///
/// The simple model is the contact-point model with one contact and zero
/// lever arms, and without friction.
pub fn resolve_collision(model: ImpulseModel, manifold: &CollisionManifold, a: &mut Body, b: &mut Body) {
    let normal = manifold.normal();
    let restitution = a
        .properties()
        .restitution()
        .min(b.properties().restitution());

    let centre_of_mass = [a.position()];
    let (contacts, with_friction) = match model {
        ImpulseModel::ContactPoint => (manifold.contacts(), true),
        ImpulseModel::Simple => (&centre_of_mass[..], false),
    };
    let contact_count = contacts.len() as f32;

    let mut resolved = [None; 2];
    for (slot, &contact) in resolved.iter_mut().zip(contacts) {
        let (r_a, r_b) = match model {
            ImpulseModel::ContactPoint => (contact - a.position(), contact - b.position()),
            ImpulseModel::Simple => (Vec2::ZERO, Vec2::ZERO),
        };

        let normal_vel = relative_velocity(a, b, r_a, r_b).dot(normal);
        // Already separating.
        if normal_vel > 0. {
            continue;
        }
        let k_normal = effective_inv_mass(a, b, r_a, r_b, normal);
        if k_normal <= 0. {
            continue;
        }

        *slot = Some(ContactImpulse {
            r_a,
            r_b,
            normal_impulse: -(1. + restitution) * normal_vel / k_normal / contact_count,
        });
    }

    for contact in resolved.iter().flatten() {
        let impulse = normal * contact.normal_impulse;
        a.apply_impulse(-impulse, contact.r_a);
        b.apply_impulse(impulse, contact.r_b);
    }

    if !with_friction {
        return;
    }

    let static_friction = combine_friction(
        a.properties().static_friction(),
        b.properties().static_friction(),
    );
    let dynamic_friction = combine_friction(
        a.properties().dynamic_friction(),
        b.properties().dynamic_friction(),
    );

    let mut friction = [None; 2];
    for (slot, contact) in friction.iter_mut().zip(&resolved) {
        let ContactImpulse {
            r_a,
            r_b,
            normal_impulse: j,
        } = match contact {
            Some(contact) => *contact,
            None => continue,
        };

        let relative_vel = relative_velocity(a, b, r_a, r_b);
        let tangent = (relative_vel - normal * relative_vel.dot(normal)).normalize_safe();
        if tangent == Vec2::ZERO {
            continue;
        }
        let k_tangent = effective_inv_mass(a, b, r_a, r_b, tangent);
        if k_tangent <= 0. {
            continue;
        }
        let jt = -relative_vel.dot(tangent) / k_tangent / contact_count;
        if jt.abs() <= MIN_FRICTION_IMPULSE {
            continue;
        }

        // Coulomb: stick while under the static bound, slide otherwise.
        let friction_impulse = if jt.abs() < j * static_friction {
            tangent * jt
        } else {
            tangent * (-j * dynamic_friction)
        };
        *slot = Some((r_a, r_b, friction_impulse));
    }

    for (r_a, r_b, impulse) in friction.iter().flatten() {
        a.apply_impulse(-*impulse, *r_a);
        b.apply_impulse(*impulse, *r_b);
    }
}

/// Pushes a penetrating pair apart along the normal without touching velocity.
pub fn correct_positions(config: &EngineConfig, manifold: &CollisionManifold, a: &mut Body, b: &mut Body) {
    let inv_mass_a = a.inv_mass();
    let inv_mass_b = b.inv_mass();
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    if inv_mass_sum <= 0. {
        return;
    }

    let magnitude = (manifold.penetration_depth() - config.slop).max(0.) / inv_mass_sum
        * config.correction_percent;
    if magnitude <= 0. {
        return;
    }

    let correction = manifold.normal() * magnitude;
    if inv_mass_a > 0. {
        a.translate(-correction * inv_mass_a);
    }
    if inv_mass_b > 0. {
        b.translate(correction * inv_mass_b);
    }
}

/// Velocity of B's contact point relative to A's.
fn relative_velocity(a: &Body, b: &Body, r_a: Vec2, r_b: Vec2) -> Vec2 {
    b.velocity() + scalar_cross(b.angular_velocity(), r_b)
        - a.velocity()
        - scalar_cross(a.angular_velocity(), r_a)
}

fn effective_inv_mass(a: &Body, b: &Body, r_a: Vec2, r_b: Vec2, direction: Vec2) -> f32 {
    let ra_cross = r_a.cross(direction);
    let rb_cross = r_b.cross(direction);
    a.inv_mass()
        + b.inv_mass()
        + ra_cross * ra_cross * a.inv_inertia()
        + rb_cross * rb_cross * b.inv_inertia()
}

fn combine_friction(a: f32, b: f32) -> f32 {
    (a * a + b * b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn elastic() -> Material {
        Material::default().with_restitution(1.)
    }

    fn inelastic() -> Material {
        Material::default().with_restitution(0.)
    }

    fn head_on_pair() -> Vec<Body> {
        vec![
            Body::circle(Vec2::ZERO, 10., &elastic())
                .unwrap()
                .with_velocity(Vec2::new(5., 0.)),
            Body::circle(Vec2::new(15., 0.), 10., &elastic())
                .unwrap()
                .with_velocity(Vec2::new(-5., 0.)),
        ]
    }

    fn momentum(bodies: &[Body]) -> Vec2 {
        bodies
            .iter()
            .fold(Vec2::ZERO, |acc, b| acc + b.velocity() * b.properties().mass())
    }

    #[test]
    fn head_on_circles_separate_and_conserve_momentum() {
        let mut bodies = head_on_pair();
        let before = momentum(&bodies);
        let mut engine = PhysicsEngine::default();

        let report = engine.step(&mut bodies, false);
        assert_eq!(report.contacts, 1);

        let after = momentum(&bodies);
        let scale = bodies[0].properties().mass();
        assert_abs_diff_eq!(before.x / scale, after.x / scale, epsilon = 1e-4);
        assert_abs_diff_eq!(before.y / scale, after.y / scale, epsilon = 1e-4);

        let normal = Vec2::X;
        let separation = (bodies[1].velocity() - bodies[0].velocity()).dot(normal);
        assert!(separation >= 0.);
        assert_relative_eq!(bodies[0].velocity().x, -5., epsilon = 1e-4);
        assert_relative_eq!(bodies[1].velocity().x, 5., epsilon = 1e-4);
        assert!(bodies[0].is_colliding() && bodies[1].is_colliding());
    }

    #[test]
    fn simple_model_matches_on_centre_line() {
        let mut bodies = head_on_pair();
        let mut engine =
            PhysicsEngine::new(EngineConfig::default().with_impulse_model(ImpulseModel::Simple));
        engine.step(&mut bodies, false);
        assert_relative_eq!(bodies[0].velocity().x, -5., epsilon = 1e-4);
        assert_relative_eq!(bodies[1].velocity().x, 5., epsilon = 1e-4);
        assert_eq!(bodies[0].angular_velocity(), 0.);
    }

    #[test]
    fn frozen_body_never_moves() {
        let mut bodies = vec![
            Body::rectangle(Vec2::ZERO, 20., 2., 0., &elastic()).unwrap().frozen(),
            Body::circle(Vec2::new(0., 2.), 1.5, &elastic())
                .unwrap()
                .with_velocity(Vec2::new(1., -8.)),
        ];
        let mut engine = PhysicsEngine::default();
        for _ in 0..30 {
            engine.update(&mut bodies, 1. / 60., false);
            assert_eq!(bodies[0].position(), Vec2::ZERO);
            assert_eq!(bodies[0].velocity(), Vec2::ZERO);
            assert_eq!(bodies[0].angular_velocity(), 0.);
        }
        assert!(bodies[1].velocity().y > 0. || bodies[1].position().y > 2.);
    }

    #[test]
    fn no_correction_within_slop() {
        let config = EngineConfig::default();
        let mut a = Body::circle(Vec2::ZERO, 1., &inelastic()).unwrap();
        let mut b = Body::circle(Vec2::new(1.995, 0.), 1., &inelastic()).unwrap();
        let manifold = CollisionManifold::new(&a, &b);
        assert!(manifold.penetration_depth() <= config.slop);

        correct_positions(&config, &manifold, &mut a, &mut b);
        assert_eq!(a.position(), Vec2::ZERO);
        assert_eq!(b.position(), Vec2::new(1.995, 0.));
    }

    #[test]
    fn correction_pushes_apart_by_inverse_mass() {
        let config = EngineConfig::default();
        let mut a = Body::circle(Vec2::ZERO, 1., &inelastic()).unwrap();
        let mut b = Body::circle(Vec2::new(1., 0.), 1., &inelastic()).unwrap();
        let manifold = CollisionManifold::new(&a, &b);

        correct_positions(&config, &manifold, &mut a, &mut b);
        // Depth 1, slop 0.01, 20% split evenly between equal masses.
        let shift = (1. - 0.01) * 0.2 / 2.;
        assert_relative_eq!(a.position().x, -shift, epsilon = 1e-5);
        assert_relative_eq!(b.position().x, 1. + shift, epsilon = 1e-5);
        assert_eq!(a.velocity(), Vec2::ZERO);
        assert_eq!(a.shape().position(), a.position());
    }

    #[test]
    fn correction_leaves_immovable_side() {
        let config = EngineConfig::default();
        let mut ground = Body::rectangle(Vec2::ZERO, 10., 2., 0., &inelastic().immovable()).unwrap();
        let mut ball = Body::circle(Vec2::new(0., 1.5), 1., &inelastic()).unwrap();
        let manifold = CollisionManifold::new(&ground, &ball);
        correct_positions(&config, &manifold, &mut ground, &mut ball);
        assert_eq!(ground.position(), Vec2::ZERO);
        assert_relative_eq!(ball.position().y, 1.5 + (0.5 - 0.01) * 0.2, epsilon = 1e-5);
    }

    #[test]
    fn touching_circles_at_rest_stay_at_rest() {
        let mut bodies = vec![
            Body::circle(Vec2::ZERO, 1., &inelastic()).unwrap(),
            Body::circle(Vec2::new(2., 0.), 1., &inelastic()).unwrap(),
        ];
        let mut engine = PhysicsEngine::default();
        engine.step(&mut bodies, false);
        for body in &bodies {
            assert_eq!(body.velocity(), Vec2::ZERO);
            assert_eq!(body.angular_velocity(), 0.);
        }
    }

    #[test]
    fn resting_overlap_injects_no_energy() {
        let mut bodies = vec![
            Body::circle(Vec2::ZERO, 1., &inelastic()).unwrap(),
            Body::circle(Vec2::new(1.999, 0.), 1., &inelastic()).unwrap(),
        ];
        let mut engine = PhysicsEngine::default();
        let report = engine.step(&mut bodies, false);
        assert_eq!(report.contacts, 1);
        for body in &bodies {
            assert_eq!(body.velocity(), Vec2::ZERO);
        }
    }

    #[test]
    fn broad_phase_prunes_distant_pairs() {
        let material = Material::default();
        let mut bodies = vec![
            Body::circle(Vec2::ZERO, 1., &material).unwrap(),
            Body::rectangle(Vec2::new(100., 0.), 2., 2., 0., &material).unwrap(),
            // Bounding circles overlap, shapes do not.
            Body::rectangle(Vec2::new(0., 3.), 10., 1., 0., &material).unwrap(),
        ];
        let mut engine = PhysicsEngine::default();
        let report = engine.step(&mut bodies, false);
        assert_eq!(report.potential_pairs, 1);
        assert_eq!(report.contacts, 0);
        assert!(!bodies[0].is_colliding());
    }

    #[test]
    fn immovable_pairs_are_skipped() {
        let fixed = Material::default().immovable();
        let mut bodies = vec![
            Body::rectangle(Vec2::ZERO, 4., 4., 0., &fixed).unwrap(),
            Body::rectangle(Vec2::new(1., 0.), 4., 4., 0., &fixed).unwrap(),
        ];
        let report = PhysicsEngine::default().step(&mut bodies, false);
        assert_eq!(report.potential_pairs, 0);
        assert!(bodies.iter().all(|b| !b.is_colliding()));

        // Frozen bodies with mass are skipped the same way.
        let mut frozen = vec![
            Body::circle(Vec2::ZERO, 1., &Material::default()).unwrap().frozen(),
            Body::circle(Vec2::new(0.5, 0.), 1., &Material::default()).unwrap().frozen(),
        ];
        let report = PhysicsEngine::default().step(&mut frozen, false);
        assert_eq!(report.contacts, 0);
        assert!(frozen.iter().all(|b| !b.is_colliding()));
    }

    #[test]
    fn friction_slows_sliding_box() {
        let mut bodies = vec![
            Body::rectangle(Vec2::ZERO, 100., 10., 0., &inelastic().immovable()).unwrap(),
            Body::rectangle(Vec2::new(0., 9.95), 10., 10., 0., &inelastic())
                .unwrap()
                .with_velocity(Vec2::new(4., -1.)),
        ];
        let mut engine = PhysicsEngine::default();
        engine.step(&mut bodies, false);
        let v = bodies[1].velocity();
        assert!(v.x < 4.);
        assert!(v.x >= 0.);
        assert!(v.y.abs() < 1.);
    }

    #[test]
    fn flat_landing_stays_symmetric() {
        let mut bodies = vec![
            Body::rectangle(Vec2::ZERO, 100., 10., 0., &inelastic().immovable()).unwrap(),
            Body::rectangle(Vec2::new(0., 9.9), 10., 10., 0., &inelastic())
                .unwrap()
                .with_velocity(Vec2::new(0., -5.)),
        ];
        let mut engine = PhysicsEngine::default();
        engine.step(&mut bodies, false);

        assert_eq!(engine.contacts()[0].manifold.contact_count(), 2);
        let crate_box = &bodies[1];
        assert_eq!(crate_box.angular_velocity(), 0.);
        assert_eq!(crate_box.velocity().x, 0.);
        assert!(crate_box.velocity().y > -5. && crate_box.velocity().y < 0.);
    }

    /// A ball resting on the ground with a sideways velocity of `slide`.
    fn ball_on_ground(slide: f32) -> (Body, Body, CollisionManifold) {
        let ground = Body::rectangle(Vec2::ZERO, 10., 2., 0., &inelastic().immovable()).unwrap();
        let ball = Body::circle(Vec2::new(0., 1.95), 1., &inelastic())
            .unwrap()
            .with_velocity(Vec2::new(slide, -5.));
        let manifold = CollisionManifold::new(&ground, &ball);
        (ground, ball, manifold)
    }

    #[test]
    fn static_friction_sticks_contact_point() {
        let (mut ground, mut ball, manifold) = ball_on_ground(0.1);
        assert_eq!(manifold.contact_count(), 1);
        resolve_collision(ImpulseModel::ContactPoint, &manifold, &mut ground, &mut ball);

        let contact = manifold.contacts()[0];
        let r_a = contact - ground.position();
        let r_b = contact - ball.position();
        let slip = relative_velocity(&ground, &ball, r_a, r_b);
        assert_abs_diff_eq!(slip.x, 0., epsilon = 1e-5);
        assert_abs_diff_eq!(slip.y, 0., epsilon = 1e-4);
        // Part of the sideways motion went into rolling.
        assert!(ball.velocity().x > 0. && ball.velocity().x < 0.1);
        assert!(ball.angular_velocity() < 0.);
    }

    #[test]
    fn dynamic_friction_caps_sliding_impulse() {
        let (mut ground, mut ball, manifold) = ball_on_ground(20.);
        let mass = ball.properties().mass();
        resolve_collision(ImpulseModel::ContactPoint, &manifold, &mut ground, &mut ball);

        // Normal impulse of an inelastic hit through the centre: m * 5.
        let j = mass * 5.;
        let dynamic = (0.3f32 * 0.3 + 0.3 * 0.3).sqrt();
        let applied = mass * (20. - ball.velocity().x);
        assert_relative_eq!(applied, j * dynamic, epsilon = 1e-3);
        assert_abs_diff_eq!(ball.velocity().y, 0., epsilon = 1e-4);
        // Still sliding after the impulse.
        let contact = manifold.contacts()[0];
        let slip = relative_velocity(&ground, &ball, contact - ground.position(), contact - ball.position());
        assert!(slip.x > 1.);
    }

    #[test]
    fn off_centre_contact_spins_box() {
        let mut bodies = vec![
            Body::rectangle(Vec2::ZERO, 100., 10., 0., &inelastic().immovable()).unwrap(),
            Body::rectangle(Vec2::new(0., 10.), 10., 10., 0.3, &inelastic())
                .unwrap()
                .with_velocity(Vec2::new(0., -5.)),
        ];
        let mut engine = PhysicsEngine::default();
        let report = engine.step(&mut bodies, false);
        assert_eq!(report.contacts, 1);
        assert_eq!(engine.contacts()[0].manifold.contact_count(), 1);
        assert!(bodies[1].angular_velocity() != 0.);
    }

    #[test]
    fn box_settles_on_ground() {
        let mut bodies = vec![
            Body::rectangle(Vec2::ZERO, 100., 10., 0., &inelastic().immovable()).unwrap(),
            Body::rectangle(Vec2::new(0., 10.5), 10., 10., 0., &inelastic()).unwrap(),
        ];
        let mut engine = PhysicsEngine::default();
        for _ in 0..120 {
            engine.update(&mut bodies, 1. / 60., false);
        }
        let crate_box = &bodies[1];
        assert!(crate_box.position().is_finite());
        assert!(crate_box.position().y > 9. && crate_box.position().y < 11.);
        assert!(crate_box.angle().abs() < 0.2);
    }

    fn scattered_scene() -> Vec<Body> {
        let material = Material::default().with_restitution(0.5);
        let mut bodies = vec![Body::rectangle(Vec2::new(0., -2.), 60., 4., 0., &material.clone().immovable())
            .unwrap()];
        for i in 0..24 {
            let x = (i % 6) as f32 * 3.1 - 8.;
            let y = (i / 6) as f32 * 2.9 + 0.5;
            let body = if i % 2 == 0 {
                Body::circle(Vec2::new(x, y), 1.6, &material).unwrap()
            } else {
                Body::rectangle(Vec2::new(x, y), 3., 2.5, i as f32 * 0.2, &material).unwrap()
            };
            bodies.push(body.with_velocity(Vec2::new((i % 3) as f32 - 1., -2.)));
        }
        bodies
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_detection_matches_sequential() {
        let mut sequential = scattered_scene();
        let mut parallel = scattered_scene();
        let mut engine_a = PhysicsEngine::default();
        let mut engine_b = PhysicsEngine::default();
        for _ in 0..20 {
            let a = engine_a.update(&mut sequential, 1. / 60., false);
            let b = engine_b.update(&mut parallel, 1. / 60., true);
            assert!(b.parallel);
            assert_eq!(a.potential_pairs, b.potential_pairs);
            assert_eq!(a.contacts, b.contacts);
        }
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn contacts_are_ordered_pairs() {
        let mut bodies = scattered_scene();
        let mut engine = PhysicsEngine::default();
        engine.update(&mut bodies, 1. / 60., true);
        let pairs: Vec<(usize, usize)> = engine
            .contacts()
            .iter()
            .map(|c| (c.index_a, c.index_b))
            .collect();
        assert!(pairs.iter().all(|(a, b)| a < b));
        let mut sorted = pairs.clone();
        sorted.sort();
        assert_eq!(pairs, sorted);
    }

    #[test]
    fn clear_drops_transient_state() {
        let mut bodies = head_on_pair();
        let mut engine = PhysicsEngine::default();
        engine.step(&mut bodies, false);
        assert!(!engine.contacts().is_empty());

        engine.clear(&mut bodies);
        assert!(engine.contacts().is_empty());
        assert!(bodies.iter().all(|b| !b.is_colliding()));
        assert_eq!(bodies.len(), 2);
    }

    #[test]
    #[should_panic]
    fn pair_mut_rejects_self_pairs() {
        let mut bodies = head_on_pair();
        let _ = pair_mut(&mut bodies, 1, 1);
    }
}
