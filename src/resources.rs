use bevy::prelude::*;

use crate::{Body, BodyHandle, CollisionManifold, PhysicsEngine};

/// How collision impulses are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImpulseModel {
    /// Per contact point, with torque and Coulomb friction.
    #[default]
    ContactPoint,
    /// One impulse through the centres of mass; linear only, no friction.
    Simple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub gravity: Vec2,
    /// Penetration allowed before positional correction kicks in.
    pub slop: f32,
    /// Fraction of the remaining penetration removed per step.
    pub correction_percent: f32,
    pub impulse_model: ImpulseModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0., -9.81),
            slop: 0.01,
            correction_percent: 0.2,
            impulse_model: ImpulseModel::ContactPoint,
        }
    }
}

impl EngineConfig {
    pub fn with_gravity(self, gravity: Vec2) -> Self {
        Self { gravity, ..self }
    }

    pub fn with_impulse_model(self, impulse_model: ImpulseModel) -> Self {
        Self {
            impulse_model,
            ..self
        }
    }

    pub fn with_correction(self, slop: f32, correction_percent: f32) -> Self {
        Self {
            slop,
            correction_percent,
            ..self
        }
    }
}

/// A confirmed, penetrating pair found during detection. `index_a < index_b`.
#[derive(Debug, Clone)]
pub struct BodyContact {
    pub index_a: usize,
    pub index_b: usize,
    pub manifold: CollisionManifold,
}

/// Bodies and engine driven by [`crate::PhysicsPlugin`].
pub struct PhysicsWorld {
    pub bodies: Vec<Body>,
    pub engine: PhysicsEngine,
    /// Time advanced per app update.
    pub dt: f32,
    pub parallel: bool,
}

impl PhysicsWorld {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: PhysicsEngine::new(config),
            ..Default::default()
        }
    }

    /// Adds a body and returns the handle entities use to follow it.
    pub fn add(&mut self, body: Body) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle(self.bodies.len() - 1)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.0)
    }

    /// Removes every body along with the engine's pending contacts.
    pub fn clear(&mut self) {
        self.engine.clear(&mut self.bodies);
        self.bodies.clear();
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            bodies: Vec::new(),
            engine: PhysicsEngine::default(),
            dt: 1. / 60.,
            parallel: false,
        }
    }
}
