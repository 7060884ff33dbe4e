use bevy::prelude::*;

/// Links a bevy entity to a body in [`crate::PhysicsWorld::bodies`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub usize);

/// Surface and density parameters used when building bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Mass per unit area. Zero builds an immovable body.
    pub density: f32,
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub velocity_damping: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.,
            restitution: 0.3,
            static_friction: 0.5,
            dynamic_friction: 0.3,
            velocity_damping: 0.,
        }
    }
}

impl Material {
    /// Same surface, zero density.
    pub fn immovable(self) -> Self {
        Self { density: 0., ..self }
    }

    pub fn with_restitution(self, restitution: f32) -> Self {
        Self { restitution, ..self }
    }

    pub fn with_friction(self, static_friction: f32, dynamic_friction: f32) -> Self {
        Self {
            static_friction,
            dynamic_friction,
            ..self
        }
    }
}

/// Inertial and material state of one body.
///
/// Inverses are only ever written through [`PhysicsProperties::set_mass`] and
/// [`PhysicsProperties::set_inertia`], so a zero mass or inertia always pairs
/// with a zero inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsProperties {
    mass: f32,
    inv_mass: f32,
    inertia: f32,
    inv_inertia: f32,
    restitution: f32,
    static_friction: f32,
    dynamic_friction: f32,
    velocity_damping: f32,
}

#[inline]
fn inverse(value: f32) -> f32 {
    if value == 0. {
        0.
    } else {
        1. / value
    }
}

impl PhysicsProperties {
    pub fn new(mass: f32, inertia: f32, material: &Material) -> Self {
        let mut properties = Self {
            mass: 0.,
            inv_mass: 0.,
            inertia: 0.,
            inv_inertia: 0.,
            restitution: 0.,
            static_friction: material.static_friction,
            dynamic_friction: material.dynamic_friction,
            velocity_damping: material.velocity_damping,
        };
        properties.set_mass(mass);
        properties.set_inertia(inertia);
        properties.set_restitution(material.restitution);
        properties
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.inv_mass = inverse(mass);
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    pub fn set_inertia(&mut self, inertia: f32) {
        self.inertia = inertia;
        self.inv_inertia = inverse(inertia);
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Clamped to `[0, 1]`.
    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution.clamp(0., 1.);
    }

    pub fn static_friction(&self) -> f32 {
        self.static_friction
    }

    pub fn set_static_friction(&mut self, friction: f32) {
        self.static_friction = friction;
    }

    pub fn dynamic_friction(&self) -> f32 {
        self.dynamic_friction
    }

    pub fn set_dynamic_friction(&mut self, friction: f32) {
        self.dynamic_friction = friction;
    }

    pub fn velocity_damping(&self) -> f32 {
        self.velocity_damping
    }

    pub fn set_velocity_damping(&mut self, damping: f32) {
        self.velocity_damping = damping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverses_follow_mass_and_inertia() {
        let mut p = PhysicsProperties::new(4., 8., &Material::default());
        assert_eq!(p.inv_mass(), 0.25);
        assert_eq!(p.inv_inertia(), 0.125);

        p.set_mass(0.);
        p.set_inertia(0.);
        assert_eq!(p.inv_mass(), 0.);
        assert_eq!(p.inv_inertia(), 0.);

        p.set_mass(2.);
        assert_eq!(p.inv_mass(), 0.5);
    }

    #[test]
    fn restitution_is_clamped() {
        let p = PhysicsProperties::new(1., 1., &Material::default().with_restitution(1.5));
        assert_eq!(p.restitution(), 1.);

        let mut p = p;
        p.set_restitution(-0.2);
        assert_eq!(p.restitution(), 0.);
    }

    #[test]
    fn material_carries_surface() {
        let material = Material::default().with_friction(0.9, 0.4).immovable();
        assert_eq!(material.density, 0.);

        let p = PhysicsProperties::new(0., 0., &material);
        assert_eq!(p.static_friction(), 0.9);
        assert_eq!(p.dynamic_friction(), 0.4);
        assert_eq!(p.inv_mass(), 0.);
    }
}
