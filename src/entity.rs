use std::f32::consts::PI;

use bevy::prelude::*;

use crate::error::BodyError;
use crate::*;

/// Displacement components below this are dropped during integration.
const MIN_DISPLACEMENT: f32 = 1e-4;

/// A simulated rigid body: one shape, one set of physics properties.
///
/// `position` is the centre of mass and always equals the shape's position.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    position: Vec2,
    velocity: Vec2,
    angular_velocity: f32,
    shape: Shape,
    properties: PhysicsProperties,
    frozen: bool,
    pub(crate) colliding: bool,
}

/// Everything a renderer needs to draw one body.
#[derive(Debug, Clone, Copy)]
pub struct RenderData<'a> {
    pub position: Vec2,
    pub angle: f32,
    pub vertices: &'a [Vec2],
    pub face_normals: &'a [Vec2],
    pub colliding: bool,
}

fn check_density(material: &Material) -> Result<f32, BodyError> {
    if material.density.is_finite() && material.density >= 0. {
        Ok(material.density)
    } else {
        Err(BodyError::InvalidDensity(material.density))
    }
}

impl Body {
    pub fn new(shape: Shape, properties: PhysicsProperties) -> Self {
        Self {
            position: shape.position(),
            velocity: Vec2::ZERO,
            angular_velocity: 0.,
            shape,
            properties,
            frozen: false,
            colliding: false,
        }
    }

    /// A solid disc of the material's density.
    pub fn circle(position: Vec2, radius: f32, material: &Material) -> Result<Self, BodyError> {
        let density = check_density(material)?;
        let shape = Shape::circle(position, radius)?;
        let mass = density * PI * radius * radius;
        let inertia = 0.5 * mass * radius * radius;
        debug!(?position, radius, mass, "built circle body");
        Ok(Self::new(shape, PhysicsProperties::new(mass, inertia, material)))
    }

    /// A solid box of the material's density.
    pub fn rectangle(
        position: Vec2,
        width: f32,
        height: f32,
        angle: f32,
        material: &Material,
    ) -> Result<Self, BodyError> {
        let density = check_density(material)?;
        let shape = Shape::rectangle(position, angle, width, height)?;
        let mass = density * width * height;
        let inertia = mass * (width * width + height * height) / 12.;
        debug!(?position, width, height, angle, mass, "built rectangle body");
        Ok(Self::new(shape, PhysicsProperties::new(mass, inertia, material)))
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.shape.move_to(position);
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.set_position(self.position + offset);
    }

    pub fn angle(&self) -> f32 {
        self.shape.angle()
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.shape.set_angle(angle);
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.angular_velocity = angular_velocity;
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn properties(&self) -> &PhysicsProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PhysicsProperties {
        &mut self.properties
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    /// Whether the last step found this body in a resolved collision.
    ///
    /// Pairs of immovable bodies are never tested, so two overlapping frozen
    /// or zero-mass bodies are not flagged.
    pub fn is_colliding(&self) -> bool {
        self.colliding
    }

    /// Zero while frozen, so impulses leave a frozen body alone.
    pub fn inv_mass(&self) -> f32 {
        if self.frozen {
            0.
        } else {
            self.properties.inv_mass()
        }
    }

    pub fn inv_inertia(&self) -> f32 {
        if self.frozen {
            0.
        } else {
            self.properties.inv_inertia()
        }
    }

    /// Can a collision change this body's motion at all?
    pub fn is_movable(&self) -> bool {
        self.inv_mass() > 0. || self.inv_inertia() > 0.
    }

    pub fn point_within(&self, point: Vec2) -> bool {
        self.shape.point_within(point)
    }

    /// Applies `impulse` at `contact`, given relative to the centre of mass.
    pub fn apply_impulse(&mut self, impulse: Vec2, contact: Vec2) {
        self.velocity += impulse * self.inv_mass();
        self.angular_velocity += self.inv_inertia() * contact.cross(impulse);
    }

    pub fn apply_central_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse * self.inv_mass();
    }

    /// Advances position and angle by one time step.
    pub fn integrate(&mut self, dt: f32, gravity: Vec2) {
        if self.frozen {
            return;
        }

        if self.inv_mass() > 0. {
            self.velocity += gravity * dt;
        }

        let damping = self.properties.velocity_damping() * dt;
        if damping > 0. {
            self.velocity = Vec2::new(
                reduce_towards_zero(self.velocity.x, damping),
                reduce_towards_zero(self.velocity.y, damping),
            );
        }

        let mut displacement = self.velocity * dt;
        if displacement.x.abs() < MIN_DISPLACEMENT {
            displacement.x = 0.;
        }
        if displacement.y.abs() < MIN_DISPLACEMENT {
            displacement.y = 0.;
        }

        self.position += displacement;
        self.shape.move_to(self.position);
        if self.angular_velocity != 0. {
            self.shape.set_angle(self.shape.angle() + self.angular_velocity * dt);
        }
    }

    pub fn render_data(&self) -> RenderData<'_> {
        RenderData {
            position: self.position,
            angle: self.shape.angle(),
            vertices: self.shape.vertices(),
            face_normals: self.shape.face_normals(),
            colliding: self.colliding,
        }
    }
}

fn reduce_towards_zero(value: f32, amount: f32) -> f32 {
    if value > 0. {
        (value - amount).max(0.)
    } else {
        (value + amount).min(0.)
    }
}
